use std::time::Duration;

use crate::auth::rate_limit::RateLimiter;
use crate::tracker::RequestTracker;

const SWEEP_INTERVAL_SECS: u64 = 300;
/// Consoles idle this long lose their supersession entry.
const TRACKER_IDLE_SECS: u64 = 3600;

/// Periodically drop expired sign-in attempts and idle list trackers so
/// neither grows with every address or session ever seen.
pub fn spawn_sweeper(limiter: RateLimiter, tracker: RequestTracker) {
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let removed = limiter.prune();
            if removed > 0 {
                log::debug!("Pruned {removed} expired sign-in entries");
            }
            let idle = tracker.prune(Duration::from_secs(TRACKER_IDLE_SECS));
            if idle > 0 {
                log::debug!("Pruned {idle} idle console trackers, {} left", tracker.len());
            }
        }
    });
}
