//! Request supersession for list queries.
//!
//! Each session may have several list requests in flight (double clicks,
//! quick pager navigation). Only the most recently issued one may render;
//! older responses are dropped when they finally arrive.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Proof of having issued a request, checked once its response arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    key: String,
    seq: u64,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

struct Latest {
    seq: u64,
    touched: Instant,
}

#[derive(Clone, Default)]
pub struct RequestTracker {
    latest: Arc<Mutex<HashMap<String, Latest>>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for `key`, superseding every earlier ticket for it.
    pub fn begin(&self, key: &str) -> Ticket {
        let mut map = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        let latest = map
            .entry(key.to_string())
            .or_insert(Latest { seq: 0, touched: Instant::now() });
        latest.seq += 1;
        latest.touched = Instant::now();
        Ticket { key: key.to_string(), seq: latest.seq }
    }

    /// True while no newer ticket has been issued for the same key.
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        let map = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        map.get(&ticket.key).is_some_and(|latest| latest.seq == ticket.seq)
    }

    /// Drop the entry for `key`, e.g. on sign-out.
    pub fn forget(&self, key: &str) {
        let mut map = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(key);
    }

    /// Drop keys that issued no ticket within `max_idle`. Returns how many went.
    ///
    /// Sessions that simply stop (closed tab, cookie expiry) never sign out,
    /// so their entries are only reclaimed here.
    pub fn prune(&self, max_idle: Duration) -> usize {
        let mut map = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        let before = map.len();
        map.retain(|_, latest| latest.touched.elapsed() < max_idle);
        before - map.len()
    }

    pub fn len(&self) -> usize {
        self.latest.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
