use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, middleware, web};

use iotconsole::auth::rate_limit::RateLimiter;
use iotconsole::backend::ApiClient;
use iotconsole::config::Config;
use iotconsole::maintenance;
use iotconsole::routes;
use iotconsole::tracker::RequestTracker;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = Config::from_env();
    let client = ApiClient::new(&config.backend_url, config.backend_timeout)
        .map_err(|e| std::io::Error::other(format!("Failed to build backend client: {e}")))?;
    let secret_key = config.session_key();
    let tracker = RequestTracker::new();
    let limiter = RateLimiter::default();

    maintenance::spawn_sweeper(limiter.clone(), tracker.clone());

    log::info!("Backend at {}", config.backend_url);
    log::info!("Starting server at http://{}", config.bind_addr);

    let bind_addr = config.bind_addr.clone();
    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(config.cookie_secure)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(tracker.clone()))
            .app_data(web::Data::new(limiter.clone()))
            .configure(routes::configure)
            .default_service(web::to(routes::not_found))
    })
    .bind(bind_addr)?
    .run()
    .await
}
