use actix_web::{HttpResponse, web};

use crate::auth;
use crate::handlers::{account_handlers, auth_handlers, notification_handlers, protocol_handlers};

/// Register every console route. Shared state (`ApiClient`, `Config`,
/// `RequestTracker`, `RateLimiter`) and the session middleware are added by
/// the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Static files
        .service(actix_files::Files::new("/static", "./static"))
        // Public routes
        .route("/login", web::get().to(auth_handlers::login_page))
        .route("/login", web::post().to(auth_handlers::login_submit))
        .route("/", web::get().to(|| async {
            HttpResponse::SeeOther()
                .insert_header(("Location", "/protocols"))
                .finish()
        }))
        // Protected routes
        .service(
            web::scope("")
                .wrap(actix_web::middleware::from_fn(auth::middleware::require_auth))
                .route("/logout", web::post().to(auth_handlers::logout))
                // Protocols: /protocols/new and /protocols/search BEFORE /protocols/{id}/...
                .route("/protocols", web::get().to(protocol_handlers::list))
                .route("/protocols", web::post().to(protocol_handlers::save))
                .route("/protocols/new", web::get().to(protocol_handlers::new_form))
                .route("/protocols/search", web::post().to(protocol_handlers::search))
                .route("/protocols/{id}/edit", web::get().to(protocol_handlers::edit_form))
                .route("/protocols/{id}/delete", web::post().to(protocol_handlers::delete))
                .route("/protocols/{id}/deploy", web::post().to(protocol_handlers::change_deploy))
                // Account
                .route("/account/settings", web::get().to(account_handlers::settings))
                .route("/account/settings", web::post().to(account_handlers::settings_submit))
                .route("/account/security", web::get().to(account_handlers::security))
                .route("/account/password", web::post().to(account_handlers::change_password))
                .route("/account/notifications", web::get().to(notification_handlers::index))
                .route("/account/notifications/subscribe", web::post().to(notification_handlers::subscribe)),
        );
}

/// Fallback for unknown paths (must be registered last).
pub async fn not_found() -> HttpResponse {
    let html = include_str!("../templates/errors/404.html");
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
