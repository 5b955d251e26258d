use actix_session::Session;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::auth::{csrf, rate_limit::RateLimiter, session};
use crate::backend::{ApiClient, AuthService, BackendError};
use crate::config::Config;
use crate::errors::{AppError, redirect, render};
use crate::templates_structs::LoginTemplate;
use crate::tracker::RequestTracker;

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    expired: Option<String>,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn login_form(session: &Session, config: &Config, username: &str, error: Option<String>) -> Result<HttpResponse, AppError> {
    let tmpl = LoginTemplate {
        error,
        app_name: config.app_name.clone(),
        csrf_token: csrf::get_or_create_token(session),
        username: username.to_string(),
    };
    render(tmpl)
}

pub async fn login_page(
    config: web::Data<Config>,
    tracker: web::Data<RequestTracker>,
    session: Session,
    query: web::Query<LoginQuery>,
) -> Result<HttpResponse, AppError> {
    if query.expired.is_some() {
        // The backend no longer accepts our token.
        if let Some(id) = session::peek_console_id(&session) {
            tracker.forget(&id);
        }
        session.clear();
        session.renew();
        let msg = "Your session has expired, please sign in again".to_string();
        return login_form(&session, &config, "", Some(msg));
    }
    if session::get_token(&session).is_some() {
        return Ok(redirect("/protocols"));
    }
    login_form(&session, &config, "", None)
}

pub async fn login_submit(
    req: HttpRequest,
    client: web::Data<ApiClient>,
    config: web::Data<Config>,
    session: Session,
    form: web::Form<LoginForm>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    // Rate-limit check BEFORE contacting the backend
    let ip = req.peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or_else(|| std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED));

    if limiter.is_blocked(ip) {
        log::warn!("Blocked sign-in attempt from {ip}");
        let msg = "Too many failed login attempts. Please try again later.".to_string();
        return login_form(&session, &config, &form.username, Some(msg));
    }

    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return login_form(&session, &config, username, Some("Username and password are required".to_string()));
    }

    match AuthService::new(client.get_ref().clone()).login(username, &form.password).await {
        Ok(result) => {
            limiter.clear(ip);
            let landing = session::take_return_to(&session);
            session::sign_in(&session, &result.token, &result.display_name(username))?;
            log::info!("User '{username}' signed in");
            Ok(redirect(&landing))
        }
        Err(e @ (BackendError::Transport(_) | BackendError::Decode(_) | BackendError::MissingResult)) => {
            log::error!("Sign-in for '{username}' failed: {e}");
            login_form(&session, &config, username, Some(e.user_message()))
        }
        Err(e) => {
            log::info!("Rejected sign-in for '{username}': {e}");
            limiter.record_failure(ip);
            login_form(&session, &config, username, Some("Invalid username or password".to_string()))
        }
    }
}

pub async fn logout(
    client: web::Data<ApiClient>,
    tracker: web::Data<RequestTracker>,
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    if let Some(token) = session::get_token(&session) {
        // Best effort: the local session is discarded either way.
        if let Err(e) = AuthService::new(client.with_token(&token)).logout().await {
            log::warn!("Backend sign-out failed: {e}");
        }
    }
    if let Some(id) = session::peek_console_id(&session) {
        tracker.forget(&id);
    }
    session.purge();
    Ok(redirect("/login"))
}
