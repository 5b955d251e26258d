use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use askama::Template;
use std::fmt;

use crate::backend::BackendError;

#[derive(Debug)]
pub enum AppError {
    Backend(BackendError),
    Template(askama::Error),
    Session(String),
    Csrf,
    Validation(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Backend(e) => write!(f, "Backend error: {e}"),
            AppError::Template(e) => write!(f, "Template error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::Csrf => write!(f, "Invalid or missing CSRF token"),
            AppError::Validation(e) => write!(f, "Invalid request: {e}"),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Backend(BackendError::Unauthorized) | AppError::Session(_) => StatusCode::SEE_OTHER,
            AppError::Backend(_) => StatusCode::BAD_GATEWAY,
            AppError::Csrf => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // The login page drops the stale session before showing the form.
            AppError::Backend(BackendError::Unauthorized) | AppError::Session(_) => {
                log::info!("{self}, redirecting to login");
                HttpResponse::SeeOther()
                    .insert_header(("Location", "/login?expired=1"))
                    .finish()
            }
            AppError::Csrf => HttpResponse::Forbidden().body("Invalid or missing CSRF token"),
            AppError::Validation(msg) => HttpResponse::BadRequest().body(msg.clone()),
            AppError::Backend(e) => {
                log::error!("{self}");
                HttpResponse::BadGateway().body(format!("Backend unavailable: {}", e.user_message()))
            }
            AppError::Template(_) => {
                log::error!("{self}");
                HttpResponse::InternalServerError().body("Internal Server Error")
            }
        }
    }
}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        AppError::Backend(e)
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

/// Render an askama template into a 200 HTML response.
pub fn render<T: Template>(tmpl: T) -> Result<HttpResponse, AppError> {
    let body = tmpl.render()?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// 303 redirect, used after every successful form post.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location.to_string()))
        .finish()
}
