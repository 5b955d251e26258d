use actix_session::Session;
use serde::{Deserialize, Serialize};

use crate::auth::csrf;
use crate::backend::ApiClient;
use crate::errors::AppError;

const TOKEN: &str = "token";
const USERNAME: &str = "username";
const CONSOLE_ID: &str = "console_id";
const FLASH: &str = "flash";
const RETURN_TO: &str = "return_to";
const DEFAULT_LANDING: &str = "/protocols";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Success,
    Error,
}

/// One-shot notice shown on the next rendered page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn is_error(&self) -> bool {
        self.kind == FlashKind::Error
    }

    pub fn css_class(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "flash flash-success",
            FlashKind::Error => "flash flash-error",
        }
    }
}

pub fn sign_in(session: &Session, token: &str, username: &str) -> Result<(), AppError> {
    session.renew();
    session
        .insert(TOKEN, token)
        .and_then(|_| session.insert(USERNAME, username))
        .map_err(|e| AppError::Session(format!("Failed to store login: {e}")))
}

pub fn get_token(session: &Session) -> Option<String> {
    session.get::<String>(TOKEN).unwrap_or(None)
}

pub fn get_username(session: &Session) -> Result<String, String> {
    match session.get::<String>(USERNAME) {
        Ok(Some(username)) => Ok(username),
        Ok(None) => Err("No username in session".to_string()),
        Err(e) => Err(format!("Session error: {}", e)),
    }
}

/// Update the display name after a profile change.
pub fn set_username(session: &Session, username: &str) {
    if let Err(e) = session.insert(USERNAME, username) {
        log::warn!("Failed to store display name: {e}");
    }
}

/// Backend client authenticated with the session's token.
pub fn backend_for(session: &Session, client: &ApiClient) -> Result<ApiClient, AppError> {
    let token = get_token(session)
        .ok_or_else(|| AppError::Session("No backend token in session".to_string()))?;
    Ok(client.with_token(&token))
}

/// Stable per-session id, used to key per-session server-side state.
pub fn console_id(session: &Session) -> String {
    if let Ok(Some(id)) = session.get::<String>(CONSOLE_ID) {
        return id;
    }
    let id = csrf::random_hex(16);
    let _ = session.insert(CONSOLE_ID, &id);
    id
}

/// The console id if one was already issued. Never creates one.
pub fn peek_console_id(session: &Session) -> Option<String> {
    session.get::<String>(CONSOLE_ID).ok().flatten()
}

/// Remember the page an anonymous user asked for. Only local paths are kept.
pub fn remember_return_to(session: &Session, target: &str) {
    if is_local_path(target) {
        let _ = session.insert(RETURN_TO, target);
    }
}

/// Where to go after signing in; consumes the remembered page.
pub fn take_return_to(session: &Session) -> String {
    session
        .remove_as::<String>(RETURN_TO)
        .and_then(Result::ok)
        .filter(|t| is_local_path(t))
        .unwrap_or_else(|| DEFAULT_LANDING.to_string())
}

fn is_local_path(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.starts_with("/login")
}

pub fn set_flash(session: &Session, kind: FlashKind, message: impl Into<String>) {
    let flash = Flash { kind, message: message.into() };
    if let Err(e) = session.insert(FLASH, &flash) {
        log::warn!("Failed to store flash message: {e}");
    }
}

pub fn flash_success(session: &Session, message: impl Into<String>) {
    set_flash(session, FlashKind::Success, message);
}

pub fn flash_error(session: &Session, message: impl Into<String>) {
    set_flash(session, FlashKind::Error, message);
}

pub fn take_flash(session: &Session) -> Option<Flash> {
    let flash = session.get::<Flash>(FLASH).unwrap_or(None);
    if flash.is_some() {
        session.remove(FLASH);
    }
    flash
}

/// Read a JSON value stored under `key`, falling back to the default when
/// absent or unreadable.
pub fn get_state<T: for<'de> Deserialize<'de> + Default>(session: &Session, key: &str) -> T {
    session.get::<T>(key).unwrap_or(None).unwrap_or_default()
}

pub fn set_state<T: Serialize>(session: &Session, key: &str, value: &T) {
    if let Err(e) = session.insert(key, value) {
        log::warn!("Failed to store session state '{key}': {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_local_paths_are_return_targets() {
        assert!(is_local_path("/protocols?page=2"));
        assert!(!is_local_path("//evil.example/"));
        assert!(!is_local_path("https://evil.example/"));
        assert!(!is_local_path("/login"));
    }

    #[test]
    fn flash_css_follows_kind() {
        let flash = Flash { kind: FlashKind::Error, message: "x".into() };
        assert!(flash.is_error());
        assert_eq!(flash.css_class(), "flash flash-error");
    }
}
