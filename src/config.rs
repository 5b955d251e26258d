use actix_web::cookie::Key;
use std::time::Duration;

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8848";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_APP_NAME: &str = "IoT Console";

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub bind_addr: String,
    pub backend_timeout: Duration,
    pub app_name: String,
    pub cookie_secure: bool,
    session_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let backend_timeout = match std::env::var("BACKEND_TIMEOUT_SECS") {
            Ok(val) => val.parse().unwrap_or_else(|_| {
                log::warn!("Invalid BACKEND_TIMEOUT_SECS '{val}', using {DEFAULT_TIMEOUT_SECS}s");
                DEFAULT_TIMEOUT_SECS
            }),
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Self {
            backend_url: env_or("BACKEND_URL", DEFAULT_BACKEND_URL),
            bind_addr: env_or("BIND_ADDR", DEFAULT_BIND_ADDR),
            backend_timeout: Duration::from_secs(backend_timeout),
            app_name: env_or("APP_NAME", DEFAULT_APP_NAME),
            cookie_secure: std::env::var("COOKIE_SECURE").is_ok_and(|v| v == "true" || v == "1"),
            session_key: std::env::var("SESSION_KEY").ok(),
        }
    }

    /// Settings pointing at the given backend, everything else defaulted.
    pub fn for_backend(backend_url: &str) -> Self {
        Self {
            backend_url: backend_url.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            backend_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            app_name: DEFAULT_APP_NAME.to_string(),
            cookie_secure: false,
            session_key: None,
        }
    }

    /// Session encryption key. A random key is generated when SESSION_KEY is
    /// missing or too short, so sessions do not survive a restart.
    pub fn session_key(&self) -> Key {
        match &self.session_key {
            Some(val) if val.len() >= 64 => {
                log::info!("Using SESSION_KEY from environment");
                Key::from(val.as_bytes())
            }
            Some(val) => {
                log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
                Key::generate()
            }
            None => {
                log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
                Key::generate()
            }
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
