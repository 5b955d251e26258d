//! Typed access to the device-management REST backend.
//!
//! Every backend response is wrapped in an envelope `{status, result, message}`.
//! [`ApiClient`] performs one HTTP call per operation, checks the envelope
//! status and hands back the decoded `result`. Anything other than status 200
//! comes back as a [`BackendError`]; nothing is dropped silently.

pub mod account;
pub mod auth;
pub mod crud;
pub mod protocol;

pub use account::AccountService;
pub use auth::AuthService;
pub use crud::CrudService;
pub use protocol::ProtocolService;

use reqwest::Method;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;
use std::time::Duration;

/// Header carrying the token issued by the login endpoint.
pub const TOKEN_HEADER: &str = "X-Access-Token";

/// Response wrapper shared by every backend endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: u16,
    pub result: Option<T>,
    pub message: Option<String>,
}

#[derive(Debug)]
pub enum BackendError {
    /// Connection refused, timeout, broken body.
    Transport(reqwest::Error),
    /// Envelope (or bare HTTP) status other than 200.
    Status { status: u16, message: String },
    /// 401: the session token is missing or expired.
    Unauthorized,
    /// The body was not an envelope, or `result` had an unexpected shape.
    Decode(String),
    /// Status 200 but no `result` where one was required.
    MissingResult,
}

impl BackendError {
    /// Short message fit for a flash notice.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Transport(e) if e.is_timeout() => "The backend did not respond in time".to_string(),
            BackendError::Transport(_) => "The backend could not be reached".to_string(),
            BackendError::Status { message, status } if message.is_empty() => {
                format!("The backend rejected the request (status {status})")
            }
            BackendError::Status { message, .. } => message.clone(),
            BackendError::Unauthorized => "Your session has expired, please sign in again".to_string(),
            BackendError::Decode(_) | BackendError::MissingResult => {
                "The backend returned an unexpected response".to_string()
            }
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Transport(e) => write!(f, "transport error: {e}"),
            BackendError::Status { status, message } => write!(f, "status {status}: {message}"),
            BackendError::Unauthorized => write!(f, "unauthorized"),
            BackendError::Decode(e) => write!(f, "undecodable response: {e}"),
            BackendError::MissingResult => write!(f, "response carried no result"),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        BackendError::Transport(e)
    }
}

/// Shared HTTP client. Cloning is cheap; the connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// A client that authenticates as the holder of `token`.
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.to_string()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Option<T>, BackendError> {
        self.call(Method::GET, path, query, None::<&()>).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, BackendError> {
        self.call(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, BackendError> {
        self.call(Method::PATCH, path, &[], Some(body)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<Option<T>, BackendError> {
        self.call(Method::POST, path, &[], body).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, BackendError> {
        self.call(Method::DELETE, path, &[], None::<&()>).await
    }

    /// Issue one request and unwrap the envelope.
    ///
    /// The envelope is decoded loosely first so a failure status is reported
    /// as such even when its `result` does not match `T`.
    async fn call<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<Option<T>, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("backend {method} {url}");

        let mut req = self.http.request(method.clone(), &url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = &self.token {
            req = req.header(TOKEN_HEADER, token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| {
            log::warn!("backend {method} {url} failed: {e}");
            BackendError::Transport(e)
        })?;
        let http_status = resp.status();
        if http_status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(BackendError::Unauthorized);
        }
        let text = resp.text().await?;

        let envelope: Envelope<serde_json::Value> = match serde_json::from_str(&text) {
            Ok(env) => env,
            Err(e) if http_status.is_success() => {
                log::warn!("backend {method} {url}: body is not an envelope: {e}");
                return Err(BackendError::Decode(e.to_string()));
            }
            Err(_) => {
                return Err(BackendError::Status {
                    status: http_status.as_u16(),
                    message: text.chars().take(200).collect(),
                });
            }
        };

        match envelope.status {
            200 => match envelope.result {
                None | Some(serde_json::Value::Null) => Ok(None),
                Some(value) => serde_json::from_value(value)
                    .map(Some)
                    .map_err(|e| BackendError::Decode(e.to_string())),
            },
            401 => Err(BackendError::Unauthorized),
            status => {
                let message = envelope.message.unwrap_or_default();
                log::warn!("backend {method} {url} returned status {status}: {message}");
                Err(BackendError::Status { status, message })
            }
        }
    }
}

/// Require a `result` from a successful envelope.
pub fn required<T>(result: Option<T>) -> Result<T, BackendError> {
    result.ok_or(BackendError::MissingResult)
}

/// Path segment for an entity id. Blank ids and the dot segments are refused:
/// URL normalization would resolve `.`/`..` (encoded or not) outside the
/// entity path.
pub fn id_segment(id: &str) -> Result<String, BackendError> {
    if id.trim().is_empty() {
        return Err(BackendError::Status { status: 400, message: "An id is required".to_string() });
    }
    if id == "." || id == ".." {
        return Err(BackendError::Status { status: 400, message: format!("Invalid id '{id}'") });
    }
    Ok(encode_segment(id))
}

/// Percent-encode one path segment (an entity id).
pub fn encode_segment(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for b in id.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
