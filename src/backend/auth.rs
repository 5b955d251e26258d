use serde::{Deserialize, Serialize};

use super::crud::Echo;
use super::{ApiClient, BackendError, required};

const LOGIN_URI: &str = "/jetlinks/authorize/login";
const LOGOUT_URI: &str = "/jetlinks/user-token/reset";
/// Token lifetime requested at sign-in, in milliseconds.
const TOKEN_EXPIRES_MS: i64 = 3_600_000;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    expires: i64,
    token_type: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResult {
    pub token: String,
    pub user: Option<LoginUser>,
}

impl LoginResult {
    /// Name to greet the user with, falling back to the login name.
    pub fn display_name(&self, login: &str) -> String {
        self.user
            .as_ref()
            .map(|u| if u.name.is_empty() { u.username.clone() } else { u.name.clone() })
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| login.to_string())
    }
}

pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, BackendError> {
        let body = LoginRequest { username, password, expires: TOKEN_EXPIRES_MS, token_type: "default" };
        required(self.client.post(LOGIN_URI, Some(&body)).await?)
    }

    /// Invalidate the token held by this client.
    pub async fn logout(&self) -> Result<(), BackendError> {
        let _: Echo = self.client.get(LOGOUT_URI, &[]).await?;
        Ok(())
    }
}
