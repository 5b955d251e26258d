use super::crud::Echo;
use super::{ApiClient, BackendError, required};
use crate::models::account::{DeviceAlarm, NotificationProvider, PasswordChange, Subscription, UserDetail};
use crate::models::{Page, QueryParam};

pub const USER_DETAIL_URI: &str = "/jetlinks/user/detail";
const PASSWORD_URI: &str = "/user/passwd";
const PROVIDERS_URI: &str = "/jetlinks/notifications/providers";
const ALARMS_URI: &str = "/jetlinks/device/alarm/_query";
const SUBSCRIBE_URI: &str = "/jetlinks/notifications/subscribe";

/// Account settings of the signed-in user.
#[derive(Debug, Clone)]
pub struct AccountService {
    client: ApiClient,
    uri: String,
}

impl AccountService {
    pub fn new(client: ApiClient) -> Self {
        Self { client, uri: USER_DETAIL_URI.to_string() }
    }

    /// Profile of the current user. A non-200 envelope is an error.
    pub async fn get(&self) -> Result<UserDetail, BackendError> {
        required(self.client.get(&self.uri, &[]).await?)
    }

    pub async fn save(&self, partial: &UserDetail) -> Result<Echo, BackendError> {
        self.client.put(&self.uri, partial).await
    }

    pub async fn save_password(&self, change: &PasswordChange) -> Result<(), BackendError> {
        let _: Echo = self.client.put(PASSWORD_URI, change).await?;
        Ok(())
    }

    pub async fn notification_providers(&self) -> Result<Vec<NotificationProvider>, BackendError> {
        let providers: Option<Vec<NotificationProvider>> = self.client.get(PROVIDERS_URI, &[]).await?;
        Ok(providers.unwrap_or_default())
    }

    pub async fn device_alarms(&self, query: &QueryParam) -> Result<Page<DeviceAlarm>, BackendError> {
        let page: Option<Page<DeviceAlarm>> = self.client.get(ALARMS_URI, &query.encode()).await?;
        Ok(page.unwrap_or_else(|| Page::empty(query.page_size)))
    }

    pub async fn save_subscribe(&self, subscription: &Subscription) -> Result<Echo, BackendError> {
        self.client.patch(SUBSCRIBE_URI, subscription).await
    }
}
