use askama::Template;

use super::PageContext;
use crate::models::account::{DeviceAlarm, NotificationProvider};
use crate::models::page::PageLink;
use crate::models::Page;

/// Profile form values; empty when the profile could not be loaded.
#[derive(Default)]
pub struct ProfileView {
    pub name: String,
    pub username: String,
    pub email: String,
    pub telephone: String,
    pub description: String,
}

#[derive(Template)]
#[template(path = "account/settings.html")]
pub struct AccountSettingsTemplate {
    pub ctx: PageContext,
    pub profile: Option<ProfileView>,
    pub load_error: Option<String>,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "account/security.html")]
pub struct SecurityTemplate {
    pub ctx: PageContext,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "account/notifications.html")]
pub struct NotificationsTemplate {
    pub ctx: PageContext,
    pub providers: Vec<NotificationProvider>,
    pub providers_error: Option<String>,
    pub alarms: Page<DeviceAlarm>,
    pub alarms_error: Option<String>,
    pub page_links: Vec<PageLink>,
    pub errors: Vec<String>,
    pub subscribe_name: String,
    pub topic_provider: String,
    pub topic_config: String,
}
