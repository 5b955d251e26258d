// Template context structures for askama templates, organized by domain.

use actix_session::Session;

use crate::auth::csrf;
use crate::auth::session::{Flash, get_username, take_flash};
use crate::config::Config;
use crate::errors::AppError;
use crate::models::nav_item::{self, NavModule, NavSidebarItem};

/// Common context shared by all signed-in pages.
/// Templates access these as `ctx.username`, `ctx.nav_modules`, etc.
pub struct PageContext {
    pub username: String,
    pub avatar_initial: String,
    pub flash: Option<Flash>,
    pub nav_modules: Vec<NavModule>,
    pub sidebar_items: Vec<NavSidebarItem>,
    pub app_name: String,
    pub csrf_token: String,
}

impl PageContext {
    pub fn build(session: &Session, config: &Config, current_path: &str) -> Result<Self, AppError> {
        let username = get_username(session)
            .map_err(|e| AppError::Session(format!("Failed to get username: {}", e)))?;
        let flash = take_flash(session);
        let (nav_modules, sidebar_items) = nav_item::find_navigation(current_path);
        let csrf_token = csrf::get_or_create_token(session);
        let avatar_initial = username.chars().next().unwrap_or('?').to_uppercase().to_string();
        Ok(Self {
            username,
            avatar_initial,
            flash,
            nav_modules,
            sidebar_items,
            app_name: config.app_name.clone(),
            csrf_token,
        })
    }
}

mod account;
mod common;
mod protocol;

pub use account::*;
pub use common::*;
pub use protocol::*;
