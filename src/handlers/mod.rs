pub mod account_handlers;
pub mod auth_handlers;
pub mod notification_handlers;
pub mod protocol_handlers;
