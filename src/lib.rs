pub mod auth;
pub mod backend;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod maintenance;
pub mod models;
pub mod routes;
pub mod templates_structs;
pub mod tracker;
