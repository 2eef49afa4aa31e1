pub mod api;
pub mod config;
pub mod ranking;
pub mod server;
