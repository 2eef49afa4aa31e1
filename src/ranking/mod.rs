pub mod auth;
pub mod credential;
pub mod filter;
pub mod format;
pub mod params;
pub mod report;
