pub mod errors;
pub mod ranking;
