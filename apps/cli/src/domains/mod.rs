pub mod auth;
pub mod config;
pub mod insurance;
pub mod report;
pub mod sandbox;
pub mod search;
pub mod sso;
