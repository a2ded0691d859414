pub mod auth;
pub mod dataset;
