pub mod dataset;
pub mod user;
