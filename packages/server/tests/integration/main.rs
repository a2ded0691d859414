mod common;

mod auth;
mod dataset;
mod report;
