// Library crate exposing the users service modules so integration tests and the binary share code.
pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod repository;
