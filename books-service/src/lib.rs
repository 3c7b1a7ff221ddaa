// Library crate exposing the books service modules so integration tests and the binary share code.
pub mod config;
pub mod handlers;
pub mod models;
pub mod repository;
