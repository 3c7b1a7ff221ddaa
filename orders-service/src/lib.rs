// Library crate exposing the orders service modules so integration tests and the binary share code.
pub mod books;
pub mod config;
pub mod handlers;
pub mod models;
pub mod repository;
