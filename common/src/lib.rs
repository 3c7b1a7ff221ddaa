// Shared plumbing for the books, orders and users services: token handling, the auth gate,
// the error taxonomy, input coercion, configuration primitives and server bootstrap.
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod server;
pub mod telemetry;
pub mod validation;

pub use error::AppError;
