//! User domain model and credential payloads.

use std::sync::LazyLock;

use bookstore_common::AppError;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const INVALID_USER_DATA: &str = "Invalid user data";
pub const EMAIL_TAKEN: &str = "Email is already taken";

/// Stored user. `password_hash` is an Argon2id PHC string and never leaves the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

/// Local part, `@`, then alphanumeric-led domain labels and an alphabetic TLD of two or
/// more letters. A leading dot and `..` anywhere are rejected separately.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$").expect("Invalid regex")
});

impl User {
    pub fn validate_email(email: &str) -> Result<(), AppError> {
        if email.starts_with('.') || email.contains("..") || !EMAIL_RE.is_match(email) {
            return Err(AppError::Validation(INVALID_USER_DATA.into()));
        }
        Ok(())
    }
}

/// Body of both `POST /api/register` and `POST /api/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_works() {
        assert!(User::validate_email("a@b.com").is_ok());
        assert!(User::validate_email("first.last@mail.example.org").is_ok());
        assert!(User::validate_email("invalid").is_err());
        assert!(User::validate_email("@b.com").is_err());
        assert!(User::validate_email("a@b").is_err());
        assert!(User::validate_email("a@b..com").is_err());
        assert!(User::validate_email("a@@b.com").is_err());
        assert!(User::validate_email("a b@c.com").is_err());
        assert!(User::validate_email("o'neil+tag@mail-host.co").is_ok());
        assert!(User::validate_email("under_score@b.io").is_ok());
        for rejected in ["a@b.c", "a!b@c.com", "a.@b.com", ".a@b.com", "a@-b.com", "a@b.123", "a..b@c.com"] {
            assert!(User::validate_email(rejected).is_err(), "{}", rejected);
        }
    }
}
