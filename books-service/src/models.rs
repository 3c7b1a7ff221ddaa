//! Book domain model and request payloads.

use bookstore_common::validation::coerce_i64;
use serde::{Deserialize, Serialize};

pub const INVALID_BOOK_DATA: &str = "Invalid book data";
pub const BOOK_NOT_FOUND: &str = "Book not found";
pub const NOT_FOUND: &str = "Not found";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub year: i64,
}

/// Body of `POST /api/books`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    #[serde(deserialize_with = "coerce_i64")]
    pub year: i64,
}

impl NewBook {
    pub fn into_book(self, id: i64) -> Book {
        Book { id, title: self.title, author: self.author, year: self.year }
    }
}
