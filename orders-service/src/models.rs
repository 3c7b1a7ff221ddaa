//! Order domain model and request payloads.

use bookstore_common::{
    validation::{coerce_i64, coerce_opt_i64},
    AppError,
};
use serde::{Deserialize, Serialize};

pub const INVALID_ORDER_DATA: &str = "Invalid order data";
pub const INVALID_BOOK_ID: &str = "Invalid book id";
pub const NO_CHANGES: &str = "No changes provided";
pub const ORDER_NOT_FOUND: &str = "Order not found";
pub const NOT_FOUND: &str = "Not found";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub quantity: i64,
}

/// Body of `POST /api/orders`. All fields must be positive integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(deserialize_with = "coerce_i64")]
    pub user_id: i64,
    #[serde(deserialize_with = "coerce_i64")]
    pub book_id: i64,
    #[serde(deserialize_with = "coerce_i64")]
    pub quantity: i64,
}

impl NewOrder {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.user_id > 0 && self.book_id > 0 && self.quantity > 0 {
            Ok(())
        } else {
            Err(AppError::Validation(INVALID_ORDER_DATA.into()))
        }
    }

    pub fn into_order(self, id: i64) -> Order {
        Order { id, user_id: self.user_id, book_id: self.book_id, quantity: self.quantity }
    }
}

/// Body of `PATCH /api/orders/:id`: any subset of the order fields. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderChanges {
    #[serde(default, deserialize_with = "coerce_opt_i64", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "coerce_opt_i64", skip_serializing_if = "Option::is_none")]
    pub book_id: Option<i64>,
    #[serde(default, deserialize_with = "coerce_opt_i64", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

impl OrderChanges {
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.book_id.is_none() && self.quantity.is_none()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let positive = [self.user_id, self.book_id, self.quantity].into_iter().flatten().all(|v| v > 0);
        if positive { Ok(()) } else { Err(AppError::Validation(INVALID_ORDER_DATA.into())) }
    }

    pub fn apply(&self, order: &mut Order) {
        if let Some(v) = self.user_id { order.user_id = v; }
        if let Some(v) = self.book_id { order.book_id = v; }
        if let Some(v) = self.quantity { order.quantity = v; }
    }
}
