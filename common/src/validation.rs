//! Input coercion and request-extraction helpers.
//!
//! Clients have always been allowed to send integers either as JSON numbers or as numeric
//! strings (`"3"`), so integer fields deserialize through [`coerce_i64`].

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    Json,
};
use serde::{de, Deserialize, Deserializer};

use crate::error::AppError;

pub const INVALID_ID: &str = "Invalid id";

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Int(i64),
    Float(f64),
    Text(String),
}

fn integral(v: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound must be exclusive.
    if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

impl Numeric {
    fn into_i64(self) -> Option<i64> {
        match self {
            Numeric::Int(v) => Some(v),
            Numeric::Float(v) => integral(v),
            Numeric::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
        }
    }
}

/// Deserialize an integer given as a number or a numeric string.
pub fn coerce_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Numeric::deserialize(deserializer)?
        .into_i64()
        .ok_or_else(|| de::Error::custom("expected an integer"))
}

/// Like [`coerce_i64`] for optional fields; pair with `#[serde(default)]`.
/// An explicit `null` is rejected rather than treated as absent.
pub fn coerce_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    coerce_i64(deserializer).map(Some)
}

/// Unwrap a JSON body, mapping any rejection (bad content type, bad syntax, wrong shape)
/// to a 400 with the resource-specific message.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>, message: &str) -> Result<T, AppError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected request body");
        AppError::Validation(message.to_string())
    })
}

/// Unwrap a numeric path id, mapping a non-numeric segment to a 400.
pub fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id).map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected path id");
        AppError::Validation(INVALID_ID.into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "coerce_i64")]
        n: i64,
        #[serde(default, deserialize_with = "coerce_opt_i64")]
        m: Option<i64>,
    }

    fn parse(json: &str) -> Result<Probe, serde_json::Error> { serde_json::from_str(json) }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        assert_eq!(parse(r#"{"n": 5}"#).unwrap().n, 5);
        assert_eq!(parse(r#"{"n": "12"}"#).unwrap().n, 12);
        assert_eq!(parse(r#"{"n": " 7 "}"#).unwrap().n, 7);
        assert_eq!(parse(r#"{"n": 3.0}"#).unwrap().n, 3);
        assert_eq!(parse(r#"{"n": -4}"#).unwrap().n, -4);
    }

    #[test]
    fn rejects_non_integers() {
        assert!(parse(r#"{"n": 2.5}"#).is_err());
        assert!(parse(r#"{"n": "abc"}"#).is_err());
        assert!(parse(r#"{"n": ""}"#).is_err());
        assert!(parse(r#"{"n": null}"#).is_err());
        assert!(parse(r#"{"n": true}"#).is_err());
        assert!(parse(r#"{}"#).is_err());
    }

    #[test]
    fn optional_fields() {
        assert_eq!(parse(r#"{"n": 1}"#).unwrap().m, None);
        assert_eq!(parse(r#"{"n": 1, "m": "9"}"#).unwrap().m, Some(9));
        assert!(parse(r#"{"n": 1, "m": null}"#).is_err());
    }
}
