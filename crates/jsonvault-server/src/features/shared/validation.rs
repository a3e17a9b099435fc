//! Shared request validation utilities
//!
//! Structural checks only (presence and type); business rules such as
//! uniqueness belong to the services.

use crate::error::{ServiceError, ServiceResult};

/// Unwraps a required request field, naming the field in the error.
pub fn require<T>(value: Option<T>, field: &str) -> ServiceResult<T> {
    value.ok_or_else(|| ServiceError::Validation(format!("{field} is required")))
}

/// Parses the `id` query parameter used by the get-by-id endpoints.
pub fn parse_id_param(raw: Option<String>) -> ServiceResult<i64> {
    let raw = require(raw, "id")?;
    raw.parse::<i64>()
        .map_err(|_| ServiceError::Validation("id is not a valid integer".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_passes_through_present_values() {
        assert_eq!(require(Some(42), "id").unwrap(), 42);
    }

    #[test]
    fn require_names_the_missing_field() {
        let err = require::<String>(None, "emailAddress").unwrap_err();
        assert!(matches!(&err, ServiceError::Validation(msg) if msg == "emailAddress is required"));
    }

    #[test]
    fn parse_id_param_accepts_integers() {
        assert_eq!(parse_id_param(Some("17".to_string())).unwrap(), 17);
    }

    #[test]
    fn parse_id_param_rejects_missing_id() {
        let err = parse_id_param(None).unwrap_err();
        assert!(matches!(&err, ServiceError::Validation(msg) if msg == "id is required"));
    }

    #[test]
    fn parse_id_param_rejects_non_integers() {
        let err = parse_id_param(Some("abc".to_string())).unwrap_err();
        assert!(matches!(&err, ServiceError::Validation(msg) if msg == "id is not a valid integer"));
    }
}
