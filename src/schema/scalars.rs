/// Custom GraphQL scalar types for Date and DateTime
///
/// These scalars handle ISO 8601 formatted date and datetime strings.

use async_graphql::dynamic::Scalar;
use async_graphql::Value;
use chrono::{DateTime, NaiveDate};

/// Names of the registered custom scalars.
pub const SCALAR_NAMES: &[&str] = &["Date", "DateTime"];

/// Custom scalars to register in the schema builder
pub fn register_custom_scalars() -> Vec<Scalar> {
    vec![
        Scalar::new("Date")
            .description("ISO 8601 date format (YYYY-MM-DD)")
            .validator(|value| {
                if let Value::String(s) = value {
                    NaiveDate::parse_from_str(s.as_str(), "%Y-%m-%d").is_ok()
                } else {
                    false
                }
            }),
        Scalar::new("DateTime")
            .description("ISO 8601 datetime format with timezone")
            .validator(|value| {
                if let Value::String(s) = value {
                    DateTime::parse_from_rfc3339(s.as_str()).is_ok()
                } else {
                    false
                }
            }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_registration() {
        let scalars = register_custom_scalars();
        assert_eq!(scalars.len(), SCALAR_NAMES.len());
    }

    #[test]
    fn test_date_validation() {
        assert!(NaiveDate::parse_from_str("2024-01-15", "%Y-%m-%d").is_ok());
        assert!(NaiveDate::parse_from_str("invalid-date", "%Y-%m-%d").is_err());
    }

    #[test]
    fn test_datetime_validation() {
        assert!(DateTime::parse_from_rfc3339("2024-01-15T10:00:00Z").is_ok());
        assert!(DateTime::parse_from_rfc3339("not-a-datetime").is_err());
    }
}
