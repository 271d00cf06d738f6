//! `DESCRIBE USER` pivoting.
//!
//! The server answers with one `property`/`value` row per attribute. The
//! known properties are folded into a single [`Row`] keyed like the
//! `SHOW USERS` columns, so both paths share one scan.

use crate::core::Row;
use crate::error::{Result, SnowflakeError};

/// Properties copied through under their lowercase column name.
const COLUMNS: &[&str] = &[
    "COMMENT",
    "DEFAULT_NAMESPACE",
    "DEFAULT_ROLE",
    "DEFAULT_SECONDARY_ROLES",
    "DEFAULT_WAREHOUSE",
    "DISABLED",
    "DISPLAY_NAME",
    "EMAIL",
    "FIRST_NAME",
    "LAST_NAME",
    "LOGIN_NAME",
    "NAME",
];

/// A fingerprint is only reported when an RSA public key is set.
const RSA_FINGERPRINT: &str = "RSA_PUBLIC_KEY_FP";

pub(super) fn pivot(rows: &[Row]) -> Result<Row> {
    let mut pivoted = Row::new().with("has_rsa_public_key", "false");
    for row in rows {
        let property = row
            .get("property")
            .ok_or_else(|| SnowflakeError::scan("property", "missing property name"))?
            .to_ascii_uppercase();
        // Snowflake reports unset properties as the text "null".
        let value = row.get("value").filter(|v| *v != "null");

        if property == RSA_FINGERPRINT {
            if value.is_some() {
                pivoted = pivoted.with("has_rsa_public_key", "true");
            }
            continue;
        }
        if !COLUMNS.contains(&property.as_str()) {
            continue;
        }
        let column = property.to_ascii_lowercase();
        pivoted = match value {
            Some(value) => pivoted.with(column, value),
            None => pivoted.with_null(column),
        };
    }
    Ok(pivoted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(name: &str, value: &str) -> Row {
        Row::new().with("property", name).with("value", value)
    }

    #[test]
    fn test_null_text_is_absent() {
        let row = pivot(&[property("EMAIL", "null")]).unwrap();
        assert_eq!(row.get("email"), None);
    }

    #[test]
    fn test_unknown_properties_ignored() {
        let row = pivot(&[property("MINS_TO_BYPASS_MFA", "0")]).unwrap();
        assert_eq!(row.get("mins_to_bypass_mfa"), None);
        assert_eq!(row.get("has_rsa_public_key"), Some("false"));
    }

    #[test]
    fn test_null_fingerprint_means_no_key() {
        let row = pivot(&[property("RSA_PUBLIC_KEY_FP", "null")]).unwrap();
        assert_eq!(row.get("has_rsa_public_key"), Some("false"));
    }

    #[test]
    fn test_missing_property_column_is_scan_error() {
        let err = pivot(&[Row::new().with("value", "x")]).unwrap_err();
        assert!(err.to_string().contains("property"));
    }
}
