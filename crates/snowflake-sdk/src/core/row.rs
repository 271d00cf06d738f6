//! Raw result rows with nullable columns.
//!
//! The transport delivers every value as text or NULL. [`Row`] keeps that
//! shape; typed accessors return `Option<_>` so "absent" and "NULL" both
//! surface as `None`. Only a present value that cannot be decoded is an
//! error.

use std::collections::HashMap;

use crate::error::{Result, SnowflakeError};

/// One result row keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: HashMap<String, Option<String>>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from parallel column-name and value lists.
    pub fn from_columns(columns: &[String], values: Vec<Option<String>>) -> Self {
        let values = columns.iter().cloned().zip(values).collect();
        Self { values }
    }

    /// Builder-style setter with a non-NULL value.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(column.into(), Some(value.into()));
        self
    }

    /// Builder-style setter with a NULL value.
    pub fn with_null(mut self, column: impl Into<String>) -> Self {
        self.values.insert(column.into(), None);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow a column's text; `None` when absent or NULL.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).and_then(|v| v.as_deref())
    }

    pub fn string(&self, column: &str) -> Option<String> {
        self.get(column).map(str::to_string)
    }

    pub fn bool(&self, column: &str) -> Result<Option<bool>> {
        self.get(column).map(|v| parse_bool(column, v)).transpose()
    }

    pub fn int32(&self, column: &str) -> Result<Option<i32>> {
        self.get(column)
            .map(|v| {
                v.trim()
                    .parse::<i32>()
                    .map_err(|e| SnowflakeError::scan(column, format!("{}: {:?}", e, v)))
            })
            .transpose()
    }
}

fn parse_bool(column: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "y" | "yes" | "1" | "on" => Ok(true),
        "false" | "f" | "n" | "no" | "0" | "off" => Ok(false),
        _ => Err(SnowflakeError::scan(
            column,
            format!("not a boolean: {:?}", value),
        )),
    }
}

/// Scan a raw row into a nullable row struct.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self>;
}

/// Decode a bracket-delimited list such as `["A","B"]` into its items.
///
/// Surrounding whitespace and double quotes are removed from each item and
/// empty items are dropped, so `[]` decodes to an empty list.
pub fn decode_bracketed_list(value: &str) -> Vec<String> {
    value
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|item| item.trim().trim_matches('"').trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_and_null_are_none() {
        let row = Row::new().with_null("comment");
        assert_eq!(row.string("comment"), None);
        assert_eq!(row.string("owner"), None);
        assert_eq!(row.bool("is_secure").unwrap(), None);
        assert_eq!(row.int32("retention_time").unwrap(), None);
    }

    #[test]
    fn test_typed_accessors() {
        let row = Row::new()
            .with("is_secure", "true")
            .with("disabled", "false")
            .with("retention_time", " 7 ");
        assert_eq!(row.bool("is_secure").unwrap(), Some(true));
        assert_eq!(row.bool("disabled").unwrap(), Some(false));
        assert_eq!(row.int32("retention_time").unwrap(), Some(7));
    }

    #[test]
    fn test_undecodable_value_is_scan_error() {
        let row = Row::new().with("retention_time", "seven");
        let err = row.int32("retention_time").unwrap_err();
        assert!(err.to_string().contains("retention_time"));

        let row = Row::new().with("is_secure", "maybe");
        assert!(row.bool("is_secure").is_err());
    }

    #[test]
    fn test_from_columns() {
        let columns = vec!["name".to_string(), "comment".to_string()];
        let row = Row::from_columns(&columns, vec![Some("T1".into()), None]);
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("name"), Some("T1"));
        assert_eq!(row.get("comment"), None);
    }

    #[test]
    fn test_decode_bracketed_list() {
        assert_eq!(decode_bracketed_list(r#"["A","B"]"#), vec!["A", "B"]);
        assert_eq!(decode_bracketed_list(r#"[ "A", "B" ]"#), vec!["A", "B"]);
        assert_eq!(decode_bracketed_list("[ALL]"), vec!["ALL"]);
        assert!(decode_bracketed_list("[]").is_empty());
        assert!(decode_bracketed_list("").is_empty());
    }
}
