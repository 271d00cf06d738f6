//! Identifier quoting and string-literal escaping.
//!
//! Identifiers are wrapped in double quotes and dot-qualified. No escaping
//! is applied to identifier text; string literals go through
//! [`escape_string`] / [`quote_literal`] instead.
//!
//! Each object kind qualifies names a little differently, and those
//! differences are part of each statement's contract:
//!
//! | Helper | Used by | `db` only | `schema` only |
//! |--------|---------|-----------|---------------|
//! | [`qualified_name`] | table, masking policy | `"db".."name"` | `"schema"."name"` |
//! | [`database_qualified_name`] | schema | `"db"."name"` | n/a |
//! | [`dotted_name`] | tag | `"db"."name"` | `"schema"."name"` |
//! | [`three_part_name`] | sequence, view | `"db".""."name"` | `""."schema"."name"` |

/// Wrap an identifier in double quotes.
///
/// # Examples
///
/// ```
/// use snowflake_sdk::core::identifier::quote_ident;
/// assert_eq!(quote_ident("USERS"), "\"USERS\"");
/// ```
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name)
}

/// Quote every identifier in a list.
pub fn quote_idents<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names.iter().map(|n| quote_ident(n.as_ref())).collect()
}

/// Qualify a name with optional database and schema.
///
/// With a database but no schema this emits the `"db".."name"` form,
/// which relies on the server resolving the empty middle segment.
pub fn qualified_name(name: &str, database: &str, schema: &str) -> String {
    let mut s = String::new();
    match (database.is_empty(), schema.is_empty()) {
        (false, false) => s.push_str(&format!("\"{}\".\"{}\".", database, schema)),
        (false, true) => s.push_str(&format!("\"{}\"..", database)),
        (true, false) => s.push_str(&format!("\"{}\".", schema)),
        (true, true) => {}
    }
    s.push_str(&quote_ident(name));
    s
}

/// Qualify a schema-level name with an optional database.
pub fn database_qualified_name(name: &str, database: &str) -> String {
    if database.is_empty() {
        quote_ident(name)
    } else {
        format!("\"{}\".\"{}\"", database, name)
    }
}

/// Join every non-empty segment of database, schema and name.
pub fn dotted_name(name: &str, database: &str, schema: &str) -> String {
    let mut s = String::new();
    if !database.is_empty() {
        s.push_str(&format!("\"{}\".", database));
    }
    if !schema.is_empty() {
        s.push_str(&format!("\"{}\".", schema));
    }
    s.push_str(&quote_ident(name));
    s
}

/// Always emit all three segments, in database, schema, name order.
pub fn three_part_name(database: &str, schema: &str, name: &str) -> String {
    format!("\"{}\".\"{}\".\"{}\"", database, schema, name)
}

/// `"db"."schema"` container path used by `IN SCHEMA` clauses.
pub fn schema_path(database: &str, schema: &str) -> String {
    format!("\"{}\".\"{}\"", database, schema)
}

/// Escape a value for interpolation inside a single-quoted literal.
///
/// Backslashes are doubled first, then single quotes are backslash-escaped.
pub fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Render an escaped single-quoted string literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", escape_string(value))
}

/// Render a comma-separated list of single-quoted literals: `'a', 'b'`.
pub fn literal_list<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| quote_literal(v.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a SQL boolean literal.
pub fn bool_literal(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
