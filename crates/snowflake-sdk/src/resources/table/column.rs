//! Column definitions and primary keys.

use crate::core::identifier::{quote_ident, quote_idents, quote_literal};

/// Default value of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnDefault {
    /// A constant. Quoted as a string literal for character columns,
    /// emitted as-is otherwise.
    Constant(String),
    /// Next value of the named sequence.
    Sequence(String),
    /// Arbitrary SQL expression, emitted as-is.
    Expression(String),
}

impl ColumnDefault {
    pub fn render(&self, column_type: &str) -> String {
        match self {
            ColumnDefault::Constant(value) if is_character_type(column_type) => {
                quote_literal(value)
            }
            ColumnDefault::Constant(value) | ColumnDefault::Expression(value) => value.clone(),
            ColumnDefault::Sequence(sequence) => format!("{}.NEXTVAL", sequence),
        }
    }
}

fn is_character_type(column_type: &str) -> bool {
    let upper = column_type.to_ascii_uppercase();
    upper.contains("CHAR") || upper == "STRING" || upper == "TEXT"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIdentity {
    pub start: i64,
    pub step: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<ColumnDefault>,
    pub identity: Option<ColumnIdentity>,
    pub comment: String,
    pub masking_policy: String,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            ..Default::default()
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Render `"name" TYPE [NOT NULL] [DEFAULT d] [IDENTITY(start, step)]
    /// [WITH MASKING POLICY p] [COMMENT = '...']`.
    ///
    /// `NOT NULL` is only rendered with `inline_constraints`, the comment
    /// only with `comment`.
    pub fn definition(&self, inline_constraints: bool, comment: bool) -> String {
        let mut sql = format!("{} {}", quote_ident(&self.name), self.data_type);
        if inline_constraints && !self.nullable {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default {
            sql.push_str(&format!(" DEFAULT {}", default.render(&self.data_type)));
        }
        if let Some(identity) = &self.identity {
            sql.push_str(&format!(
                " IDENTITY({}, {})",
                identity.start, identity.step
            ));
        }
        let policy = self.masking_policy.trim();
        if !policy.is_empty() {
            sql.push_str(&format!(" WITH MASKING POLICY {}", policy));
        }
        if comment {
            sql.push_str(&format!(" COMMENT = {}", quote_literal(&self.comment)));
        }
        sql
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimaryKey {
    /// Constraint name; unnamed when empty.
    pub name: String,
    pub keys: Vec<String>,
}

impl PrimaryKey {
    /// `[CONSTRAINT "k"] PRIMARY KEY` without the column list.
    pub(crate) fn constraint(&self) -> String {
        if self.name.is_empty() {
            "PRIMARY KEY".to_string()
        } else {
            format!("CONSTRAINT {} PRIMARY KEY", quote_ident(&self.name))
        }
    }

    /// `"a", "b"`
    pub(crate) fn key_list(&self) -> String {
        quote_idents(&self.keys).join(", ")
    }
}

/// A change aimed at one existing column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnChange<T> {
    pub column: String,
    pub value: T,
}

impl<T> ColumnChange<T> {
    pub fn new(column: impl Into<String>, value: T) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}
