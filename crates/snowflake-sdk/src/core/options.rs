//! Shared option types: object kinds, base identity options and list scopes.

use std::fmt;

use crate::error::{Result, SnowflakeError};

use super::identifier::{
    database_qualified_name, dotted_name, qualified_name, quote_ident, quote_literal, schema_path,
    three_part_name,
};

/// Which identity fields an object kind needs before SQL can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualification {
    /// Name alone (account-level objects, or objects resolved by session).
    NameOnly,
    /// Name and database.
    Database,
    /// Name, database and schema.
    DatabaseAndSchema,
}

/// Object kinds managed by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Database,
    Schema,
    Table,
    View,
    Sequence,
    Tag,
    MaskingPolicy,
    Role,
    User,
}

impl ObjectKind {
    /// Singular SQL keyword, e.g. `MASKING POLICY`.
    pub fn keyword(&self) -> &'static str {
        match self {
            ObjectKind::Database => "DATABASE",
            ObjectKind::Schema => "SCHEMA",
            ObjectKind::Table => "TABLE",
            ObjectKind::View => "VIEW",
            ObjectKind::Sequence => "SEQUENCE",
            ObjectKind::Tag => "TAG",
            ObjectKind::MaskingPolicy => "MASKING POLICY",
            ObjectKind::Role => "ROLE",
            ObjectKind::User => "USER",
        }
    }

    /// Plural SQL keyword used by `SHOW`, e.g. `MASKING POLICIES`.
    pub fn plural(&self) -> &'static str {
        match self {
            ObjectKind::Database => "DATABASES",
            ObjectKind::Schema => "SCHEMAS",
            ObjectKind::Table => "TABLES",
            ObjectKind::View => "VIEWS",
            ObjectKind::Sequence => "SEQUENCES",
            ObjectKind::Tag => "TAGS",
            ObjectKind::MaskingPolicy => "MASKING POLICIES",
            ObjectKind::Role => "ROLES",
            ObjectKind::User => "USERS",
        }
    }

    /// Lowercase name for messages.
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Database => "database",
            ObjectKind::Schema => "schema",
            ObjectKind::Table => "table",
            ObjectKind::View => "view",
            ObjectKind::Sequence => "sequence",
            ObjectKind::Tag => "tag",
            ObjectKind::MaskingPolicy => "masking policy",
            ObjectKind::Role => "role",
            ObjectKind::User => "user",
        }
    }

    pub fn qualification(&self) -> Qualification {
        match self {
            ObjectKind::Table | ObjectKind::View | ObjectKind::Sequence => {
                Qualification::DatabaseAndSchema
            }
            ObjectKind::Schema => Qualification::Database,
            ObjectKind::Database
            | ObjectKind::Tag
            | ObjectKind::MaskingPolicy
            | ObjectKind::Role
            | ObjectKind::User => Qualification::NameOnly,
        }
    }

    /// Render the kind-specific qualified identifier.
    pub fn qualify(&self, name: &str, database: &str, schema: &str) -> String {
        match self {
            ObjectKind::Table | ObjectKind::MaskingPolicy => qualified_name(name, database, schema),
            ObjectKind::Sequence | ObjectKind::View => three_part_name(database, schema, name),
            ObjectKind::Tag => dotted_name(name, database, schema),
            ObjectKind::Schema => database_qualified_name(name, database),
            ObjectKind::Database | ObjectKind::Role | ObjectKind::User => quote_ident(name),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Identity of a single object: name plus optional container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseOptions {
    pub name: String,
    pub database: String,
    pub schema: String,
}

impl BaseOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Place the object inside `database`.`schema`.
    pub fn in_schema(mut self, database: impl Into<String>, schema: impl Into<String>) -> Self {
        self.database = database.into();
        self.schema = schema.into();
        self
    }

    /// Place the object inside `database`.
    pub fn in_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Check the identity fields `kind` requires.
    pub fn validate(&self, kind: ObjectKind) -> Result<()> {
        if self.name.is_empty() {
            return Err(SnowflakeError::validation(format!(
                "{} name is required",
                kind.label()
            )));
        }
        match kind.qualification() {
            Qualification::NameOnly => {}
            Qualification::Database => require_database(&self.database)?,
            Qualification::DatabaseAndSchema => {
                require_database(&self.database)?;
                require_schema(&self.schema)?;
            }
        }
        Ok(())
    }

    /// Kind-specific qualified identifier for this object.
    pub fn qualified(&self, kind: ObjectKind) -> String {
        kind.qualify(&self.name, &self.database, &self.schema)
    }
}

/// List scope for schema-level objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaScope {
    pub database: String,
    pub schema: String,
    /// Optional `LIKE` pattern.
    pub pattern: Option<String>,
}

impl SchemaScope {
    pub fn new(database: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            pattern: None,
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_database(&self.database)?;
        require_schema(&self.schema)
    }

    /// `SHOW <KINDS>[ LIKE '...'] IN SCHEMA "db"."schema"`
    pub fn show_statement(&self, kind: ObjectKind) -> String {
        let mut sql = format!("SHOW {}", kind.plural());
        if let Some(pattern) = &self.pattern {
            sql.push_str(&like_clause(pattern));
        }
        sql.push_str(&format!(
            " IN SCHEMA {}",
            schema_path(&self.database, &self.schema)
        ));
        sql
    }
}

/// ` LIKE '<pattern>'` with the pattern escaped.
pub fn like_clause(pattern: &str) -> String {
    format!(" LIKE {}", quote_literal(pattern))
}

fn require_database(database: &str) -> Result<()> {
    if database.is_empty() {
        return Err(SnowflakeError::validation("database name is required"));
    }
    Ok(())
}

fn require_schema(schema: &str) -> Result<()> {
    if schema.is_empty() {
        return Err(SnowflakeError::validation("schema name is required"));
    }
    Ok(())
}
