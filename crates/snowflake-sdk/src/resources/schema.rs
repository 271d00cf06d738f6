//! Schemas inside a database.

use async_trait::async_trait;
use tracing::debug;

use crate::client::Executor;
use crate::core::identifier::{database_qualified_name, quote_ident};
use crate::core::{like_clause, BaseOptions, FromRow, ObjectKind, Row, Tristate};
use crate::error::{Result, ResultExt, SnowflakeError};

use super::{comment_clause, has_changes, set_comment_clause};

/// A Snowflake schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub name: String,
    pub database: String,
    pub comment: String,
    pub options: String,
    pub retention_time: String,
}

#[derive(Debug, Default)]
struct SchemaRow {
    name: Option<String>,
    database_name: Option<String>,
    comment: Option<String>,
    options: Option<String>,
    retention_time: Option<String>,
}

impl FromRow for SchemaRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            name: row.string("name"),
            database_name: row.string("database_name"),
            comment: row.string("comment"),
            options: row.string("options"),
            retention_time: row.string("retention_time"),
        })
    }
}

impl SchemaRow {
    fn into_schema(self) -> Schema {
        Schema {
            name: self.name.unwrap_or_default(),
            database: self.database_name.unwrap_or_default(),
            comment: self.comment.unwrap_or_default(),
            options: self.options.unwrap_or_default(),
            retention_time: self.retention_time.unwrap_or_default(),
        }
    }
}

/// List the schemas of one database.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub database: String,
    pub pattern: Option<String>,
}

impl ListOptions {
    pub fn validate(&self) -> Result<()> {
        if self.database.is_empty() {
            return Err(SnowflakeError::validation("database name is required"));
        }
        Ok(())
    }

    pub fn build(&self) -> String {
        let mut sql = String::from("SHOW SCHEMAS");
        if let Some(pattern) = &self.pattern {
            sql.push_str(&like_clause(pattern));
        }
        sql.push_str(&format!(" IN DATABASE {}", quote_ident(&self.database)));
        sql
    }
}

/// Find one schema by name, optionally within a database.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    pub name: String,
    pub database: String,
}

impl ReadOptions {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(SnowflakeError::validation("schema name is required"));
        }
        Ok(())
    }

    pub fn build(&self) -> String {
        let mut sql = format!("SHOW SCHEMAS{}", like_clause(&self.name));
        if !self.database.is_empty() {
            sql.push_str(&format!(" IN DATABASE {}", quote_ident(&self.database)));
        }
        sql
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub name: String,
    pub database: String,
    pub data_retention_time: Option<i32>,
    pub transient: bool,
    pub managed_access: bool,
    pub comment: Option<String>,
}

impl CreateOptions {
    pub fn validate(&self) -> Result<()> {
        BaseOptions::new(self.name.clone())
            .in_database(self.database.clone())
            .validate(ObjectKind::Schema)
    }

    pub fn build(&self) -> String {
        let mut sql = String::from("CREATE");
        if self.transient {
            sql.push_str(" TRANSIENT");
        }
        sql.push_str(&format!(
            " SCHEMA {}",
            database_qualified_name(&self.name, &self.database)
        ));
        if self.managed_access {
            sql.push_str(" WITH MANAGED ACCESS");
        }
        if let Some(days) = self.data_retention_time {
            sql.push_str(&format!(" DATA_RETENTION_TIME_IN_DAYS = {}", days));
        }
        if let Some(comment) = self.comment.as_deref().filter(|c| !c.is_empty()) {
            sql.push_str(&comment_clause(comment));
        }
        sql
    }
}

/// One change to a schema; the first field set wins.
///
/// Precedence: comment clear, data retention, comment set, managed access.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub comment: Tristate<String>,
    pub data_retention_time: Option<i32>,
    pub managed_access: Option<bool>,
}

impl UpdateOptions {
    pub fn build(&self) -> String {
        if self.comment.is_clear() {
            " UNSET COMMENT".to_string()
        } else if let Some(days) = self.data_retention_time {
            format!(" SET DATA_RETENTION_TIME_IN_DAYS = {}", days)
        } else if let Some(comment) = self.comment.as_set() {
            set_comment_clause(comment)
        } else if let Some(managed) = self.managed_access {
            if managed {
                " ENABLE MANAGED ACCESS".to_string()
            } else {
                " DISABLE MANAGED ACCESS".to_string()
            }
        } else {
            String::new()
        }
    }
}

/// Schema operations.
#[async_trait]
pub trait Schemas: Send + Sync {
    async fn list(&self, opts: &ListOptions) -> Result<Vec<Schema>>;
    async fn create(&self, opts: &CreateOptions) -> Result<Schema>;
    async fn read(&self, opts: &ReadOptions) -> Result<Schema>;
    /// Apply one change, then read the schema back by name alone.
    async fn update(&self, name: &str, opts: &UpdateOptions) -> Result<Schema>;
    async fn drop(&self, name: &str) -> Result<()>;
    async fn undrop(&self, name: &str) -> Result<()>;
    async fn rename(&self, old: &str, new: &str) -> Result<()>;
}

/// [`Schemas`] over SQL statements.
#[derive(Clone)]
pub struct SqlSchemas {
    executor: Executor,
}

impl SqlSchemas {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

fn require_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SnowflakeError::validation("schema name is required"));
    }
    Ok(())
}

#[async_trait]
impl Schemas for SqlSchemas {
    async fn list(&self, opts: &ListOptions) -> Result<Vec<Schema>> {
        opts.validate().context("validate list options")?;
        let rows: Vec<SchemaRow> = self.executor.query_as(&opts.build()).await?;
        Ok(rows.into_iter().map(SchemaRow::into_schema).collect())
    }

    async fn create(&self, opts: &CreateOptions) -> Result<Schema> {
        opts.validate().context("validate create options")?;
        self.executor.exec(&opts.build()).await.context("db exec")?;
        debug!("Created schema {}.{}", opts.database, opts.name);
        self.read(&ReadOptions {
            name: opts.name.clone(),
            database: opts.database.clone(),
        })
        .await
    }

    async fn read(&self, opts: &ReadOptions) -> Result<Schema> {
        opts.validate().context("validate read options")?;
        let row: SchemaRow = self
            .executor
            .read_named(&opts.build(), &opts.name)
            .await
            .context("read schema")?;
        Ok(row.into_schema())
    }

    async fn update(&self, name: &str, opts: &UpdateOptions) -> Result<Schema> {
        require_name(name).context("validate update options")?;
        let ident = quote_ident(name);
        let clause = opts.build();
        if has_changes(&clause, ObjectKind::Schema, &ident) {
            let sql = format!("ALTER SCHEMA {}{}", ident, clause);
            self.executor.exec(&sql).await.context("db exec")?;
        }
        self.read(&ReadOptions {
            name: name.to_string(),
            ..Default::default()
        })
        .await
    }

    async fn drop(&self, name: &str) -> Result<()> {
        require_name(name).context("validate drop options")?;
        self.executor.drop(ObjectKind::Schema, &quote_ident(name)).await
    }

    async fn undrop(&self, name: &str) -> Result<()> {
        require_name(name).context("validate undrop options")?;
        self.executor.undrop(ObjectKind::Schema, &quote_ident(name)).await
    }

    async fn rename(&self, old: &str, new: &str) -> Result<()> {
        require_name(old).context("validate rename options")?;
        require_name(new).context("validate rename options")?;
        self.executor
            .rename(ObjectKind::Schema, &quote_ident(old), &quote_ident(new))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RecordingClient;
    use std::sync::Arc;

    fn schemas() -> (Arc<RecordingClient>, SqlSchemas) {
        let client = Arc::new(RecordingClient::new());
        let schemas = SqlSchemas::new(Executor::new(client.clone()));
        (client, schemas)
    }

    // =========================================================================
    // Statement tests
    // =========================================================================

    #[test]
    fn test_create_minimal() {
        let opts = CreateOptions {
            name: "S1".into(),
            database: "D1".into(),
            ..Default::default()
        };
        assert_eq!(opts.build(), r#"CREATE SCHEMA "D1"."S1""#);
    }

    #[test]
    fn test_create_all_clauses() {
        let opts = CreateOptions {
            name: "S1".into(),
            database: "D1".into(),
            data_retention_time: Some(3),
            transient: true,
            managed_access: true,
            comment: Some("it's raw".into()),
        };
        assert_eq!(
            opts.build(),
            r#"CREATE TRANSIENT SCHEMA "D1"."S1" WITH MANAGED ACCESS DATA_RETENTION_TIME_IN_DAYS = 3 COMMENT = 'it\'s raw'"#
        );
    }

    #[test]
    fn test_create_empty_comment_omitted() {
        let opts = CreateOptions {
            name: "S1".into(),
            database: "D1".into(),
            comment: Some(String::new()),
            ..Default::default()
        };
        assert!(!opts.build().contains("COMMENT"));
    }

    #[test]
    fn test_create_requires_database() {
        let opts = CreateOptions {
            name: "S1".into(),
            ..Default::default()
        };
        assert!(opts.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_read_and_list_statements() {
        let read = ReadOptions {
            name: "S1".into(),
            database: "D1".into(),
        };
        assert_eq!(read.build(), r#"SHOW SCHEMAS LIKE 'S1' IN DATABASE "D1""#);
        let read = ReadOptions {
            name: "S1".into(),
            ..Default::default()
        };
        assert_eq!(read.build(), "SHOW SCHEMAS LIKE 'S1'");

        let list = ListOptions {
            database: "D1".into(),
            pattern: None,
        };
        assert_eq!(list.build(), r#"SHOW SCHEMAS IN DATABASE "D1""#);
        assert!(ListOptions::default().validate().is_err());
    }

    #[test]
    fn test_update_precedence() {
        let opts = UpdateOptions {
            comment: Tristate::Clear,
            data_retention_time: Some(1),
            ..Default::default()
        };
        assert_eq!(opts.build(), " UNSET COMMENT");

        let opts = UpdateOptions {
            comment: "new".into(),
            data_retention_time: Some(1),
            ..Default::default()
        };
        assert_eq!(opts.build(), " SET DATA_RETENTION_TIME_IN_DAYS = 1");

        let opts = UpdateOptions {
            comment: "new".into(),
            managed_access: Some(false),
            ..Default::default()
        };
        assert_eq!(opts.build(), " SET COMMENT = 'new'");

        let opts = UpdateOptions {
            managed_access: Some(false),
            ..Default::default()
        };
        assert_eq!(opts.build(), " DISABLE MANAGED ACCESS");
    }

    // =========================================================================
    // Operation tests
    // =========================================================================

    #[tokio::test]
    async fn test_create_reads_back() {
        let (client, schemas) = schemas();
        client.respond(
            "SHOW SCHEMAS",
            vec![Row::new()
                .with("name", "S1")
                .with("database_name", "D1")
                .with_null("comment")
                .with("retention_time", "1")],
        );
        let schema = schemas
            .create(&CreateOptions {
                name: "S1".into(),
                database: "D1".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(schema.name, "S1");
        assert_eq!(schema.comment, "");
        assert_eq!(schema.retention_time, "1");
        assert_eq!(
            client.statements(),
            vec![
                r#"CREATE SCHEMA "D1"."S1""#,
                r#"SHOW SCHEMAS LIKE 'S1' IN DATABASE "D1""#
            ]
        );
    }

    #[tokio::test]
    async fn test_update_reads_back_by_name_only() {
        let (client, schemas) = schemas();
        client.respond("SHOW SCHEMAS", vec![Row::new().with("name", "S1")]);
        schemas
            .update(
                "S1",
                &UpdateOptions {
                    comment: "c".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            client.statements(),
            vec![
                r#"ALTER SCHEMA "S1" SET COMMENT = 'c'"#,
                "SHOW SCHEMAS LIKE 'S1'"
            ]
        );
    }

    #[tokio::test]
    async fn test_update_without_changes_only_reads() {
        let (client, schemas) = schemas();
        client.respond("SHOW SCHEMAS", vec![Row::new().with("name", "S1")]);
        schemas.update("S1", &UpdateOptions::default()).await.unwrap();
        assert_eq!(client.statements(), vec!["SHOW SCHEMAS LIKE 'S1'"]);
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let (_client, schemas) = schemas();
        let err = schemas
            .read(&ReadOptions {
                name: "NOPE".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_drop_undrop_rename() {
        let (client, schemas) = schemas();
        schemas.drop("S1").await.unwrap();
        schemas.undrop("S1").await.unwrap();
        schemas.rename("S1", "S2").await.unwrap();
        assert_eq!(
            client.statements(),
            vec![
                r#"DROP SCHEMA "S1""#,
                r#"UNDROP SCHEMA "S1""#,
                r#"ALTER SCHEMA "S1" RENAME TO "S2""#
            ]
        );
        assert!(schemas.drop("").await.unwrap_err().is_validation());
    }
}
