//! Tables.
//!
//! Table updates carry the longest precedence chain of any kind: exactly one
//! of the [`UpdateOptions`] fields is applied per call, in the order the
//! fields are declared.

mod column;

pub use column::{Column, ColumnChange, ColumnDefault, ColumnIdentity, PrimaryKey};

use async_trait::async_trait;
use tracing::debug;

use crate::client::Executor;
use crate::core::identifier::{bool_literal, quote_ident, quote_literal};
use crate::core::{BaseOptions, FromRow, ObjectKind, Row, SchemaScope, Tristate};
use crate::error::{Result, ResultExt, SnowflakeError};

use super::tag::{with_tag_clause, TagValue};
use super::{comment_clause, has_changes, set_comment_clause, show_in_schema};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub created_on: String,
    pub name: String,
    pub database: String,
    pub schema: String,
    pub kind: String,
    pub comment: String,
    pub cluster_by: String,
    pub rows: String,
    pub bytes: String,
    pub owner: String,
    pub retention_time: i32,
    pub automatic_clustering: String,
    pub change_tracking: String,
    pub is_external: String,
}

#[derive(Debug, Default)]
struct TableRow {
    created_on: Option<String>,
    name: Option<String>,
    database_name: Option<String>,
    schema_name: Option<String>,
    kind: Option<String>,
    comment: Option<String>,
    cluster_by: Option<String>,
    rows: Option<String>,
    bytes: Option<String>,
    owner: Option<String>,
    retention_time: Option<i32>,
    automatic_clustering: Option<String>,
    change_tracking: Option<String>,
    is_external: Option<String>,
}

impl FromRow for TableRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            created_on: row.string("created_on"),
            name: row.string("name"),
            database_name: row.string("database_name"),
            schema_name: row.string("schema_name"),
            kind: row.string("kind"),
            comment: row.string("comment"),
            cluster_by: row.string("cluster_by"),
            rows: row.string("rows"),
            bytes: row.string("bytes"),
            owner: row.string("owner"),
            retention_time: row.int32("retention_time")?,
            automatic_clustering: row.string("automatic_clustering"),
            change_tracking: row.string("change_tracking"),
            is_external: row.string("is_external"),
        })
    }
}

impl TableRow {
    fn into_table(self) -> Table {
        Table {
            created_on: self.created_on.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            database: self.database_name.unwrap_or_default(),
            schema: self.schema_name.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
            comment: self.comment.unwrap_or_default(),
            cluster_by: self.cluster_by.unwrap_or_default(),
            rows: self.rows.unwrap_or_default(),
            bytes: self.bytes.unwrap_or_default(),
            owner: self.owner.unwrap_or_default(),
            retention_time: self.retention_time.unwrap_or_default(),
            automatic_clustering: self.automatic_clustering.unwrap_or_default(),
            change_tracking: self.change_tracking.unwrap_or_default(),
            is_external: self.is_external.unwrap_or_default(),
        }
    }
}

/// One column as reported by `DESCRIBE TABLE`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnDescription {
    pub name: String,
    pub data_type: String,
    pub kind: String,
    /// `Y` or `N`, as reported.
    pub nullable: String,
    pub default: String,
    pub comment: String,
    pub masking_policy: String,
}

#[derive(Debug, Default)]
struct ColumnDescriptionRow {
    name: Option<String>,
    data_type: Option<String>,
    kind: Option<String>,
    nullable: Option<String>,
    default: Option<String>,
    comment: Option<String>,
    masking_policy: Option<String>,
}

impl FromRow for ColumnDescriptionRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            name: row.string("name"),
            data_type: row.string("type"),
            kind: row.string("kind"),
            nullable: row.string("null?"),
            default: row.string("default"),
            comment: row.string("comment"),
            masking_policy: row.string("policy name"),
        })
    }
}

impl ColumnDescriptionRow {
    fn into_description(self) -> ColumnDescription {
        ColumnDescription {
            name: self.name.unwrap_or_default(),
            data_type: self.data_type.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
            nullable: self.nullable.unwrap_or_default(),
            default: self.default.unwrap_or_default(),
            comment: self.comment.unwrap_or_default(),
            masking_policy: self.masking_policy.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub base: BaseOptions,
    pub columns: Vec<Column>,
    pub primary_key: Option<PrimaryKey>,
    /// Clustering expressions, emitted as-is.
    pub cluster_by: Vec<String>,
    pub data_retention_time: Option<i32>,
    pub change_tracking: Option<bool>,
    pub comment: Option<String>,
    pub tags: Vec<TagValue>,
}

impl CreateOptions {
    pub fn validate(&self) -> Result<()> {
        self.base.validate(ObjectKind::Table)?;
        if self.columns.is_empty() {
            return Err(SnowflakeError::validation("at least one column is required"));
        }
        Ok(())
    }

    pub fn build(&self) -> String {
        let mut elements: Vec<String> = self
            .columns
            .iter()
            .map(|c| c.definition(true, !c.comment.is_empty()))
            .collect();
        if let Some(key) = self.primary_key.as_ref().filter(|k| !k.keys.is_empty()) {
            elements.push(format!("{} ({})", key.constraint(), key.key_list()));
        }

        let mut sql = format!(
            "CREATE TABLE {} ({})",
            self.base.qualified(ObjectKind::Table),
            elements.join(", ")
        );
        if !self.cluster_by.is_empty() {
            sql.push_str(&format!(" CLUSTER BY LINEAR({})", self.cluster_by.join(", ")));
        }
        if let Some(days) = self.data_retention_time {
            sql.push_str(&format!(" DATA_RETENTION_TIME_IN_DAYS = {}", days));
        }
        if let Some(tracking) = self.change_tracking {
            sql.push_str(&format!(" CHANGE_TRACKING = {}", bool_literal(tracking)));
        }
        if let Some(comment) = self.comment.as_deref().filter(|c| !c.is_empty()) {
            sql.push_str(&comment_clause(comment));
        }
        if !self.tags.is_empty() {
            sql.push_str(&with_tag_clause(&self.tags));
        }
        sql
    }
}

/// One change to a table; the first field set wins, in declaration order.
/// `comment` and `cluster_by` each occupy two positions: their `Clear` and
/// `Set` forms are checked at different points in the chain.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub base: BaseOptions,
    pub comment: Tristate<String>,
    pub data_retention_time: Option<i32>,
    pub change_tracking: Option<bool>,
    pub drop_column: Option<String>,
    pub cluster_by: Tristate<Vec<String>>,
    pub primary_key: Tristate<PrimaryKey>,
    pub add_tag: Option<TagValue>,
    pub unset_tag: Option<TagValue>,
    pub change_tag: Option<TagValue>,
    /// Column whose default is dropped.
    pub drop_column_default: Option<String>,
    pub change_column_comment: Option<ColumnChange<String>>,
    pub change_column_type: Option<ColumnChange<String>>,
    /// A blank policy unsets the column's masking policy.
    pub change_column_masking_policy: Option<ColumnChange<String>>,
    /// `true` makes the column nullable.
    pub change_null_constraint: Option<ColumnChange<bool>>,
}

impl UpdateOptions {
    pub fn validate(&self) -> Result<()> {
        self.base.validate(ObjectKind::Table)
    }

    pub fn build(&self) -> String {
        if self.comment.is_clear() {
            " UNSET COMMENT".to_string()
        } else if let Some(days) = self.data_retention_time {
            format!(" SET DATA_RETENTION_TIME_IN_DAYS = {}", days)
        } else if let Some(tracking) = self.change_tracking {
            format!(" SET CHANGE_TRACKING = {}", bool_literal(tracking))
        } else if let Some(column) = &self.drop_column {
            format!(" DROP COLUMN {}", quote_ident(column))
        } else if let Some(comment) = self.comment.as_set() {
            set_comment_clause(comment)
        } else if let Some(keys) = self.cluster_by.as_set() {
            format!(" CLUSTER BY LINEAR({})", keys.join(", "))
        } else if self.cluster_by.is_clear() {
            " DROP CLUSTERING KEY".to_string()
        } else if self.primary_key.is_clear() {
            " DROP PRIMARY KEY".to_string()
        } else if let Some(key) = self.primary_key.as_set() {
            format!(" ADD {}({})", key.constraint(), key.key_list())
        } else if let Some(tag) = &self.add_tag {
            tag.set_clause()
        } else if let Some(tag) = &self.unset_tag {
            tag.unset_clause()
        } else if let Some(tag) = &self.change_tag {
            tag.set_clause()
        } else if let Some(column) = &self.drop_column_default {
            format!(" MODIFY COLUMN {} DROP DEFAULT", quote_ident(column))
        } else if let Some(change) = &self.change_column_comment {
            format!(
                " MODIFY COLUMN {} COMMENT {}",
                quote_ident(&change.column),
                quote_literal(&change.value)
            )
        } else if let Some(change) = &self.change_column_type {
            let column = Column::new(change.column.clone(), change.value.clone());
            format!(" MODIFY COLUMN {}", column.definition(false, false))
        } else if let Some(change) = &self.change_column_masking_policy {
            let policy = change.value.trim();
            if policy.is_empty() {
                format!(
                    " MODIFY COLUMN {} UNSET MASKING POLICY",
                    quote_ident(&change.column)
                )
            } else {
                format!(
                    " MODIFY COLUMN {} SET MASKING POLICY {}",
                    quote_ident(&change.column),
                    policy
                )
            }
        } else if let Some(change) = &self.change_null_constraint {
            let action = if change.value {
                "DROP NOT NULL"
            } else {
                "SET NOT NULL"
            };
            format!(" MODIFY COLUMN {} {}", quote_ident(&change.column), action)
        } else {
            String::new()
        }
    }
}

#[async_trait]
pub trait Tables: Send + Sync {
    async fn list(&self, scope: &SchemaScope) -> Result<Vec<Table>>;
    async fn create(&self, opts: &CreateOptions) -> Result<Table>;
    async fn read(&self, opts: &BaseOptions) -> Result<Table>;
    /// Column metadata. A table without columns is reported as not found.
    async fn describe(&self, opts: &BaseOptions) -> Result<Vec<ColumnDescription>>;
    async fn update(&self, opts: &UpdateOptions) -> Result<Table>;
    async fn drop(&self, opts: &BaseOptions) -> Result<()>;
    /// Rename within the same database and schema.
    async fn rename(&self, opts: &BaseOptions, new_name: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct SqlTables {
    executor: Executor,
}

impl SqlTables {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Tables for SqlTables {
    async fn list(&self, scope: &SchemaScope) -> Result<Vec<Table>> {
        scope.validate().context("validate list options")?;
        let rows: Vec<TableRow> = self
            .executor
            .query_as(&scope.show_statement(ObjectKind::Table))
            .await?;
        Ok(rows.into_iter().map(TableRow::into_table).collect())
    }

    async fn create(&self, opts: &CreateOptions) -> Result<Table> {
        opts.validate().context("validate create options")?;
        self.executor.exec(&opts.build()).await.context("db exec")?;
        debug!("Created table {}", opts.base.qualified(ObjectKind::Table));
        self.read(&opts.base).await
    }

    async fn read(&self, opts: &BaseOptions) -> Result<Table> {
        opts.validate(ObjectKind::Table)
            .context("validate read options")?;
        let row: TableRow = self
            .executor
            .read_named(&show_in_schema(opts, ObjectKind::Table), &opts.name)
            .await
            .context("read table")?;
        Ok(row.into_table())
    }

    async fn describe(&self, opts: &BaseOptions) -> Result<Vec<ColumnDescription>> {
        opts.validate(ObjectKind::Table)
            .context("validate describe options")?;
        let sql = format!("DESCRIBE TABLE {}", opts.qualified(ObjectKind::Table));
        let rows: Vec<ColumnDescriptionRow> = self.executor.query_as(&sql).await?;
        if rows.is_empty() {
            return Err(SnowflakeError::NotFound(sql)).context("describe table");
        }
        Ok(rows
            .into_iter()
            .map(ColumnDescriptionRow::into_description)
            .collect())
    }

    async fn update(&self, opts: &UpdateOptions) -> Result<Table> {
        opts.validate().context("validate update options")?;
        let ident = opts.base.qualified(ObjectKind::Table);
        let clause = opts.build();
        if has_changes(&clause, ObjectKind::Table, &ident) {
            let sql = format!("ALTER TABLE {}{}", ident, clause);
            self.executor.exec(&sql).await.context("db exec")?;
        }
        self.read(&opts.base).await
    }

    async fn drop(&self, opts: &BaseOptions) -> Result<()> {
        opts.validate(ObjectKind::Table)
            .context("validate drop options")?;
        self.executor
            .drop(ObjectKind::Table, &opts.qualified(ObjectKind::Table))
            .await
    }

    async fn rename(&self, opts: &BaseOptions, new_name: &str) -> Result<()> {
        opts.validate(ObjectKind::Table)
            .context("validate rename options")?;
        let target = BaseOptions {
            name: new_name.to_string(),
            ..opts.clone()
        };
        target
            .validate(ObjectKind::Table)
            .context("validate rename options")?;
        self.executor
            .rename(
                ObjectKind::Table,
                &opts.qualified(ObjectKind::Table),
                &target.qualified(ObjectKind::Table),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RecordingClient;
    use std::sync::Arc;

    fn base() -> BaseOptions {
        BaseOptions::new("T1").in_schema("D1", "S1")
    }

    fn tables() -> (Arc<RecordingClient>, SqlTables) {
        let client = Arc::new(RecordingClient::new());
        (client.clone(), SqlTables::new(Executor::new(client)))
    }

    // =========================================================================
    // Create tests
    // =========================================================================

    #[test]
    fn test_create_columns_and_primary_key() {
        let mut name = Column::new("NAME", "VARCHAR");
        name.default = Some(ColumnDefault::Constant("n/a".into()));
        name.comment = "display name".into();
        let opts = CreateOptions {
            base: base(),
            columns: vec![Column::new("ID", "NUMBER").not_null(), name],
            primary_key: Some(PrimaryKey {
                name: "PK_T1".into(),
                keys: vec!["ID".into()],
            }),
            ..Default::default()
        };
        assert_eq!(
            opts.build(),
            r#"CREATE TABLE "D1"."S1"."T1" ("ID" NUMBER NOT NULL, "NAME" VARCHAR DEFAULT 'n/a' COMMENT = 'display name', CONSTRAINT "PK_T1" PRIMARY KEY ("ID"))"#
        );
    }

    #[test]
    fn test_create_trailing_properties() {
        let opts = CreateOptions {
            base: base(),
            columns: vec![Column::new("ID", "NUMBER")],
            cluster_by: vec!["ID".into(), "TO_DATE(TS)".into()],
            data_retention_time: Some(1),
            change_tracking: Some(true),
            comment: Some("facts".into()),
            tags: vec![TagValue::new("PII", "none").in_schema("G", "T")],
            ..Default::default()
        };
        assert_eq!(
            opts.build(),
            r#"CREATE TABLE "D1"."S1"."T1" ("ID" NUMBER) CLUSTER BY LINEAR(ID, TO_DATE(TS)) DATA_RETENTION_TIME_IN_DAYS = 1 CHANGE_TRACKING = true COMMENT = 'facts' WITH TAG ("G"."T"."PII" = 'none')"#
        );
    }

    #[test]
    fn test_create_requires_columns_and_schema() {
        let opts = CreateOptions {
            base: base(),
            ..Default::default()
        };
        assert!(opts.validate().unwrap_err().is_validation());

        let opts = CreateOptions {
            base: BaseOptions::new("T1").in_database("D1"),
            columns: vec![Column::new("ID", "NUMBER")],
            ..Default::default()
        };
        assert!(opts.validate().unwrap_err().is_validation());
    }

    // =========================================================================
    // Update precedence tests
    // =========================================================================

    fn update() -> UpdateOptions {
        UpdateOptions {
            base: base(),
            ..Default::default()
        }
    }

    #[test]
    fn test_comment_clear_and_set_positions() {
        let opts = UpdateOptions {
            comment: Tristate::Clear,
            data_retention_time: Some(1),
            ..update()
        };
        assert_eq!(opts.build(), " UNSET COMMENT");

        let opts = UpdateOptions {
            comment: "c".into(),
            drop_column: Some("OLD".into()),
            ..update()
        };
        assert_eq!(opts.build(), r#" DROP COLUMN "OLD""#);

        let opts = UpdateOptions {
            comment: "c".into(),
            cluster_by: Tristate::Clear,
            ..update()
        };
        assert_eq!(opts.build(), " SET COMMENT = 'c'");
    }

    #[test]
    fn test_clustering_and_primary_key() {
        let opts = UpdateOptions {
            cluster_by: Tristate::Set(vec!["A".into(), "B".into()]),
            ..update()
        };
        assert_eq!(opts.build(), " CLUSTER BY LINEAR(A, B)");

        let opts = UpdateOptions {
            cluster_by: Tristate::Clear,
            primary_key: Tristate::Clear,
            ..update()
        };
        assert_eq!(opts.build(), " DROP CLUSTERING KEY");

        let opts = UpdateOptions {
            primary_key: Tristate::Set(PrimaryKey {
                name: String::new(),
                keys: vec!["A".into(), "B".into()],
            }),
            ..update()
        };
        assert_eq!(opts.build(), r#" ADD PRIMARY KEY("A", "B")"#);
    }

    #[test]
    fn test_tag_changes_use_literal_values() {
        let opts = UpdateOptions {
            change_tag: Some(TagValue::new("PII", "high").in_schema("G", "T")),
            drop_column_default: Some("X".into()),
            ..update()
        };
        assert_eq!(opts.build(), r#" SET TAG "G"."T"."PII" = 'high'"#);
    }

    #[test]
    fn test_column_changes() {
        let opts = UpdateOptions {
            drop_column_default: Some("X".into()),
            ..update()
        };
        assert_eq!(opts.build(), r#" MODIFY COLUMN "X" DROP DEFAULT"#);

        let opts = UpdateOptions {
            change_column_comment: Some(ColumnChange::new("X", "it's".to_string())),
            ..update()
        };
        assert_eq!(opts.build(), r#" MODIFY COLUMN "X" COMMENT 'it\'s'"#);

        let opts = UpdateOptions {
            change_column_type: Some(ColumnChange::new("X", "VARCHAR(32)".to_string())),
            ..update()
        };
        assert_eq!(opts.build(), r#" MODIFY COLUMN "X" VARCHAR(32)"#);

        let opts = UpdateOptions {
            change_column_masking_policy: Some(ColumnChange::new("X", "  ".to_string())),
            ..update()
        };
        assert_eq!(opts.build(), r#" MODIFY COLUMN "X" UNSET MASKING POLICY"#);

        let opts = UpdateOptions {
            change_null_constraint: Some(ColumnChange::new("X", true)),
            ..update()
        };
        assert_eq!(opts.build(), r#" MODIFY COLUMN "X" DROP NOT NULL"#);

        let opts = UpdateOptions {
            change_null_constraint: Some(ColumnChange::new("X", false)),
            ..update()
        };
        assert_eq!(opts.build(), r#" MODIFY COLUMN "X" SET NOT NULL"#);
    }

    // =========================================================================
    // Operation tests
    // =========================================================================

    #[tokio::test]
    async fn test_update_reads_back_with_full_identity() {
        let (client, tables) = tables();
        client.respond(
            "SHOW TABLES",
            vec![Row::new()
                .with("name", "T1")
                .with("rows", "42")
                .with("retention_time", "1")],
        );
        let table = tables
            .update(&UpdateOptions {
                change_tracking: Some(false),
                ..update()
            })
            .await
            .unwrap();
        assert_eq!(table.rows, "42");
        assert_eq!(table.retention_time, 1);
        assert_eq!(
            client.statements(),
            vec![
                r#"ALTER TABLE "D1"."S1"."T1" SET CHANGE_TRACKING = false"#,
                r#"SHOW TABLES LIKE 'T1' IN SCHEMA "D1"."S1""#,
            ]
        );
    }

    #[tokio::test]
    async fn test_read_ignores_wildcard_lookalike() {
        let (client, tables) = tables();
        client.respond(
            "SHOW TABLES",
            vec![
                Row::new().with("name", "MYXTABLE").with("rows", "1"),
                Row::new().with("name", "MY_TABLE").with("rows", "2"),
            ],
        );
        let table = tables
            .read(&BaseOptions::new("MY_TABLE").in_schema("D", "S"))
            .await
            .unwrap();
        assert_eq!(table.name, "MY_TABLE");
        assert_eq!(table.rows, "2");
    }

    #[tokio::test]
    async fn test_read_without_exact_name_is_not_found() {
        let (client, tables) = tables();
        client.respond("SHOW TABLES", vec![Row::new().with("name", "MYXTABLE")]);
        let err = tables
            .read(&BaseOptions::new("MY_TABLE").in_schema("D", "S"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_describe_maps_columns() {
        let (client, tables) = tables();
        client.respond(
            "DESCRIBE TABLE",
            vec![Row::new()
                .with("name", "ID")
                .with("type", "NUMBER(38,0)")
                .with("kind", "COLUMN")
                .with("null?", "N")
                .with_null("default")
                .with("policy name", "MASK_ID")],
        );
        let columns = tables.describe(&base()).await.unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].data_type, "NUMBER(38,0)");
        assert_eq!(columns[0].nullable, "N");
        assert_eq!(columns[0].default, "");
        assert_eq!(columns[0].masking_policy, "MASK_ID");
        assert_eq!(
            client.last_statement().unwrap(),
            r#"DESCRIBE TABLE "D1"."S1"."T1""#
        );
    }

    #[tokio::test]
    async fn test_describe_without_rows_is_not_found() {
        let (_client, tables) = tables();
        assert!(tables.describe(&base()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_drop_and_rename_are_qualified() {
        let (client, tables) = tables();
        tables.rename(&base(), "T2").await.unwrap();
        tables.drop(&base()).await.unwrap();
        assert_eq!(
            client.statements(),
            vec![
                r#"ALTER TABLE "D1"."S1"."T1" RENAME TO "D1"."S1"."T2""#,
                r#"DROP TABLE "D1"."S1"."T1""#,
            ]
        );
    }
}
