//! Views.

use async_trait::async_trait;
use tracing::debug;

use crate::client::Executor;
use crate::core::{BaseOptions, FromRow, ObjectKind, Row, SchemaScope, Tristate};
use crate::error::{Result, ResultExt, SnowflakeError};

use super::tag::TagValue;
use super::{comment_clause, has_changes, set_comment_clause, show_in_schema};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    pub name: String,
    pub database: String,
    pub schema: String,
    pub comment: String,
    pub is_secure: bool,
    /// The view's defining statement.
    pub text: String,
}

#[derive(Debug, Default)]
struct ViewRow {
    comment: Option<String>,
    is_secure: Option<bool>,
    name: Option<String>,
    schema_name: Option<String>,
    text: Option<String>,
    database_name: Option<String>,
}

impl FromRow for ViewRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            comment: row.string("comment"),
            is_secure: row.bool("is_secure")?,
            name: row.string("name"),
            schema_name: row.string("schema_name"),
            text: row.string("text"),
            database_name: row.string("database_name"),
        })
    }
}

impl ViewRow {
    fn into_view(self) -> View {
        View {
            name: self.name.unwrap_or_default(),
            database: self.database_name.unwrap_or_default(),
            schema: self.schema_name.unwrap_or_default(),
            comment: self.comment.unwrap_or_default(),
            is_secure: self.is_secure.unwrap_or_default(),
            text: self.text.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub base: BaseOptions,
    /// The `SELECT` the view is defined as.
    pub statement: String,
    pub replace: bool,
    pub secure: bool,
    pub comment: Option<String>,
}

impl CreateOptions {
    pub fn validate(&self) -> Result<()> {
        self.base.validate(ObjectKind::View)?;
        if self.statement.is_empty() {
            return Err(SnowflakeError::validation("statement is required"));
        }
        Ok(())
    }

    pub fn build(&self) -> String {
        let mut sql = String::from("CREATE");
        if self.replace {
            sql.push_str(" OR REPLACE");
        }
        if self.secure {
            sql.push_str(" SECURE");
        }
        sql.push_str(&format!(" VIEW {}", self.base.qualified(ObjectKind::View)));
        if let Some(comment) = self.comment.as_deref().filter(|c| !c.is_empty()) {
            sql.push_str(&comment_clause(comment));
        }
        sql.push_str(&format!(" AS {}", self.statement));
        sql
    }
}

/// One change to a view; the first field set wins.
///
/// Precedence: comment clear, comment set, add tag, unset tag, change tag,
/// secure.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub base: BaseOptions,
    pub comment: Tristate<String>,
    pub add_tag: Option<TagValue>,
    pub unset_tag: Option<TagValue>,
    pub change_tag: Option<TagValue>,
    pub secure: Option<bool>,
}

impl UpdateOptions {
    pub fn validate(&self) -> Result<()> {
        self.base.validate(ObjectKind::View)
    }

    pub fn build(&self) -> String {
        if self.comment.is_clear() {
            " UNSET COMMENT".to_string()
        } else if let Some(comment) = self.comment.as_set() {
            set_comment_clause(comment)
        } else if let Some(tag) = &self.add_tag {
            tag.set_clause()
        } else if let Some(tag) = &self.unset_tag {
            tag.unset_clause()
        } else if let Some(tag) = &self.change_tag {
            tag.set_clause()
        } else if let Some(secure) = self.secure {
            if secure {
                " SET SECURE".to_string()
            } else {
                " UNSET SECURE".to_string()
            }
        } else {
            String::new()
        }
    }
}

#[async_trait]
pub trait Views: Send + Sync {
    async fn list(&self, scope: &SchemaScope) -> Result<Vec<View>>;
    async fn create(&self, opts: &CreateOptions) -> Result<View>;
    async fn read(&self, opts: &BaseOptions) -> Result<View>;
    async fn update(&self, opts: &UpdateOptions) -> Result<View>;
    async fn drop(&self, opts: &BaseOptions) -> Result<()>;
    /// Rename within the same database and schema.
    async fn rename(&self, opts: &BaseOptions, new_name: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct SqlViews {
    executor: Executor,
}

impl SqlViews {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Views for SqlViews {
    async fn list(&self, scope: &SchemaScope) -> Result<Vec<View>> {
        scope.validate().context("validate list options")?;
        let rows: Vec<ViewRow> = self
            .executor
            .query_as(&scope.show_statement(ObjectKind::View))
            .await?;
        Ok(rows.into_iter().map(ViewRow::into_view).collect())
    }

    async fn create(&self, opts: &CreateOptions) -> Result<View> {
        opts.validate().context("validate create options")?;
        self.executor.exec(&opts.build()).await.context("db exec")?;
        debug!("Created view {}", opts.base.qualified(ObjectKind::View));
        self.read(&opts.base).await
    }

    async fn read(&self, opts: &BaseOptions) -> Result<View> {
        opts.validate(ObjectKind::View)
            .context("validate read options")?;
        let row: ViewRow = self
            .executor
            .read_named(&show_in_schema(opts, ObjectKind::View), &opts.name)
            .await
            .context("read view")?;
        Ok(row.into_view())
    }

    async fn update(&self, opts: &UpdateOptions) -> Result<View> {
        opts.validate().context("validate update options")?;
        let ident = opts.base.qualified(ObjectKind::View);
        let clause = opts.build();
        if has_changes(&clause, ObjectKind::View, &ident) {
            let sql = format!("ALTER VIEW {}{}", ident, clause);
            self.executor.exec(&sql).await.context("db exec")?;
        }
        self.read(&opts.base).await
    }

    async fn drop(&self, opts: &BaseOptions) -> Result<()> {
        opts.validate(ObjectKind::View)
            .context("validate drop options")?;
        self.executor
            .drop(ObjectKind::View, &opts.qualified(ObjectKind::View))
            .await
    }

    async fn rename(&self, opts: &BaseOptions, new_name: &str) -> Result<()> {
        opts.validate(ObjectKind::View)
            .context("validate rename options")?;
        let target = BaseOptions {
            name: new_name.to_string(),
            ..opts.clone()
        };
        target
            .validate(ObjectKind::View)
            .context("validate rename options")?;
        self.executor
            .rename(
                ObjectKind::View,
                &opts.qualified(ObjectKind::View),
                &target.qualified(ObjectKind::View),
            )
            .await
    }
}
