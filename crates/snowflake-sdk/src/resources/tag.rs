//! Tags, and the tag assignments other objects carry.

use async_trait::async_trait;
use tracing::debug;

use crate::client::Executor;
use crate::core::identifier::{dotted_name, literal_list, quote_ident, quote_literal};
use crate::core::{BaseOptions, FromRow, ObjectKind, Row, SchemaScope, Tristate};
use crate::error::{Result, ResultExt};

use super::{comment_clause, has_changes, set_comment_clause, show_narrowed};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub database: String,
    pub schema: String,
    pub comment: String,
    pub allowed_values: String,
}

#[derive(Debug, Default)]
struct TagRow {
    name: Option<String>,
    database_name: Option<String>,
    schema_name: Option<String>,
    comment: Option<String>,
    allowed_values: Option<String>,
}

impl FromRow for TagRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            name: row.string("name"),
            database_name: row.string("database_name"),
            schema_name: row.string("schema_name"),
            comment: row.string("comment"),
            allowed_values: row.string("allowed_values"),
        })
    }
}

impl TagRow {
    fn into_tag(self) -> Tag {
        Tag {
            name: self.name.unwrap_or_default(),
            database: self.database_name.unwrap_or_default(),
            schema: self.schema_name.unwrap_or_default(),
            comment: self.comment.unwrap_or_default(),
            allowed_values: self.allowed_values.unwrap_or_default(),
        }
    }
}

/// A tag assigned to another object, with its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagValue {
    pub name: String,
    /// Ignored unless `schema` is also set: a database alone is not emitted.
    pub database: String,
    pub schema: String,
    pub value: String,
}

impl TagValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn in_schema(mut self, database: impl Into<String>, schema: impl Into<String>) -> Self {
        self.database = database.into();
        self.schema = schema.into();
        self
    }

    /// Tag reference. The database is only emitted together with a schema.
    pub fn qualified(&self) -> String {
        if self.schema.is_empty() {
            quote_ident(&self.name)
        } else {
            dotted_name(&self.name, &self.database, &self.schema)
        }
    }

    /// `<tag> = '<value>'`
    pub(crate) fn assignment(&self) -> String {
        format!("{} = {}", self.qualified(), quote_literal(&self.value))
    }

    pub(crate) fn set_clause(&self) -> String {
        format!(" SET TAG {}", self.assignment())
    }

    pub(crate) fn unset_clause(&self) -> String {
        format!(" UNSET TAG {}", self.qualified())
    }
}

/// ` WITH TAG (<tag> = '<value>', ...)`
pub(crate) fn with_tag_clause(tags: &[TagValue]) -> String {
    let assignments: Vec<String> = tags.iter().map(TagValue::assignment).collect();
    format!(" WITH TAG ({})", assignments.join(", "))
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub base: BaseOptions,
    pub allowed_values: Vec<String>,
    pub comment: Option<String>,
}

impl CreateOptions {
    pub fn validate(&self) -> Result<()> {
        self.base.validate(ObjectKind::Tag)
    }

    pub fn build(&self) -> String {
        let mut sql = format!("CREATE TAG {}", self.base.qualified(ObjectKind::Tag));
        if !self.allowed_values.is_empty() {
            sql.push_str(&format!(
                " ALLOWED_VALUES {}",
                literal_list(&self.allowed_values)
            ));
        }
        if let Some(comment) = self.comment.as_deref().filter(|c| !c.is_empty()) {
            sql.push_str(&comment_clause(comment));
        }
        sql
    }
}

/// One change to a tag; the first field set wins.
///
/// Precedence: comment clear, add allowed values, drop allowed values,
/// unset allowed values, comment set, masking policy.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub base: BaseOptions,
    pub comment: Tristate<String>,
    pub add_allowed_values: Vec<String>,
    pub drop_allowed_values: Vec<String>,
    pub unset_allowed_values: bool,
    pub masking_policy: Option<String>,
    /// Detach `masking_policy` instead of attaching it.
    pub remove_masking_policy: bool,
}

impl UpdateOptions {
    pub fn validate(&self) -> Result<()> {
        self.base.validate(ObjectKind::Tag)
    }

    pub fn build(&self) -> String {
        if self.comment.is_clear() {
            " UNSET COMMENT".to_string()
        } else if !self.add_allowed_values.is_empty() {
            format!(" ADD ALLOWED_VALUES {}", literal_list(&self.add_allowed_values))
        } else if !self.drop_allowed_values.is_empty() {
            format!(
                " DROP ALLOWED_VALUES {}",
                literal_list(&self.drop_allowed_values)
            )
        } else if self.unset_allowed_values {
            " UNSET ALLOWED_VALUES".to_string()
        } else if let Some(comment) = self.comment.as_set() {
            set_comment_clause(comment)
        } else if let Some(policy) = &self.masking_policy {
            if self.remove_masking_policy {
                format!(" UNSET MASKING POLICY {}", policy)
            } else {
                format!(" SET MASKING POLICY {}", policy)
            }
        } else {
            String::new()
        }
    }
}

#[async_trait]
pub trait Tags: Send + Sync {
    async fn list(&self, scope: &SchemaScope) -> Result<Vec<Tag>>;
    async fn create(&self, opts: &CreateOptions) -> Result<Tag>;
    async fn read(&self, opts: &BaseOptions) -> Result<Tag>;
    async fn update(&self, opts: &UpdateOptions) -> Result<Tag>;
    async fn drop(&self, opts: &BaseOptions) -> Result<()>;
    async fn undrop(&self, opts: &BaseOptions) -> Result<()>;
}

#[derive(Clone)]
pub struct SqlTags {
    executor: Executor,
}

impl SqlTags {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Tags for SqlTags {
    async fn list(&self, scope: &SchemaScope) -> Result<Vec<Tag>> {
        scope.validate().context("validate list options")?;
        let rows: Vec<TagRow> = self
            .executor
            .query_as(&scope.show_statement(ObjectKind::Tag))
            .await?;
        Ok(rows.into_iter().map(TagRow::into_tag).collect())
    }

    async fn create(&self, opts: &CreateOptions) -> Result<Tag> {
        opts.validate().context("validate create options")?;
        self.executor.exec(&opts.build()).await.context("db exec")?;
        debug!("Created tag {}", opts.base.qualified(ObjectKind::Tag));
        self.read(&opts.base).await
    }

    async fn read(&self, opts: &BaseOptions) -> Result<Tag> {
        opts.validate(ObjectKind::Tag)
            .context("validate read options")?;
        let row: TagRow = self
            .executor
            .read_named(&show_narrowed(opts, ObjectKind::Tag), &opts.name)
            .await
            .context("read tag")?;
        Ok(row.into_tag())
    }

    async fn update(&self, opts: &UpdateOptions) -> Result<Tag> {
        opts.validate().context("validate update options")?;
        let ident = opts.base.qualified(ObjectKind::Tag);
        let clause = opts.build();
        if has_changes(&clause, ObjectKind::Tag, &ident) {
            let sql = format!("ALTER TAG {}{}", ident, clause);
            self.executor.exec(&sql).await.context("db exec")?;
        }
        self.read(&opts.base).await
    }

    async fn drop(&self, opts: &BaseOptions) -> Result<()> {
        opts.validate(ObjectKind::Tag)
            .context("validate drop options")?;
        self.executor
            .drop(ObjectKind::Tag, &opts.qualified(ObjectKind::Tag))
            .await
    }

    async fn undrop(&self, opts: &BaseOptions) -> Result<()> {
        opts.validate(ObjectKind::Tag)
            .context("validate undrop options")?;
        self.executor
            .undrop(ObjectKind::Tag, &opts.qualified(ObjectKind::Tag))
            .await
    }
}
