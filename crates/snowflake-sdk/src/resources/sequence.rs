//! Sequences.

use async_trait::async_trait;
use tracing::debug;

use crate::client::Executor;
use crate::core::{BaseOptions, FromRow, ObjectKind, Row, SchemaScope, Tristate};
use crate::error::{Result, ResultExt};

use super::{comment_clause, has_changes, set_comment_clause, show_in_schema};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    pub name: String,
    pub database: String,
    pub schema: String,
    pub next_value: String,
    pub increment: String,
    pub created_on: String,
    pub owner: String,
    pub comment: String,
}

#[derive(Debug, Default)]
struct SequenceRow {
    name: Option<String>,
    database_name: Option<String>,
    schema_name: Option<String>,
    next_value: Option<String>,
    interval: Option<String>,
    created_on: Option<String>,
    owner: Option<String>,
    comment: Option<String>,
}

impl FromRow for SequenceRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            name: row.string("name"),
            database_name: row.string("database_name"),
            schema_name: row.string("schema_name"),
            next_value: row.string("next_value"),
            interval: row.string("interval"),
            created_on: row.string("created_on"),
            owner: row.string("owner"),
            comment: row.string("comment"),
        })
    }
}

impl SequenceRow {
    fn into_sequence(self) -> Sequence {
        Sequence {
            name: self.name.unwrap_or_default(),
            database: self.database_name.unwrap_or_default(),
            schema: self.schema_name.unwrap_or_default(),
            next_value: self.next_value.unwrap_or_default(),
            increment: self.interval.unwrap_or_default(),
            created_on: self.created_on.unwrap_or_default(),
            owner: self.owner.unwrap_or_default(),
            comment: self.comment.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub base: BaseOptions,
    pub start: Option<i64>,
    pub increment: Option<i64>,
    pub comment: Option<String>,
}

impl CreateOptions {
    pub fn validate(&self) -> Result<()> {
        self.base.validate(ObjectKind::Sequence)
    }

    /// `START`/`INCREMENT` equal to the server default of 1 are left out.
    pub fn build(&self) -> String {
        let mut sql = format!("CREATE SEQUENCE {}", self.base.qualified(ObjectKind::Sequence));
        if let Some(start) = self.start.filter(|n| *n != 1) {
            sql.push_str(&format!(" START = {}", start));
        }
        if let Some(increment) = self.increment.filter(|n| *n != 1) {
            sql.push_str(&format!(" INCREMENT = {}", increment));
        }
        if let Some(comment) = self.comment.as_deref().filter(|c| !c.is_empty()) {
            sql.push_str(&comment_clause(comment));
        }
        sql
    }
}

/// Precedence: comment clear, increment, comment set.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub base: BaseOptions,
    pub comment: Tristate<String>,
    pub increment: Option<i64>,
}

impl UpdateOptions {
    pub fn validate(&self) -> Result<()> {
        self.base.validate(ObjectKind::Sequence)
    }

    pub fn build(&self) -> String {
        if self.comment.is_clear() {
            " UNSET COMMENT".to_string()
        } else if let Some(increment) = self.increment {
            format!(" SET INCREMENT = {}", increment)
        } else if let Some(comment) = self.comment.as_set() {
            set_comment_clause(comment)
        } else {
            String::new()
        }
    }
}

#[async_trait]
pub trait Sequences: Send + Sync {
    async fn list(&self, scope: &SchemaScope) -> Result<Vec<Sequence>>;
    async fn create(&self, opts: &CreateOptions) -> Result<Sequence>;
    async fn read(&self, opts: &BaseOptions) -> Result<Sequence>;
    async fn update(&self, opts: &UpdateOptions) -> Result<Sequence>;
    async fn drop(&self, opts: &BaseOptions) -> Result<()>;
}

#[derive(Clone)]
pub struct SqlSequences {
    executor: Executor,
}

impl SqlSequences {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Sequences for SqlSequences {
    async fn list(&self, scope: &SchemaScope) -> Result<Vec<Sequence>> {
        scope.validate().context("validate list options")?;
        let rows: Vec<SequenceRow> = self
            .executor
            .query_as(&scope.show_statement(ObjectKind::Sequence))
            .await?;
        Ok(rows.into_iter().map(SequenceRow::into_sequence).collect())
    }

    async fn create(&self, opts: &CreateOptions) -> Result<Sequence> {
        opts.validate().context("validate create options")?;
        self.executor.exec(&opts.build()).await.context("db exec")?;
        debug!("Created sequence {}", opts.base.qualified(ObjectKind::Sequence));
        self.read(&opts.base).await
    }

    async fn read(&self, opts: &BaseOptions) -> Result<Sequence> {
        opts.validate(ObjectKind::Sequence)
            .context("validate read options")?;
        let row: SequenceRow = self
            .executor
            .read_named(&show_in_schema(opts, ObjectKind::Sequence), &opts.name)
            .await
            .context("read sequence")?;
        Ok(row.into_sequence())
    }

    async fn update(&self, opts: &UpdateOptions) -> Result<Sequence> {
        opts.validate().context("validate update options")?;
        let ident = opts.base.qualified(ObjectKind::Sequence);
        let clause = opts.build();
        if has_changes(&clause, ObjectKind::Sequence, &ident) {
            let sql = format!("ALTER SEQUENCE {}{}", ident, clause);
            self.executor.exec(&sql).await.context("db exec")?;
        }
        self.read(&opts.base).await
    }

    async fn drop(&self, opts: &BaseOptions) -> Result<()> {
        opts.validate(ObjectKind::Sequence)
            .context("validate drop options")?;
        self.executor
            .drop(ObjectKind::Sequence, &opts.qualified(ObjectKind::Sequence))
            .await
    }
}
