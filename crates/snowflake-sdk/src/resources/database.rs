//! Databases, including clones, replicas and databases mounted from a share.

use async_trait::async_trait;
use tracing::debug;

use crate::client::Executor;
use crate::core::identifier::quote_ident;
use crate::core::{like_clause, BaseOptions, FromRow, ObjectKind, Row, Tristate};
use crate::error::{Result, ResultExt, SnowflakeError};

use super::{comment_clause, has_changes, set_comment_clause};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Database {
    pub created_on: String,
    pub name: String,
    pub is_default: bool,
    pub is_current: bool,
    pub origin: String,
    pub owner: String,
    pub comment: String,
    pub options: String,
    pub retention_time: i32,
}

#[derive(Debug, Default)]
struct DatabaseRow {
    created_on: Option<String>,
    name: Option<String>,
    is_default: Option<bool>,
    is_current: Option<bool>,
    origin: Option<String>,
    owner: Option<String>,
    comment: Option<String>,
    options: Option<String>,
    retention_time: Option<i32>,
}

impl FromRow for DatabaseRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            created_on: row.string("created_on"),
            name: row.string("name"),
            is_default: row.bool("is_default")?,
            is_current: row.bool("is_current")?,
            origin: row.string("origin"),
            owner: row.string("owner"),
            comment: row.string("comment"),
            options: row.string("options"),
            retention_time: row.int32("retention_time")?,
        })
    }
}

impl DatabaseRow {
    fn into_database(self) -> Database {
        Database {
            created_on: self.created_on.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            is_default: self.is_default.unwrap_or_default(),
            is_current: self.is_current.unwrap_or_default(),
            origin: self.origin.unwrap_or_default(),
            owner: self.owner.unwrap_or_default(),
            comment: self.comment.unwrap_or_default(),
            options: self.options.unwrap_or_default(),
            retention_time: self.retention_time.unwrap_or_default(),
        }
    }
}

/// Databases visible to the session, optionally filtered.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub pattern: Option<String>,
}

impl ListOptions {
    pub fn build(&self) -> String {
        match &self.pattern {
            Some(pattern) => format!("SHOW DATABASES{}", like_clause(pattern)),
            None => "SHOW DATABASES".to_string(),
        }
    }
}

/// Share a new database is mounted from.
#[derive(Debug, Clone, Default)]
pub struct ShareSource {
    pub provider: String,
    pub share: String,
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub name: String,
    pub transient: bool,
    pub from_share: Option<ShareSource>,
    /// Database to clone.
    pub from_database: Option<String>,
    /// Fully qualified primary database, e.g. `ORG.ACCOUNT.DB`.
    pub from_replica: Option<String>,
    pub data_retention_time: Option<i32>,
    pub comment: Option<String>,
}

impl CreateOptions {
    pub fn validate(&self) -> Result<()> {
        BaseOptions::new(self.name.clone()).validate(ObjectKind::Database)?;
        if let Some(share) = &self.from_share {
            if share.provider.is_empty() || share.share.is_empty() {
                return Err(SnowflakeError::validation(
                    "from_share must contain both provider and share",
                ));
            }
        }
        Ok(())
    }

    pub fn build(&self) -> String {
        let mut sql = String::from("CREATE");
        if self.transient {
            sql.push_str(" TRANSIENT");
        }
        sql.push_str(&format!(" DATABASE {}", quote_ident(&self.name)));
        if let Some(share) = &self.from_share {
            sql.push_str(&format!(
                " FROM SHARE {}.{}",
                quote_ident(&share.provider),
                quote_ident(&share.share)
            ));
        } else if let Some(source) = &self.from_database {
            sql.push_str(&format!(" CLONE {}", quote_ident(source)));
        } else if let Some(primary) = &self.from_replica {
            sql.push_str(&format!(" AS REPLICA OF {}", primary));
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

/// One change to a database; the first field set wins.
///
/// Precedence: comment clear, data retention, comment set, replication.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub name: String,
    pub comment: Tristate<String>,
    pub data_retention_time: Option<i32>,
    /// Account locators to enable replication to.
    pub enable_replication_to_accounts: Vec<String>,
}

impl UpdateOptions {
    pub fn validate(&self) -> Result<()> {
        BaseOptions::new(self.name.clone()).validate(ObjectKind::Database)
    }

    pub fn build(&self) -> String {
        if self.comment.is_clear() {
            " UNSET COMMENT".to_string()
        } else if let Some(days) = self.data_retention_time {
            format!(" SET DATA_RETENTION_TIME_IN_DAYS = {}", days)
        } else if let Some(comment) = self.comment.as_set() {
            set_comment_clause(comment)
        } else if !self.enable_replication_to_accounts.is_empty() {
            format!(
                " ENABLE REPLICATION TO ACCOUNTS {}",
                self.enable_replication_to_accounts.join(", ")
            )
        } else {
            String::new()
        }
    }
}

#[async_trait]
pub trait Databases: Send + Sync {
    async fn list(&self, opts: &ListOptions) -> Result<Vec<Database>>;
    async fn create(&self, opts: &CreateOptions) -> Result<Database>;
    async fn read(&self, name: &str) -> Result<Database>;
    async fn update(&self, opts: &UpdateOptions) -> Result<Database>;
    async fn drop(&self, name: &str) -> Result<()>;
    async fn undrop(&self, name: &str) -> Result<()>;
    async fn rename(&self, old: &str, new: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct SqlDatabases {
    executor: Executor,
}

impl SqlDatabases {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

fn validate_name(name: &str, phase: &str) -> Result<()> {
    BaseOptions::new(name)
        .validate(ObjectKind::Database)
        .context(phase)
}

#[async_trait]
impl Databases for SqlDatabases {
    async fn list(&self, opts: &ListOptions) -> Result<Vec<Database>> {
        let rows: Vec<DatabaseRow> = self.executor.query_as(&opts.build()).await?;
        Ok(rows.into_iter().map(DatabaseRow::into_database).collect())
    }

    async fn create(&self, opts: &CreateOptions) -> Result<Database> {
        opts.validate().context("validate create options")?;
        self.executor.exec(&opts.build()).await.context("db exec")?;
        debug!("Created database {}", opts.name);
        self.read(&opts.name).await
    }

    async fn read(&self, name: &str) -> Result<Database> {
        validate_name(name, "validate read options")?;
        let sql = format!("SHOW DATABASES{}", like_clause(name));
        let row: DatabaseRow = self
            .executor
            .read_named(&sql, name)
            .await
            .context("read database")?;
        Ok(row.into_database())
    }

    async fn update(&self, opts: &UpdateOptions) -> Result<Database> {
        opts.validate().context("validate update options")?;
        let ident = quote_ident(&opts.name);
        let clause = opts.build();
        if has_changes(&clause, ObjectKind::Database, &ident) {
            let sql = format!("ALTER DATABASE {}{}", ident, clause);
            self.executor.exec(&sql).await.context("db exec")?;
        }
        self.read(&opts.name).await
    }

    async fn drop(&self, name: &str) -> Result<()> {
        validate_name(name, "validate drop options")?;
        self.executor
            .drop(ObjectKind::Database, &quote_ident(name))
            .await
    }

    async fn undrop(&self, name: &str) -> Result<()> {
        validate_name(name, "validate undrop options")?;
        self.executor
            .undrop(ObjectKind::Database, &quote_ident(name))
            .await
    }

    async fn rename(&self, old: &str, new: &str) -> Result<()> {
        validate_name(old, "validate rename options")?;
        validate_name(new, "validate rename options")?;
        self.executor
            .rename(ObjectKind::Database, &quote_ident(old), &quote_ident(new))
            .await
    }
}
