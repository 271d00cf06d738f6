//! Execution adapter between resource operations and a [`Client`] transport.
//!
//! [`Executor`] adds the semantics every resource relies on:
//!
//! - every statement is logged at `debug` before it is sent
//! - every call races the caller's [`CancellationToken`]
//! - [`Executor::read`] turns zero rows into [`SnowflakeError::NotFound`],
//!   while [`Executor::query_as`] returns an empty list
//! - [`Executor::read_named`] keeps only the row whose name matches exactly
//! - `DROP`, `UNDROP` and `RENAME` statements for any object kind

mod recording;
mod rest;

pub use recording::RecordingClient;
pub use rest::{shared_http_client, RestClient};

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::{Client, ExecResult, FromRow, ObjectKind, Row};
use crate::error::{Result, ResultExt, SnowflakeError};

/// Cancellable, logging wrapper around a shared transport.
#[derive(Clone)]
pub struct Executor {
    client: Arc<dyn Client>,
    cancel: CancellationToken,
}

impl Executor {
    pub fn new(client: Arc<dyn Client>) -> Self {
        Self {
            client,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort in-flight and future calls when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn client(&self) -> &Arc<dyn Client> {
        &self.client
    }

    async fn guard<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(SnowflakeError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(SnowflakeError::Cancelled),
            result = call => result,
        }
    }

    /// Execute a statement for its side effect.
    pub async fn exec(&self, sql: &str) -> Result<ExecResult> {
        debug!(client = self.client.client_type(), "sql-exec: {}", sql);
        self.guard(self.client.exec(sql)).await
    }

    /// Execute a statement and return its raw rows.
    pub async fn query(&self, sql: &str) -> Result<Vec<Row>> {
        debug!(client = self.client.client_type(), "sql-query: {}", sql);
        self.guard(self.client.query(sql)).await
    }

    /// Scan every row of a statement's result. Zero rows is an empty list.
    pub async fn query_as<T: FromRow>(&self, sql: &str) -> Result<Vec<T>> {
        let rows = self.query(sql).await.context("do query")?;
        rows.iter()
            .map(T::from_row)
            .collect::<Result<Vec<_>>>()
            .context("rows scan")
    }

    /// Scan the first row of a statement's result.
    ///
    /// Returns [`SnowflakeError::NotFound`] when the statement yields no rows.
    pub async fn read<T: FromRow>(&self, sql: &str) -> Result<T> {
        let rows = self.query(sql).await.context("do query")?;
        match rows.first() {
            Some(row) => T::from_row(row).context("rows scan"),
            None => Err(SnowflakeError::NotFound(sql.to_string())),
        }
    }

    /// Scan the row whose `name` column equals `name` exactly.
    ///
    /// `SHOW ... LIKE` treats `_` and `%` as wildcards, so a pattern built
    /// from a name can match other objects too. Returns
    /// [`SnowflakeError::NotFound`] when no row carries the exact name.
    pub async fn read_named<T: FromRow>(&self, sql: &str, name: &str) -> Result<T> {
        let rows = self.query(sql).await.context("do query")?;
        match rows.iter().find(|row| row.get("name") == Some(name)) {
            Some(row) => T::from_row(row).context("rows scan"),
            None => Err(SnowflakeError::NotFound(sql.to_string())),
        }
    }

    /// `DROP <KIND> <ident>`; `ident` is already quoted/qualified.
    pub async fn drop(&self, kind: ObjectKind, ident: &str) -> Result<()> {
        let sql = format!("DROP {} {}", kind.keyword(), ident);
        self.exec(&sql).await.context("db exec")?;
        debug!("Dropped {} {}", kind.label(), ident);
        Ok(())
    }

    /// `UNDROP <KIND> <ident>`; `ident` is already quoted/qualified.
    pub async fn undrop(&self, kind: ObjectKind, ident: &str) -> Result<()> {
        let sql = format!("UNDROP {} {}", kind.keyword(), ident);
        self.exec(&sql).await.context("db exec")?;
        debug!("Undropped {} {}", kind.label(), ident);
        Ok(())
    }

    /// `ALTER <KIND> <old> RENAME TO <new>`; both already quoted/qualified.
    pub async fn rename(&self, kind: ObjectKind, old: &str, new: &str) -> Result<()> {
        let sql = format!("ALTER {} {} RENAME TO {}", kind.keyword(), old, new);
        self.exec(&sql).await.context("db exec")?;
        debug!("Renamed {} {} to {}", kind.label(), old, new);
        Ok(())
    }
}
