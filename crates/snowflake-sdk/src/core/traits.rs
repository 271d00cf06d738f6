//! Transport abstraction used by the execution adapter.
//!
//! A [`Client`] only moves SQL text to the server and rows back. Statement
//! construction, validation and result mapping live above it, so any
//! transport (HTTP, an in-memory recorder, a test double) can be plugged in.

use async_trait::async_trait;

use crate::error::Result;

use super::row::Row;

/// Outcome of a statement executed for its side effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Server-assigned query id, when the transport reports one.
    pub query_id: Option<String>,
    /// Rows reported as affected (zero for DDL).
    pub rows_affected: u64,
}

/// Send SQL statements to a Snowflake account.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; handles are shared behind `Arc`.
#[async_trait]
pub trait Client: Send + Sync {
    /// Execute a statement for its side effect.
    async fn exec(&self, sql: &str) -> Result<ExecResult>;

    /// Execute a statement and collect every result row.
    async fn query(&self, sql: &str) -> Result<Vec<Row>>;

    /// Transport identifier (e.g. "rest", "recording").
    fn client_type(&self) -> &str;
}
