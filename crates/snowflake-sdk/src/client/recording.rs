//! In-memory transport that records statements and replays scripted rows.
//!
//! Nothing is sent anywhere. Each statement is appended to a log, and queries
//! are answered from responses registered by statement prefix. A statement
//! with no matching response yields zero rows. Useful for tests and for
//! previewing the SQL an operation would issue.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::core::{Client, ExecResult, Row};
use crate::error::{Result, SnowflakeError};

#[derive(Default)]
struct Script {
    statements: Vec<String>,
    responses: Vec<(String, Vec<Row>)>,
    failures: Vec<(String, String)>,
}

/// Scripted [`Client`] that never touches the network.
#[derive(Default)]
pub struct RecordingClient {
    script: Mutex<Script>,
    latency: Option<Duration>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call, e.g. to exercise cancellation.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Answer statements starting with `prefix` with `rows`.
    ///
    /// When several prefixes match, the longest one wins.
    pub fn respond(&self, prefix: impl Into<String>, rows: Vec<Row>) {
        self.lock().responses.push((prefix.into(), rows));
    }

    /// Fail statements starting with `prefix` with a statement error.
    pub fn fail(&self, prefix: impl Into<String>, message: impl Into<String>) {
        self.lock().failures.push((prefix.into(), message.into()));
    }

    /// Every statement received so far, in order.
    pub fn statements(&self) -> Vec<String> {
        self.lock().statements.clone()
    }

    pub fn last_statement(&self) -> Option<String> {
        self.lock().statements.last().cloned()
    }

    /// Forget recorded statements; scripted responses are kept.
    pub fn clear_statements(&self) {
        self.lock().statements.clear();
    }

    async fn record(&self, sql: &str) -> Result<Vec<Row>> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let mut script = self.lock();
        script.statements.push(sql.to_string());

        if let Some((_, message)) = longest_match(&script.failures, sql) {
            return Err(SnowflakeError::Statement {
                code: None,
                message: message.clone(),
            });
        }

        let rows = longest_match(&script.responses, sql)
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default();
        debug!("recording client answered {} rows", rows.len());
        Ok(rows)
    }
}

fn longest_match<'a, T>(entries: &'a [(String, T)], sql: &str) -> Option<&'a (String, T)> {
    entries
        .iter()
        .filter(|(prefix, _)| sql.starts_with(prefix.as_str()))
        .max_by_key(|(prefix, _)| prefix.len())
}

#[async_trait]
impl Client for RecordingClient {
    async fn exec(&self, sql: &str) -> Result<ExecResult> {
        let rows = self.record(sql).await?;
        Ok(ExecResult {
            query_id: None,
            rows_affected: rows.len() as u64,
        })
    }

    async fn query(&self, sql: &str) -> Result<Vec<Row>> {
        self.record(sql).await
    }

    fn client_type(&self) -> &str {
        "recording"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_in_order() {
        let client = RecordingClient::new();
        client.exec("CREATE ROLE \"R\"").await.unwrap();
        client.query("SHOW ROLES LIKE 'R'").await.unwrap();
        assert_eq!(
            client.statements(),
            vec!["CREATE ROLE \"R\"", "SHOW ROLES LIKE 'R'"]
        );
        assert_eq!(client.last_statement().as_deref(), Some("SHOW ROLES LIKE 'R'"));
    }

    #[tokio::test]
    async fn test_longest_prefix_wins() {
        let client = RecordingClient::new();
        client.respond("SHOW", vec![Row::new().with("name", "ANY")]);
        client.respond("SHOW ROLES", vec![Row::new().with("name", "ROLE")]);
        let rows = client.query("SHOW ROLES LIKE '%'").await.unwrap();
        assert_eq!(rows[0].get("name"), Some("ROLE"));
        let rows = client.query("SHOW USERS LIKE '%'").await.unwrap();
        assert_eq!(rows[0].get("name"), Some("ANY"));
    }

    #[tokio::test]
    async fn test_unmatched_query_has_no_rows() {
        let client = RecordingClient::new();
        assert!(client.query("SHOW TAGS").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_recorded_then_returned() {
        let client = RecordingClient::new();
        client.fail("DROP ROLE", "does not exist");
        let err = client.exec("DROP ROLE \"R\"").await.unwrap_err();
        assert!(matches!(err, SnowflakeError::Statement { .. }));
        assert_eq!(client.statements().len(), 1);

        client.clear_statements();
        assert!(client.statements().is_empty());
    }
}
