//! HTTP transport for the Snowflake SQL endpoints.
//!
//! One login per [`RestClient`]; every statement is then posted with the
//! session token. All `RestClient`s in the process share one
//! `reqwest::Client` (and its connection pool), created on first use.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::core::{Client, ExecResult, Row};
use crate::error::{Result, ResultExt, SnowflakeError};

const LOGIN_PATH: &str = "/session/v1/login-request";
const QUERY_PATH: &str = "/queries/v1/query-request";
const SESSION_PATH: &str = "/session";
const CLIENT_APP_ID: &str = "snowflake-sdk-rs";
const ACCEPT_SNOWFLAKE: &str = "application/snowflake";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

static SHARED_HTTP: OnceLock<reqwest::Client> = OnceLock::new();
static SHARED_HTTP_INITS: AtomicUsize = AtomicUsize::new(0);

/// Process-wide HTTP client, built on first call.
///
/// Later calls return a handle to the same connection pool; the transport
/// is never re-initialized.
pub fn shared_http_client() -> Result<reqwest::Client> {
    if let Some(client) = SHARED_HTTP.get() {
        return Ok(client.clone());
    }

    let built = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .user_agent(format!("{}/{}", CLIENT_APP_ID, env!("CARGO_PKG_VERSION")))
        .build()?;

    // A racing caller may have stored its client first; that one wins.
    let client = SHARED_HTTP.get_or_init(|| {
        SHARED_HTTP_INITS.fetch_add(1, Ordering::SeqCst);
        debug!("Initialized shared Snowflake HTTP transport");
        built
    });
    Ok(client.clone())
}

/// Statement transport over the Snowflake REST session API.
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    sequence: AtomicU64,
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Validate `config`, log in, and keep the session token.
    pub async fn connect(config: &Config) -> Result<Self> {
        config.validate()?;
        let http = shared_http_client()?;
        let base_url = config.base_url();

        let mut params: Vec<(&str, &str)> = Vec::new();
        if !config.warehouse.is_empty() {
            params.push(("warehouse", &config.warehouse));
        }
        if !config.role.is_empty() {
            params.push(("roleName", &config.role));
        }

        let body = json!({
            "data": {
                "CLIENT_APP_ID": CLIENT_APP_ID,
                "CLIENT_APP_VERSION": env!("CARGO_PKG_VERSION"),
                "ACCOUNT_NAME": config.account,
                "LOGIN_NAME": config.user,
                "PASSWORD": config.password,
                "SESSION_PARAMETERS": { "QUERY_RESULT_FORMAT": "JSON" },
            }
        });

        let response: ApiResponse<LoginData> = http
            .post(format!("{}{}", base_url, LOGIN_PATH))
            .query(&params)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SnowflakeError::from(e).context("login request"))?
            .json()
            .await
            .map_err(|e| SnowflakeError::from(e).context("decode login response"))?;

        let token = response
            .into_data()
            .context("login")?
            .token
            .ok_or_else(|| SnowflakeError::Statement {
                code: None,
                message: "login response carried no session token".to_string(),
            })?;

        info!(
            "Connected to Snowflake at {} as {}",
            config.host(),
            config.user
        );

        Ok(Self {
            http,
            base_url,
            token,
            sequence: AtomicU64::new(0),
        })
    }

    fn authorization(&self) -> String {
        format!("Snowflake Token=\"{}\"", self.token)
    }

    async fn submit(&self, sql: &str) -> Result<QueryData> {
        let request_id = Uuid::new_v4().to_string();
        let body = QueryRequest {
            sql_text: sql,
            async_exec: false,
            sequence_id: self.sequence.fetch_add(1, Ordering::SeqCst) + 1,
            query_submission_time: Utc::now().timestamp_millis(),
        };

        let response: ApiResponse<QueryData> = self
            .http
            .post(format!("{}{}", self.base_url, QUERY_PATH))
            .query(&[("requestId", request_id.as_str())])
            .header(AUTHORIZATION, self.authorization())
            .header(ACCEPT, ACCEPT_SNOWFLAKE)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.into_data()
    }

    /// End the server-side session.
    pub async fn close(&self) -> Result<()> {
        self.http
            .post(format!("{}{}", self.base_url, SESSION_PATH))
            .query(&[("delete", "true")])
            .header(AUTHORIZATION, self.authorization())
            .header(ACCEPT, ACCEPT_SNOWFLAKE)
            .send()
            .await?
            .error_for_status()?;
        debug!("Closed Snowflake session at {}", self.base_url);
        Ok(())
    }
}

#[async_trait]
impl Client for RestClient {
    async fn exec(&self, sql: &str) -> Result<ExecResult> {
        let data = self.submit(sql).await?;
        let rows_affected = data.rows_affected();
        Ok(ExecResult {
            query_id: data.query_id,
            rows_affected,
        })
    }

    async fn query(&self, sql: &str) -> Result<Vec<Row>> {
        self.submit(sql).await?.into_rows()
    }

    fn client_type(&self) -> &str {
        "rest"
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    sql_text: &'a str,
    async_exec: bool,
    sequence_id: u64,
    query_submission_time: i64,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

impl<T> ApiResponse<T> {
    fn into_data(self) -> Result<T> {
        if !self.success {
            return Err(SnowflakeError::Statement {
                code: self.code,
                message: self
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            });
        }
        self.data.ok_or_else(|| SnowflakeError::Statement {
            code: self.code,
            message: "response carried no data".to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct LoginData {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryData {
    #[serde(default)]
    query_id: Option<String>,
    #[serde(default)]
    rowtype: Vec<RowType>,
    #[serde(default)]
    rowset: Vec<Vec<Value>>,
    #[serde(default)]
    chunks: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RowType {
    name: String,
}

impl QueryData {
    fn columns(&self) -> Vec<String> {
        self.rowtype.iter().map(|c| c.name.clone()).collect()
    }

    /// Inline rows only. A result the server split into downloadable chunks
    /// is an error rather than a silently truncated list.
    fn into_rows(self) -> Result<Vec<Row>> {
        if !self.chunks.is_empty() {
            let query_id = self.query_id.as_deref().unwrap_or("?");
            warn!(
                "Result for query {} spans {} chunks, which this client does not fetch",
                query_id,
                self.chunks.len()
            );
            return Err(SnowflakeError::Statement {
                code: None,
                message: format!(
                    "result of query {} is split into {} chunks; narrow the statement",
                    query_id,
                    self.chunks.len()
                ),
            });
        }
        let columns = self.columns();
        Ok(self
            .rowset
            .into_iter()
            .map(|values| Row::from_columns(&columns, values.into_iter().map(cell_text).collect()))
            .collect())
    }

    /// DML results report counts in `number of rows ...` columns; DDL has none.
    fn rows_affected(&self) -> u64 {
        let Some(first) = self.rowset.first() else {
            return 0;
        };
        self.rowtype
            .iter()
            .zip(first)
            .filter(|(column, _)| column.name.starts_with("number of rows"))
            .filter_map(|(_, value)| cell_text(value.clone()))
            .filter_map(|text| text.parse::<u64>().ok())
            .sum()
    }
}

fn cell_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
