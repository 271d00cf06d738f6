//! # snowflake-sdk
//!
//! Typed management of Snowflake account objects through generated DDL.
//!
//! Every object kind (databases, schemas, tables, views, sequences, tags,
//! masking policies, roles and users) is exposed through a resource trait
//! with the same shape:
//!
//! - **List** objects matching a pattern in a namespace
//! - **Create**, then read the object back in its canonical form
//! - **Read** and, for some kinds, **Describe** detailed metadata
//! - **Update** one property at a time, following a fixed precedence
//! - **Drop**, **Undrop** and **Rename**
//!
//! Options are validated before any SQL is built. Identifiers are quoted and
//! literals escaped by the statement builders; callers never assemble SQL.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use snowflake_sdk::resources::{table, Tables};
//! use snowflake_sdk::{BaseOptions, Column, Config, RestClient, Snowflake};
//!
//! #[tokio::main]
//! async fn main() -> snowflake_sdk::Result<()> {
//!     let config = Config::from_env();
//!     let client = RestClient::connect(&config).await?;
//!     let snowflake = Snowflake::new(Arc::new(client));
//!
//!     let created = snowflake
//!         .tables()
//!         .create(&table::CreateOptions {
//!             base: BaseOptions::new("EVENTS").in_schema("ANALYTICS", "RAW"),
//!             columns: vec![Column::new("ID", "NUMBER").not_null()],
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("created {} in {}.{}", created.name, created.database, created.schema);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod resources;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

// Re-exports for convenient access
pub use client::{Executor, RecordingClient, RestClient};
pub use config::Config;
pub use self::core::{BaseOptions, Client, ExecResult, FromRow, ObjectKind, Row, SchemaScope, Tristate};
pub use error::{Result, ResultExt, SnowflakeError};
pub use resources::{
    Column, ColumnDefault, ColumnIdentity, Database, MaskingPolicy, PrimaryKey, Role, Schema,
    Sequence, Table, Tag, TagValue, User, View,
};

use resources::{
    SqlDatabases, SqlMaskingPolicies, SqlRoles, SqlSchemas, SqlSequences, SqlTables, SqlTags,
    SqlUsers, SqlViews,
};

/// Entry point handing out one resource handle per object kind.
///
/// All handles share the same transport and cancellation token.
#[derive(Clone)]
pub struct Snowflake {
    executor: Executor,
}

impl Snowflake {
    pub fn new(client: Arc<dyn Client>) -> Self {
        Self {
            executor: Executor::new(client),
        }
    }

    /// Abort in-flight and future calls once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.executor = self.executor.with_cancellation(token);
        self
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn databases(&self) -> SqlDatabases {
        SqlDatabases::new(self.executor.clone())
    }

    pub fn schemas(&self) -> SqlSchemas {
        SqlSchemas::new(self.executor.clone())
    }

    pub fn tables(&self) -> SqlTables {
        SqlTables::new(self.executor.clone())
    }

    pub fn views(&self) -> SqlViews {
        SqlViews::new(self.executor.clone())
    }

    pub fn sequences(&self) -> SqlSequences {
        SqlSequences::new(self.executor.clone())
    }

    pub fn tags(&self) -> SqlTags {
        SqlTags::new(self.executor.clone())
    }

    pub fn masking_policies(&self) -> SqlMaskingPolicies {
        SqlMaskingPolicies::new(self.executor.clone())
    }

    pub fn roles(&self) -> SqlRoles {
        SqlRoles::new(self.executor.clone())
    }

    pub fn users(&self) -> SqlUsers {
        SqlUsers::new(self.executor.clone())
    }
}
