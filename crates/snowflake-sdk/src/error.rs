//! Error types for the Snowflake SDK.

use thiserror::Error;

/// Main error type for SDK operations.
#[derive(Error, Debug)]
pub enum SnowflakeError {
    /// Configuration error (missing account, invalid YAML values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Options failed validation before any SQL was built
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The statement matched zero rows where exactly one was expected
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The server rejected a statement
    #[error("Statement failed{}: {message}", code.as_ref().map(|c| format!(" [{}]", c)).unwrap_or_default())]
    Statement {
        code: Option<String>,
        message: String,
    },

    /// A present column value could not be decoded
    #[error("Scan failed for column '{column}': {message}")]
    Scan { column: String, message: String },

    /// An error annotated with the operation or phase that failed
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<SnowflakeError>,
    },

    /// HTTP transport error
    #[error("Transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error (config file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The caller cancelled the in-flight call
    #[error("Operation cancelled")]
    Cancelled,
}

impl SnowflakeError {
    /// Create a Validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        SnowflakeError::Validation(message.into())
    }

    /// Create a Scan error for a column.
    pub fn scan(column: impl Into<String>, message: impl Into<String>) -> Self {
        SnowflakeError::Scan {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Wrap this error with the operation or phase that failed.
    pub fn context(self, context: impl Into<String>) -> Self {
        SnowflakeError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error, with all context layers removed.
    pub fn root(&self) -> &SnowflakeError {
        match self {
            SnowflakeError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// True when the underlying condition is "record not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), SnowflakeError::NotFound(_))
    }

    /// True when the underlying condition is an options validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self.root(), SnowflakeError::Validation(_))
    }

    /// True when the call was aborted by its cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), SnowflakeError::Cancelled)
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, SnowflakeError>;

/// Attach operation context to a fallible result.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(context))
    }
}
