//! Column masking policies.

use async_trait::async_trait;
use tracing::debug;

use crate::client::Executor;
use crate::core::{BaseOptions, FromRow, ObjectKind, Row, SchemaScope, Tristate};
use crate::error::{Result, ResultExt, SnowflakeError};

use super::{comment_clause, has_changes, set_comment_clause, show_narrowed};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskingPolicy {
    pub name: String,
    pub database: String,
    pub schema: String,
    pub kind: String,
    pub owner: String,
    pub comment: String,
    pub created_on: String,
}

#[derive(Debug, Default)]
struct MaskingPolicyRow {
    name: Option<String>,
    database_name: Option<String>,
    schema_name: Option<String>,
    kind: Option<String>,
    owner: Option<String>,
    comment: Option<String>,
    created_on: Option<String>,
}

impl FromRow for MaskingPolicyRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            name: row.string("name"),
            database_name: row.string("database_name"),
            schema_name: row.string("schema_name"),
            kind: row.string("kind"),
            owner: row.string("owner"),
            comment: row.string("comment"),
            created_on: row.string("created_on"),
        })
    }
}

impl MaskingPolicyRow {
    fn into_masking_policy(self) -> MaskingPolicy {
        MaskingPolicy {
            name: self.name.unwrap_or_default(),
            database: self.database_name.unwrap_or_default(),
            schema: self.schema_name.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
            owner: self.owner.unwrap_or_default(),
            comment: self.comment.unwrap_or_default(),
            created_on: self.created_on.unwrap_or_default(),
        }
    }
}

/// Signature and body of a masking policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskingPolicyDetails {
    pub name: String,
    pub signature: String,
    pub return_type: String,
    pub body: String,
}

#[derive(Debug, Default)]
struct DescribeRow {
    name: Option<String>,
    signature: Option<String>,
    return_type: Option<String>,
    body: Option<String>,
}

impl FromRow for DescribeRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            name: row.string("name"),
            signature: row.string("signature"),
            return_type: row.string("return_type"),
            body: row.string("body"),
        })
    }
}

impl DescribeRow {
    fn into_details(self) -> MaskingPolicyDetails {
        MaskingPolicyDetails {
            name: self.name.unwrap_or_default(),
            signature: self.signature.unwrap_or_default(),
            return_type: self.return_type.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub base: BaseOptions,
    pub value_data_type: String,
    pub return_data_type: String,
    pub masking_expression: String,
    pub comment: Option<String>,
}

impl CreateOptions {
    pub fn validate(&self) -> Result<()> {
        self.base.validate(ObjectKind::MaskingPolicy)?;
        if self.value_data_type.is_empty() {
            return Err(SnowflakeError::validation(
                "value data type must not be empty",
            ));
        }
        if self.return_data_type.is_empty() {
            return Err(SnowflakeError::validation(
                "return data type must not be empty",
            ));
        }
        if self.masking_expression.is_empty() {
            return Err(SnowflakeError::validation(
                "masking expression must not be empty",
            ));
        }
        Ok(())
    }

    pub fn build(&self) -> String {
        let mut sql = format!(
            "CREATE MASKING POLICY {} AS (VAL {}) RETURNS {} -> {}",
            self.base.qualified(ObjectKind::MaskingPolicy),
            self.value_data_type,
            self.return_data_type,
            self.masking_expression
        );
        if let Some(comment) = self.comment.as_deref().filter(|c| !c.is_empty()) {
            sql.push_str(&comment_clause(comment));
        }
        sql
    }
}

/// Precedence: comment clear, comment set, body.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub base: BaseOptions,
    pub comment: Tristate<String>,
    pub masking_expression: Option<String>,
}

impl UpdateOptions {
    pub fn validate(&self) -> Result<()> {
        self.base.validate(ObjectKind::MaskingPolicy)
    }

    pub fn build(&self) -> String {
        if self.comment.is_clear() {
            " UNSET COMMENT".to_string()
        } else if let Some(comment) = self.comment.as_set() {
            set_comment_clause(comment)
        } else if let Some(expression) = &self.masking_expression {
            format!(" SET BODY -> {}", expression)
        } else {
            String::new()
        }
    }
}

#[async_trait]
pub trait MaskingPolicies: Send + Sync {
    async fn list(&self, scope: &SchemaScope) -> Result<Vec<MaskingPolicy>>;
    async fn create(&self, opts: &CreateOptions) -> Result<MaskingPolicy>;
    async fn read(&self, opts: &BaseOptions) -> Result<MaskingPolicy>;
    async fn describe(&self, opts: &BaseOptions) -> Result<MaskingPolicyDetails>;
    async fn update(&self, opts: &UpdateOptions) -> Result<MaskingPolicy>;
    async fn drop(&self, opts: &BaseOptions) -> Result<()>;
}

#[derive(Clone)]
pub struct SqlMaskingPolicies {
    executor: Executor,
}

impl SqlMaskingPolicies {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl MaskingPolicies for SqlMaskingPolicies {
    async fn list(&self, scope: &SchemaScope) -> Result<Vec<MaskingPolicy>> {
        scope.validate().context("validate list options")?;
        let rows: Vec<MaskingPolicyRow> = self
            .executor
            .query_as(&scope.show_statement(ObjectKind::MaskingPolicy))
            .await?;
        Ok(rows
            .into_iter()
            .map(MaskingPolicyRow::into_masking_policy)
            .collect())
    }

    async fn create(&self, opts: &CreateOptions) -> Result<MaskingPolicy> {
        opts.validate().context("validate create options")?;
        self.executor.exec(&opts.build()).await.context("db exec")?;
        debug!(
            "Created masking policy {}",
            opts.base.qualified(ObjectKind::MaskingPolicy)
        );
        self.read(&opts.base).await
    }

    async fn read(&self, opts: &BaseOptions) -> Result<MaskingPolicy> {
        opts.validate(ObjectKind::MaskingPolicy)
            .context("validate read options")?;
        let row: MaskingPolicyRow = self
            .executor
            .read_named(&show_narrowed(opts, ObjectKind::MaskingPolicy), &opts.name)
            .await
            .context("read masking policy")?;
        Ok(row.into_masking_policy())
    }

    async fn describe(&self, opts: &BaseOptions) -> Result<MaskingPolicyDetails> {
        opts.validate(ObjectKind::MaskingPolicy)
            .context("validate describe options")?;
        let sql = format!(
            "DESCRIBE MASKING POLICY {}",
            opts.qualified(ObjectKind::MaskingPolicy)
        );
        let row: DescribeRow = self.executor.read(&sql).await.context("do describe")?;
        Ok(row.into_details())
    }

    async fn update(&self, opts: &UpdateOptions) -> Result<MaskingPolicy> {
        opts.validate().context("validate update options")?;
        let ident = opts.base.qualified(ObjectKind::MaskingPolicy);
        let clause = opts.build();
        if has_changes(&clause, ObjectKind::MaskingPolicy, &ident) {
            let sql = format!("ALTER MASKING POLICY {}{}", ident, clause);
            self.executor.exec(&sql).await.context("db exec")?;
        }
        self.read(&opts.base).await
    }

    async fn drop(&self, opts: &BaseOptions) -> Result<()> {
        opts.validate(ObjectKind::MaskingPolicy)
            .context("validate drop options")?;
        self.executor
            .drop(
                ObjectKind::MaskingPolicy,
                &opts.qualified(ObjectKind::MaskingPolicy),
            )
            .await
    }
}
