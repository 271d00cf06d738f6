//! Account users.
//!
//! Users differ from the other kinds in two ways: an update sets every
//! property it carries in a single `ALTER USER ... SET`, and `DESCRIBE USER`
//! answers with one property/value row per attribute.

mod describe;

use async_trait::async_trait;
use tracing::debug;

use crate::client::Executor;
use crate::core::identifier::{bool_literal, quote_ident, quote_literal};
use crate::core::{decode_bracketed_list, like_clause, BaseOptions, FromRow, ObjectKind, Row};
use crate::error::{Result, ResultExt, SnowflakeError};

use super::require_pattern;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub comment: String,
    pub default_namespace: String,
    pub default_role: String,
    pub default_secondary_roles: Vec<String>,
    pub default_warehouse: String,
    pub disabled: bool,
    pub display_name: String,
    pub email: String,
    pub first_name: String,
    pub has_rsa_public_key: bool,
    pub last_name: String,
    pub login_name: String,
}

#[derive(Debug, Default)]
pub(crate) struct UserRow {
    name: Option<String>,
    comment: Option<String>,
    default_namespace: Option<String>,
    default_role: Option<String>,
    default_secondary_roles: Option<String>,
    default_warehouse: Option<String>,
    disabled: Option<bool>,
    display_name: Option<String>,
    email: Option<String>,
    first_name: Option<String>,
    has_rsa_public_key: Option<bool>,
    last_name: Option<String>,
    login_name: Option<String>,
}

impl FromRow for UserRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            name: row.string("name"),
            comment: row.string("comment"),
            default_namespace: row.string("default_namespace"),
            default_role: row.string("default_role"),
            default_secondary_roles: row.string("default_secondary_roles"),
            default_warehouse: row.string("default_warehouse"),
            disabled: row.bool("disabled")?,
            display_name: row.string("display_name"),
            email: row.string("email"),
            first_name: row.string("first_name"),
            has_rsa_public_key: row.bool("has_rsa_public_key")?,
            last_name: row.string("last_name"),
            login_name: row.string("login_name"),
        })
    }
}

impl UserRow {
    pub(crate) fn into_user(self) -> User {
        User {
            name: self.name.unwrap_or_default(),
            comment: self.comment.unwrap_or_default(),
            default_namespace: self.default_namespace.unwrap_or_default(),
            default_role: self.default_role.unwrap_or_default(),
            default_secondary_roles: self
                .default_secondary_roles
                .as_deref()
                .map(decode_bracketed_list)
                .unwrap_or_default(),
            default_warehouse: self.default_warehouse.unwrap_or_default(),
            disabled: self.disabled.unwrap_or_default(),
            display_name: self.display_name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            first_name: self.first_name.unwrap_or_default(),
            has_rsa_public_key: self.has_rsa_public_key.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            login_name: self.login_name.unwrap_or_default(),
        }
    }
}

/// Users matching a `LIKE` pattern. The pattern is required.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub pattern: String,
}

impl ListOptions {
    pub fn validate(&self) -> Result<()> {
        require_pattern(&self.pattern)
    }

    pub fn build(&self) -> String {
        format!("SHOW USERS{}", like_clause(&self.pattern))
    }
}

/// ` KEY = '<escaped>'`
fn string_property(sql: &mut String, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        sql.push_str(&format!(" {} = {}", key, quote_literal(value)));
    }
}

fn bool_property(sql: &mut String, key: &str, value: Option<bool>) {
    if let Some(value) = value {
        sql.push_str(&format!(" {} = {}", key, bool_literal(value)));
    }
}

/// ` DEFAULT_SECONDARY_ROLES = ('A','B')`
fn roles_property(sql: &mut String, roles: &Option<Vec<String>>) {
    if let Some(roles) = roles {
        let quoted: Vec<String> = roles.iter().map(|r| quote_literal(r)).collect();
        sql.push_str(&format!(" DEFAULT_SECONDARY_ROLES = ({})", quoted.join(",")));
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub name: String,
    pub login_name: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub must_change_password: Option<bool>,
    pub disabled: Option<bool>,
    pub default_warehouse: Option<String>,
    pub rsa_public_key: Option<String>,
    pub rsa_public_key_2: Option<String>,
    pub default_namespace: Option<String>,
    pub default_role: Option<String>,
    pub default_secondary_roles: Option<Vec<String>>,
    pub comment: Option<String>,
}

impl CreateOptions {
    pub fn validate(&self) -> Result<()> {
        BaseOptions::new(self.name.clone()).validate(ObjectKind::User)
    }

    pub fn build(&self) -> String {
        let mut sql = format!("CREATE USER {}", quote_ident(&self.name));
        string_property(&mut sql, "LOGIN_NAME", &self.login_name);
        string_property(&mut sql, "PASSWORD", &self.password);
        string_property(&mut sql, "DISPLAY_NAME", &self.display_name);
        string_property(&mut sql, "FIRST_NAME", &self.first_name);
        string_property(&mut sql, "LAST_NAME", &self.last_name);
        string_property(&mut sql, "EMAIL", &self.email);
        bool_property(&mut sql, "MUST_CHANGE_PASSWORD", self.must_change_password);
        bool_property(&mut sql, "DISABLED", self.disabled);
        string_property(&mut sql, "DEFAULT_WAREHOUSE", &self.default_warehouse);
        string_property(&mut sql, "RSA_PUBLIC_KEY", &self.rsa_public_key);
        string_property(&mut sql, "RSA_PUBLIC_KEY_2", &self.rsa_public_key_2);
        string_property(&mut sql, "DEFAULT_NAMESPACE", &self.default_namespace);
        string_property(&mut sql, "DEFAULT_ROLE", &self.default_role);
        roles_property(&mut sql, &self.default_secondary_roles);
        string_property(&mut sql, "COMMENT", &self.comment);
        sql
    }
}

/// Properties to set on an existing user. Every field that is set is
/// applied in the same statement.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub login_name: Option<String>,
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub disabled: Option<bool>,
    pub default_warehouse: Option<String>,
    pub default_namespace: Option<String>,
    pub default_role: Option<String>,
    pub default_secondary_roles: Option<Vec<String>>,
    pub comment: Option<String>,
}

impl UpdateOptions {
    pub fn build(&self) -> String {
        let mut sql = String::new();
        string_property(&mut sql, "LOGIN_NAME", &self.login_name);
        string_property(&mut sql, "DISPLAY_NAME", &self.display_name);
        string_property(&mut sql, "FIRST_NAME", &self.first_name);
        string_property(&mut sql, "LAST_NAME", &self.last_name);
        string_property(&mut sql, "EMAIL", &self.email);
        bool_property(&mut sql, "DISABLED", self.disabled);
        string_property(&mut sql, "DEFAULT_WAREHOUSE", &self.default_warehouse);
        string_property(&mut sql, "DEFAULT_NAMESPACE", &self.default_namespace);
        string_property(&mut sql, "DEFAULT_ROLE", &self.default_role);
        roles_property(&mut sql, &self.default_secondary_roles);
        string_property(&mut sql, "COMMENT", &self.comment);
        sql
    }
}

#[async_trait]
pub trait Users: Send + Sync {
    async fn list(&self, opts: &ListOptions) -> Result<Vec<User>>;
    async fn create(&self, opts: &CreateOptions) -> Result<User>;
    async fn read(&self, name: &str) -> Result<User>;
    /// Full property set from `DESCRIBE USER`.
    async fn describe(&self, name: &str) -> Result<User>;
    async fn update(&self, name: &str, opts: &UpdateOptions) -> Result<User>;
    async fn drop(&self, name: &str) -> Result<()>;
    async fn rename(&self, old: &str, new: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct SqlUsers {
    executor: Executor,
}

impl SqlUsers {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

fn validate_name(name: &str, phase: &str) -> Result<()> {
    BaseOptions::new(name).validate(ObjectKind::User).context(phase)
}

#[async_trait]
impl Users for SqlUsers {
    async fn list(&self, opts: &ListOptions) -> Result<Vec<User>> {
        opts.validate().context("validate list options")?;
        let rows: Vec<UserRow> = self.executor.query_as(&opts.build()).await?;
        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn create(&self, opts: &CreateOptions) -> Result<User> {
        opts.validate().context("validate create options")?;
        self.executor.exec(&opts.build()).await.context("db exec")?;
        debug!("Created user {}", opts.name);
        self.read(&opts.name).await
    }

    async fn read(&self, name: &str) -> Result<User> {
        validate_name(name, "validate read options")?;
        let sql = format!("SHOW USERS{}", like_clause(name));
        let row: UserRow = self.executor.read_named(&sql, name).await.context("read user")?;
        Ok(row.into_user())
    }

    async fn describe(&self, name: &str) -> Result<User> {
        validate_name(name, "validate describe options")?;
        let sql = format!("DESCRIBE USER {}", quote_ident(name));
        let rows = self.executor.query(&sql).await.context("do query")?;
        if rows.is_empty() {
            return Err(SnowflakeError::NotFound(sql)).context("describe user");
        }
        let row = describe::pivot(&rows).context("rows scan")?;
        Ok(UserRow::from_row(&row).context("rows scan")?.into_user())
    }

    async fn update(&self, name: &str, opts: &UpdateOptions) -> Result<User> {
        validate_name(name, "validate update options")?;
        let properties = opts.build();
        if properties.is_empty() {
            return Err(SnowflakeError::validation("user update sets no properties"))
                .context("validate update options");
        }
        let sql = format!("ALTER USER {} SET{}", quote_ident(name), properties);
        self.executor.exec(&sql).await.context("db exec")?;
        self.read(name).await
    }

    async fn drop(&self, name: &str) -> Result<()> {
        validate_name(name, "validate drop options")?;
        self.executor.drop(ObjectKind::User, &quote_ident(name)).await
    }

    async fn rename(&self, old: &str, new: &str) -> Result<()> {
        validate_name(old, "validate rename options")?;
        validate_name(new, "validate rename options")?;
        self.executor
            .rename(ObjectKind::User, &quote_ident(old), &quote_ident(new))
            .await
    }
}
