//! Account roles.

use async_trait::async_trait;
use tracing::debug;

use crate::client::Executor;
use crate::core::identifier::quote_ident;
use crate::core::{like_clause, BaseOptions, FromRow, ObjectKind, Row, Tristate};
use crate::error::{Result, ResultExt};

use super::{comment_clause, has_changes, require_pattern, set_comment_clause};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub comment: String,
    pub owner: String,
    pub created_on: String,
}

#[derive(Debug, Default)]
struct RoleRow {
    name: Option<String>,
    comment: Option<String>,
    owner: Option<String>,
    created_on: Option<String>,
}

impl FromRow for RoleRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            name: row.string("name"),
            comment: row.string("comment"),
            owner: row.string("owner"),
            created_on: row.string("created_on"),
        })
    }
}

impl RoleRow {
    fn into_role(self) -> Role {
        Role {
            name: self.name.unwrap_or_default(),
            comment: self.comment.unwrap_or_default(),
            owner: self.owner.unwrap_or_default(),
            created_on: self.created_on.unwrap_or_default(),
        }
    }
}

/// Roles matching a `LIKE` pattern. The pattern is required.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub pattern: String,
}

impl ListOptions {
    pub fn validate(&self) -> Result<()> {
        require_pattern(&self.pattern)
    }

    pub fn build(&self) -> String {
        format!("SHOW ROLES{}", like_clause(&self.pattern))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub name: String,
    pub comment: Option<String>,
}

impl CreateOptions {
    pub fn validate(&self) -> Result<()> {
        BaseOptions::new(self.name.clone()).validate(ObjectKind::Role)
    }

    pub fn build(&self) -> String {
        let mut sql = format!("CREATE ROLE {}", quote_ident(&self.name));
        if let Some(comment) = self.comment.as_deref().filter(|c| !c.is_empty()) {
            sql.push_str(&comment_clause(comment));
        }
        sql
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub name: String,
    pub comment: Tristate<String>,
}

impl UpdateOptions {
    pub fn validate(&self) -> Result<()> {
        BaseOptions::new(self.name.clone()).validate(ObjectKind::Role)
    }

    pub fn build(&self) -> String {
        match &self.comment {
            Tristate::Clear => " UNSET COMMENT".to_string(),
            Tristate::Set(comment) => set_comment_clause(comment),
            Tristate::Unspecified => String::new(),
        }
    }
}

#[async_trait]
pub trait Roles: Send + Sync {
    async fn list(&self, opts: &ListOptions) -> Result<Vec<Role>>;
    async fn create(&self, opts: &CreateOptions) -> Result<Role>;
    async fn read(&self, name: &str) -> Result<Role>;
    async fn update(&self, opts: &UpdateOptions) -> Result<Role>;
    async fn drop(&self, name: &str) -> Result<()>;
    async fn rename(&self, old: &str, new: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct SqlRoles {
    executor: Executor,
}

impl SqlRoles {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

fn validate_name(name: &str, phase: &str) -> Result<()> {
    BaseOptions::new(name).validate(ObjectKind::Role).context(phase)
}

#[async_trait]
impl Roles for SqlRoles {
    async fn list(&self, opts: &ListOptions) -> Result<Vec<Role>> {
        opts.validate().context("validate list options")?;
        let rows: Vec<RoleRow> = self.executor.query_as(&opts.build()).await?;
        Ok(rows.into_iter().map(RoleRow::into_role).collect())
    }

    async fn create(&self, opts: &CreateOptions) -> Result<Role> {
        opts.validate().context("validate create options")?;
        self.executor.exec(&opts.build()).await.context("db exec")?;
        debug!("Created role {}", opts.name);
        self.read(&opts.name).await
    }

    async fn read(&self, name: &str) -> Result<Role> {
        validate_name(name, "validate read options")?;
        let sql = format!("SHOW ROLES{}", like_clause(name));
        let row: RoleRow = self.executor.read_named(&sql, name).await.context("read role")?;
        Ok(row.into_role())
    }

    async fn update(&self, opts: &UpdateOptions) -> Result<Role> {
        opts.validate().context("validate update options")?;
        let ident = quote_ident(&opts.name);
        let clause = opts.build();
        if has_changes(&clause, ObjectKind::Role, &ident) {
            let sql = format!("ALTER ROLE {}{}", ident, clause);
            self.executor.exec(&sql).await.context("db exec")?;
        }
        self.read(&opts.name).await
    }

    async fn drop(&self, name: &str) -> Result<()> {
        validate_name(name, "validate drop options")?;
        self.executor.drop(ObjectKind::Role, &quote_ident(name)).await
    }

    async fn rename(&self, old: &str, new: &str) -> Result<()> {
        validate_name(old, "validate rename options")?;
        validate_name(new, "validate rename options")?;
        self.executor
            .rename(ObjectKind::Role, &quote_ident(old), &quote_ident(new))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RecordingClient;
    use std::sync::Arc;

    fn roles() -> (Arc<RecordingClient>, SqlRoles) {
        let client = Arc::new(RecordingClient::new());
        (client.clone(), SqlRoles::new(Executor::new(client)))
    }

    #[tokio::test]
    async fn test_list_requires_pattern() {
        let (client, roles) = roles();
        let err = roles.list(&ListOptions::default()).await.unwrap_err();
        assert!(err.is_validation());
        assert!(client.statements().is_empty());
    }

    #[tokio::test]
    async fn test_list_maps_rows() {
        let (client, roles) = roles();
        client.respond(
            "SHOW ROLES",
            vec![
                Row::new().with("name", "ANALYST").with("owner", "SECURITYADMIN"),
                Row::new().with("name", "ANALYST_RO").with_null("owner"),
            ],
        );
        let listed = roles
            .list(&ListOptions {
                pattern: "ANALYST%".into(),
            })
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].owner, "SECURITYADMIN");
        assert_eq!(listed[1].owner, "");
        assert_eq!(client.statements(), vec!["SHOW ROLES LIKE 'ANALYST%'"]);
    }

    #[tokio::test]
    async fn test_create_update_drop_rename() {
        let (client, roles) = roles();
        client.respond("SHOW ROLES", vec![Row::new().with("name", "R1")]);
        roles
            .create(&CreateOptions {
                name: "R1".into(),
                comment: Some("readers".into()),
            })
            .await
            .unwrap();
        roles
            .update(&UpdateOptions {
                name: "R1".into(),
                comment: Tristate::Clear,
            })
            .await
            .unwrap();
        roles.rename("R1", "R2").await.unwrap();
        roles.drop("R2").await.unwrap();
        assert_eq!(
            client.statements(),
            vec![
                r#"CREATE ROLE "R1" COMMENT = 'readers'"#,
                "SHOW ROLES LIKE 'R1'",
                r#"ALTER ROLE "R1" UNSET COMMENT"#,
                "SHOW ROLES LIKE 'R1'",
                r#"ALTER ROLE "R1" RENAME TO "R2""#,
                r#"DROP ROLE "R2""#,
            ]
        );
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let (_client, roles) = roles();
        assert!(roles.read("NOPE").await.unwrap_err().is_not_found());
    }
}
