//! Resource handles, one per object kind.
//!
//! Every handle follows the same flow: validate the options, build one
//! statement, run it through the [`Executor`](crate::client::Executor), and
//! scan the rows into domain entities. Create and Update finish with a Read
//! so the caller sees the server's canonical state.

pub mod database;
pub mod masking_policy;
pub mod role;
pub mod schema;
pub mod sequence;
pub mod table;
pub mod tag;
pub mod user;
pub mod view;

pub use database::{Database, Databases, ShareSource, SqlDatabases};
pub use masking_policy::{MaskingPolicies, MaskingPolicy, MaskingPolicyDetails, SqlMaskingPolicies};
pub use role::{Role, Roles, SqlRoles};
pub use schema::{Schema, Schemas, SqlSchemas};
pub use sequence::{Sequence, Sequences, SqlSequences};
pub use table::{
    Column, ColumnChange, ColumnDefault, ColumnDescription, ColumnIdentity, PrimaryKey, SqlTables,
    Table, Tables,
};
pub use tag::{SqlTags, Tag, TagValue, Tags};
pub use user::{SqlUsers, User, Users};
pub use view::{SqlViews, View, Views};

use tracing::warn;

use crate::core::identifier::{quote_ident, quote_literal, schema_path};
use crate::core::{like_clause, BaseOptions, ObjectKind, SchemaScope};
use crate::error::{Result, SnowflakeError};

/// ` COMMENT = '<escaped>'`
pub(crate) fn comment_clause(comment: &str) -> String {
    format!(" COMMENT = {}", quote_literal(comment))
}

/// ` SET COMMENT = '<escaped>'`
pub(crate) fn set_comment_clause(comment: &str) -> String {
    format!(" SET COMMENT = {}", quote_literal(comment))
}

/// `SHOW <KINDS> LIKE '<name>' IN SCHEMA "db"."schema"` for one object.
pub(crate) fn show_in_schema(opts: &BaseOptions, kind: ObjectKind) -> String {
    SchemaScope::new(opts.database.clone(), opts.schema.clone())
        .with_pattern(opts.name.clone())
        .show_statement(kind)
}

/// `SHOW <KINDS> LIKE '<name>'`, narrowed to the schema when both database
/// and schema are given, or to the database alone.
pub(crate) fn show_narrowed(opts: &BaseOptions, kind: ObjectKind) -> String {
    let mut sql = format!("SHOW {}{}", kind.plural(), like_clause(&opts.name));
    if !opts.database.is_empty() {
        if !opts.schema.is_empty() {
            sql.push_str(&format!(
                " IN SCHEMA {}",
                schema_path(&opts.database, &opts.schema)
            ));
        } else {
            sql.push_str(&format!(" IN DATABASE {}", quote_ident(&opts.database)));
        }
    }
    sql
}

/// True when an update rendered a clause worth sending.
///
/// An update with nothing set is tolerated: no statement is sent and the
/// caller gets the current state back from the follow-up Read.
pub(crate) fn has_changes(clause: &str, kind: ObjectKind, ident: &str) -> bool {
    if clause.is_empty() {
        warn!("Update of {} {} has no changes; skipping ALTER", kind.label(), ident);
        return false;
    }
    true
}

/// Name pattern required by account-level List operations.
pub(crate) fn require_pattern(pattern: &str) -> Result<()> {
    if pattern.is_empty() {
        return Err(SnowflakeError::validation("name pattern is required"));
    }
    Ok(())
}
