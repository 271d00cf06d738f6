//! Core abstractions shared by every object kind.
//!
//! - [`identifier`]: identifier quoting and string-literal escaping
//! - [`tristate`]: three-valued optional fields for updates
//! - [`options`]: object kinds, base identity options and list scopes
//! - [`row`]: nullable result rows and the [`FromRow`] scan trait
//! - [`traits`]: the [`Client`] transport trait

pub mod identifier;
pub mod options;
pub mod row;
pub mod traits;
pub mod tristate;

pub use options::{like_clause, BaseOptions, ObjectKind, Qualification, SchemaScope};
pub use row::{decode_bracketed_list, FromRow, Row};
pub use traits::{Client, ExecResult};
pub use tristate::Tristate;
