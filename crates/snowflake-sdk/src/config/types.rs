//! Connection configuration type definitions.

use serde::{Deserialize, Serialize};

/// Snowflake's default region. Naming it explicitly bypasses the default
/// host resolution, so it is normalized to "no region".
pub const DEFAULT_REGION: &str = "us-west-2";

/// Domain suffix used when building a host from account and region.
pub const HOST_SUFFIX: &str = "snowflakecomputing.com";

/// Environment variable names read by [`Config::from_env`].
pub const ENV_ACCOUNT: &str = "SNOWFLAKE_ACCOUNT";
pub const ENV_USER: &str = "SNOWFLAKE_USER";
pub const ENV_PASSWORD: &str = "SNOWFLAKE_PASSWORD";
pub const ENV_REGION: &str = "SNOWFLAKE_REGION";
pub const ENV_ROLE: &str = "SNOWFLAKE_ROLE";
pub const ENV_HOST: &str = "SNOWFLAKE_HOST";
pub const ENV_WAREHOUSE: &str = "SNOWFLAKE_WAREHOUSE";

/// Connection parameters for a Snowflake account.
///
/// Empty strings mean "not provided". The password is accepted on input
/// but never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Account identifier (e.g. "xy12345").
    #[serde(default)]
    pub account: String,

    /// Login user.
    #[serde(default)]
    pub user: String,

    /// Password (never serialized).
    #[serde(default, skip_serializing)]
    pub password: String,

    /// Cloud region. `us-west-2` is normalized to empty.
    #[serde(default)]
    pub region: String,

    /// Session role.
    #[serde(default)]
    pub role: String,

    /// Explicit host. When set, the region is ignored.
    #[serde(default)]
    pub host: String,

    /// Session warehouse.
    #[serde(default)]
    pub warehouse: String,
}

/// Collapse the provider's default region to "no region".
pub fn normalize_region(region: &str) -> String {
    if region == DEFAULT_REGION {
        String::new()
    } else {
        region.to_string()
    }
}
