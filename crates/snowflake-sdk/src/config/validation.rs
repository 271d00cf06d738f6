//! Configuration validation.

use super::Config;
use crate::error::{Result, SnowflakeError};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    if config.account.is_empty() && config.host.is_empty() {
        return Err(SnowflakeError::Config(
            "account is required when host is not set".into(),
        ));
    }
    if config.user.is_empty() {
        return Err(SnowflakeError::Config("user is required".into()));
    }
    if config.password.is_empty() {
        return Err(SnowflakeError::Config("password is required".into()));
    }
    if config.host.contains("://") {
        return Err(SnowflakeError::Config(format!(
            "host must be a bare hostname, got '{}'",
            config.host
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            account: "xy12345".to_string(),
            user: "loader".to_string(),
            password: "password".to_string(),
            region: "eu-central-1".to_string(),
            role: "SYSADMIN".to_string(),
            host: String::new(),
            warehouse: "COMPUTE_WH".to_string(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_account_without_host() {
        let mut config = valid_config();
        config.account = String::new();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("account is required"));
    }

    #[test]
    fn test_host_substitutes_for_account() {
        let mut config = valid_config();
        config.account = String::new();
        config.host = "xy12345.privatelink.snowflakecomputing.com".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_missing_user() {
        let mut config = valid_config();
        config.user = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_missing_password() {
        let mut config = valid_config();
        config.password = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_host_with_scheme_rejected() {
        let mut config = valid_config();
        config.host = "https://xy12345.snowflakecomputing.com".to_string();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("bare hostname"));
    }
}
