//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from the `SNOWFLAKE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (environment-shaped).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();
        Self {
            account: get(ENV_ACCOUNT),
            user: get(ENV_USER),
            password: get(ENV_PASSWORD),
            region: normalize_region(&get(ENV_REGION)),
            role: get(ENV_ROLE),
            host: get(ENV_HOST),
            warehouse: get(ENV_WAREHOUSE),
        }
    }

    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(yaml)?;
        config.region = normalize_region(&config.region);
        if !config.host.is_empty() {
            config.region.clear();
        }
        config.validate()?;
        Ok(config)
    }

    /// Overlay explicitly provided values on top of `self`.
    ///
    /// Empty fields in `explicit` keep the current value. An explicit host
    /// clears the region.
    pub fn merge(mut self, explicit: &Config) -> Self {
        fn overlay(target: &mut String, value: &str) {
            if !value.is_empty() {
                *target = value.to_string();
            }
        }

        overlay(&mut self.account, &explicit.account);
        overlay(&mut self.user, &explicit.user);
        overlay(&mut self.password, &explicit.password);
        if !explicit.region.is_empty() && explicit.region != DEFAULT_REGION {
            self.region = explicit.region.clone();
        }
        overlay(&mut self.role, &explicit.role);
        if !explicit.host.is_empty() {
            self.host = explicit.host.clone();
            self.region.clear();
        }
        overlay(&mut self.warehouse, &explicit.warehouse);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Hostname of the account endpoint.
    pub fn host(&self) -> String {
        if !self.host.is_empty() {
            return self.host.clone();
        }
        let region = normalize_region(&self.region);
        if region.is_empty() {
            format!("{}.{}", self.account, HOST_SUFFIX)
        } else {
            format!("{}.{}.{}", self.account, region, HOST_SUFFIX)
        }
    }

    /// HTTPS base URL of the account endpoint.
    pub fn base_url(&self) -> String {
        format!("https://{}", self.host())
    }
}
