use std::env;

use tracing::info;

use crate::error::ConfigError;
use crate::optimistic::ToggleRollback;

pub const API_URL_VAR: &str = "STARDO_API_URL";
pub const TOGGLE_ROLLBACK_VAR: &str = "STARDO_TOGGLE_ROLLBACK";
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub toggle_rollback: ToggleRollback,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            toggle_rollback: ToggleRollback::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(API_URL_VAR).unwrap_or_else(|| {
            info!("{API_URL_VAR} not set, using default: {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        });
        if base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        let toggle_rollback = match lookup(TOGGLE_ROLLBACK_VAR) {
            None => ToggleRollback::default(),
            Some(value) => parse_toggle_rollback(&value)?,
        };

        Ok(Self {
            base_url,
            toggle_rollback,
        })
    }
}

fn parse_toggle_rollback(value: &str) -> Result<ToggleRollback, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "only-from-true" => Ok(ToggleRollback::OnlyFromTrue),
        "always" => Ok(ToggleRollback::Always),
        _ => Err(ConfigError::InvalidValue {
            key: TOGGLE_ROLLBACK_VAR,
            value: value.to_string(),
        }),
    }
}
