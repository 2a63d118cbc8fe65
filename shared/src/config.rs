use std::env;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TABLE_NAME: &str = "quiz-quest";
const DEFAULT_CLAIMS_ATTRIBUTE: &str = "custom:claims";
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be a number of milliseconds, got {value:?}")]
    InvalidTimeout { name: &'static str, value: String },
}

/// Settings read once at cold start
#[derive(Debug, Clone)]
pub struct Config {
    pub user_pool_id: String,
    pub table_name: String,
    /// Cognito attribute holding the JSON claims object
    pub claims_attribute: String,
    /// Upper bound on every identity pool / table call
    pub store_timeout: Duration,
    /// Trust an `X-User-Id` header as the caller. Local development only.
    pub allow_user_id_header: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let user_pool_id = lookup("COGNITO_USER_POOL_ID")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("COGNITO_USER_POOL_ID"))?;

        let table_name =
            lookup("TABLE_NAME").unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string());
        let claims_attribute =
            lookup("CLAIMS_ATTRIBUTE").unwrap_or_else(|| DEFAULT_CLAIMS_ATTRIBUTE.to_string());

        let store_timeout = match lookup("STORE_TIMEOUT_MS") {
            Some(value) => {
                let millis = value
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|ms| *ms > 0)
                    .ok_or(ConfigError::InvalidTimeout {
                        name: "STORE_TIMEOUT_MS",
                        value: value.clone(),
                    })?;
                Duration::from_millis(millis)
            }
            None => Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
        };

        let allow_user_id_header = lookup("ALLOW_USER_ID_HEADER")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
            .unwrap_or(false);

        if allow_user_id_header {
            tracing::warn!("ALLOW_USER_ID_HEADER is set; X-User-Id will be trusted as the caller");
        }

        Ok(Self {
            user_pool_id,
            table_name,
            claims_attribute,
            store_timeout,
            allow_user_id_header,
        })
    }
}
