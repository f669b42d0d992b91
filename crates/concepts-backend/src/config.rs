//! Search backend configuration.
//!
//! Values come from the API's startup flags; [`BackendConfig::validate`] is
//! run once before the client is built so a bad endpoint or auth mode fails
//! the process at startup instead of on the first request.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use concepts_core::defaults;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid auth mode: {0}")]
    InvalidAuthMode(String),

    #[error("Unsupported auth mode: {0}")]
    UnsupportedAuthMode(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for concepts_core::Error {
    fn from(err: ConfigError) -> Self {
        concepts_core::Error::Config(err.to_string())
    }
}

/// Authentication mode named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    None,
    Basic,
    /// Request signing for managed clusters. Recognised so the error is
    /// explicit, but not supported.
    Aws,
}

impl FromStr for AuthMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "basic" => Ok(Self::Basic),
            "aws" => Ok(Self::Aws),
            _ => Err(ConfigError::InvalidAuthMode(s.to_string())),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Basic => write!(f, "basic"),
            Self::Aws => write!(f, "aws"),
        }
    }
}

/// Credentials attached to every backend request.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum BackendAuth {
    #[default]
    None,
    Basic { username: String, password: String },
}

impl fmt::Debug for BackendAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

impl BackendAuth {
    /// Build credentials for a mode. Basic auth needs a username.
    pub fn from_mode(
        mode: AuthMode,
        username: Option<String>,
        password: Option<String>,
    ) -> ConfigResult<Self> {
        match mode {
            AuthMode::None => Ok(Self::None),
            AuthMode::Basic => {
                let username = username.filter(|u| !u.is_empty()).ok_or_else(|| {
                    ConfigError::Validation("basic auth requires a username".to_string())
                })?;
                Ok(Self::Basic {
                    username,
                    password: password.unwrap_or_default(),
                })
            }
            AuthMode::Aws => Err(ConfigError::UnsupportedAuthMode(
                "aws request signing is not supported, use none or basic".to_string(),
            )),
        }
    }
}

/// Connection settings for the search cluster.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the cluster.
    pub endpoint: String,
    pub auth: BackendAuth,
    /// Timeout applied to each outbound call.
    pub timeout_seconds: u64,
    /// Transport-level retries after the first attempt.
    pub max_retries: u32,
    /// Initial retry backoff; doubles per attempt.
    pub retry_backoff_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::ELASTICSEARCH_ENDPOINT.to_string(),
            auth: BackendAuth::None,
            timeout_seconds: defaults::BACKEND_TIMEOUT_SECS,
            max_retries: defaults::BACKEND_MAX_RETRIES,
            retry_backoff_ms: defaults::BACKEND_RETRY_BACKOFF_MS,
        }
    }
}

impl BackendConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn with_auth(mut self, auth: BackendAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_backoff_ms(mut self, retry_backoff_ms: u64) -> Self {
        self.retry_backoff_ms = retry_backoff_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Backoff before retry number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(1u64 << exponent))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::Validation(
                "search endpoint cannot be empty".to_string(),
            ));
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "search endpoint must start with http:// or https://, got: {}",
                self.endpoint
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "backend timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_mode_from_str() {
        assert_eq!("none".parse::<AuthMode>().unwrap(), AuthMode::None);
        assert_eq!("".parse::<AuthMode>().unwrap(), AuthMode::None);
        assert_eq!("BASIC".parse::<AuthMode>().unwrap(), AuthMode::Basic);
        assert_eq!("aws".parse::<AuthMode>().unwrap(), AuthMode::Aws);
        assert!(matches!(
            "kerberos".parse::<AuthMode>(),
            Err(ConfigError::InvalidAuthMode(_))
        ));
    }

    #[test]
    fn test_auth_mode_display() {
        assert_eq!(AuthMode::Basic.to_string(), "basic");
        assert_eq!(AuthMode::None.to_string(), "none");
    }

    #[test]
    fn test_basic_auth_requires_username() {
        let err = BackendAuth::from_mode(AuthMode::Basic, None, Some("secret".into()));
        assert!(matches!(err, Err(ConfigError::Validation(_))));

        let auth =
            BackendAuth::from_mode(AuthMode::Basic, Some("reader".into()), Some("secret".into()))
                .unwrap();
        assert_eq!(
            auth,
            BackendAuth::Basic {
                username: "reader".into(),
                password: "secret".into()
            }
        );
    }

    #[test]
    fn test_aws_auth_is_rejected() {
        let err = BackendAuth::from_mode(AuthMode::Aws, None, None).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedAuthMode(_)));
        let core_err: concepts_core::Error = err.into();
        assert!(matches!(core_err, concepts_core::Error::Config(_)));
    }

    #[test]
    fn test_debug_hides_password() {
        let auth = BackendAuth::Basic {
            username: "reader".into(),
            password: "hunter2".into(),
        };
        let debug = format!("{:?}", auth);
        assert!(debug.contains("reader"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = BackendConfig::default();
        assert_eq!(config.endpoint, "http://localhost:9200");
        assert_eq!(config.timeout_seconds, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        assert!(BackendConfig::new("").validate().is_err());
        assert!(BackendConfig::new("localhost:9200").validate().is_err());
        assert!(BackendConfig::new("https://search.example.com/")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = BackendConfig::default().with_timeout_seconds(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backoff_doubles() {
        let config = BackendConfig::default().with_retry_backoff_ms(100);
        assert_eq!(config.backoff_for(1), Duration::from_millis(100));
        assert_eq!(config.backoff_for(2), Duration::from_millis(200));
        assert_eq!(config.backoff_for(3), Duration::from_millis(400));
    }

    #[test]
    fn test_base_url_trims_slash() {
        let config = BackendConfig::new("http://es:9200/");
        assert_eq!(config.base_url(), "http://es:9200");
    }
}
