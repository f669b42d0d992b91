//! Startup flags.
//!
//! Every flag can also be set through the environment variable named next
//! to it; `.env` is loaded before parsing.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use concepts_backend::{AuthMode, BackendAuth, BackendConfig, IndexNames};
use concepts_core::{defaults, Error, Result};
use concepts_search::SearchLimits;

#[derive(Debug, Clone, Parser)]
#[command(name = "concepts-api", version, about = "Concept search API")]
pub struct Cli {
    #[arg(long, env = "HOST", default_value = defaults::HOST)]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = defaults::PORT)]
    pub port: u16,

    /// System code reported by the health endpoints
    #[arg(long, env = "APP_SYSTEM_CODE", default_value = defaults::SYSTEM_CODE)]
    pub app_system_code: String,

    #[arg(long, env = "APP_NAME", default_value = defaults::APP_NAME)]
    pub app_name: String,

    #[arg(long, env = "ELASTICSEARCH_ENDPOINT", default_value = defaults::ELASTICSEARCH_ENDPOINT)]
    pub elasticsearch_endpoint: String,

    /// Index alias with the curated authorities
    #[arg(long, env = "ELASTICSEARCH_INDEX", default_value = defaults::DEFAULT_INDEX)]
    pub elasticsearch_index: String,

    /// Index alias with every authority
    #[arg(
        long,
        env = "ELASTICSEARCH_EXTENDED_SEARCH_INDEX",
        default_value = defaults::EXTENDED_INDEX
    )]
    pub elasticsearch_extended_search_index: String,

    /// Backend authentication: none or basic
    #[arg(long, env = "AUTH", default_value = "none")]
    pub auth: String,

    #[arg(long, env = "ELASTICSEARCH_USERNAME")]
    pub elasticsearch_username: Option<String>,

    #[arg(long, env = "ELASTICSEARCH_PASSWORD", hide_env_values = true)]
    pub elasticsearch_password: Option<String>,

    #[arg(long, env = "SEARCH_RESULT_LIMIT", default_value_t = defaults::SEARCH_RESULT_LIMIT)]
    pub search_result_limit: usize,

    #[arg(
        long,
        env = "AUTOCOMPLETE_RESULT_LIMIT",
        default_value_t = defaults::AUTOCOMPLETE_RESULT_LIMIT
    )]
    pub autocomplete_result_limit: usize,

    #[arg(long, env = "MAX_IDS_LIMIT", default_value_t = defaults::MAX_IDS_LIMIT)]
    pub max_ids_limit: usize,

    #[arg(
        long,
        env = "ELASTICSEARCH_TIMEOUT_SECS",
        default_value_t = defaults::BACKEND_TIMEOUT_SECS
    )]
    pub elasticsearch_timeout_secs: u64,

    #[arg(
        long,
        env = "ELASTICSEARCH_MAX_RETRIES",
        default_value_t = defaults::BACKEND_MAX_RETRIES
    )]
    pub elasticsearch_max_retries: u32,

    /// Wait between attempts to reach the cluster at startup
    #[arg(
        long,
        env = "BACKEND_RETRY_INTERVAL_SECS",
        default_value_t = defaults::BACKEND_CONNECT_INTERVAL_SECS
    )]
    pub backend_retry_interval_secs: u64,
}

impl Cli {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("invalid bind address: {}", e)))
    }

    pub fn limits(&self) -> Result<SearchLimits> {
        let limits = SearchLimits {
            search_result_limit: self.search_result_limit,
            autocomplete_result_limit: self.autocomplete_result_limit,
            max_ids_limit: self.max_ids_limit,
        };
        limits.validate()?;
        Ok(limits)
    }

    pub fn indices(&self) -> IndexNames {
        IndexNames::new(
            &self.elasticsearch_index,
            &self.elasticsearch_extended_search_index,
        )
    }

    pub fn backend_config(&self) -> Result<BackendConfig> {
        let mode: AuthMode = self.auth.parse()?;
        let auth = BackendAuth::from_mode(
            mode,
            self.elasticsearch_username.clone(),
            self.elasticsearch_password.clone(),
        )?;
        let config = BackendConfig::new(&self.elasticsearch_endpoint)
            .with_auth(auth)
            .with_timeout_seconds(self.elasticsearch_timeout_secs)
            .with_max_retries(self.elasticsearch_max_retries);
        config.validate()?;
        Ok(config)
    }

    pub fn connect_interval(&self) -> Duration {
        Duration::from_secs(self.backend_retry_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["concepts-api"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_explicit_flags() {
        let cli = parse(&[
            "--port",
            "9090",
            "--elasticsearch-index",
            "concepts-v2",
            "--max-ids-limit",
            "5",
        ]);
        assert_eq!(cli.bind_addr().unwrap().port(), 9090);
        assert_eq!(cli.indices().default, "concepts-v2");
        assert_eq!(cli.limits().unwrap().max_ids_limit, 5);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let cli = parse(&["--search-result-limit", "0"]);
        assert!(matches!(cli.limits(), Err(Error::Config(_))));
    }

    #[test]
    fn test_basic_auth_needs_username() {
        let cli = parse(&["--auth", "basic"]);
        assert!(matches!(cli.backend_config(), Err(Error::Config(_))));

        let cli = parse(&[
            "--auth",
            "basic",
            "--elasticsearch-username",
            "reader",
            "--elasticsearch-password",
            "secret",
        ]);
        let config = cli.backend_config().unwrap();
        assert!(matches!(config.auth, BackendAuth::Basic { .. }));
    }

    #[test]
    fn test_aws_auth_rejected() {
        let cli = parse(&["--auth", "aws"]);
        assert!(cli.backend_config().is_err());
    }

    #[test]
    fn test_bad_endpoint_rejected() {
        let cli = parse(&["--elasticsearch-endpoint", "localhost:9200"]);
        assert!(cli.backend_config().is_err());
    }
}
