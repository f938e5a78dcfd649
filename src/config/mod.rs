#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://public-api.live.buildops.com";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    100
}

fn default_existence_check_workers() -> usize {
    20
}

fn default_property_workers() -> usize {
    10
}

fn default_cache_tokens() -> bool {
    true
}

fn default_token_ttl_secs() -> u64 {
    300
}

/// Credentials and tuning read once at startup.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_existence_check_workers")]
    pub existence_check_workers: usize,
    #[serde(default = "default_property_workers")]
    pub property_workers: usize,
    #[serde(default = "default_cache_tokens")]
    pub cache_tokens: bool,
    /// Lifetime assumed for tokens whose response carries no `expires_in`.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    /// Write whatever succeeded instead of failing the report when some customers fail.
    #[serde(default)]
    pub allow_partial: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("page_size", &self.page_size)
            .field("existence_check_workers", &self.existence_check_workers)
            .field("property_workers", &self.property_workers)
            .field("cache_tokens", &self.cache_tokens)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("allow_partial", &self.allow_partial)
            .finish()
    }
}

impl AppConfig {
    /// Minimal config pointing at `base_url`, everything else defaulted.
    pub fn new(
        base_url: impl Into<String>,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: base_url.into(),
            request_timeout_secs: default_request_timeout_secs(),
            page_size: default_page_size(),
            existence_check_workers: default_existence_check_workers(),
            property_workers: default_property_workers(),
            cache_tokens: default_cache_tokens(),
            token_ttl_secs: default_token_ttl_secs(),
            allow_partial: false,
        }
    }

    /// Loads and validates the config file. `.toml` files are parsed as TOML,
    /// anything else as JSON.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ReportError::ConfigError {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let config = if is_toml {
            Self::from_toml_str(&content)?
        } else {
            Self::from_json_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;
        serde_json::from_str(&processed).map_err(|e| ReportError::ConfigError {
            message: format!("JSON parsing error: {}", e),
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;
        toml::from_str(&processed).map_err(|e| ReportError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables stay verbatim.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| {
            ReportError::ConfigError {
                message: format!("invalid placeholder pattern: {}", e),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn token_ttl(&self) -> Result<chrono::Duration> {
        i64::try_from(self.token_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| ReportError::InvalidConfigValueError {
                field: "token_ttl_secs".to_string(),
                value: self.token_ttl_secs.to_string(),
                reason: "Token lifetime is out of range".to_string(),
            })
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("base_url", &self.base_url)?;
        validation::validate_credential("tenant_id", &self.tenant_id)?;
        validation::validate_credential("client_id", &self.client_id)?;
        validation::validate_credential("client_secret", &self.client_secret)?;
        validation::validate_range("page_size", self.page_size, 1, 1000)?;
        validation::validate_range("request_timeout_secs", self.request_timeout_secs, 1, 3600)?;
        validation::validate_range("token_ttl_secs", self.token_ttl_secs, 1, 86_400)?;
        validation::validate_positive_number(
            "existence_check_workers",
            self.existence_check_workers,
            1,
        )?;
        validation::validate_positive_number("property_workers", self.property_workers, 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_json_config() {
        let config = AppConfig::from_json_str(
            r#"{"tenant_id": "t1", "client_id": "id", "client_secret": "secret"}"#,
        )
        .unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.existence_check_workers, 20);
        assert_eq!(config.property_workers, 10);
        assert!(config.cache_tokens);
        assert!(!config.allow_partial);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_credential_is_config_error() {
        let result = AppConfig::from_json_str(r#"{"tenant_id": "t1", "client_id": "id"}"#);
        assert!(matches!(result, Err(ReportError::ConfigError { .. })));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let result = AppConfig::from_json_str("{not json");
        assert!(matches!(result, Err(ReportError::ConfigError { .. })));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CUSTOMER_EXPORT_TEST_SECRET", "from-env");

        let config = AppConfig::from_json_str(
            r#"{"tenant_id": "t1", "client_id": "id", "client_secret": "${CUSTOMER_EXPORT_TEST_SECRET}"}"#,
        )
        .unwrap();
        assert_eq!(config.client_secret, "from-env");

        std::env::remove_var("CUSTOMER_EXPORT_TEST_SECRET");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let config = AppConfig::from_json_str(
            r#"{"tenant_id": "t1", "client_id": "id", "client_secret": "${CUSTOMER_EXPORT_UNSET_VAR}"}"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_toml_file() {
        let mut temp_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        temp_file
            .write_all(
                br#"
tenant_id = "t1"
client_id = "id"
client_secret = "secret"
base_url = "http://localhost:9000"
property_workers = 4
"#,
            )
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.property_workers, 4);
    }

    #[test]
    fn test_config_from_json_file_rejects_zero_workers() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"{"tenant_id": "t1", "client_id": "id", "client_secret": "s", "property_workers": 0}"#,
            )
            .unwrap();

        let result = AppConfig::from_file(temp_file.path());
        assert!(matches!(
            result,
            Err(ReportError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_huge_token_ttl_is_rejected() {
        let mut config = AppConfig::new("http://localhost", "t1", "id", "secret");
        config.token_ttl_secs = 10_000_000_000_000_000;

        assert!(matches!(
            config.validate(),
            Err(ReportError::InvalidConfigValueError { .. })
        ));
        assert!(matches!(
            config.token_ttl(),
            Err(ReportError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_default_token_ttl() {
        let config = AppConfig::new("http://localhost", "t1", "id", "secret");
        assert_eq!(config.token_ttl().unwrap(), chrono::Duration::seconds(300));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = AppConfig::from_file("/definitely/not/here/config.json");
        assert!(matches!(result, Err(ReportError::ConfigError { .. })));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AppConfig::new("http://localhost", "t1", "id", "top-secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("top-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
