//! KYC back-office client configuration.
//!
//! One base URL serves every endpoint. Defaults target a local development
//! server; override through the environment or by explicit construction.

use url::Url;
use zeroize::Zeroizing;

/// Default base URL when `KYC_API_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

/// Default request timeout when `KYC_TIMEOUT_SECS` is unset.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the KYC back-office API.
///
/// `Debug` redacts the token.
#[derive(Clone)]
pub struct KycApiConfig {
    pub base_url: Url,
    /// Optional bearer token. Zeroized on drop.
    pub api_token: Option<Zeroizing<String>>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for KycApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KycApiConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl KycApiConfig {
    /// Configuration for `base_url` with no token and the default timeout.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(Zeroizing::new(token.into()));
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `KYC_API_URL` (default: `http://127.0.0.1:3000`)
    /// - `KYC_API_TOKEN` (optional)
    /// - `KYC_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_url("KYC_API_URL", DEFAULT_BASE_URL)?;
        let api_token = std::env::var("KYC_API_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .map(Zeroizing::new);
        let timeout_secs = match std::env::var("KYC_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            base_url,
            api_token,
            timeout_secs,
        })
    }
}

/// `base` with `segments` appended to its path.
pub(crate) fn api_url(base: &Url, segments: &[&str]) -> Result<Url, ConfigError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ConfigError::InvalidUrl(base.to_string(), "URL cannot be a base".into()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("KYC_TIMEOUT_SECS must be a whole number of seconds, got {0:?}")]
    InvalidTimeout(String),
    #[error("invalid bearer token")]
    InvalidToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_token() {
        let cfg = KycApiConfig::new(Url::parse(DEFAULT_BASE_URL).unwrap()).with_token("s3cret");
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn new_uses_default_timeout() {
        let cfg = KycApiConfig::new(Url::parse("http://kyc.local").unwrap());
        assert_eq!(cfg.timeout_secs, 30);
        assert!(cfg.api_token.is_none());
        assert_eq!(cfg.with_timeout_secs(5).timeout_secs, 5);
    }

    #[test]
    fn api_url_appends_segments_to_base_path() {
        let base = Url::parse("http://kyc.local/portal/").unwrap();
        let url = api_url(&base, &["api", "cms", "123456789"]).unwrap();
        assert_eq!(url.as_str(), "http://kyc.local/portal/api/cms/123456789");

        let bare = Url::parse("http://127.0.0.1:3000").unwrap();
        assert_eq!(api_url(&bare, &["api", "kyc"]).unwrap().as_str(), "http://127.0.0.1:3000/api/kyc");
    }

    #[test]
    fn env_url_uses_default_when_var_absent() {
        let url = env_url("KYC_NONEXISTENT_VAR_12345", "https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn env_url_rejects_invalid_url() {
        std::env::set_var("KYC_TEST_BAD_URL", "not a url");
        let result = env_url("KYC_TEST_BAD_URL", "https://example.com");
        std::env::remove_var("KYC_TEST_BAD_URL");
        assert!(matches!(result, Err(ConfigError::InvalidUrl(var, _)) if var == "KYC_TEST_BAD_URL"));
    }
}
