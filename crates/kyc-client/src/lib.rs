//! # kyc-client -- Typed Rust client for the KYC back office
//!
//! Provides typed access to the three back-office operations the intake
//! wizard depends on:
//! - **Contract existence** via `POST /api/cms/{contract}`
//! - **Customer search** via `POST /api/cms?query=`
//! - **Submission** via `POST /api/kyc` (multipart)
//!
//! ## Architecture
//!
//! [`CmsClient`] implements [`kyc_schema::ContractLookup`] and
//! [`SubmissionClient`] implements [`kyc_state::SubmissionSink`], so the
//! wizard runs unchanged against the live back office or an in-memory fake.
//! Transport failures are retried with exponential backoff; HTTP statuses
//! are never retried.

pub mod cms;
pub mod config;
pub mod error;
pub(crate) mod retry;
pub mod submission;

pub use cms::{CmsClient, ExistsResponse, SearchResponse};
pub use config::{ConfigError, KycApiConfig};
pub use error::KycApiError;
pub use submission::{SubmissionClient, SubmitResponse};

use std::time::Duration;

/// Top-level back-office client. Holds one sub-client per concern.
#[derive(Debug, Clone)]
pub struct KycClient {
    cms: CmsClient,
    submissions: SubmissionClient,
}

impl KycClient {
    /// Create a new client from configuration.
    pub fn new(config: KycApiConfig) -> Result<Self, KycApiError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = &config.api_token {
            let mut value =
                reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                    .map_err(|_| KycApiError::Config(ConfigError::InvalidToken))?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| KycApiError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            cms: CmsClient::new(http.clone(), config.base_url.clone()),
            submissions: SubmissionClient::new(http, config.base_url),
        })
    }

    /// Build a client from `KYC_API_URL`, `KYC_API_TOKEN`, `KYC_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, KycApiError> {
        Self::new(KycApiConfig::from_env()?)
    }

    /// Contract existence and customer search.
    pub fn cms(&self) -> &CmsClient {
        &self.cms
    }

    /// The submission endpoint.
    pub fn submissions(&self) -> &SubmissionClient {
        &self.submissions
    }
}
