//! Typed client for the customer management endpoints.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `/api/cms/{contract}` | Does the contract exist? |
//! | POST   | `/api/cms?query={text}` | Search customers |

use std::future::Future;

use kyc_core::Customer;
use kyc_schema::{ContractLookup, LookupError};
use serde::Deserialize;
use url::Url;

use crate::config::api_url;
use crate::error::KycApiError;

/// Body of the existence endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

/// Body of the search endpoint: either `{"data": [...]}` or a bare list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Wrapped {
        #[serde(default)]
        data: Vec<Customer>,
    },
    Bare(Vec<Customer>),
}

impl SearchResponse {
    pub fn into_customers(self) -> Vec<Customer> {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(customers) => customers,
        }
    }
}

// -- Client -------------------------------------------------------------------

/// Client for contract existence and customer search.
#[derive(Debug, Clone)]
pub struct CmsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CmsClient {
    pub(crate) fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Whether `contract` is known to the back office.
    ///
    /// Calls `POST {base_url}/api/cms/{contract}`. A 404 whose body says
    /// `exists: false` is a definite "no"; any other non-2xx is an error.
    pub async fn contract_exists(&self, contract: &str) -> Result<bool, KycApiError> {
        let endpoint = "POST /api/cms/{contract}";
        let url = api_url(&self.base_url, &["api", "cms", contract])?;

        let resp = crate::retry::retry_send(endpoint, || self.http.post(url.clone()).send())
            .await
            .map_err(|e| KycApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            let body = resp.text().await.unwrap_or_default();
            return match serde_json::from_str::<ExistsResponse>(&body) {
                Ok(ExistsResponse { exists: false }) => Ok(false),
                _ => Err(KycApiError::ApiError {
                    endpoint: endpoint.into(),
                    status: status.as_u16(),
                    body,
                }),
            };
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(KycApiError::ApiError {
                endpoint: endpoint.into(),
                status: status.as_u16(),
                body,
            });
        }

        let body: ExistsResponse =
            resp.json()
                .await
                .map_err(|e| KycApiError::Deserialization {
                    endpoint: endpoint.into(),
                    source: e,
                })?;
        tracing::debug!(contract, exists = body.exists, "contract lookup answered");
        Ok(body.exists)
    }

    /// Search customers by free text (contract number, meter, or name).
    ///
    /// Calls `POST {base_url}/api/cms?query={text}`. A 404 means no match.
    pub async fn search(&self, query: &str) -> Result<Vec<Customer>, KycApiError> {
        let endpoint = "POST /api/cms";
        let mut url = api_url(&self.base_url, &["api", "cms"])?;
        url.query_pairs_mut().append_pair("query", query);

        let resp = crate::retry::retry_send(endpoint, || self.http.post(url.clone()).send())
            .await
            .map_err(|e| KycApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(KycApiError::ApiError {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        resp.json::<SearchResponse>()
            .await
            .map(SearchResponse::into_customers)
            .map_err(|e| KycApiError::Deserialization {
                endpoint: endpoint.into(),
                source: e,
            })
    }
}

impl ContractLookup for CmsClient {
    fn exists(&self, number: &str) -> impl Future<Output = Result<bool, LookupError>> + Send {
        async move {
            self.contract_exists(number).await.map_err(|e| {
                tracing::warn!(contract = number, error = %e, "contract lookup failed");
                if e.is_transient() {
                    LookupError::Unavailable(e.to_string())
                } else {
                    LookupError::Rejected(e.to_string())
                }
            })
        }
    }
}
