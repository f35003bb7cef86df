//! Typed client for the KYC submission endpoint.
//!
//! `POST /api/kyc` takes a multipart body: one `formData` part with the
//! validated record as JSON, then one file part per attachment
//! (`idFrontImage`, `idBackImage`, `niuFile`).

use std::future::Future;

use kyc_core::{Submission, SubmissionId, RECORD_PART};
use kyc_state::{SinkError, SubmissionReceipt, SubmissionSink};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use url::Url;

use crate::config::api_url;
use crate::error::KycApiError;

/// Body of the submission endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub data: Option<SubmitData>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitData {
    pub id: String,
}

impl SubmitResponse {
    /// The created record id, from `data.id` or the top-level `id`.
    pub fn created_id(&self) -> Option<&str> {
        self.data
            .as_ref()
            .map(|d| d.id.as_str())
            .or(self.id.as_deref())
    }
}

/// One file part, read into memory so it can be resent on retry.
#[derive(Debug, Clone)]
struct LoadedFile {
    part_name: &'static str,
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

// -- Client -------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SubmissionClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SubmissionClient {
    pub(crate) fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Send a validated record with its attachments.
    ///
    /// Calls `POST {base_url}/api/kyc`.
    pub async fn submit(&self, submission: &Submission) -> Result<SubmissionId, KycApiError> {
        let endpoint = "POST /api/kyc";
        let url = api_url(&self.base_url, &["api", "kyc"])?;

        let record_json = submission.record_json()?;
        let mut files = Vec::with_capacity(submission.attachments.len());
        for attachment in &submission.attachments {
            let bytes = tokio::fs::read(&attachment.file.path)
                .await
                .map_err(|e| KycApiError::Attachment {
                    path: attachment.file.path.clone(),
                    source: e,
                })?;
            files.push(LoadedFile {
                part_name: attachment.slot.part_name(),
                file_name: attachment.file.name.clone(),
                content_type: attachment.file.content_type.clone(),
                bytes,
            });
        }

        let resp = crate::retry::retry_send(endpoint, || {
            let form = build_form(&record_json, &files);
            let http = self.http.clone();
            let url = url.clone();
            async move { http.post(url).multipart(form?).send().await }
        })
        .await
        .map_err(|e| KycApiError::Http {
            endpoint: endpoint.into(),
            source: e,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(KycApiError::ApiError {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        let body: SubmitResponse =
            resp.json()
                .await
                .map_err(|e| KycApiError::Deserialization {
                    endpoint: endpoint.into(),
                    source: e,
                })?;

        if body.success {
            if let Some(id) = body.created_id() {
                tracing::info!(id, attachments = files.len(), "KYC record created");
                return Ok(SubmissionId::new(id));
            }
        }
        Err(KycApiError::Refused {
            endpoint: endpoint.into(),
            message: body
                .message
                .unwrap_or_else(|| "submission not accepted".into()),
        })
    }
}

fn build_form(record_json: &str, files: &[LoadedFile]) -> Result<Form, reqwest::Error> {
    let mut form = Form::new().part(
        RECORD_PART,
        Part::text(record_json.to_string()).mime_str("application/json")?,
    );
    for file in files {
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }
        form = form.part(file.part_name, part);
    }
    Ok(form)
}

impl SubmissionSink for SubmissionClient {
    fn submit(
        &self,
        submission: &Submission,
    ) -> impl Future<Output = Result<SubmissionReceipt, SinkError>> + Send {
        async move {
            match SubmissionClient::submit(self, submission).await {
                Ok(id) => Ok(SubmissionReceipt { id }),
                Err(e) if e.is_transient() => Err(SinkError::Unavailable(e.to_string())),
                Err(e) => Err(SinkError::Rejected {
                    reason: e.to_string(),
                }),
            }
        }
    }
}
