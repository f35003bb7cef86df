//! Contract tests for SubmissionClient against `POST /api/kyc`.

use std::path::PathBuf;

use chrono::NaiveDate;
use kyc_client::{KycApiConfig, KycApiError, KycClient};
use kyc_core::{FileRef, Gender, KeyEcho, PhoneEntry, Record, Region, Submission, UsageType};
use kyc_schema::RecordSchema;
use kyc_state::{SinkError, SubmissionSink};
use wiremock::matchers::{body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(mock_server: &MockServer) -> KycClient {
    let config = KycApiConfig::new(mock_server.uri().parse().unwrap()).with_timeout_secs(5);
    KycClient::new(config).unwrap()
}

/// Write the three attachments under a per-test directory.
fn attachments(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("kyc-client-{test}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("front.png"), b"front-bytes").unwrap();
    std::fs::write(dir.join("back.png"), b"back-bytes").unwrap();
    std::fs::write(dir.join("nui.pdf"), b"nui-bytes").unwrap();
    dir
}

fn submission(dir: &std::path::Path) -> Submission {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
    let mut r = Record::default();
    r.first_name = Some("Jean".into());
    r.last_name = "Mbarga".into();
    r.gender = Some(Gender::Male);
    r.date_of_birth = Some(date(1985, 3, 14));
    r.document.doc_type = Some("CNI".into());
    r.document.number = "123456789".into();
    r.document.postfix.post = Some(Region::Ce);
    r.document.postfix.code = "12".into();
    r.document.validity_date = Some(date(2030, 1, 1));
    r.document.front_image = Some(FileRef::from_path(dir.join("front.png")).with_content_type("image/png"));
    r.document.back_image = Some(FileRef::from_path(dir.join("back.png")));
    r.nui_document.number = "P123456789012A".into();
    r.nui_document.file = Some(FileRef::from_path(dir.join("nui.pdf")));
    r.phone_numbers = vec![PhoneEntry::new("612345678", true)];
    r.email = "jean@example.cm".into();
    r.contract.number = "200123456".into();
    r.contract.usage_type = Some(UsageType::Residential);

    let valid = RecordSchema::new(KeyEcho)
        .with_today(date(2024, 6, 1))
        .validate(&r)
        .unwrap();
    Submission::assemble(valid)
}

#[tokio::test]
async fn submit_sends_multipart_with_record_and_files() {
    let mock_server = MockServer::start().await;
    let dir = attachments("multipart");

    Mock::given(method("POST"))
        .and(path("/api/kyc"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"formData\""))
        .and(body_string_contains("\"contract\""))
        .and(body_string_contains("name=\"idFrontImage\"; filename=\"front.png\""))
        .and(body_string_contains("name=\"idBackImage\""))
        .and(body_string_contains("name=\"niuFile\""))
        .and(body_string_contains("nui-bytes"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "success": true,
            "data": {"id": "kyc-42"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let id = client.submissions().submit(&submission(&dir)).await.unwrap();
    assert_eq!(id.as_str(), "kyc-42");
}

#[tokio::test]
async fn submit_reports_refusal_message() {
    let mock_server = MockServer::start().await;
    let dir = attachments("refused");

    Mock::given(method("POST"))
        .and(path("/api/kyc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "message": "contract already registered"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.submissions().submit(&submission(&dir)).await.unwrap_err();
    match err {
        KycApiError::Refused { message, .. } => assert_eq!(message, "contract already registered"),
        other => panic!("expected refusal, got {other:?}"),
    }
}

#[tokio::test]
async fn sink_maps_server_errors_to_unavailable() {
    let mock_server = MockServer::start().await;
    let dir = attachments("unavailable");

    Mock::given(method("POST"))
        .and(path("/api/kyc"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = SubmissionSink::submit(client.submissions(), &submission(&dir))
        .await
        .unwrap_err();
    assert!(matches!(err, SinkError::Unavailable(_)));
}

#[tokio::test]
async fn sink_maps_client_errors_to_rejected() {
    let mock_server = MockServer::start().await;
    let dir = attachments("rejected");

    Mock::given(method("POST"))
        .and(path("/api/kyc"))
        .respond_with(ResponseTemplate::new(422).set_body_string("email invalid"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = SubmissionSink::submit(client.submissions(), &submission(&dir))
        .await
        .unwrap_err();
    match err {
        SinkError::Rejected { reason } => assert!(reason.contains("email invalid")),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_attachment_fails_before_sending() {
    let mock_server = MockServer::start().await;
    let dir = attachments("missing");
    let sub = submission(&dir);
    std::fs::remove_file(dir.join("nui.pdf")).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/kyc"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.submissions().submit(&sub).await.unwrap_err();
    assert!(matches!(err, KycApiError::Attachment { .. }));
}
