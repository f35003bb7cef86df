//! # Submit CLI: Walk a draft through the wizard and submit it.
//!
//! Every step gate runs in order, so the first failing step is reported
//! the same way the interactive wizard would report it.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use kyc_client::KycClient;
use kyc_schema::{RecordSchema, StepGate, UniquenessValidator, WizardStep};
use kyc_state::{Wizard, WizardError};

use crate::{load_catalog, load_record, print_errors, EXIT_INVALID};

/// Submit subcommand arguments.
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Draft record (JSON).
    pub record: PathBuf,

    /// Message catalog (JSON or YAML) used to render errors.
    #[arg(long)]
    pub messages: Option<PathBuf>,
}

/// Execute the submit subcommand.
pub async fn run_submit(args: &SubmitArgs, client: &KycClient) -> Result<u8> {
    let record = load_record(&args.record)?;
    let schema = RecordSchema::new(load_catalog(args.messages.as_deref())?);
    let gate = StepGate::new(schema, UniquenessValidator::new(client.cms().clone()));
    let mut wizard = Wizard::resume(gate, record);

    while wizard.step() != WizardStep::Review {
        match wizard.next().await {
            Ok(_) => {}
            Err(WizardError::Validation(errors)) => {
                println!("INVALID: step {} of {}", wizard.step(), args.record.display());
                print_errors(&errors);
                return Ok(EXIT_INVALID);
            }
            Err(e) => return Err(e.into()),
        }
    }

    match wizard.submit(client.submissions()).await {
        Ok(receipt) => {
            println!("Submitted: {} (session {})", receipt.id, wizard.session());
            Ok(0)
        }
        Err(WizardError::Validation(errors)) => {
            println!("INVALID: {}", args.record.display());
            print_errors(&errors);
            Ok(EXIT_INVALID)
        }
        Err(e) => Err(anyhow::Error::new(e).context("submitting KYC record")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyc_client::KycApiConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn stops_at_first_failing_step_without_submitting() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/kyc"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let draft = dir.path().join("draft.json");
        std::fs::write(&draft, r#"{"lastName":"Mbarga"}"#).unwrap();

        let args = SubmitArgs {
            record: draft,
            messages: None,
        };
        let client = KycClient::new(KycApiConfig::new(mock_server.uri().parse().unwrap())).unwrap();
        assert_eq!(run_submit(&args, &client).await.unwrap(), EXIT_INVALID);
    }
}
