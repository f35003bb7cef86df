//! # Validate CLI: Check a draft record against the intake rules.
//!
//! ```bash
//! # Whole record, including the contract existence lookup:
//! kyc validate draft.json
//!
//! # One wizard step, no network:
//! kyc validate draft.json --step identity --offline
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use kyc_client::KycClient;
use kyc_core::FieldErrors;
use kyc_schema::{RecordSchema, StepGate, UniquenessValidator, WizardStep};

use crate::{load_catalog, load_record, print_errors, EXIT_INVALID};

/// Validate subcommand arguments.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Draft record (JSON).
    pub record: PathBuf,

    /// Validate a single step: personal, identity, contact, contract.
    #[arg(long)]
    pub step: Option<WizardStep>,

    /// Message catalog (JSON or YAML) used to render errors.
    #[arg(long)]
    pub messages: Option<PathBuf>,

    /// Skip the contract existence lookup.
    #[arg(long)]
    pub offline: bool,

    /// Print errors as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the validate subcommand.
pub async fn run_validate(args: &ValidateArgs, client: &KycClient) -> Result<u8> {
    let record = load_record(&args.record)?;
    let schema = RecordSchema::new(load_catalog(args.messages.as_deref())?);
    let mut gate = StepGate::new(schema, UniquenessValidator::new(client.cms().clone()));

    let mut errors = match args.step {
        Some(step) => gate.validate_step(step, &record).err(),
        None => gate.schema().validate(&record).err(),
    }
    .unwrap_or_default();

    let looks_up = matches!(args.step, None | Some(WizardStep::ContractMeter));
    if looks_up && !args.offline {
        let found = gate.verify_contracts(&record, &errors).await;
        errors.extend(found);
    }

    tracing::debug!(
        record = %args.record.display(),
        step = ?args.step,
        errors = errors.len(),
        "validation finished"
    );
    report(args, &errors)
}

fn report(args: &ValidateArgs, errors: &FieldErrors) -> Result<u8> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(errors)?);
    } else if errors.is_empty() {
        let scope = args.step.map_or("record", |s| s.as_str());
        println!("OK: {} ({scope}) is valid", args.record.display());
    } else {
        println!("INVALID: {}", args.record.display());
        print_errors(errors);
    }
    Ok(if errors.is_empty() { 0 } else { EXIT_INVALID })
}
