//! # Prefill CLI: Seed a draft record from a looked-up customer.
//!
//! ```bash
//! kyc prefill 200123456 > draft.json
//! kyc prefill "NGONO" --index 1 --name-policy both-names --out draft.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use kyc_client::KycClient;
use kyc_core::Record;
use kyc_state::{prefill_with, NamePolicy};

use crate::EXIT_INVALID;

/// Prefill subcommand arguments.
#[derive(Args, Debug)]
pub struct PrefillArgs {
    /// Search text used to find the customer.
    pub query: String,

    /// Which match to use when the search returns several.
    #[arg(long, default_value_t = 0)]
    pub index: usize,

    /// Where the customer's name goes: last-name-only or both-names.
    #[arg(long, default_value = "last-name-only")]
    pub name_policy: NamePolicy,

    /// Write the draft here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Execute the prefill subcommand.
pub async fn run_prefill(args: &PrefillArgs, client: &KycClient) -> Result<u8> {
    let customers = client
        .cms()
        .search(&args.query)
        .await
        .with_context(|| format!("searching customers for {:?}", args.query))?;

    let Some(customer) = customers.get(args.index) else {
        eprintln!(
            "No customer at index {} for {:?} ({} match(es))",
            args.index,
            args.query,
            customers.len()
        );
        return Ok(EXIT_INVALID);
    };

    let record = prefill_with(customer, &Record::default(), args.name_policy);
    let json = serde_json::to_string_pretty(&record)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, json.as_bytes())
                .with_context(|| format!("writing draft {}", path.display()))?;
            tracing::info!(contract = %customer.contract, out = %path.display(), "draft written");
        }
        None => println!("{json}"),
    }
    Ok(0)
}
