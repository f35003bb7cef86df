//! # kyc CLI entry point
//!
//! Parses command-line arguments, builds the back-office client from the
//! environment, and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use kyc_cli::contract::{run_check_contract, run_search, CheckContractArgs, SearchArgs};
use kyc_cli::prefill::{run_prefill, PrefillArgs};
use kyc_cli::submit::{run_submit, SubmitArgs};
use kyc_cli::validate::{run_validate, ValidateArgs};
use kyc_client::KycClient;

/// KYC intake CLI.
///
/// Validates draft records, checks contracts, searches customers, and
/// submits records to the back office configured by `KYC_API_URL`.
#[derive(Parser, Debug)]
#[command(name = "kyc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a draft record, whole or one wizard step.
    Validate(ValidateArgs),

    /// Check that a contract number exists.
    CheckContract(CheckContractArgs),

    /// Search customers by contract, meter, or name.
    Search(SearchArgs),

    /// Build a draft record from a looked-up customer.
    Prefill(PrefillArgs),

    /// Validate a draft through every wizard step and submit it.
    Submit(SubmitArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("cannot start async runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let client = match KycClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(1);
        }
    };

    let result = runtime.block_on(async {
        match &cli.command {
            Commands::Validate(args) => run_validate(args, &client).await,
            Commands::CheckContract(args) => run_check_contract(args, &client).await,
            Commands::Search(args) => run_search(args, &client).await,
            Commands::Prefill(args) => run_prefill(args, &client).await,
            Commands::Submit(args) => run_submit(args, &client).await,
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use kyc_schema::WizardStep;
    use kyc_state::NamePolicy;

    #[test]
    fn cli_parse_validate_with_step() {
        let cli = Cli::try_parse_from(["kyc", "validate", "draft.json", "--step", "identity"]).unwrap();
        if let Commands::Validate(args) = cli.command {
            assert_eq!(args.record, PathBuf::from("draft.json"));
            assert_eq!(args.step, Some(WizardStep::Identity));
            assert!(!args.offline);
        } else {
            panic!("expected validate");
        }
    }

    #[test]
    fn cli_parse_validate_rejects_unknown_step() {
        assert!(Cli::try_parse_from(["kyc", "validate", "draft.json", "--step", "payment"]).is_err());
    }

    #[test]
    fn cli_parse_validate_offline_with_messages() {
        let cli = Cli::try_parse_from([
            "kyc",
            "validate",
            "draft.json",
            "--offline",
            "--messages",
            "fr.yaml",
        ])
        .unwrap();
        if let Commands::Validate(args) = cli.command {
            assert!(args.offline);
            assert_eq!(args.messages, Some(PathBuf::from("fr.yaml")));
            assert_eq!(args.step, None);
        }
    }

    #[test]
    fn cli_parse_check_contract() {
        let cli = Cli::try_parse_from(["kyc", "check-contract", "200123456"]).unwrap();
        assert!(matches!(cli.command, Commands::CheckContract(ref a) if a.number == "200123456"));
    }

    #[test]
    fn cli_parse_prefill_defaults() {
        let cli = Cli::try_parse_from(["kyc", "prefill", "NGONO"]).unwrap();
        if let Commands::Prefill(args) = cli.command {
            assert_eq!(args.index, 0);
            assert_eq!(args.name_policy, NamePolicy::LastNameOnly);
            assert!(args.out.is_none());
        }
    }

    #[test]
    fn cli_parse_prefill_both_names() {
        let cli = Cli::try_parse_from([
            "kyc",
            "prefill",
            "NGONO",
            "--index",
            "2",
            "--name-policy",
            "both-names",
        ])
        .unwrap();
        if let Commands::Prefill(args) = cli.command {
            assert_eq!(args.index, 2);
            assert_eq!(args.name_policy, NamePolicy::BothNames);
        }
    }

    #[test]
    fn cli_parse_verbosity_is_global() {
        let cli = Cli::try_parse_from(["kyc", "search", "x", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_parse_submit() {
        let cli = Cli::try_parse_from(["kyc", "submit", "draft.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Submit(_)));
    }
}
