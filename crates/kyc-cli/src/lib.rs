//! # kyc-cli: Operator CLI for KYC Intake
//!
//! Provides the `kyc` command-line interface over the intake engine.
//!
//! ## Subcommands
//!
//! - `kyc validate`: Full-record or single-step validation of a draft.
//! - `kyc check-contract`: Contract existence lookup.
//! - `kyc search`: Customer search.
//! - `kyc prefill`: Seed a draft record from a looked-up customer.
//! - `kyc submit`: Walk a draft through the wizard and submit it.
//!
//! ## Exit Codes
//!
//! `0` on success, `2` when the record (or contract) fails validation,
//! `1` on infrastructure errors (unreadable files, unreachable back office).
//!
//! ```bash
//! kyc validate draft.json --step identity --offline
//! kyc check-contract 200123456
//! kyc prefill "NGONO Marie" --index 0 --name-policy both-names > draft.json
//! kyc submit draft.json --messages messages/fr.yaml
//! ```

pub mod contract;
pub mod prefill;
pub mod submit;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use kyc_core::{Catalog, FieldErrors, Record};

/// Exit code for a record that fails validation.
pub const EXIT_INVALID: u8 = 2;

/// Read a draft record from a JSON file. Missing fields take defaults.
pub fn load_record(path: &Path) -> Result<Record> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading record {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing record {}", path.display()))
}

/// Load a message catalog, or an empty one that echoes keys.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("loading message catalog {}", path.display())),
        None => Ok(Catalog::new()),
    }
}

/// Print field errors, one per line, as `path: message [KIND]`.
pub fn print_errors(errors: &FieldErrors) {
    for e in errors.iter() {
        println!("  {}: {} [{}]", e.path, e.message, e.kind.as_str());
    }
    println!();
    println!("{} error(s)", errors.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_record_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.json");
        std::fs::write(&path, r#"{"lastName":"Mbarga","email":"a@b.com"}"#).unwrap();

        let record = load_record(&path).unwrap();
        assert_eq!(record.last_name, "Mbarga");
        assert_eq!(record.is_moral_entity, Some(false));
        assert_eq!(record.phone_numbers.len(), 1);
    }

    #[test]
    fn load_record_reports_path_on_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_record(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }

    #[test]
    fn load_catalog_reads_yaml_messages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fr.yaml");
        std::fs::write(
            &path,
            "kycForm:\n  errors:\n    required: Ce champ est obligatoire\n",
        )
        .unwrap();

        let catalog = load_catalog(Some(&path)).unwrap();
        assert_eq!(
            catalog.get("kycForm.errors.required"),
            Some("Ce champ est obligatoire")
        );
        assert!(load_catalog(None).unwrap().is_empty());
    }

    #[test]
    fn public_modules_are_accessible() {
        let _ = std::any::type_name::<contract::CheckContractArgs>();
        let _ = std::any::type_name::<contract::SearchArgs>();
        let _ = std::any::type_name::<prefill::PrefillArgs>();
        let _ = std::any::type_name::<submit::SubmitArgs>();
        let _ = std::any::type_name::<validate::ValidateArgs>();
    }
}
