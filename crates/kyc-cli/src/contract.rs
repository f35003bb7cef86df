//! # Contract CLI: Existence lookup and customer search.
//!
//! ```bash
//! kyc check-contract 200123456
//! kyc search "NGONO Marie" --json
//! ```

use anyhow::{Context, Result};
use clap::Args;

use kyc_client::KycClient;
use kyc_schema::Pattern;

use crate::EXIT_INVALID;

/// Check-contract subcommand arguments.
#[derive(Args, Debug)]
pub struct CheckContractArgs {
    /// Contract number (nine digits).
    pub number: String,
}

/// Search subcommand arguments.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Contract number, meter number, or customer name.
    pub query: String,

    /// Print the matches as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the check-contract subcommand.
///
/// Malformed numbers are rejected without a lookup.
pub async fn run_check_contract(args: &CheckContractArgs, client: &KycClient) -> Result<u8> {
    if !Pattern::ContractNumber.is_match(&args.number) {
        println!("INVALID: {} is not a nine-digit contract number", args.number);
        return Ok(EXIT_INVALID);
    }

    let exists = client
        .cms()
        .contract_exists(&args.number)
        .await
        .with_context(|| format!("looking up contract {}", args.number))?;

    if exists {
        println!("OK: contract {} exists", args.number);
        Ok(0)
    } else {
        println!("NOT FOUND: contract {}", args.number);
        Ok(EXIT_INVALID)
    }
}

/// Execute the search subcommand.
pub async fn run_search(args: &SearchArgs, client: &KycClient) -> Result<u8> {
    let customers = client
        .cms()
        .search(&args.query)
        .await
        .with_context(|| format!("searching customers for {:?}", args.query))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&customers)?);
        return Ok(0);
    }

    if customers.is_empty() {
        println!("No customer matches {:?}", args.query);
        return Ok(0);
    }

    println!("  {:<4} {:<12} {:<14} NAME", "#", "CONTRACT", "METER");
    for (i, c) in customers.iter().enumerate() {
        println!(
            "  {:<4} {:<12} {:<14} {}",
            i,
            c.contract,
            c.meter.as_deref().unwrap_or("-"),
            c.full_name
        );
    }
    println!();
    println!("Total: {} customer(s)", customers.len());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyc_client::KycApiConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(uri: &str) -> KycClient {
        KycClient::new(KycApiConfig::new(uri.parse().unwrap())).unwrap()
    }

    #[tokio::test]
    async fn malformed_number_is_not_looked_up() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let args = CheckContractArgs {
            number: "12AB".into(),
        };
        let code = run_check_contract(&args, &client(&mock_server.uri())).await.unwrap();
        assert_eq!(code, EXIT_INVALID);
    }

    #[tokio::test]
    async fn exit_code_follows_existence() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/cms/200123456"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"exists": true})))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/cms/999999999"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"exists": false})))
            .mount(&mock_server)
            .await;

        let c = client(&mock_server.uri());
        let found = CheckContractArgs {
            number: "200123456".into(),
        };
        let missing = CheckContractArgs {
            number: "999999999".into(),
        };
        assert_eq!(run_check_contract(&found, &c).await.unwrap(), 0);
        assert_eq!(run_check_contract(&missing, &c).await.unwrap(), EXIT_INVALID);
    }
}
