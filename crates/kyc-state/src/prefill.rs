//! Seeding a fresh record from a looked-up customer.
//!
//! A one-time copy: the customer's contract number, name and meter number
//! are written onto a clone of the default record and
//! `contract.hasMeterDetails` is forced on. Nothing else is mapped.

use std::str::FromStr;

use kyc_core::{Customer, Record};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the customer's single full-name field lands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamePolicy {
    /// `lastName` only; `firstName` keeps its default.
    #[default]
    LastNameOnly,
    /// Both `firstName` and `lastName`.
    BothNames,
}

impl NamePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LastNameOnly => "last-name-only",
            Self::BothNames => "both-names",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown name policy: {0:?} (expected last-name-only or both-names)")]
pub struct UnknownNamePolicy(pub String);

impl FromStr for NamePolicy {
    type Err = UnknownNamePolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last-name-only" => Ok(Self::LastNameOnly),
            "both-names" => Ok(Self::BothNames),
            other => Err(UnknownNamePolicy(other.to_string())),
        }
    }
}

/// [`prefill_with`] under the default name policy.
pub fn prefill(customer: &Customer, defaults: &Record) -> Record {
    prefill_with(customer, defaults, NamePolicy::default())
}

pub fn prefill_with(customer: &Customer, defaults: &Record, policy: NamePolicy) -> Record {
    let mut record = defaults.clone();
    record.contract.number = customer.contract.clone();
    record.last_name = customer.full_name.clone();
    if policy == NamePolicy::BothNames {
        record.first_name = Some(customer.full_name.clone());
    }
    record.contract.has_meter_details = true;
    if let Some(meter) = &customer.meter {
        record.contract.meter_details.number = meter.clone();
    }
    record
}
