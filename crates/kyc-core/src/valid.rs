//! # Validated Record
//!
//! The narrowed form of [`crate::record::Record`], produced only by the
//! schema after every check has passed. The identity document is a sum
//! type with one constructor per document kind, each carrying exactly the
//! fields that kind requires; there is no way to hold a trade-register
//! document with a postfix, or a national identity card without one.
//!
//! This is also the JSON part of the submission payload.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::domain::{
    ContractStatus, CustomerStatus, DocumentType, Gender, MeterStatus, MeterType, Region,
    UsageType,
};
use crate::record::{FileRef, Location, PhoneEntry};

/// A record that passed full validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidRecord {
    pub is_moral_entity: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    pub last_name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub document: IdentityDocument,
    pub nui_document: NuiDocument,
    pub phone_numbers: Vec<PhoneEntry>,
    pub location: Location,
    pub email: String,
    pub contract: Contract,
    #[serde(serialize_with = "serialize_other_contracts")]
    pub other_contracts: Vec<OtherContract>,
}

impl ValidRecord {
    /// First and last name joined, as stored by the back office.
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), Some(self.last_name.as_str())]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ─── Identity document ───────────────────────────────────────────────

/// An identity document narrowed to exactly one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentityDocument {
    Cni(PostfixedDocument),
    Cs(PostfixedDocument),
    RecpCs(PostfixedDocument),
    RecpCni(PostfixedDocument),
    TradeRegister(RegisterDocument),
}

impl IdentityDocument {
    pub fn document_type(&self) -> DocumentType {
        match self {
            Self::Cni(_) => DocumentType::Cni,
            Self::Cs(_) => DocumentType::Cs,
            Self::RecpCs(_) => DocumentType::RecpCs,
            Self::RecpCni(_) => DocumentType::RecpCni,
            Self::TradeRegister(_) => DocumentType::TradeRegister,
        }
    }

    pub fn number(&self) -> &str {
        match self {
            Self::Cni(d) | Self::Cs(d) | Self::RecpCs(d) | Self::RecpCni(d) => &d.number,
            Self::TradeRegister(d) => &d.number,
        }
    }

    /// The postfix; `None` only for trade-register extracts.
    pub fn postfix(&self) -> Option<&Postfix> {
        match self {
            Self::Cni(d) | Self::Cs(d) | Self::RecpCs(d) | Self::RecpCni(d) => Some(&d.postfix),
            Self::TradeRegister(_) => None,
        }
    }

    pub fn validity_date(&self) -> NaiveDate {
        match self {
            Self::Cni(d) | Self::Cs(d) | Self::RecpCs(d) | Self::RecpCni(d) => d.validity_date,
            Self::TradeRegister(d) => d.validity_date,
        }
    }

    pub fn front_image(&self) -> &FileRef {
        match self {
            Self::Cni(d) | Self::Cs(d) | Self::RecpCs(d) | Self::RecpCni(d) => &d.front_image,
            Self::TradeRegister(d) => &d.front_image,
        }
    }

    pub fn back_image(&self) -> &FileRef {
        match self {
            Self::Cni(d) | Self::Cs(d) | Self::RecpCs(d) | Self::RecpCni(d) => &d.back_image,
            Self::TradeRegister(d) => &d.back_image,
        }
    }
}

/// Fields of the individual document kinds (CNI, CS and their receipts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostfixedDocument {
    pub number: String,
    pub postfix: Postfix,
    pub validity_date: NaiveDate,
    pub front_image: FileRef,
    pub back_image: FileRef,
}

/// Fields of a trade-register extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDocument {
    pub number: String,
    pub validity_date: NaiveDate,
    pub front_image: FileRef,
    pub back_image: FileRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Postfix {
    pub post: Region,
    /// Two digits, `01` to `99`.
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NuiDocument {
    pub number: String,
    pub file: FileRef,
}

// ─── Contract ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub number: String,
    pub status: ContractStatus,
    pub customer_status: CustomerStatus,
    pub usage_type: UsageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    pub has_meter_details: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter_details: Option<MeterDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterDetails {
    pub number: String,
    pub status: MeterStatus,
    #[serde(rename = "type")]
    pub meter_type: MeterType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characteristics: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itinerary_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformer_power: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherContract {
    pub number: String,
    pub usage_type: Option<UsageType>,
    pub meter_details: Option<MeterDetails>,
}

fn serialize_other_contracts<S: Serializer>(
    entries: &[OtherContract],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Wire<'a> {
        has_other_contracts: bool,
        numbers: Vec<&'a str>,
        usage_types: Vec<Option<UsageType>>,
        meter_details: Vec<Option<&'a MeterDetails>>,
    }

    Wire {
        has_other_contracts: !entries.is_empty(),
        numbers: entries.iter().map(|e| e.number.as_str()).collect(),
        usage_types: entries.iter().map(|e| e.usage_type).collect(),
        meter_details: entries.iter().map(|e| e.meter_details.as_ref()).collect(),
    }
    .serialize(serializer)
}
