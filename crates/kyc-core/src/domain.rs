//! # Intake Taxonomy: Single Source of Truth
//!
//! Every closed value set used by the intake record lives here: the five
//! identity-document kinds, the ten postfix region codes, and the small
//! enumerations of the personal, contract, and meter sections.
//!
//! ## Invariant
//!
//! `DocumentType` is the only definition of the document kinds. Every
//! `match` on it is exhaustive, so adding a sixth kind is a compile-time
//! checked change in the variant resolver and the validated record.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::UnknownTag;

// ─── Entity kind ─────────────────────────────────────────────────────

/// Whether the customer is an individual or a corporate ("moral") entity.
///
/// The draft record carries this as the `isMoralEntity` flag; this enum is
/// the typed view used by the schema and the form controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Physical,
    Moral,
}

impl EntityKind {
    /// Map the `isMoralEntity` flag onto the typed entity kind.
    pub fn from_flag(is_moral: bool) -> Self {
        if is_moral {
            Self::Moral
        } else {
            Self::Physical
        }
    }

    pub fn is_moral(&self) -> bool {
        matches!(self, Self::Moral)
    }

    /// The document type a record falls back to when the entity kind is
    /// selected: `TRADE_REGISTER` for companies, `CNI` for individuals.
    pub fn default_document_type(&self) -> DocumentType {
        match self {
            Self::Physical => DocumentType::Cni,
            Self::Moral => DocumentType::TradeRegister,
        }
    }
}

// ─── Identity documents ──────────────────────────────────────────────

/// The five identity-document kinds accepted at intake.
///
/// | Tag | Holder | Number |
/// |-----|--------|--------|
/// | `CNI` | individual | exactly 9 chars |
/// | `CS` | individual | exactly 7 chars |
/// | `RECP_CS` | individual | exactly 10 chars |
/// | `RECP_CNI` | individual | exactly 10 chars |
/// | `TRADE_REGISTER` | company | 7 to 15 chars |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    /// National identity card.
    Cni,
    /// Residence card.
    Cs,
    /// Receipt issued while a residence card is being produced.
    RecpCs,
    /// Receipt issued while a national identity card is being produced.
    RecpCni,
    /// Commercial trade register extract (companies only).
    TradeRegister,
}

/// Number of document kinds. Used by exhaustiveness tests.
pub const DOCUMENT_TYPE_COUNT: usize = 5;

impl DocumentType {
    pub fn all() -> &'static [DocumentType] {
        &[
            Self::Cni,
            Self::Cs,
            Self::RecpCs,
            Self::RecpCni,
            Self::TradeRegister,
        ]
    }

    /// The wire tag (`"CNI"`, `"RECP_CS"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cni => "CNI",
            Self::Cs => "CS",
            Self::RecpCs => "RECP_CS",
            Self::RecpCni => "RECP_CNI",
            Self::TradeRegister => "TRADE_REGISTER",
        }
    }

    /// Segment used to build `kycForm.errors.number.<key>` message keys.
    pub fn error_key(&self) -> &'static str {
        match self {
            Self::Cni => "cni",
            Self::Cs => "cs",
            Self::RecpCs => "recp_cs",
            Self::RecpCni => "recp_cni",
            Self::TradeRegister => "trade_register",
        }
    }

    /// The entity kind allowed to present this document.
    pub fn holder(&self) -> EntityKind {
        match self {
            Self::TradeRegister => EntityKind::Moral,
            Self::Cni | Self::Cs | Self::RecpCs | Self::RecpCni => EntityKind::Physical,
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CNI" => Ok(Self::Cni),
            "CS" => Ok(Self::Cs),
            "RECP_CS" => Ok(Self::RecpCs),
            "RECP_CNI" => Ok(Self::RecpCni),
            "TRADE_REGISTER" => Ok(Self::TradeRegister),
            other => Err(UnknownTag {
                kind: "document type",
                value: other.to_string(),
            }),
        }
    }
}

/// Region tag of a document-number postfix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Ad,
    Ce,
    Es,
    En,
    Lt,
    No,
    Ou,
    Su,
    Nw,
    Sw,
}

impl Region {
    pub fn all() -> &'static [Region] {
        &[
            Self::Ad,
            Self::Ce,
            Self::Es,
            Self::En,
            Self::Lt,
            Self::No,
            Self::Ou,
            Self::Su,
            Self::Nw,
            Self::Sw,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ad => "AD",
            Self::Ce => "CE",
            Self::Es => "ES",
            Self::En => "EN",
            Self::Lt => "LT",
            Self::No => "NO",
            Self::Ou => "OU",
            Self::Su => "SU",
            Self::Nw => "NW",
            Self::Sw => "SW",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Personal section ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    /// Reserved for moral entities.
    Company,
}

// ─── Contract section ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Active,
    Inactive,
}

/// Relationship of the customer to the supplied premises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Landlord,
    Tenant,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageType {
    Residential,
    Commercial,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeterStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeterType {
    Prepaid,
    Postpaid,
    Smart,
}
