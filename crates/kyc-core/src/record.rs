//! # Draft Record
//!
//! The record as it is being filled in by the wizard. Every field is
//! permissive here: optional values may be absent and the document tag is
//! kept as the raw string the user submitted, so the schema can report an
//! unknown tag as a discriminant failure instead of failing to decode.
//!
//! The typed, narrowed counterpart produced by validation lives in
//! [`crate::valid`].
//!
//! ## Wire shape
//!
//! Field names are camelCase. `otherContracts` is held as a list of
//! entries but travels as three parallel lists (`numbers`, `usageTypes`,
//! `meterDetails`) so existing consumers keep working.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    ContractStatus, CustomerStatus, DocumentType, Gender, MeterStatus, MeterType, Region,
    UsageType,
};

/// Reference to a file picked by the user.
///
/// The engine only stores the reference; it never opens the file. The
/// HTTP submission sink is the only consumer of `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    /// Original file name as reported by the picker.
    pub name: String,
    /// Location of the file contents.
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl FileRef {
    /// Reference a file on disk, deriving `name` from the last path segment.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            path,
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

// ─── Record ──────────────────────────────────────────────────────────

/// One KYC submission being built by the wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Record {
    /// Entity discriminator. `None` is reported as a discriminant failure.
    pub is_moral_entity: Option<bool>,
    pub first_name: Option<String>,
    /// Family name, or company name for a moral entity.
    pub last_name: String,
    pub gender: Option<Gender>,
    /// Birth date, or creation date for a moral entity.
    pub date_of_birth: Option<NaiveDate>,
    pub document: DocumentDraft,
    pub nui_document: NuiDraft,
    pub phone_numbers: Vec<PhoneEntry>,
    pub location: Location,
    pub email: String,
    pub contract: ContractDraft,
    pub other_contracts: OtherContracts,
}

impl Default for Record {
    /// The empty record a wizard starts from.
    fn default() -> Self {
        Self {
            is_moral_entity: Some(false),
            first_name: Some(String::new()),
            last_name: String::new(),
            gender: None,
            date_of_birth: None,
            document: DocumentDraft::default(),
            nui_document: NuiDraft::default(),
            phone_numbers: vec![PhoneEntry::default()],
            location: Location::default(),
            email: String::new(),
            contract: ContractDraft::default(),
            other_contracts: OtherContracts::default(),
        }
    }
}

impl Record {
    /// The entity flag, treating an absent flag as a physical person.
    pub fn is_moral(&self) -> bool {
        self.is_moral_entity.unwrap_or(false)
    }
}

// ─── Identity document ───────────────────────────────────────────────

/// Identity-document fields shared by every variant, before narrowing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentDraft {
    /// Raw discriminator tag as submitted.
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub number: String,
    pub postfix: PostfixDraft,
    pub validity_date: Option<NaiveDate>,
    pub front_image: Option<FileRef>,
    pub back_image: Option<FileRef>,
}

impl DocumentDraft {
    /// An empty document of the given variant.
    pub fn of_type(doc_type: Option<DocumentType>) -> Self {
        Self {
            doc_type: doc_type.map(|t| t.as_str().to_string()),
            ..Self::default()
        }
    }

    /// The parsed tag, if present and recognized.
    pub fn document_type(&self) -> Option<DocumentType> {
        self.doc_type.as_deref().and_then(|t| t.parse().ok())
    }

    /// Whether any variant-specific field holds user input.
    pub fn has_variant_data(&self) -> bool {
        !self.number.is_empty()
            || self.postfix.post.is_some()
            || !self.postfix.code.is_empty()
            || self.validity_date.is_some()
            || self.front_image.is_some()
            || self.back_image.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostfixDraft {
    pub post: Option<Region>,
    pub code: String,
}

/// National unique identifier document. Independent of the document tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NuiDraft {
    pub number: String,
    pub file: Option<FileRef>,
}

// ─── Contact ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhoneEntry {
    pub number: String,
    pub is_whatsapp: bool,
}

impl PhoneEntry {
    pub fn new(number: impl Into<String>, is_whatsapp: bool) -> Self {
        Self {
            number: number.into(),
            is_whatsapp,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    pub reference: Option<String>,
    pub gps_coordinates: Option<String>,
}

// ─── Contract ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractDraft {
    pub number: String,
    pub status: Option<ContractStatus>,
    pub customer_status: Option<CustomerStatus>,
    pub usage_type: Option<UsageType>,
    pub activity: Option<String>,
    pub has_meter_details: bool,
    pub meter_details: MeterDraft,
}

impl Default for ContractDraft {
    fn default() -> Self {
        Self {
            number: String::new(),
            status: Some(ContractStatus::Active),
            customer_status: Some(CustomerStatus::Tenant),
            usage_type: None,
            activity: Some(String::new()),
            has_meter_details: false,
            meter_details: MeterDraft::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeterDraft {
    pub number: String,
    pub status: Option<MeterStatus>,
    #[serde(rename = "type")]
    pub meter_type: Option<MeterType>,
    pub characteristics: Option<String>,
    pub itinerary_number: Option<String>,
    pub transformer_power: Option<String>,
    pub voltage: Option<String>,
}

impl Default for MeterDraft {
    fn default() -> Self {
        Self {
            number: String::new(),
            status: Some(MeterStatus::Active),
            meter_type: Some(MeterType::Postpaid),
            characteristics: None,
            itinerary_number: None,
            transformer_power: None,
            voltage: None,
        }
    }
}

impl MeterDraft {
    /// Whether any free-text meter field holds user input.
    pub fn has_user_data(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        !self.number.trim().is_empty()
            || filled(&self.characteristics)
            || filled(&self.itinerary_number)
            || filled(&self.transformer_power)
            || filled(&self.voltage)
    }
}

// ─── Other contracts ─────────────────────────────────────────────────

/// One additional contract held by the same customer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtherContractEntry {
    pub number: String,
    pub usage_type: Option<UsageType>,
    pub meter_details: Option<MeterDraft>,
}

impl OtherContractEntry {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            ..Self::default()
        }
    }
}

/// Additional contracts, held as entries and serialized as parallel lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OtherContractsWire", into = "OtherContractsWire")]
pub struct OtherContracts {
    pub has_other_contracts: bool,
    pub entries: Vec<OtherContractEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct OtherContractsWire {
    #[serde(alias = "hasOther")]
    has_other_contracts: bool,
    numbers: Vec<String>,
    #[serde(alias = "usageType")]
    usage_types: Vec<Option<UsageType>>,
    meter_details: Vec<Option<MeterDraft>>,
}

impl From<OtherContractsWire> for OtherContracts {
    fn from(wire: OtherContractsWire) -> Self {
        let mut usage_types = wire.usage_types.into_iter();
        let mut meters = wire.meter_details.into_iter();
        let entries = wire
            .numbers
            .into_iter()
            .map(|number| OtherContractEntry {
                number,
                usage_type: usage_types.next().flatten(),
                meter_details: meters.next().flatten(),
            })
            .collect();
        Self {
            has_other_contracts: wire.has_other_contracts,
            entries,
        }
    }
}

impl From<OtherContracts> for OtherContractsWire {
    fn from(value: OtherContracts) -> Self {
        let mut wire = OtherContractsWire {
            has_other_contracts: value.has_other_contracts,
            ..Self::default()
        };
        for entry in value.entries {
            wire.numbers.push(entry.number);
            wire.usage_types.push(entry.usage_type);
            wire.meter_details.push(entry.meter_details);
        }
        wire
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_matches_wizard_start_state() {
        let record = Record::default();
        assert_eq!(record.is_moral_entity, Some(false));
        assert_eq!(record.phone_numbers.len(), 1);
        assert!(record.document.doc_type.is_none());
        assert_eq!(record.contract.status, Some(ContractStatus::Active));
        assert_eq!(record.contract.customer_status, Some(CustomerStatus::Tenant));
        assert_eq!(record.contract.meter_details.meter_type, Some(MeterType::Postpaid));
        assert!(!record.contract.has_meter_details);
        assert!(record.other_contracts.entries.is_empty());
    }

    #[test]
    fn missing_fields_decode_to_defaults() {
        let record: Record = serde_json::from_str(r#"{"lastName":"Doe"}"#).unwrap();
        assert_eq!(record.last_name, "Doe");
        assert_eq!(record.is_moral_entity, Some(false));
        assert_eq!(record.phone_numbers.len(), 1);
    }

    #[test]
    fn explicit_null_moral_flag_is_kept_absent() {
        let record: Record = serde_json::from_str(r#"{"isMoralEntity":null}"#).unwrap();
        assert_eq!(record.is_moral_entity, None);
    }

    #[test]
    fn unknown_document_tag_survives_decoding() {
        let record: Record =
            serde_json::from_str(r#"{"document":{"type":"PASSPORT","number":"X1"}}"#).unwrap();
        assert_eq!(record.document.doc_type.as_deref(), Some("PASSPORT"));
        assert_eq!(record.document.document_type(), None);
    }

    #[test]
    fn other_contracts_travel_as_parallel_lists() {
        let other = OtherContracts {
            has_other_contracts: true,
            entries: vec![
                OtherContractEntry {
                    number: "123456789".into(),
                    usage_type: Some(UsageType::Commercial),
                    meter_details: None,
                },
                OtherContractEntry::new("987654321"),
            ],
        };
        let json = serde_json::to_value(&other).unwrap();
        assert_eq!(json["hasOtherContracts"], true);
        assert_eq!(json["numbers"], serde_json::json!(["123456789", "987654321"]));
        assert_eq!(json["usageTypes"], serde_json::json!(["commercial", null]));
        assert_eq!(json["meterDetails"], serde_json::json!([null, null]));

        let back: OtherContracts = serde_json::from_value(json).unwrap();
        assert_eq!(back, other);
    }

    #[test]
    fn short_parallel_lists_pad_with_none() {
        let other: OtherContracts = serde_json::from_str(
            r#"{"hasOther":true,"numbers":["111111111","222222222"],"usageType":["residential"]}"#,
        )
        .unwrap();
        assert_eq!(other.entries.len(), 2);
        assert_eq!(other.entries[0].usage_type, Some(UsageType::Residential));
        assert_eq!(other.entries[1].usage_type, None);
    }

    #[test]
    fn file_ref_derives_name_from_path() {
        let file = FileRef::from_path("/tmp/uploads/front side.png").with_content_type("image/png");
        assert_eq!(file.name, "front side.png");
        assert_eq!(file.content_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn meter_defaults_carry_no_user_data() {
        assert!(!MeterDraft::default().has_user_data());
        let meter = MeterDraft {
            voltage: Some("220V".into()),
            ..MeterDraft::default()
        };
        assert!(meter.has_user_data());
    }
}
