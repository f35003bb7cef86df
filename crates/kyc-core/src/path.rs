//! # Field Paths
//!
//! Dotted paths into the record (`document.postfix.code`,
//! `phoneNumbers.0.number`). Paths use the camelCase wire names so the
//! UI can attach messages to its inputs without a mapping table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A dotted path addressing one field of the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Append a named segment.
    pub fn child(&self, segment: &str) -> Self {
        Self(format!("{}.{segment}", self.0))
    }

    /// Append a list index segment.
    pub fn index(&self, i: usize) -> Self {
        Self(format!("{}.{i}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this path equals `prefix` or lies below it.
    ///
    /// `document.number` is within `document` but `documentType` is not.
    pub fn is_within(&self, prefix: &str) -> bool {
        match self.0.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('.'),
            None => false,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FieldPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&FieldPath> for FieldPath {
    fn from(p: &FieldPath) -> Self {
        p.clone()
    }
}

/// Well-known paths of the record.
pub mod paths {
    pub const IS_MORAL_ENTITY: &str = "isMoralEntity";
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const GENDER: &str = "gender";
    pub const DATE_OF_BIRTH: &str = "dateOfBirth";

    pub const DOCUMENT: &str = "document";
    pub const DOCUMENT_TYPE: &str = "document.type";
    pub const DOCUMENT_NUMBER: &str = "document.number";
    pub const DOCUMENT_POSTFIX_POST: &str = "document.postfix.post";
    pub const DOCUMENT_POSTFIX_CODE: &str = "document.postfix.code";
    pub const DOCUMENT_VALIDITY_DATE: &str = "document.validityDate";
    pub const DOCUMENT_FRONT_IMAGE: &str = "document.frontImage";
    pub const DOCUMENT_BACK_IMAGE: &str = "document.backImage";

    pub const NUI_NUMBER: &str = "nuiDocument.number";
    pub const NUI_FILE: &str = "nuiDocument.file";

    pub const PHONE_NUMBERS: &str = "phoneNumbers";
    pub const EMAIL: &str = "email";

    pub const CONTRACT_NUMBER: &str = "contract.number";
    pub const CONTRACT_STATUS: &str = "contract.status";
    pub const CONTRACT_CUSTOMER_STATUS: &str = "contract.customerStatus";
    pub const CONTRACT_USAGE_TYPE: &str = "contract.usageType";
    pub const METER_DETAILS: &str = "contract.meterDetails";
    pub const METER_NUMBER: &str = "contract.meterDetails.number";
    pub const METER_STATUS: &str = "contract.meterDetails.status";
    pub const METER_TYPE: &str = "contract.meterDetails.type";

    pub const OTHER_CONTRACTS: &str = "otherContracts";
    pub const OTHER_CONTRACT_NUMBERS: &str = "otherContracts.numbers";
    pub const OTHER_CONTRACT_USAGE_TYPES: &str = "otherContracts.usageTypes";
}
