//! A customer as returned by the back-office search.
//!
//! Only the three fields the prefill mapper reads are typed; everything
//! else the search returns is kept verbatim in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Contract number.
    pub contract: String,
    pub full_name: String,
    /// Meter number, when the customer has one on record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meter: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Customer {
    pub fn new(contract: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            contract: contract.into(),
            full_name: full_name.into(),
            ..Self::default()
        }
    }

    pub fn with_meter(mut self, meter: impl Into<String>) -> Self {
        self.meter = Some(meter.into());
        self
    }
}
