//! # Form State Controller
//!
//! Keeps dependent fields consistent as discriminators change. Four
//! discriminators drive resets:
//!
//! ```text
//! isMoralEntity             ──▶ document reset to the entity default,
//!                               gender / first name swapped, dateOfBirth cleared
//! document.type             ──▶ number, postfix, validityDate, images cleared
//! contract.hasMeterDetails  ──▶ (to false) meter details back to defaults
//! otherContracts.hasOther…  ──▶ (to false) entries cleared
//! ```
//!
//! [`reduce`] is the pure form: it returns a new record and never touches
//! its input. [`FormController`] wraps it with change detection so that a
//! reset fires exactly once per actual change, whether the change arrives
//! as a [`DiscriminatorChange`] or as a direct edit followed by
//! [`FormController::sync`]. Setting a discriminator to its current value
//! fires nothing. No reset touches a field it does not own; in particular
//! the NUI document survives every document-type change.
//!
//! A document type whose holder differs from the current entity kind is
//! not offered: selecting `TRADE_REGISTER` for an individual (or `CNI` for a
//! company) keeps the previous type and fires nothing.

use chrono::{DateTime, Utc};
use kyc_core::{
    DocumentDraft, DocumentType, EntityKind, Gender, MeterDraft, OtherContractEntry, PhoneEntry,
    Record,
};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

// ─── Changes and resets ──────────────────────────────────────────────

/// A new value for one discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscriminatorChange {
    /// `isMoralEntity` set to the given flag.
    MoralEntity(bool),
    /// `document.type` set to the given kind (or cleared).
    DocumentType(Option<DocumentType>),
    /// `contract.hasMeterDetails` set.
    HasMeterDetails(bool),
    /// `otherContracts.hasOtherContracts` set.
    HasOtherContracts(bool),
}

/// A reset that fired in response to a discriminator change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reset", rename_all = "snake_case")]
pub enum Reset {
    /// The entity kind changed; personal and document fields were reset.
    EntityKind { to: EntityKind },
    /// The document type changed; variant fields were cleared.
    DocumentVariant {
        from: Option<String>,
        to: Option<String>,
    },
    /// Meter details were turned off and reset to defaults.
    MeterDetails,
    /// Other contracts were turned off and their entries cleared.
    OtherContracts,
}

impl std::fmt::Display for Reset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntityKind { to } => write!(f, "entity kind -> {to:?}"),
            Self::DocumentVariant { from, to } => write!(
                f,
                "document type {} -> {}",
                from.as_deref().unwrap_or("none"),
                to.as_deref().unwrap_or("none")
            ),
            Self::MeterDetails => f.write_str("meter details cleared"),
            Self::OtherContracts => f.write_str("other contracts cleared"),
        }
    }
}

/// Apply a change and its reset in place. Returns `None` when the
/// discriminator already held the value or the document type is not
/// offered to the record's entity kind.
pub fn apply(record: &mut Record, change: DiscriminatorChange) -> Option<Reset> {
    match change {
        DiscriminatorChange::MoralEntity(flag) => {
            if record.is_moral_entity == Some(flag) {
                return None;
            }
            record.is_moral_entity = Some(flag);
            Some(reset_entity(record, EntityKind::from_flag(flag)))
        }
        DiscriminatorChange::DocumentType(doc_type) => {
            let tag = doc_type.map(|t| t.as_str().to_string());
            if record.document.doc_type == tag {
                return None;
            }
            if !offered(record.is_moral_entity, tag.as_deref()) {
                debug!(
                    document_type = ?tag,
                    is_moral_entity = ?record.is_moral_entity,
                    "document type not offered"
                );
                return None;
            }
            let from = record.document.doc_type.take();
            record.document = DocumentDraft::of_type(doc_type);
            Some(Reset::DocumentVariant { from, to: tag })
        }
        DiscriminatorChange::HasMeterDetails(on) => {
            if record.contract.has_meter_details == on {
                return None;
            }
            record.contract.has_meter_details = on;
            if on {
                return None;
            }
            record.contract.meter_details = MeterDraft::default();
            Some(Reset::MeterDetails)
        }
        DiscriminatorChange::HasOtherContracts(on) => {
            if record.other_contracts.has_other_contracts == on {
                return None;
            }
            record.other_contracts.has_other_contracts = on;
            if on {
                return None;
            }
            record.other_contracts.entries.clear();
            Some(Reset::OtherContracts)
        }
    }
}

/// Pure form of [`apply`]: the record after the change and its reset.
pub fn reduce(record: &Record, change: DiscriminatorChange) -> Record {
    let mut next = record.clone();
    apply(&mut next, change);
    next
}

/// Whether `tag` may be selected for the given entity flag. Unknown tags
/// and an unset flag are left to the schema.
fn offered(is_moral_entity: Option<bool>, tag: Option<&str>) -> bool {
    let doc_type = tag.and_then(|t| t.parse::<DocumentType>().ok());
    match (is_moral_entity, doc_type) {
        (Some(flag), Some(doc_type)) => doc_type.holder() == EntityKind::from_flag(flag),
        _ => true,
    }
}

fn reset_entity(record: &mut Record, kind: EntityKind) -> Reset {
    record.document = DocumentDraft::of_type(Some(kind.default_document_type()));
    record.date_of_birth = None;
    match kind {
        EntityKind::Moral => {
            record.gender = Some(Gender::Company);
            record.first_name = None;
        }
        EntityKind::Physical => {
            record.gender = None;
            record.first_name = Some(String::new());
        }
    }
    Reset::EntityKind { to: kind }
}

// ─── Controller ──────────────────────────────────────────────────────

/// Errors from list operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// At least one phone number must remain.
    #[error("cannot remove the last phone number")]
    LastPhoneNumber,

    #[error("{list} has no entry at index {index} (length {len})")]
    IndexOutOfRange {
        list: &'static str,
        index: usize,
        len: usize,
    },
}

/// A fired reset with the time it fired.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionRecord {
    pub reset: Reset,
    pub at: DateTime<Utc>,
}

/// Discriminator values as last observed by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Observed {
    is_moral_entity: Option<bool>,
    doc_type: Option<String>,
    has_meter_details: bool,
    has_other_contracts: bool,
}

impl Observed {
    fn of(record: &Record) -> Self {
        Self {
            is_moral_entity: record.is_moral_entity,
            doc_type: record.document.doc_type.clone(),
            has_meter_details: record.contract.has_meter_details,
            has_other_contracts: record.other_contracts.has_other_contracts,
        }
    }
}

/// Owns the draft record and keeps its dependent fields consistent.
#[derive(Debug, Clone)]
pub struct FormController {
    record: Record,
    observed: Observed,
    transitions: Vec<TransitionRecord>,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new(Record::default())
    }
}

impl FormController {
    pub fn new(record: Record) -> Self {
        Self {
            observed: Observed::of(&record),
            record,
            transitions: Vec::new(),
        }
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    /// Ordered log of every reset that fired.
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// Replace the record wholesale, e.g. on restart. Fires nothing.
    pub fn replace(&mut self, record: Record) {
        self.observed = Observed::of(&record);
        self.record = record;
        self.transitions.clear();
    }

    /// Set one discriminator, firing its reset if the value changed.
    pub fn set(&mut self, change: DiscriminatorChange) -> Option<Reset> {
        let reset = apply(&mut self.record, change);
        self.observed = Observed::of(&self.record);
        if let Some(reset) = &reset {
            self.log(reset.clone());
        }
        reset
    }

    /// Edit the record directly, then fire the resets the edit implies.
    pub fn edit(&mut self, f: impl FnOnce(&mut Record)) -> Vec<Reset> {
        f(&mut self.record);
        self.sync()
    }

    /// Compare the record against the last observed discriminators and
    /// fire the reset of each one that changed.
    pub fn sync(&mut self) -> Vec<Reset> {
        let mut fired = Vec::new();
        let current = Observed::of(&self.record);

        let mut entity_reset = false;
        if current.is_moral_entity != self.observed.is_moral_entity {
            if let Some(flag) = current.is_moral_entity {
                fired.push(reset_entity(&mut self.record, EntityKind::from_flag(flag)));
                entity_reset = true;
            }
        }

        // An entity reset has already rewritten the document.
        let doc_changed = !entity_reset && current.doc_type != self.observed.doc_type;
        if doc_changed && !offered(current.is_moral_entity, current.doc_type.as_deref()) {
            debug!(
                document_type = ?current.doc_type,
                is_moral_entity = ?current.is_moral_entity,
                "document type not offered, keeping previous"
            );
            self.record.document.doc_type = self.observed.doc_type.clone();
        } else if doc_changed {
            let to = self.record.document.doc_type.clone();
            let keep = self.record.document.doc_type.take();
            self.record.document = DocumentDraft {
                doc_type: keep,
                ..DocumentDraft::default()
            };
            fired.push(Reset::DocumentVariant {
                from: self.observed.doc_type.clone(),
                to,
            });
        }

        if current.has_meter_details != self.observed.has_meter_details
            && !current.has_meter_details
        {
            self.record.contract.meter_details = MeterDraft::default();
            fired.push(Reset::MeterDetails);
        }

        if current.has_other_contracts != self.observed.has_other_contracts
            && !current.has_other_contracts
        {
            self.record.other_contracts.entries.clear();
            fired.push(Reset::OtherContracts);
        }

        self.observed = Observed::of(&self.record);
        for reset in &fired {
            self.log(reset.clone());
        }
        fired
    }

    fn log(&mut self, reset: Reset) {
        debug!(reset = %reset, "derived fields reset");
        self.transitions.push(TransitionRecord {
            reset,
            at: Utc::now(),
        });
    }

    // ─── List operations ─────────────────────────────────────────────

    pub fn add_phone(&mut self) -> usize {
        self.record.phone_numbers.push(PhoneEntry::default());
        self.record.phone_numbers.len() - 1
    }

    /// Remove a phone entry. The last remaining entry cannot be removed.
    pub fn remove_phone(&mut self, index: usize) -> Result<PhoneEntry, FormError> {
        let len = self.record.phone_numbers.len();
        if index >= len {
            return Err(FormError::IndexOutOfRange {
                list: "phoneNumbers",
                index,
                len,
            });
        }
        if len <= 1 {
            return Err(FormError::LastPhoneNumber);
        }
        Ok(self.record.phone_numbers.remove(index))
    }

    /// Append an empty secondary contract, turning the section on.
    pub fn add_other_contract(&mut self) -> usize {
        self.set(DiscriminatorChange::HasOtherContracts(true));
        self.record
            .other_contracts
            .entries
            .push(OtherContractEntry::default());
        self.record.other_contracts.entries.len() - 1
    }

    pub fn remove_other_contract(&mut self, index: usize) -> Result<OtherContractEntry, FormError> {
        let len = self.record.other_contracts.entries.len();
        if index >= len {
            return Err(FormError::IndexOutOfRange {
                list: "otherContracts",
                index,
                len,
            });
        }
        Ok(self.record.other_contracts.entries.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use kyc_core::{FileRef, Region};

    fn filled_cni() -> Record {
        let mut r = Record::default();
        r.first_name = Some("Jean".into());
        r.last_name = "Mbarga".into();
        r.gender = Some(Gender::Male);
        r.date_of_birth = NaiveDate::from_ymd_opt(1985, 3, 14);
        r.document = DocumentDraft::of_type(Some(DocumentType::Cni));
        r.document.number = "123456789".into();
        r.document.postfix.post = Some(Region::Ce);
        r.document.postfix.code = "12".into();
        r.document.front_image = Some(FileRef::from_path("/f.png"));
        r.document.back_image = Some(FileRef::from_path("/b.png"));
        r.nui_document.number = "P123456789012A".into();
        r.email = "a@b.com".into();
        r
    }

    #[test]
    fn test_switching_document_type_clears_variant_fields_only() {
        let before = filled_cni();
        let after = reduce(&before, DiscriminatorChange::DocumentType(Some(DocumentType::Cs)));
        assert_eq!(after.document.doc_type.as_deref(), Some("CS"));
        assert!(!after.document.has_variant_data());
        assert_eq!(after.nui_document, before.nui_document);
        assert_eq!(after.email, before.email);
        assert_eq!(after.gender, before.gender);
        // Input untouched.
        assert_eq!(before.document.number, "123456789");
    }

    #[test]
    fn test_flip_to_moral_after_cni() {
        let after = reduce(&filled_cni(), DiscriminatorChange::MoralEntity(true));
        assert_eq!(after.document.doc_type.as_deref(), Some("TRADE_REGISTER"));
        assert_eq!(after.gender, Some(Gender::Company));
        assert_eq!(after.first_name, None);
        assert_eq!(after.date_of_birth, None);
        assert!(after.document.number.is_empty());
        assert!(after.document.postfix.post.is_none());
        assert!(after.document.front_image.is_none());
        assert_eq!(after.last_name, "Mbarga");
    }

    #[test]
    fn test_moral_round_trip_is_stable() {
        let start = filled_cni();
        let moral = reduce(&start, DiscriminatorChange::MoralEntity(true));
        let back = reduce(&moral, DiscriminatorChange::MoralEntity(false));
        assert_eq!(back.document.doc_type.as_deref(), Some("CNI"));
        assert_eq!(back.gender, None);
        assert_eq!(back.first_name.as_deref(), Some(""));
        let again = reduce(&back, DiscriminatorChange::MoralEntity(true));
        assert_eq!(back, reduce(&again, DiscriminatorChange::MoralEntity(false)));
    }

    #[test]
    fn test_same_value_fires_nothing() {
        let mut c = FormController::new(filled_cni());
        assert_eq!(c.set(DiscriminatorChange::MoralEntity(false)), None);
        assert_eq!(c.set(DiscriminatorChange::DocumentType(Some(DocumentType::Cni))), None);
        assert_eq!(c.set(DiscriminatorChange::HasMeterDetails(false)), None);
        assert!(c.transitions().is_empty());
        assert_eq!(c.record().document.number, "123456789");
    }

    #[test]
    fn test_each_change_fires_once() {
        let mut c = FormController::new(filled_cni());
        assert!(c.set(DiscriminatorChange::MoralEntity(true)).is_some());
        assert!(c.set(DiscriminatorChange::MoralEntity(true)).is_none());
        assert_eq!(c.transitions().len(), 1);
        assert_eq!(c.transitions()[0].reset, Reset::EntityKind { to: EntityKind::Moral });
    }

    #[test]
    fn test_direct_edit_is_synced() {
        let mut c = FormController::new(filled_cni());
        let fired = c.edit(|r| r.document.doc_type = Some("RECP_CNI".into()));
        assert_eq!(
            fired,
            vec![Reset::DocumentVariant {
                from: Some("CNI".into()),
                to: Some("RECP_CNI".into())
            }]
        );
        assert!(c.record().document.number.is_empty());
        assert!(c.sync().is_empty());
    }

    #[test]
    fn test_entity_edit_overrides_document_edit() {
        let mut c = FormController::new(filled_cni());
        let fired = c.edit(|r| {
            r.is_moral_entity = Some(true);
            r.document.doc_type = Some("CS".into());
        });
        assert_eq!(fired, vec![Reset::EntityKind { to: EntityKind::Moral }]);
        assert_eq!(c.record().document.doc_type.as_deref(), Some("TRADE_REGISTER"));
    }

    /// A fully filled document of the given type, held by the right entity kind.
    fn filled(doc_type: DocumentType) -> Record {
        let mut r = filled_cni();
        r.is_moral_entity = Some(doc_type.holder().is_moral());
        r.document.doc_type = Some(doc_type.as_str().into());
        r.document.validity_date = NaiveDate::from_ymd_opt(2031, 6, 30);
        r
    }

    fn assert_variant_cleared(r: &Record, before: &Record) {
        assert!(r.document.number.is_empty());
        assert_eq!(r.document.postfix.post, None);
        assert!(r.document.postfix.code.is_empty());
        assert_eq!(r.document.validity_date, None);
        assert_eq!(r.document.front_image, None);
        assert_eq!(r.document.back_image, None);
        assert_eq!(r.nui_document, before.nui_document);
    }

    #[test]
    fn test_every_document_switch_clears_variant_fields() {
        for &from in DocumentType::all() {
            let targets = DocumentType::all()
                .iter()
                .copied()
                .filter(|to| *to != from && to.holder() == from.holder())
                .map(Some)
                .chain([None]);
            for to in targets {
                let before = filled(from);
                let tag = to.map(|t| t.as_str().to_string());

                let mut via_set = FormController::new(before.clone());
                assert!(via_set.set(DiscriminatorChange::DocumentType(to)).is_some());
                assert_eq!(via_set.record().document.doc_type, tag);
                assert_variant_cleared(via_set.record(), &before);

                let mut via_edit = FormController::new(before.clone());
                let fired = via_edit.edit(|r| r.document.doc_type = tag.clone());
                assert_eq!(fired.len(), 1, "{from} -> {to:?}");
                assert_eq!(via_edit.record().document.doc_type, tag);
                assert_variant_cleared(via_edit.record(), &before);
            }
        }
    }

    #[test]
    fn test_document_type_must_match_entity_kind() {
        let mut physical = FormController::new(filled_cni());
        let register = DiscriminatorChange::DocumentType(Some(DocumentType::TradeRegister));
        assert_eq!(physical.set(register), None);
        assert!(physical.edit(|r| r.document.doc_type = Some("TRADE_REGISTER".into())).is_empty());
        assert_eq!(physical.record().document.doc_type.as_deref(), Some("CNI"));
        assert_eq!(physical.record().document.number, "123456789");
        assert!(physical.transitions().is_empty());

        let schema = kyc_schema::RecordSchema::new(kyc_core::KeyEcho);
        let errors = schema.identity(physical.record()).err().unwrap_or_default();
        assert!(!errors.has(kyc_core::paths::DOCUMENT_TYPE, kyc_core::ErrorKind::CrossFieldInconsistency));

        let mut moral = FormController::new(filled(DocumentType::TradeRegister));
        assert_eq!(moral.set(DiscriminatorChange::DocumentType(Some(DocumentType::Cni))), None);
        assert!(moral.edit(|r| r.document.doc_type = Some("RECP_CS".into())).is_empty());
        assert_eq!(moral.record().document.doc_type.as_deref(), Some("TRADE_REGISTER"));
        assert!(moral.record().document.has_variant_data());
    }

    #[test]
    fn test_clearing_entity_flag_still_resets_document() {
        let before = filled_cni();
        let mut c = FormController::new(before.clone());
        let fired = c.edit(|r| {
            r.is_moral_entity = None;
            r.document.doc_type = Some("CS".into());
        });
        assert_eq!(
            fired,
            vec![Reset::DocumentVariant {
                from: Some("CNI".into()),
                to: Some("CS".into())
            }]
        );
        assert_variant_cleared(c.record(), &before);
    }

    #[test]
    fn test_meter_details_cleared_when_turned_off() {
        let mut c = FormController::default();
        c.set(DiscriminatorChange::HasMeterDetails(true));
        c.edit(|r| r.contract.meter_details.number = "MTR-9".into());
        assert_eq!(c.set(DiscriminatorChange::HasMeterDetails(false)), Some(Reset::MeterDetails));
        assert!(c.record().contract.meter_details.number.is_empty());
        assert_eq!(c.record().contract.meter_details, MeterDraft::default());
    }

    #[test]
    fn test_other_contracts_cleared_when_turned_off() {
        let mut c = FormController::default();
        c.add_other_contract();
        c.add_other_contract();
        assert!(c.record().other_contracts.has_other_contracts);
        let fired = c.edit(|r| r.other_contracts.has_other_contracts = false);
        assert_eq!(fired, vec![Reset::OtherContracts]);
        assert!(c.record().other_contracts.entries.is_empty());
    }

    #[test]
    fn test_last_phone_cannot_be_removed() {
        let mut c = FormController::default();
        assert_eq!(c.remove_phone(0), Err(FormError::LastPhoneNumber));
        c.add_phone();
        assert!(c.remove_phone(1).is_ok());
        assert_eq!(c.record().phone_numbers.len(), 1);
        assert!(matches!(
            c.remove_phone(3),
            Err(FormError::IndexOutOfRange { index: 3, len: 1, .. })
        ));
    }

    #[test]
    fn test_remove_other_contract_by_index() {
        let mut c = FormController::default();
        c.add_other_contract();
        c.edit(|r| r.other_contracts.entries[0].number = "111111111".into());
        c.add_other_contract();
        let removed = c.remove_other_contract(0).unwrap();
        assert_eq!(removed.number, "111111111");
        assert_eq!(c.record().other_contracts.entries.len(), 1);
        assert!(c.remove_other_contract(5).is_err());
    }
}
