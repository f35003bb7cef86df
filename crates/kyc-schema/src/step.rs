//! # Step Gate
//!
//! The wizard has five steps. The first four each own the slice of the
//! record schema covering their fields; the gate validates that slice and
//! decides whether the wizard may advance. Review owns no slice: leaving
//! it means submitting, which runs the full-record validation.
//!
//! The contract step also depends on the existence check. `advance` on
//! that step waits for every contract-number lookup to settle before
//! deciding, so a pending check can never be raced past.

use std::fmt;
use std::str::FromStr;

use kyc_core::path::paths;
use kyc_core::{EntityKind, FieldErrors, FieldPath, Record, Translate, UnknownTag};
use tracing::debug;

use crate::factory::RecordSchema;
use crate::uniqueness::{ContractLookup, UniquenessValidator};

/// The steps of the intake wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WizardStep {
    PersonalInfo,
    Identity,
    Contact,
    ContractMeter,
    Review,
}

impl WizardStep {
    pub fn all() -> &'static [WizardStep] {
        &[
            Self::PersonalInfo,
            Self::Identity,
            Self::Contact,
            Self::ContractMeter,
            Self::Review,
        ]
    }

    pub fn first() -> Self {
        Self::PersonalInfo
    }

    /// Zero-based position.
    pub fn index(&self) -> usize {
        match self {
            Self::PersonalInfo => 0,
            Self::Identity => 1,
            Self::Contact => 2,
            Self::ContractMeter => 3,
            Self::Review => 4,
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::all().get(self.index() + 1).copied()
    }

    pub fn prev(&self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::all()[i])
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PersonalInfo => "personal",
            Self::Identity => "identity",
            Self::Contact => "contact",
            Self::ContractMeter => "contract",
            Self::Review => "review",
        }
    }

    /// The sub-schema owned by this step under `entity`.
    pub fn schema(&self, entity: Option<EntityKind>) -> Option<StepSchema> {
        match self {
            Self::PersonalInfo => Some(match entity {
                Some(EntityKind::Moral) => StepSchema::PersonalMoral,
                _ => StepSchema::PersonalPhysical,
            }),
            Self::Identity => Some(StepSchema::Identity),
            Self::Contact => Some(StepSchema::Contact),
            Self::ContractMeter => Some(StepSchema::ContractMeter),
            Self::Review => None,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WizardStep {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|step| step.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownTag {
                kind: "wizard step",
                value: s.to_string(),
            })
    }
}

/// The sub-schemas of the first four steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSchema {
    PersonalPhysical,
    PersonalMoral,
    Identity,
    Contact,
    ContractMeter,
}

/// Validates one step's slice of the record before the wizard advances.
#[derive(Debug)]
pub struct StepGate<T, L> {
    schema: RecordSchema<T>,
    uniqueness: UniquenessValidator<L>,
}

impl<T: Translate, L: ContractLookup> StepGate<T, L> {
    pub fn new(schema: RecordSchema<T>, uniqueness: UniquenessValidator<L>) -> Self {
        Self { schema, uniqueness }
    }

    pub fn schema(&self) -> &RecordSchema<T> {
        &self.schema
    }

    pub fn uniqueness(&self) -> &UniquenessValidator<L> {
        &self.uniqueness
    }

    pub fn uniqueness_mut(&mut self) -> &mut UniquenessValidator<L> {
        &mut self.uniqueness
    }

    /// Synchronous validation of one step's slice.
    pub fn validate_step(&self, step: WizardStep, record: &Record) -> Result<(), FieldErrors> {
        let entity = record.is_moral_entity.map(EntityKind::from_flag);
        match step.schema(entity) {
            None => Ok(()),
            Some(StepSchema::PersonalPhysical) | Some(StepSchema::PersonalMoral) => {
                self.schema.personal(record)
            }
            Some(StepSchema::Identity) => self.schema.identity(record),
            Some(StepSchema::Contact) => self.schema.contact(record),
            Some(StepSchema::ContractMeter) => self.schema.contract(record),
        }
    }

    /// Decide whether the wizard may leave `step`.
    ///
    /// On the contract step every contract number that passed its format
    /// rules is checked for existence, and the gate waits for the answers.
    pub async fn advance(
        &mut self,
        step: WizardStep,
        record: &Record,
    ) -> Result<(), FieldErrors> {
        let mut errors = match self.validate_step(step, record) {
            Ok(()) => FieldErrors::new(),
            Err(errors) => errors,
        };

        if step == WizardStep::ContractMeter {
            let async_errors = self.verify_contracts(record, &errors).await;
            errors.extend(async_errors);
        }

        debug!(step = %step, errors = errors.len(), "step gate decided");
        errors.into_result(())
    }

    /// Run the existence check for each well-formed contract number and
    /// return the errors it attaches.
    pub async fn verify_contracts(
        &mut self,
        record: &Record,
        known: &FieldErrors,
    ) -> FieldErrors {
        let fields = contract_fields(record);
        for (field, value) in &fields {
            if known.for_path(field.as_str()).next().is_some() {
                continue;
            }
            self.uniqueness.check(field.clone(), value).await;
        }
        let current = fields
            .iter()
            .filter(|(field, _)| known.for_path(field.as_str()).next().is_none())
            .map(|(field, value)| (field.clone(), value.as_str()));
        self.uniqueness.errors(current, self.schema.translator())
    }
}

/// Every contract-number field of the record with its current value.
pub fn contract_fields(record: &Record) -> Vec<(FieldPath, String)> {
    let mut fields = vec![(
        FieldPath::new(paths::CONTRACT_NUMBER),
        record.contract.number.clone(),
    )];
    if record.other_contracts.has_other_contracts {
        let numbers = FieldPath::new(paths::OTHER_CONTRACT_NUMBERS);
        for (i, entry) in record.other_contracts.entries.iter().enumerate() {
            fields.push((numbers.index(i), entry.number.clone()));
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_ordered() {
        assert_eq!(WizardStep::all().len(), 5);
        assert_eq!(WizardStep::first().next(), Some(WizardStep::Identity));
        assert_eq!(WizardStep::Review.next(), None);
        assert_eq!(WizardStep::PersonalInfo.prev(), None);
        assert_eq!(WizardStep::Review.prev(), Some(WizardStep::ContractMeter));
    }

    #[test]
    fn step_names_parse_back() {
        for step in WizardStep::all() {
            assert_eq!(step.as_str().parse::<WizardStep>().unwrap(), *step);
        }
        assert!("payment".parse::<WizardStep>().is_err());
    }

    #[test]
    fn personal_step_splits_on_entity_kind() {
        assert_eq!(
            WizardStep::PersonalInfo.schema(Some(EntityKind::Moral)),
            Some(StepSchema::PersonalMoral)
        );
        assert_eq!(
            WizardStep::PersonalInfo.schema(Some(EntityKind::Physical)),
            Some(StepSchema::PersonalPhysical)
        );
        assert_eq!(WizardStep::Review.schema(None), None);
    }

    #[test]
    fn contract_fields_include_other_contracts_only_when_flagged() {
        let mut record = Record::default();
        record.contract.number = "123456789".into();
        record.other_contracts.entries.push(kyc_core::OtherContractEntry::new("222222222"));
        assert_eq!(contract_fields(&record).len(), 1);

        record.other_contracts.has_other_contracts = true;
        let fields = contract_fields(&record);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].0.as_str(), "otherContracts.numbers.0");
    }
}
