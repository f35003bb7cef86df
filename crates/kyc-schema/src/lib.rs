//! # kyc-schema: Conditional Validation for KYC Intake
//!
//! The validation engine of the intake wizard:
//!
//! - [`variant`] resolves a document-type tag into the rules of that
//!   document kind.
//! - [`rules`] holds the field patterns and the chainable primitive checks.
//! - [`factory`] composes both into [`RecordSchema`], which validates a
//!   whole record or one wizard section and narrows a valid draft into a
//!   [`kyc_core::ValidRecord`].
//! - [`step`] partitions the schema per wizard step and gates advancement.
//! - [`uniqueness`] runs the asynchronous contract existence check and
//!   correlates its outcomes with the latest input.
//!
//! ## Crate Policy
//!
//! - Depends only on `kyc-core` internally.
//! - Never formats a message itself; every message goes through
//!   [`kyc_core::Translate`].

pub mod factory;
pub mod rules;
pub mod step;
pub mod uniqueness;
pub mod variant;

pub use factory::{keys, RecordSchema, NUI_MAX_CHARS};
pub use rules::{Failure, Pattern};
pub use step::{contract_fields, StepGate, StepSchema, WizardStep};
pub use uniqueness::{
    CheckState, ContractLookup, LookupError, Ticket, UniquenessValidator, DEFAULT_LOOKUP_TIMEOUT,
};
pub use variant::{resolve, NumberConstraint, NuiPattern, VariantError, VariantRules};
