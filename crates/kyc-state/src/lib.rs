//! # kyc-state: Form State for KYC Intake
//!
//! Owns the draft record while the wizard runs.
//!
//! - **Controller** (`controller.rs`): keeps dependent fields consistent as
//!   the four discriminators change (`isMoralEntity`, `document.type`,
//!   `contract.hasMeterDetails`, `otherContracts.hasOtherContracts`), and
//!   guards the list operations.
//!
//! - **Wizard** (`wizard.rs`): the session lifecycle
//!   (`Editing → Submitting → Submitted`), step navigation through the
//!   [`kyc_schema::StepGate`], and hand-off to a [`SubmissionSink`].
//!
//! - **Prefill** (`prefill.rs`): seeds a fresh record from a looked-up
//!   customer.
//!
//! ## Design
//!
//! Resets are expressed as a pure reducer ([`reduce`]) so they can be
//! tested without a controller. The controller adds change detection: a
//! reset fires once per actual change, never for a same-value write.

pub mod controller;
pub mod prefill;
pub mod wizard;

// ─── Controller re-exports ──────────────────────────────────────────

pub use controller::{
    apply, reduce, DiscriminatorChange, FormController, FormError, Reset, TransitionRecord,
};

// ─── Prefill re-exports ─────────────────────────────────────────────

pub use prefill::{prefill, prefill_with, NamePolicy, UnknownNamePolicy};

// ─── Wizard re-exports ──────────────────────────────────────────────

pub use wizard::{
    SinkError, SubmissionReceipt, SubmissionSink, Wizard, WizardError, WizardStatus,
};
