//! # Wizard Lifecycle
//!
//! Drives one intake session from the empty record to a created KYC
//! record:
//!
//! ```text
//! Editing(step 1) ──next──▶ … ──next──▶ Editing(review)
//!                                            │ submit
//!                                            ▼
//!                                        Submitting ──ok──▶ Submitted
//!                                            │
//!                                            └──failure──▶ Editing(review)
//!                                                          last_failure set
//! ```
//!
//! A failed submission keeps every entered value so the user can retry.
//! `restart` discards the record from any status and opens a new session.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use kyc_core::{
    Customer, FieldErrors, FieldPath, Record, SessionId, Submission, SubmissionId, Translate,
};
use kyc_schema::{
    contract_fields, CheckState, ContractLookup, LookupError, StepGate, Ticket, WizardStep,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::controller::{DiscriminatorChange, FormController, FormError, Reset};
use crate::prefill::{prefill_with, NamePolicy};

// ─── Sink ────────────────────────────────────────────────────────────

/// What the sink returns for a created record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub id: SubmissionId,
}

/// Why the sink did not create a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The sink could not be reached.
    #[error("submission sink unavailable: {0}")]
    Unavailable(String),

    /// The sink answered and refused the submission.
    #[error("submission rejected: {reason}")]
    Rejected { reason: String },
}

/// Accepts a validated record with its attachments.
pub trait SubmissionSink {
    fn submit(
        &self,
        submission: &Submission,
    ) -> impl Future<Output = Result<SubmissionReceipt, SinkError>> + Send;
}

impl<S: SubmissionSink> SubmissionSink for &S {
    fn submit(
        &self,
        submission: &Submission,
    ) -> impl Future<Output = Result<SubmissionReceipt, SinkError>> + Send {
        (**self).submit(submission)
    }
}

impl<S: SubmissionSink> SubmissionSink for Arc<S> {
    fn submit(
        &self,
        submission: &Submission,
    ) -> impl Future<Output = Result<SubmissionReceipt, SinkError>> + Send {
        (**self).submit(submission)
    }
}

// ─── Status ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WizardStatus {
    Editing,
    Submitting,
    Submitted { receipt: SubmissionReceipt },
}

impl fmt::Display for WizardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Editing => f.write_str("editing"),
            Self::Submitting => f.write_str("submitting"),
            Self::Submitted { .. } => f.write_str("submitted"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    #[error("invalid wizard transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("{} field error(s)", .0.len())]
    Validation(FieldErrors),

    #[error(transparent)]
    Submission(#[from] SinkError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("{0} is not a contract number field")]
    NotAContractField(String),
}

// ─── Wizard ──────────────────────────────────────────────────────────

/// One intake session.
#[derive(Debug)]
pub struct Wizard<T, L> {
    session: SessionId,
    controller: FormController,
    gate: StepGate<T, L>,
    step: WizardStep,
    status: WizardStatus,
    last_failure: Option<SinkError>,
}

impl<T: Translate, L: ContractLookup> Wizard<T, L> {
    /// Start a session on the empty record.
    pub fn new(gate: StepGate<T, L>) -> Self {
        Self::resume(gate, Record::default())
    }

    /// Start a session on an existing draft. No resets fire.
    pub fn resume(gate: StepGate<T, L>, record: Record) -> Self {
        let session = SessionId::new();
        debug!(session = %session, "wizard session opened");
        Self {
            session,
            controller: FormController::new(record),
            gate,
            step: WizardStep::first(),
            status: WizardStatus::Editing,
            last_failure: None,
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn status(&self) -> &WizardStatus {
        &self.status
    }

    pub fn record(&self) -> &Record {
        self.controller.record()
    }

    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    pub fn gate(&self) -> &StepGate<T, L> {
        &self.gate
    }

    /// The sink error from the most recent failed submission.
    pub fn last_failure(&self) -> Option<&SinkError> {
        self.last_failure.as_ref()
    }

    fn require_editing(&self, to: &str) -> Result<(), WizardError> {
        if self.status != WizardStatus::Editing {
            return Err(WizardError::InvalidTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    // ─── Editing ─────────────────────────────────────────────────────

    /// Set a discriminator through the controller.
    pub fn set(&mut self, change: DiscriminatorChange) -> Result<Option<Reset>, WizardError> {
        self.require_editing("editing")?;
        Ok(self.controller.set(change))
    }

    /// Edit the draft directly; dependent resets fire afterwards.
    pub fn edit(&mut self, f: impl FnOnce(&mut Record)) -> Result<Vec<Reset>, WizardError> {
        self.require_editing("editing")?;
        Ok(self.controller.edit(f))
    }

    pub fn add_phone(&mut self) -> Result<usize, WizardError> {
        self.require_editing("editing")?;
        Ok(self.controller.add_phone())
    }

    pub fn remove_phone(&mut self, index: usize) -> Result<(), WizardError> {
        self.require_editing("editing")?;
        self.controller.remove_phone(index)?;
        Ok(())
    }

    pub fn add_other_contract(&mut self) -> Result<usize, WizardError> {
        self.require_editing("editing")?;
        Ok(self.controller.add_other_contract())
    }

    /// Remove a secondary contract. Existence states of the shifted
    /// entries are dropped so none is attributed to the wrong number.
    pub fn remove_other_contract(&mut self, index: usize) -> Result<(), WizardError> {
        self.require_editing("editing")?;
        let before = contract_fields(self.controller.record());
        self.controller.remove_other_contract(index)?;
        for (field, _) in before.iter().skip(index + 1) {
            self.gate.uniqueness_mut().forget(field);
        }
        Ok(())
    }

    /// Check one contract-number field for existence, e.g. on blur.
    ///
    /// Numbers that fail their format rules are not looked up; the format
    /// errors are returned instead.
    pub async fn verify_field(&mut self, path: &str) -> Result<CheckState, WizardError> {
        self.require_editing("editing")?;
        let value = self.checkable_value(path)?;
        Ok(self.gate.uniqueness_mut().check(FieldPath::new(path), &value).await)
    }

    /// Start a check of one contract-number field without waiting for it.
    ///
    /// The draft stays editable while the lookup is in flight. Await
    /// [`Wizard::run_verify`] for the ticket and hand its outcome to
    /// [`Wizard::complete_verify`]; an outcome for a value that was edited
    /// and checked again in the meantime is discarded.
    pub fn begin_verify(&mut self, path: &str) -> Result<Ticket, WizardError> {
        self.require_editing("editing")?;
        let value = self.checkable_value(path)?;
        Ok(self.gate.uniqueness_mut().begin(FieldPath::new(path), &value))
    }

    /// The lookup for a ticket. Holds no borrow of the wizard.
    pub fn run_verify(
        &self,
        ticket: &Ticket,
    ) -> impl Future<Output = Result<bool, LookupError>> + Send + 'static
    where
        L: Clone + Send + Sync + 'static,
    {
        self.gate.uniqueness().run_detached(ticket)
    }

    /// Apply a lookup outcome. Returns `false` when it was stale.
    pub fn complete_verify(&mut self, ticket: Ticket, outcome: Result<bool, LookupError>) -> bool {
        self.gate.uniqueness_mut().complete(ticket, outcome)
    }

    /// Current value of a contract-number field, if it passes its format
    /// rules.
    fn checkable_value(&self, path: &str) -> Result<String, WizardError> {
        let value = contract_fields(self.controller.record())
            .into_iter()
            .find(|(field, _)| field.as_str() == path)
            .map(|(_, value)| value)
            .ok_or_else(|| WizardError::NotAContractField(path.to_string()))?;

        if let Err(errors) = self.gate.schema().contract(self.controller.record()) {
            let mut own = FieldErrors::new();
            for e in errors.for_path(path) {
                own.push(e.clone());
            }
            if !own.is_empty() {
                return Err(WizardError::Validation(own));
            }
        }
        Ok(value)
    }

    // ─── Navigation ──────────────────────────────────────────────────

    /// Validate the current step and move to the next one.
    pub async fn next(&mut self) -> Result<WizardStep, WizardError> {
        self.require_editing("next step")?;
        let Some(target) = self.step.next() else {
            return Err(WizardError::InvalidTransition {
                from: self.step.to_string(),
                to: "next step".to_string(),
            });
        };
        self.gate
            .advance(self.step, self.controller.record())
            .await
            .map_err(WizardError::Validation)?;
        debug!(session = %self.session, from = %self.step, to = %target, "step advanced");
        self.step = target;
        Ok(target)
    }

    /// Move to the previous step. Never validates.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        self.require_editing("previous step")?;
        let target = self.step.prev().ok_or_else(|| WizardError::InvalidTransition {
            from: self.step.to_string(),
            to: "previous step".to_string(),
        })?;
        self.step = target;
        Ok(target)
    }

    /// Discard the draft and open a new session on the empty record.
    pub fn restart(&mut self) {
        self.reopen(Record::default());
    }

    /// Open a new session prefilled from a looked-up customer.
    pub fn seed(&mut self, customer: &Customer, policy: NamePolicy) {
        let record = prefill_with(customer, &Record::default(), policy);
        info!(contract = %customer.contract, policy = policy.as_str(), "wizard seeded from customer");
        self.reopen(record);
    }

    fn reopen(&mut self, record: Record) {
        let previous = self.session;
        self.session = SessionId::new();
        self.controller.replace(record);
        self.gate.uniqueness_mut().clear();
        self.step = WizardStep::first();
        self.status = WizardStatus::Editing;
        self.last_failure = None;
        debug!(previous = %previous, session = %self.session, "wizard restarted");
    }

    // ─── Submission ──────────────────────────────────────────────────

    /// Validate the whole record and hand it to `sink`.
    ///
    /// Only allowed from the review step. Validation failures leave the
    /// wizard editing; sink failures also set [`Wizard::last_failure`].
    pub async fn submit<S: SubmissionSink>(
        &mut self,
        sink: &S,
    ) -> Result<SubmissionReceipt, WizardError> {
        self.require_editing("submitting")?;
        if self.step != WizardStep::Review {
            return Err(WizardError::InvalidTransition {
                from: self.step.to_string(),
                to: "submitting".to_string(),
            });
        }
        self.status = WizardStatus::Submitting;

        let record = self.controller.record();
        let (valid, mut errors) = match self.gate.schema().validate(record) {
            Ok(valid) => (Some(valid), FieldErrors::new()),
            Err(errors) => (None, errors),
        };
        let async_errors = self.gate.verify_contracts(record, &errors).await;
        errors.extend(async_errors);

        let valid = match valid {
            Some(valid) if errors.is_empty() => valid,
            _ => {
                self.status = WizardStatus::Editing;
                debug!(session = %self.session, errors = errors.len(), "submission blocked by validation");
                return Err(WizardError::Validation(errors));
            }
        };

        let submission = Submission::assemble(valid);
        match sink.submit(&submission).await {
            Ok(receipt) => {
                info!(session = %self.session, id = %receipt.id, "kyc record submitted");
                self.status = WizardStatus::Submitted {
                    receipt: receipt.clone(),
                };
                self.last_failure = None;
                Ok(receipt)
            }
            Err(e) => {
                warn!(session = %self.session, error = %e, "submission failed; draft retained");
                self.status = WizardStatus::Editing;
                self.last_failure = Some(e.clone());
                Err(WizardError::Submission(e))
            }
        }
    }
}
