//! # Contract Existence Check
//!
//! Whether a contract number exists can only be answered by a round trip
//! to the back office. The check runs when a contract-number field loses
//! focus, for the primary contract and for every secondary contract.
//!
//! ## Correlation
//!
//! Each check is identified by a [`Ticket`] holding the field path, the
//! value that was checked, and a sequence number. An outcome is applied
//! only when its ticket is still the latest one issued for that field;
//! a slow response for a superseded value is discarded on arrival. When
//! reporting, a stored outcome is used only if its value equals the
//! field's current value, so an outcome never leaks onto an edited field.
//!
//! ## Timeout
//!
//! Every lookup is bounded by a timeout (10 s by default). Expiry is
//! reported as `VerificationFailed`, like any other lookup failure.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use kyc_core::{ErrorKind, FieldError, FieldErrors, FieldPath, Translate};
use thiserror::Error;
use tracing::{debug, warn};

use crate::factory::keys;

/// Default bound on a single existence lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Answers whether a contract number exists.
pub trait ContractLookup {
    fn exists(&self, number: &str) -> impl Future<Output = Result<bool, LookupError>> + Send;
}

impl<L: ContractLookup> ContractLookup for &L {
    fn exists(&self, number: &str) -> impl Future<Output = Result<bool, LookupError>> + Send {
        (**self).exists(number)
    }
}

impl<L: ContractLookup> ContractLookup for Arc<L> {
    fn exists(&self, number: &str) -> impl Future<Output = Result<bool, LookupError>> + Send {
        (**self).exists(number)
    }
}

/// Why a lookup could not answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The service could not be reached.
    #[error("contract lookup unavailable: {0}")]
    Unavailable(String),

    /// The service answered with something other than yes or no.
    #[error("contract lookup rejected the request: {0}")]
    Rejected(String),

    /// No answer within the configured bound.
    #[error("contract lookup timed out after {0:?}")]
    Timeout(Duration),
}

/// State of one field's existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckState {
    /// A lookup is in flight.
    Pending,
    /// The contract exists.
    Verified,
    /// The service answered that the contract does not exist.
    NotFound,
    /// The lookup failed or timed out.
    Failed(String),
}

impl CheckState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// The error kind this state attaches to its field, if any.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::NotFound => Some(ErrorKind::ContractNotFound),
            Self::Failed(_) => Some(ErrorKind::VerificationFailed),
            Self::Pending | Self::Verified => None,
        }
    }

    fn from_outcome(outcome: &Result<bool, LookupError>) -> Self {
        match outcome {
            Ok(true) => Self::Verified,
            Ok(false) => Self::NotFound,
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// Correlates one lookup with the field and value it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub field: FieldPath,
    pub value: String,
    pub seq: u64,
}

#[derive(Debug, Clone)]
struct FieldCheck {
    value: String,
    seq: u64,
    state: CheckState,
}

/// Runs existence lookups and tracks their outcome per field.
#[derive(Debug)]
pub struct UniquenessValidator<L> {
    lookup: L,
    timeout: Duration,
    fields: HashMap<FieldPath, FieldCheck>,
    next_seq: u64,
}

impl<L: ContractLookup> UniquenessValidator<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            timeout: DEFAULT_LOOKUP_TIMEOUT,
            fields: HashMap::new(),
            next_seq: 0,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Start a check of `value` for `field`, superseding any earlier one.
    pub fn begin(&mut self, field: impl Into<FieldPath>, value: &str) -> Ticket {
        self.next_seq += 1;
        let field = field.into();
        let ticket = Ticket {
            field: field.clone(),
            value: value.to_string(),
            seq: self.next_seq,
        };
        debug!(field = %field, seq = ticket.seq, "existence check started");
        self.fields.insert(
            field,
            FieldCheck {
                value: ticket.value.clone(),
                seq: ticket.seq,
                state: CheckState::Pending,
            },
        );
        ticket
    }

    /// Perform the lookup for a ticket, bounded by the timeout.
    pub async fn run(&self, ticket: &Ticket) -> Result<bool, LookupError> {
        match tokio::time::timeout(self.timeout, self.lookup.exists(&ticket.value)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(LookupError::Timeout(self.timeout)),
        }
    }

    /// The lookup for a ticket as a future that owns a clone of the lookup,
    /// so the validator stays free for edits and newer checks meanwhile.
    pub fn run_detached(
        &self,
        ticket: &Ticket,
    ) -> impl Future<Output = Result<bool, LookupError>> + Send + 'static
    where
        L: Clone + Send + Sync + 'static,
    {
        let lookup = self.lookup.clone();
        let value = ticket.value.clone();
        let timeout = self.timeout;
        async move {
            match tokio::time::timeout(timeout, lookup.exists(&value)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(LookupError::Timeout(timeout)),
            }
        }
    }

    /// Apply an outcome. Returns `false` when the ticket is stale and the
    /// outcome was discarded.
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<bool, LookupError>) -> bool {
        let Some(current) = self.fields.get_mut(&ticket.field) else {
            warn!(field = %ticket.field, seq = ticket.seq, "discarding outcome for unknown field");
            return false;
        };
        if current.seq != ticket.seq || current.value != ticket.value {
            warn!(
                field = %ticket.field,
                seq = ticket.seq,
                latest = current.seq,
                "discarding stale existence outcome"
            );
            return false;
        }
        if let Err(e) = &outcome {
            warn!(field = %ticket.field, error = %e, "existence lookup failed");
        }
        current.state = CheckState::from_outcome(&outcome);
        debug!(field = %ticket.field, state = ?current.state, "existence check settled");
        true
    }

    /// Check `value` for `field` and wait for the outcome.
    ///
    /// A settled answer (`Verified` or `NotFound`) for the same value is
    /// reused without a new lookup. Failures are retried.
    pub async fn check(&mut self, field: impl Into<FieldPath>, value: &str) -> CheckState {
        let field = field.into();
        if let Some(state) = self.state_for(&field, value) {
            if matches!(state, CheckState::Verified | CheckState::NotFound) {
                return state.clone();
            }
        }
        let ticket = self.begin(field.clone(), value);
        let outcome = self.run(&ticket).await;
        self.complete(ticket, outcome);
        self.state_for(&field, value)
            .cloned()
            .unwrap_or(CheckState::Pending)
    }

    /// The latest state recorded for `field`, whatever its value.
    pub fn state(&self, field: &FieldPath) -> Option<&CheckState> {
        self.fields.get(field).map(|c| &c.state)
    }

    /// The state recorded for `field`, only if it was checked for `value`.
    pub fn state_for(&self, field: &FieldPath, value: &str) -> Option<&CheckState> {
        self.fields
            .get(field)
            .filter(|c| c.value == value)
            .map(|c| &c.state)
    }

    /// The error this field carries given its current value.
    pub fn error_for<T: Translate>(
        &self,
        field: &FieldPath,
        current_value: &str,
        translate: &T,
    ) -> Option<FieldError> {
        let state = self.state_for(field, current_value)?;
        let kind = state.error_kind()?;
        let key = match kind {
            ErrorKind::ContractNotFound => keys::CONTRACT_NOT_FOUND,
            _ => keys::CONTRACT_VERIFICATION_FAILED,
        };
        Some(FieldError::new(field.clone(), kind, translate.translate(key)))
    }

    /// Errors for every `(field, current value)` pair.
    pub fn errors<'a, T: Translate>(
        &self,
        current: impl IntoIterator<Item = (FieldPath, &'a str)>,
        translate: &T,
    ) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for (field, value) in current {
            if let Some(e) = self.error_for(&field, value, translate) {
                errors.push(e);
            }
        }
        errors
    }

    /// Whether any field has a lookup in flight.
    pub fn has_pending(&self) -> bool {
        self.fields.values().any(|c| !c.state.is_settled())
    }

    /// Drop the state of one field, e.g. when its entry is removed.
    pub fn forget(&mut self, field: &FieldPath) {
        self.fields.remove(field);
    }

    /// Drop every recorded state.
    pub fn clear(&mut self) {
        self.fields.clear();
    }
}
