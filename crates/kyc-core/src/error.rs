//! # Error Types: Field-Level Error Taxonomy
//!
//! Every validation failure in the intake engine is reported as a
//! [`FieldError`]: a field path, an [`ErrorKind`], and a translated message.
//! Failures are collected into [`FieldErrors`] so the caller can surface
//! each one next to the field it concerns.
//!
//! ## Design
//!
//! - Discriminant failures attach to the discriminant field itself
//!   (`document.type`, `isMoralEntity`), never to a synthetic root path.
//! - Asynchronous outcomes (`ContractNotFound`, `VerificationFailed`) are
//!   separate kinds so a business rejection can be told apart from an
//!   infrastructure failure.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::path::FieldPath;

/// Classification of a field-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// A mandatory field is empty or absent.
    FieldRequired,
    /// A value is present but fails a pattern, length, or range check.
    FormatInvalid,
    /// A tag field is missing or unrecognized; variant checks are suppressed.
    DiscriminantInvalid,
    /// A derived invariant between fields is violated.
    CrossFieldInconsistency,
    /// The existence lookup answered that the contract does not exist.
    ContractNotFound,
    /// The existence lookup could not complete.
    VerificationFailed,
}

impl ErrorKind {
    /// Whether this kind is produced by the asynchronous existence check.
    pub fn is_async(&self) -> bool {
        matches!(self, Self::ContractNotFound | Self::VerificationFailed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FieldRequired => "FIELD_REQUIRED",
            Self::FormatInvalid => "FORMAT_INVALID",
            Self::DiscriminantInvalid => "DISCRIMINANT_INVALID",
            Self::CrossFieldInconsistency => "CROSS_FIELD_INCONSISTENCY",
            Self::ContractNotFound => "CONTRACT_NOT_FOUND",
            Self::VerificationFailed => "VERIFICATION_FAILED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failure attached to one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted path of the offending field (e.g. `document.number`).
    pub path: FieldPath,
    /// Failure classification.
    pub kind: ErrorKind,
    /// Translated, user-facing message.
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<FieldPath>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {} [{}]: {}", self.path, self.kind, self.message)
    }
}

/// Ordered collection of field errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Record a failure from its parts.
    pub fn add(&mut self, path: impl Into<FieldPath>, kind: ErrorKind, message: impl Into<String>) {
        self.push(FieldError::new(path, kind, message));
    }

    pub fn extend(&mut self, other: FieldErrors) {
        self.errors.extend(other.errors);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// All errors attached to exactly `path`.
    pub fn for_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors.iter().filter(move |e| e.path.as_str() == path)
    }

    /// Whether an error of `kind` is attached to `path`.
    pub fn has(&self, path: &str, kind: ErrorKind) -> bool {
        self.for_path(path).any(|e| e.kind == kind)
    }

    /// Whether any error lives at `prefix` or below it.
    pub fn touches(&self, prefix: &str) -> bool {
        self.errors.iter().any(|e| e.path.is_within(prefix))
    }

    /// Return `Ok(value)` when no error was collected.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<FieldError> {
        self.errors
    }
}

impl From<Vec<FieldError>> for FieldErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// A tag string that does not belong to its closed value set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownTag {
    /// Which value set was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_and_queries_by_path() {
        let mut errors = FieldErrors::new();
        errors.add("document.number", ErrorKind::FormatInvalid, "bad length");
        errors.add("email", ErrorKind::FieldRequired, "required");

        assert_eq!(errors.len(), 2);
        assert!(errors.has("document.number", ErrorKind::FormatInvalid));
        assert!(!errors.has("document.number", ErrorKind::FieldRequired));
        assert!(errors.touches("document"));
        assert!(!errors.touches("contract"));
    }

    #[test]
    fn into_result_is_ok_when_empty() {
        assert_eq!(FieldErrors::new().into_result(7), Ok(7));
        let mut errors = FieldErrors::new();
        errors.add("email", ErrorKind::FormatInvalid, "bad");
        assert!(errors.into_result(7).is_err());
    }

    #[test]
    fn display_lists_one_error_per_line() {
        let mut errors = FieldErrors::new();
        errors.add("lastName", ErrorKind::FieldRequired, "required");
        errors.add("email", ErrorKind::FormatInvalid, "invalid email");
        let rendered = errors.to_string();
        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.contains("lastName [FIELD_REQUIRED]: required"));
    }

    #[test]
    fn async_kinds() {
        assert!(ErrorKind::ContractNotFound.is_async());
        assert!(ErrorKind::VerificationFailed.is_async());
        assert!(!ErrorKind::FormatInvalid.is_async());
    }
}
