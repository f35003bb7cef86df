//! # Primitive Field Rules
//!
//! The reusable building blocks of the record schema: the field patterns
//! and a chainable check that stops at the first failing rule.
//!
//! ```
//! use kyc_schema::rules::{check, Pattern};
//!
//! let result = check("612345678")
//!     .required("kycForm.errors.required")
//!     .pattern(Pattern::Phone, "kycForm.errors.phone.invalid")
//!     .finish();
//! assert!(result.is_ok());
//! ```
//!
//! A failure carries the [`ErrorKind`] and the message key; translation
//! happens in the schema, never here.

use std::sync::OnceLock;

use chrono::NaiveDate;
use kyc_core::ErrorKind;
use regex::Regex;

use crate::variant::NumberConstraint;

// ─── Patterns ────────────────────────────────────────────────────────

/// The field patterns of the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Letters (Latin-1 accents included) and whitespace.
    Name,
    /// Empty, or words of letters separated by single spaces.
    FirstName,
    /// NUI of an individual.
    NuiPhysical,
    /// NUI of a company.
    NuiMoral,
    /// Nine digits starting with 2, 3 or 6.
    Phone,
    Email,
    /// Nine digits.
    ContractNumber,
    /// Two digits, `01` to `99`.
    PostfixCode,
}

impl Pattern {
    pub fn all() -> &'static [Pattern] {
        &[
            Self::Name,
            Self::FirstName,
            Self::NuiPhysical,
            Self::NuiMoral,
            Self::Phone,
            Self::Email,
            Self::ContractNumber,
            Self::PostfixCode,
        ]
    }

    pub fn source(&self) -> &'static str {
        match self {
            Self::Name => r"^[a-zA-ZÀ-ÿ\s]+$",
            Self::FirstName => r"^$|^[a-zA-ZÀ-ÿ]+(?:\s[a-zA-ZÀ-ÿ]+)*$",
            Self::NuiPhysical => r"^(P|M)\d{12}[a-zA-Z]$",
            Self::NuiMoral => r"^M\d{12}[a-zA-Z]$",
            Self::Phone => r"^[236]\d{8}$",
            Self::Email => r"^[^\s@]+@[^\s@]+\.[^\s@]+$",
            Self::ContractNumber => r"^\d{9}$",
            Self::PostfixCode => r"^(0[1-9]|[1-9]\d)$",
        }
    }

    fn cell(&self) -> &'static OnceLock<Option<Regex>> {
        static NAME: OnceLock<Option<Regex>> = OnceLock::new();
        static FIRST_NAME: OnceLock<Option<Regex>> = OnceLock::new();
        static NUI_PHYSICAL: OnceLock<Option<Regex>> = OnceLock::new();
        static NUI_MORAL: OnceLock<Option<Regex>> = OnceLock::new();
        static PHONE: OnceLock<Option<Regex>> = OnceLock::new();
        static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
        static CONTRACT: OnceLock<Option<Regex>> = OnceLock::new();
        static POSTFIX_CODE: OnceLock<Option<Regex>> = OnceLock::new();
        match self {
            Self::Name => &NAME,
            Self::FirstName => &FIRST_NAME,
            Self::NuiPhysical => &NUI_PHYSICAL,
            Self::NuiMoral => &NUI_MORAL,
            Self::Phone => &PHONE,
            Self::Email => &EMAIL,
            Self::ContractNumber => &CONTRACT,
            Self::PostfixCode => &POSTFIX_CODE,
        }
    }

    /// The compiled pattern. `None` only if the source fails to compile.
    pub fn regex(&self) -> Option<&'static Regex> {
        self.cell()
            .get_or_init(|| Regex::new(self.source()).ok())
            .as_ref()
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex().is_some_and(|re| re.is_match(value))
    }
}

/// Earliest accepted birth or creation date.
pub fn earliest_birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

// ─── Chainable check ─────────────────────────────────────────────────

/// The first rule a value failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    /// Message key under `kycForm.errors.*`.
    pub key: String,
}

impl Failure {
    pub fn new(kind: ErrorKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }
}

/// A chain of string checks that short-circuits on the first failure.
pub struct Check<'a> {
    value: &'a str,
    result: Result<(), Failure>,
}

/// Start a check chain for `value`.
pub fn check(value: &str) -> Check<'_> {
    Check {
        value,
        result: Ok(()),
    }
}

impl<'a> Check<'a> {
    fn fail(mut self, kind: ErrorKind, key: &str) -> Self {
        self.result = Err(Failure::new(kind, key));
        self
    }

    /// Fails with `FieldRequired` if the value is blank.
    pub fn required(self, key: &str) -> Self {
        if self.result.is_err() || !self.value.trim().is_empty() {
            return self;
        }
        self.fail(ErrorKind::FieldRequired, key)
    }

    /// Fails with `FormatInvalid` if the value has more than `n` characters.
    pub fn max_chars(self, n: usize, key: &str) -> Self {
        if self.result.is_err() || self.value.chars().count() <= n {
            return self;
        }
        self.fail(ErrorKind::FormatInvalid, key)
    }

    /// Fails with `FormatInvalid` if the character count breaks `constraint`.
    pub fn chars(self, constraint: NumberConstraint, short_key: &str, long_key: &str) -> Self {
        if self.result.is_err() {
            return self;
        }
        let len = self.value.chars().count();
        if constraint.accepts(len) {
            return self;
        }
        let too_short = match constraint {
            NumberConstraint::Length(n) => len < n,
            NumberConstraint::Range { min, .. } => len < min,
        };
        let key = if too_short { short_key } else { long_key };
        self.fail(ErrorKind::FormatInvalid, key)
    }

    /// Fails with `FormatInvalid` if the value does not match `pattern`.
    pub fn pattern(self, pattern: Pattern, key: &str) -> Self {
        if self.result.is_err() || pattern.is_match(self.value) {
            return self;
        }
        self.fail(ErrorKind::FormatInvalid, key)
    }

    pub fn finish(self) -> Result<(), Failure> {
        self.result
    }
}

// ─── Standalone checks ───────────────────────────────────────────────

/// Require an optional value to be present.
pub fn present<T>(value: Option<T>, key: &str) -> Result<T, Failure> {
    value.ok_or_else(|| Failure::new(ErrorKind::FieldRequired, key))
}

/// Require a date to lie within `earliest..=latest`.
pub fn date_within(
    date: NaiveDate,
    earliest: NaiveDate,
    latest: NaiveDate,
    key: &str,
) -> Result<NaiveDate, Failure> {
    if (earliest..=latest).contains(&date) {
        Ok(date)
    } else {
        Err(Failure::new(ErrorKind::FormatInvalid, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pattern_compiles() {
        for p in Pattern::all() {
            assert!(p.regex().is_some(), "{p:?} failed to compile");
        }
    }

    #[test]
    fn name_accepts_accents_and_rejects_digits() {
        assert!(Pattern::Name.is_match("Ngo Biyong Hélène"));
        assert!(!Pattern::Name.is_match("Jean2"));
        assert!(!Pattern::Name.is_match(""));
    }

    #[test]
    fn first_name_allows_empty_but_not_double_spaces() {
        assert!(Pattern::FirstName.is_match(""));
        assert!(Pattern::FirstName.is_match("Marie Claire"));
        assert!(!Pattern::FirstName.is_match("Marie  Claire"));
        assert!(!Pattern::FirstName.is_match(" Marie"));
    }

    #[test]
    fn nui_patterns() {
        assert!(Pattern::NuiPhysical.is_match("P123456789012A"));
        assert!(Pattern::NuiPhysical.is_match("M123456789012z"));
        assert!(!Pattern::NuiMoral.is_match("P123456789012A"));
        assert!(Pattern::NuiMoral.is_match("M123456789012A"));
        assert!(!Pattern::NuiPhysical.is_match("P12345678901A"));
    }

    #[test]
    fn phone_prefixes() {
        assert!(Pattern::Phone.is_match("612345678"));
        assert!(Pattern::Phone.is_match("222345678"));
        assert!(!Pattern::Phone.is_match("712345678"));
        assert!(!Pattern::Phone.is_match("61234567"));
    }

    #[test]
    fn postfix_code_rejects_zero() {
        assert!(Pattern::PostfixCode.is_match("01"));
        assert!(Pattern::PostfixCode.is_match("99"));
        assert!(!Pattern::PostfixCode.is_match("00"));
        assert!(!Pattern::PostfixCode.is_match("1"));
        assert!(!Pattern::PostfixCode.is_match("100"));
    }

    #[test]
    fn contract_number_is_nine_digits() {
        assert!(Pattern::ContractNumber.is_match("123456789"));
        assert!(!Pattern::ContractNumber.is_match("1234567890"));
        assert!(!Pattern::ContractNumber.is_match("12345678a"));
    }

    #[test]
    fn chain_stops_at_first_failure() {
        let err = check("")
            .required("kycForm.errors.nui.required")
            .max_chars(14, "kycForm.errors.nui.length")
            .pattern(Pattern::NuiPhysical, "kycForm.errors.nui.format")
            .finish()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::FieldRequired);
        assert_eq!(err.key, "kycForm.errors.nui.required");

        let err = check("P1234567890123X")
            .required("kycForm.errors.nui.required")
            .max_chars(14, "kycForm.errors.nui.length")
            .pattern(Pattern::NuiPhysical, "kycForm.errors.nui.format")
            .finish()
            .unwrap_err();
        assert_eq!(err.key, "kycForm.errors.nui.length");
    }

    #[test]
    fn chars_picks_short_or_long_key() {
        let range = NumberConstraint::Range { min: 7, max: 15 };
        let short = check("ABC").chars(range, "min", "max").finish().unwrap_err();
        assert_eq!(short.key, "min");
        let long = check("ABCDEFGHIJKLMNOP").chars(range, "min", "max").finish().unwrap_err();
        assert_eq!(long.key, "max");
        assert!(check("ABCDEFG").chars(range, "min", "max").finish().is_ok());
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let earliest = earliest_birth_date();
        assert!(date_within(earliest, earliest, today, "k").is_ok());
        assert!(date_within(today, earliest, today, "k").is_ok());
        let tomorrow = today.succ_opt().unwrap();
        let err = date_within(tomorrow, earliest, today, "k").unwrap_err();
        assert_eq!(err.kind, ErrorKind::FormatInvalid);
    }
}
