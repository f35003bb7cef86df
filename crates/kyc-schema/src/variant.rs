//! # Document-Variant Resolver
//!
//! Maps a document-type tag and the moral-entity flag onto the rules that
//! apply to that document: the number constraint, whether a postfix is
//! required, and which NUI pattern the sibling NUI document must match.
//!
//! The resolver is a pure function over a fixed table. Callers re-derive
//! the rules on every validation instead of caching them.
//!
//! | Tag | Number | Postfix |
//! |-----|--------|---------|
//! | `CNI` | length 9 | yes |
//! | `CS` | length 7 | yes |
//! | `RECP_CS` | length 10 | yes |
//! | `RECP_CNI` | length 10 | yes |
//! | `TRADE_REGISTER` | 7 to 15 | no |
//!
//! The NUI pattern depends on the entity flag only, never on the tag.

use kyc_core::DocumentType;
use thiserror::Error;

/// Constraint on the character count of a document number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberConstraint {
    /// Exactly `n` characters.
    Length(usize),
    /// Between `min` and `max` characters, inclusive.
    Range { min: usize, max: usize },
}

impl NumberConstraint {
    pub fn accepts(&self, len: usize) -> bool {
        match *self {
            Self::Length(n) => len == n,
            Self::Range { min, max } => (min..=max).contains(&len),
        }
    }
}

/// Which NUI pattern applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NuiPattern {
    /// Individuals: `P` or `M`, twelve digits, one letter.
    PatternA,
    /// Companies: `M`, twelve digits, one letter.
    PatternB,
}

impl NuiPattern {
    pub fn for_entity(is_moral: bool) -> Self {
        if is_moral {
            Self::PatternB
        } else {
            Self::PatternA
        }
    }

    /// Message key reported when the pattern does not match.
    pub fn error_key(&self) -> &'static str {
        match self {
            Self::PatternA => "kycForm.errors.nui.format",
            Self::PatternB => "kycForm.errors.nui.formatMoral",
        }
    }
}

/// The rule set for one document variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantRules {
    pub document_type: DocumentType,
    pub number: NumberConstraint,
    pub requires_postfix: bool,
    pub nui_pattern: NuiPattern,
    /// Segment of the `kycForm.errors.number.*` message keys.
    pub error_key: &'static str,
}

impl VariantRules {
    /// Rules for a known document type.
    pub fn for_type(document_type: DocumentType, is_moral: bool) -> Self {
        let (number, requires_postfix) = match document_type {
            DocumentType::Cni => (NumberConstraint::Length(9), true),
            DocumentType::Cs => (NumberConstraint::Length(7), true),
            DocumentType::RecpCs => (NumberConstraint::Length(10), true),
            DocumentType::RecpCni => (NumberConstraint::Length(10), true),
            DocumentType::TradeRegister => (NumberConstraint::Range { min: 7, max: 15 }, false),
        };
        Self {
            document_type,
            number,
            requires_postfix,
            nui_pattern: NuiPattern::for_entity(is_moral),
            error_key: document_type.error_key(),
        }
    }

    /// Message key for a number that is too short under this variant.
    pub fn number_short_key(&self) -> String {
        match self.number {
            NumberConstraint::Length(_) => format!("kycForm.errors.number.{}", self.error_key),
            NumberConstraint::Range { .. } => {
                format!("kycForm.errors.number.{}.min", self.error_key)
            }
        }
    }

    /// Message key for a number that is too long under this variant.
    pub fn number_long_key(&self) -> String {
        match self.number {
            NumberConstraint::Length(_) => format!("kycForm.errors.number.{}", self.error_key),
            NumberConstraint::Range { .. } => {
                format!("kycForm.errors.number.{}.max", self.error_key)
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantError {
    /// The tag is not one of the five document kinds.
    #[error("invalid document variant: {tag:?}")]
    InvalidVariant { tag: String },
}

/// Resolve the rules for a raw document-type tag.
pub fn resolve(tag: &str, is_moral: bool) -> Result<VariantRules, VariantError> {
    let document_type: DocumentType = tag.parse().map_err(|_| VariantError::InvalidVariant {
        tag: tag.to_string(),
    })?;
    Ok(VariantRules::for_type(document_type, is_moral))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The resolver is deterministic.
        #[test]
        fn resolve_is_pure(tag in "[A-Z_]{0,16}", is_moral in any::<bool>()) {
            prop_assert_eq!(resolve(&tag, is_moral), resolve(&tag, is_moral));
        }

        /// Every tag either resolves to its own type or fails as InvalidVariant.
        #[test]
        fn resolve_accepts_exactly_the_known_tags(tag in "[A-Z_]{0,16}") {
            let known = DocumentType::all().iter().any(|d| d.as_str() == tag);
            match resolve(&tag, false) {
                Ok(rules) => {
                    prop_assert!(known);
                    prop_assert_eq!(rules.document_type.as_str(), tag.as_str());
                }
                Err(VariantError::InvalidVariant { tag: rejected }) => {
                    prop_assert!(!known);
                    prop_assert_eq!(rejected, tag);
                }
            }
        }
    }
}
