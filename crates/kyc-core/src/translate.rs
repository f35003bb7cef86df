//! # Message Translation
//!
//! The engine never formats user-facing text itself. Every message is a
//! key under `kycForm.errors.*` passed through a [`Translate`]
//! implementation supplied by the caller.
//!
//! Three implementations ship with the crate:
//!
//! - [`FnTranslate`], wrapping any `Fn(&str) -> String` closure,
//! - [`KeyEcho`], which returns the key unchanged (useful in tests and
//!   when no catalog is configured),
//! - [`Catalog`], a flat key/value table loaded from a JSON or YAML file
//!   whose nested objects are flattened into dotted keys.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

/// Resolve a message key into user-facing text.
pub trait Translate {
    fn translate(&self, key: &str) -> String;
}

/// Adapts a closure into a [`Translate`] implementation.
#[derive(Debug, Clone, Copy)]
pub struct FnTranslate<F>(pub F);

impl<F> Translate for FnTranslate<F>
where
    F: Fn(&str) -> String,
{
    fn translate(&self, key: &str) -> String {
        (self.0)(key)
    }
}

impl<T: Translate + ?Sized> Translate for &T {
    fn translate(&self, key: &str) -> String {
        (**self).translate(key)
    }
}

impl<T: Translate + ?Sized> Translate for std::sync::Arc<T> {
    fn translate(&self, key: &str) -> String {
        (**self).translate(key)
    }
}

/// Returns every key unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyEcho;

impl Translate for KeyEcho {
    fn translate(&self, key: &str) -> String {
        key.to_string()
    }
}

// ─── Catalog ─────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read message catalog {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse JSON message catalog {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to parse YAML message catalog {path}: {source}")]
    Yaml {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("message catalog root must be an object, found {found}")]
    NotAnObject { found: &'static str },
}

/// Flat message table. Missing keys fall back to the key itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    messages: BTreeMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one message.
    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(key.into(), message.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Build a catalog from a nested JSON object.
    pub fn from_value(value: &Value) -> Result<Self, CatalogError> {
        let Value::Object(map) = value else {
            return Err(CatalogError::NotAnObject {
                found: value_kind(value),
            });
        };
        let mut catalog = Self::new();
        for (key, child) in map {
            catalog.flatten_into(key, child);
        }
        Ok(catalog)
    }

    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(text).map_err(|source| CatalogError::Json {
            path: "<inline>".to_string(),
            source,
        })?;
        Self::from_value(&value)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_yaml::from_str(text).map_err(|source| CatalogError::Yaml {
            path: "<inline>".to_string(),
            source,
        })?;
        Self::from_value(&value)
    }

    /// Load a catalog file. `.yaml` and `.yml` are parsed as YAML,
    /// anything else as JSON.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: display.clone(),
            source,
        })?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let value: Value = if is_yaml {
            serde_yaml::from_str(&text).map_err(|source| CatalogError::Yaml {
                path: display,
                source,
            })?
        } else {
            serde_json::from_str(&text).map_err(|source| CatalogError::Json {
                path: display,
                source,
            })?
        };
        Self::from_value(&value)
    }

    fn flatten_into(&mut self, prefix: &str, value: &Value) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    self.flatten_into(&format!("{prefix}.{key}"), child);
                }
            }
            Value::String(s) => {
                self.messages.insert(prefix.to_string(), s.clone());
            }
            Value::Null => {}
            other => {
                self.messages.insert(prefix.to_string(), other.to_string());
            }
        }
    }
}

impl Translate for Catalog {
    fn translate(&self, key: &str) -> String {
        self.get(key).unwrap_or(key).to_string()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_translate() {
        let upper = FnTranslate(|key: &str| key.to_uppercase());
        assert_eq!(upper.translate("kycForm.errors.required"), "KYCFORM.ERRORS.REQUIRED");
    }

    #[test]
    fn references_and_arcs_forward() {
        fn render<T: Translate>(t: T) -> String {
            t.translate("kycForm.errors.required")
        }
        let catalog = Catalog::from_json_str(r#"{"kycForm":{"errors":{"required":"Required"}}}"#)
            .unwrap();
        assert_eq!(render(&catalog), "Required");
        assert_eq!(render(std::sync::Arc::new(KeyEcho)), "kycForm.errors.required");
        assert_eq!(render(&FnTranslate(|_: &str| String::from("x"))), "x");
    }

    #[test]
    fn key_echo_returns_key() {
        assert_eq!(KeyEcho.translate("kycForm.errors.fillAll"), "kycForm.errors.fillAll");
    }

    #[test]
    fn json_catalog_flattens_nested_keys() {
        let catalog = Catalog::from_json_str(
            r#"{"kycForm":{"errors":{"required":"Required","phone":{"invalid":"Bad phone"}}}}"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.translate("kycForm.errors.phone.invalid"), "Bad phone");
        assert_eq!(catalog.translate("kycForm.errors.missing"), "kycForm.errors.missing");
    }

    #[test]
    fn yaml_catalog_flattens_nested_keys() {
        let catalog = Catalog::from_yaml_str(
            "kycForm:\n  errors:\n    invalidEmail: Invalid email\n    nui:\n      length: Too long\n",
        )
        .unwrap();
        assert_eq!(catalog.get("kycForm.errors.nui.length"), Some("Too long"));
        assert_eq!(catalog.get("kycForm.errors.invalidEmail"), Some("Invalid email"));
    }

    #[test]
    fn catalog_root_must_be_object() {
        let err = Catalog::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, CatalogError::NotAnObject { found: "array" }));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Catalog::load(Path::new("/nonexistent/messages.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
