//! HTML form state
//!
//! A submitted (or pre-filled) form as the templates see it: raw field
//! values plus field-scoped error messages.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key used for errors that do not belong to a single field
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Field-scoped validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single error on one field
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages attached to `field`
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `Ok(())` when no error was collected
    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Form values and errors handed to a template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Form {
    pub fields: BTreeMap<String, String>,
    pub errors: FormErrors,
}

impl Form {
    /// Blank form
    pub fn empty() -> Self {
        Self::default()
    }

    /// Form pre-filled with `(field, value)` pairs
    pub fn with_values<'a>(values: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            fields: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            errors: FormErrors::new(),
        }
    }

    pub fn with_errors(mut self, errors: FormErrors) -> Self {
        self.errors = errors;
        self
    }
}
