//! Field-level input checks run before any request reaches the core.
//!
//! # Responsibility
//! - Provide small composable checks (non-blank, length, range, enum).
//! - Collect every violation of one input instead of stopping at the first.
//!
//! # Invariants
//! - Checks never mutate the value they inspect.
//! - Character counts are Unicode scalar values, not bytes.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Dotted path, e.g. `leaves[2].text`.
    pub field: String,
    pub message: String,
}

/// Every violation found in one input value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Whether any violation names `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for violation in &self.violations {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", violation.field, violation.message)?;
            first = false;
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}

/// Rejects empty or whitespace-only text.
pub fn require_not_blank(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, "must not be empty");
    }
}

/// Requires `min..=max` characters after trimming.
pub fn require_char_len(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) {
    let count = value.trim().chars().count();
    if count < min || count > max {
        errors.push(
            field,
            format!("must be between {min} and {max} characters, got {count}"),
        );
    }
}

/// Requires at most `max` characters.
pub fn require_max_chars(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    let count = value.chars().count();
    if count > max {
        errors.push(
            field,
            format!("must be at most {max} characters, got {count}"),
        );
    }
}

/// Requires a 1-based ordinal, optionally capped at `max`.
pub fn require_ordinal(errors: &mut ValidationErrors, field: &str, value: u32, max: Option<u32>) {
    if value < 1 {
        errors.push(field, "must be at least 1");
        return;
    }
    if let Some(max) = max {
        if value > max {
            errors.push(field, format!("must be at most {max}, got {value}"));
        }
    }
}

/// Requires `value` to be exactly one of `allowed`.
pub fn require_one_of(errors: &mut ValidationErrors, field: &str, value: &str, allowed: &[&str]) {
    if !allowed.contains(&value) {
        errors.push(
            field,
            format!("must be one of {}, got `{value}`", allowed.join("|")),
        );
    }
}
