//! Request shapes accepted by the services, with their boundary checks.
//!
//! # Responsibility
//! - Describe create/update/bulk inputs per entity kind.
//! - Validate every field against `InputLimits`, reporting all violations.
//!
//! # Invariants
//! - `validate` is pure; it never consults the store.
//! - Patch fields left as `None` keep their stored value.

use crate::config::InputLimits;
use crate::model::entity::{EntityId, Ordinal};
use crate::model::unit::UnitCategory;
use crate::validation::{
    require_char_len, require_max_chars, require_not_blank, require_one_of, require_ordinal,
    ValidationErrors,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

const CATEGORY_TAGS: &[&str] = &["OT", "NT"];

/// Trims and collapses internal whitespace runs of a display name.
pub fn normalize_display_name(value: &str) -> String {
    WHITESPACE_RUN_RE
        .replace_all(value.trim(), " ")
        .into_owned()
}

/// Trims a description; blank text means "no description".
pub fn normalize_description(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCollection {
    pub name: String,
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewCollection {
    pub fn validate(&self, limits: &InputLimits) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "name", &self.name, limits);
        check_code(&mut errors, "code", &self.code, limits);
        require_not_blank(&mut errors, "language", &self.language);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionPatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub language: Option<String>,
    /// `Some("")` (or whitespace) clears the stored description.
    pub description: Option<String>,
}

impl CollectionPatch {
    pub fn validate(&self, limits: &InputLimits) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            check_name(&mut errors, "name", name, limits);
        }
        if let Some(code) = &self.code {
            check_code(&mut errors, "code", code, limits);
        }
        if let Some(language) = &self.language {
            require_not_blank(&mut errors, "language", language);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUnit {
    pub collection_id: EntityId,
    pub ordinal: Ordinal,
    pub name: String,
    pub code: String,
    /// `OT` or `NT`.
    pub category: String,
}

impl NewUnit {
    pub fn validate(&self, limits: &InputLimits) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_ordinal(
            &mut errors,
            "ordinal",
            self.ordinal,
            Some(limits.unit_ordinal_max),
        );
        check_name(&mut errors, "name", &self.name, limits);
        require_not_blank(&mut errors, "code", &self.code);
        require_one_of(&mut errors, "category", &self.category, CATEGORY_TAGS);
        errors.into_result()
    }

    /// Parsed category; only meaningful after `validate` passed.
    pub(crate) fn parsed_category(&self) -> Option<UnitCategory> {
        UnitCategory::parse(&self.category)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitPatch {
    pub collection_id: Option<EntityId>,
    pub ordinal: Option<Ordinal>,
    pub name: Option<String>,
    pub code: Option<String>,
    pub category: Option<String>,
}

impl UnitPatch {
    pub fn validate(&self, limits: &InputLimits) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(ordinal) = self.ordinal {
            require_ordinal(&mut errors, "ordinal", ordinal, Some(limits.unit_ordinal_max));
        }
        if let Some(name) = &self.name {
            check_name(&mut errors, "name", name, limits);
        }
        if let Some(code) = &self.code {
            require_not_blank(&mut errors, "code", code);
        }
        if let Some(category) = &self.category {
            require_one_of(&mut errors, "category", category, CATEGORY_TAGS);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubunit {
    pub unit_id: EntityId,
    pub ordinal: Ordinal,
}

impl NewSubunit {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_ordinal(&mut errors, "ordinal", self.ordinal, None);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubunitPatch {
    pub unit_id: Option<EntityId>,
    pub ordinal: Option<Ordinal>,
}

impl SubunitPatch {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(ordinal) = self.ordinal {
            require_ordinal(&mut errors, "ordinal", ordinal, None);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLeaf {
    pub subunit_id: EntityId,
    pub ordinal: Ordinal,
    pub text: String,
}

impl NewLeaf {
    pub fn validate(&self, limits: &InputLimits) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_ordinal(&mut errors, "ordinal", self.ordinal, None);
        check_leaf_text(&mut errors, "text", &self.text, limits);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeafPatch {
    pub subunit_id: Option<EntityId>,
    pub ordinal: Option<Ordinal>,
    pub text: Option<String>,
}

impl LeafPatch {
    pub fn validate(&self, limits: &InputLimits) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(ordinal) = self.ordinal {
            require_ordinal(&mut errors, "ordinal", ordinal, None);
        }
        if let Some(text) = &self.text {
            check_leaf_text(&mut errors, "text", text, limits);
        }
        errors.into_result()
    }
}

/// One leaf of a bulk request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafSpec {
    pub ordinal: Ordinal,
    pub text: String,
}

impl LeafSpec {
    pub fn new(ordinal: Ordinal, text: impl Into<String>) -> Self {
        Self {
            ordinal,
            text: text.into(),
        }
    }
}

/// Bulk leaf creation under one subunit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkLeaves {
    pub subunit_id: EntityId,
    pub leaves: Vec<LeafSpec>,
}

impl BulkLeaves {
    /// Field checks only; duplicate ordinals are the coordinator's concern.
    pub fn validate(&self, limits: &InputLimits) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.leaves.is_empty() {
            errors.push("leaves", "must contain at least 1 item");
        }
        for (index, spec) in self.leaves.iter().enumerate() {
            require_ordinal(&mut errors, &format!("leaves[{index}].ordinal"), spec.ordinal, None);
            check_leaf_text(&mut errors, &format!("leaves[{index}].text"), &spec.text, limits);
        }
        errors.into_result()
    }
}

fn check_code(errors: &mut ValidationErrors, field: &str, code: &str, limits: &InputLimits) {
    require_not_blank(errors, field, code);
    require_char_len(
        errors,
        field,
        code,
        limits.code_min_chars,
        limits.code_max_chars,
    );
}

fn check_name(errors: &mut ValidationErrors, field: &str, name: &str, limits: &InputLimits) {
    require_not_blank(errors, field, name);
    require_max_chars(errors, field, name.trim(), limits.name_max_chars);
}

fn check_leaf_text(errors: &mut ValidationErrors, field: &str, text: &str, limits: &InputLimits) {
    require_not_blank(errors, field, text);
    require_max_chars(errors, field, text, limits.leaf_text_max_chars);
}
