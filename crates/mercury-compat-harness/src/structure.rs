// crates/mercury-compat-harness/src/structure.rs
// ============================================================================
// Module: Response Structure Verification
// Description: Field-presence tables for the chat completion contract.
// Purpose: Report which contract fields a response carries, scope by scope.
// Dependencies: mercury-compat-client, serde
// ============================================================================

//! ## Overview
//! Each scope is an explicit table of field name to presence accessor. Every
//! field of every scope is always reported. When a scope's parent is absent
//! (no first choice, no usage object) all of its fields report absent.
//! Absence is data, never an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use mercury_compat_client::ChatResponse;
use mercury_compat_client::Choice;
use mercury_compat_client::Usage;
use serde::Serialize;

// ============================================================================
// SECTION: Field Tables
// ============================================================================

/// A named presence accessor over `T`.
pub struct FieldSpec<T> {
    /// Contract field name.
    pub name: &'static str,
    /// Returns true when the field is present.
    pub present: fn(&T) -> bool,
}

/// Required top-level response fields.
pub const TOP_LEVEL_FIELDS: [FieldSpec<ChatResponse>; 6] = [
    FieldSpec { name: "id", present: |response| response.id.is_some() },
    FieldSpec { name: "object", present: |response| response.object.is_some() },
    FieldSpec { name: "created", present: |response| response.created.is_some() },
    FieldSpec { name: "model", present: |response| response.model.is_some() },
    FieldSpec { name: "choices", present: |response| response.choices.is_some() },
    FieldSpec { name: "usage", present: |response| response.usage.is_some() },
];

/// Required fields of the first choice.
pub const CHOICE_FIELDS: [FieldSpec<Choice>; 3] = [
    FieldSpec { name: "index", present: |choice| choice.index.is_some() },
    FieldSpec { name: "message", present: |choice| choice.message.is_some() },
    FieldSpec { name: "finish_reason", present: |choice| choice.finish_reason.is_some() },
];

/// Required fields of the usage object.
pub const USAGE_FIELDS: [FieldSpec<Usage>; 3] = [
    FieldSpec { name: "prompt_tokens", present: |usage| usage.prompt_tokens.is_some() },
    FieldSpec { name: "completion_tokens", present: |usage| usage.completion_tokens.is_some() },
    FieldSpec { name: "total_tokens", present: |usage| usage.total_tokens.is_some() },
];

// ============================================================================
// SECTION: Report Types
// ============================================================================

/// Verification scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldScope {
    /// Fields of the response object itself.
    TopLevel,
    /// Fields of the first choice.
    Choice,
    /// Fields of the usage object.
    Usage,
}

impl FieldScope {
    /// Returns a stable label for the scope.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopLevel => "top-level",
            Self::Choice => "choice",
            Self::Usage => "usage",
        }
    }
}

/// Presence of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldPresence {
    /// Scope the field belongs to.
    pub scope: FieldScope,
    /// Contract field name.
    pub field: &'static str,
    /// Whether the field was present.
    pub present: bool,
}

impl FieldPresence {
    /// Renders the presence as a diagnostic line.
    #[must_use]
    pub fn describe(&self) -> String {
        let state = if self.present { "present" } else { "missing" };
        format!("{}.{}: {state}", self.scope.as_str(), self.field)
    }
}

/// Presence of every required field, in table order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructureReport {
    /// Top-level, then choice, then usage fields.
    pub fields: Vec<FieldPresence>,
}

impl StructureReport {
    /// Returns true when every field was present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.fields.iter().all(|field| field.present)
    }

    /// Fields that were missing.
    pub fn missing(&self) -> impl Iterator<Item = &FieldPresence> {
        self.fields.iter().filter(|field| !field.present)
    }

    /// Looks up a single field's presence.
    #[must_use]
    pub fn presence(&self, scope: FieldScope, field: &str) -> Option<bool> {
        self.fields
            .iter()
            .find(|entry| entry.scope == scope && entry.field == field)
            .map(|entry| entry.present)
    }
}

// ============================================================================
// SECTION: Verification
// ============================================================================

/// Verifies a chat completion response against the contract tables.
#[must_use]
pub fn verify_structure(response: &ChatResponse) -> StructureReport {
    let mut fields = Vec::with_capacity(
        TOP_LEVEL_FIELDS.len() + CHOICE_FIELDS.len() + USAGE_FIELDS.len(),
    );
    check_scope(&mut fields, FieldScope::TopLevel, &TOP_LEVEL_FIELDS, Some(response));
    check_scope(&mut fields, FieldScope::Choice, &CHOICE_FIELDS, response.first_choice());
    check_scope(&mut fields, FieldScope::Usage, &USAGE_FIELDS, response.usage.as_ref());
    StructureReport {
        fields,
    }
}

/// Appends one scope's presence entries; an absent parent marks all missing.
fn check_scope<T>(
    out: &mut Vec<FieldPresence>,
    scope: FieldScope,
    table: &[FieldSpec<T>],
    parent: Option<&T>,
) {
    out.extend(table.iter().map(|spec| FieldPresence {
        scope,
        field: spec.name,
        present: parent.is_some_and(|value| (spec.present)(value)),
    }));
}
