//! Field-state projection.
//!
//! The widget tracks per-field UI state (validity, filter text) keyed by
//! schema identifier. Consumers read it keyed by accessor and shaped like the
//! form data: objects as maps, arrays as one entry per element.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::schema::{FieldType, Schema, SchemaItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LeafState {
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default = "SchemaItem::default_visible")]
    pub is_visible: bool,
    #[serde(default = "LeafState::default_valid")]
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_text: Option<String>,
}

impl LeafState {
    const fn default_valid() -> bool {
        true
    }
}

/// State of one field, nested the way the form data is.
///
/// Variants are tried in order. `Leaf` rejects unknown keys, so an object
/// keyed by field identifiers falls through to `Object`, while an empty `{}`
/// reads as a default leaf. `Leaf` has to stay ahead of `Object`: an array
/// element written as `{}` must not turn into an empty nested object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldState {
    Array(Vec<FieldState>),
    Leaf(LeafState),
    Object(IndexMap<String, FieldState>),
}

impl FieldState {
    fn entry(&self, key: &str) -> Option<&FieldState> {
        match self {
            FieldState::Object(entries) => entries.get(key),
            _ => None,
        }
    }
}

/// Projects `internal` (keyed by identifier) onto `schema`, keyed by accessor.
///
/// Visibility, required and disabled flags come from the schema; validity
/// and filter text from the internal state, validity defaulting to `true`.
/// An array yields one entry per element present in the internal state.
pub fn generate_field_state(
    schema: &Schema,
    internal: Option<&FieldState>,
) -> IndexMap<String, FieldState> {
    schema
        .values()
        .map(|item| {
            let state = internal.and_then(|state| state.entry(&item.identifier));
            (item.accessor.clone(), project_item(item, state))
        })
        .collect()
}

fn project_item(item: &SchemaItem, internal: Option<&FieldState>) -> FieldState {
    match item.field_type {
        FieldType::Object => FieldState::Object(generate_field_state(&item.children, internal)),
        FieldType::Array => {
            let elements = match (internal, item.array_item()) {
                (Some(FieldState::Array(elements)), Some(template)) => elements
                    .iter()
                    .map(|element| project_item(template, Some(element)))
                    .collect(),
                _ => Vec::new(),
            };
            FieldState::Array(elements)
        }
        _ => {
            let (is_valid, filter_text) = match internal {
                Some(FieldState::Leaf(leaf)) => (leaf.is_valid, leaf.filter_text.clone()),
                _ => (true, None),
            };
            FieldState::Leaf(LeafState {
                is_disabled: item.is_disabled,
                is_required: item.is_required,
                is_visible: item.is_visible,
                is_valid,
                filter_text,
            })
        }
    }
}
