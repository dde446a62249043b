//! Form schema model.
//!
//! A [`Schema`] maps sanitized identifiers to [`SchemaItem`]s. The top-level
//! schema holds a single entry under [`ROOT_SCHEMA_KEY`] describing the whole
//! sample; nested objects and arrays keep their fields in `children`. Arrays
//! describe their elements through one template child stored under
//! [`ARRAY_ITEM_KEY`].
//!
//! Display order is carried by `position`, never by map order. Everything the
//! property pane sets that the engine does not reason about (options, icon
//! alignment, colours, ...) lives in [`SchemaItem::props`] and is carried
//! through reconciliation untouched.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::SchemaError;

pub const ROOT_SCHEMA_KEY: &str = "__root_schema__";
pub const ARRAY_ITEM_KEY: &str = "__array_item__";
/// Root of every source-data path handed to the binding evaluator.
pub const SOURCE_DATA_ROOT: &str = "sourceData";
/// Position of an item that has not been placed among its siblings yet.
pub const UNPOSITIONED: i32 = -1;

pub type Schema = IndexMap<String, SchemaItem>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Null,
    Undefined,
    Function,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::Object => "object",
            DataType::Array => "array",
            DataType::Null => "null",
            DataType::Undefined => "undefined",
            DataType::Function => "function",
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, DataType::Null | DataType::Undefined)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "Array")]
    Array,
    #[serde(rename = "Checkbox")]
    Checkbox,
    #[serde(rename = "Currency Input")]
    CurrencyInput,
    #[serde(rename = "Datepicker")]
    Datepicker,
    #[serde(rename = "Email Input")]
    EmailInput,
    #[serde(rename = "Multiselect")]
    Multiselect,
    #[serde(rename = "Multiline Text Input")]
    MultilineTextInput,
    #[serde(rename = "Number Input")]
    NumberInput,
    #[serde(rename = "Object")]
    Object,
    #[serde(rename = "Password Input")]
    PasswordInput,
    #[serde(rename = "Phone Number Input")]
    PhoneNumberInput,
    #[serde(rename = "Radio Group")]
    RadioGroup,
    #[serde(rename = "Select")]
    Select,
    #[serde(rename = "Switch")]
    Switch,
    #[serde(rename = "Text Input")]
    TextInput,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Array => "Array",
            FieldType::Checkbox => "Checkbox",
            FieldType::CurrencyInput => "Currency Input",
            FieldType::Datepicker => "Datepicker",
            FieldType::EmailInput => "Email Input",
            FieldType::Multiselect => "Multiselect",
            FieldType::MultilineTextInput => "Multiline Text Input",
            FieldType::NumberInput => "Number Input",
            FieldType::Object => "Object",
            FieldType::PasswordInput => "Password Input",
            FieldType::PhoneNumberInput => "Phone Number Input",
            FieldType::RadioGroup => "Radio Group",
            FieldType::Select => "Select",
            FieldType::Switch => "Switch",
            FieldType::TextInput => "Text Input",
        }
    }

    pub fn variants() -> &'static [FieldType] {
        &[
            FieldType::Array,
            FieldType::Checkbox,
            FieldType::CurrencyInput,
            FieldType::Datepicker,
            FieldType::EmailInput,
            FieldType::Multiselect,
            FieldType::MultilineTextInput,
            FieldType::NumberInput,
            FieldType::Object,
            FieldType::PasswordInput,
            FieldType::PhoneNumberInput,
            FieldType::RadioGroup,
            FieldType::Select,
            FieldType::Switch,
            FieldType::TextInput,
        ]
    }

    /// Kinds that own nested schema entries.
    pub fn is_container(&self) -> bool {
        matches!(self, FieldType::Array | FieldType::Object)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = SchemaError;

    /// Accepts the display name (`Text Input`), screaming case (`TEXT_INPUT`)
    /// and kebab case (`text-input`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        FieldType::variants()
            .iter()
            .copied()
            .find(|candidate| {
                candidate
                    .as_str()
                    .chars()
                    .filter(char::is_ascii_alphanumeric)
                    .map(|c| c.to_ascii_lowercase())
                    .eq(normalized.chars())
            })
            .ok_or_else(|| SchemaError::UnknownFieldType(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaItem {
    pub identifier: String,
    pub original_identifier: String,
    pub accessor: String,
    #[serde(default)]
    pub label: String,
    pub data_type: DataType,
    pub field_type: FieldType,
    /// `None` is an absent (undefined) sample, `Some(Value::Null)` an explicit null.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_data: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub children: Schema,
    pub position: i32,
    #[serde(default)]
    pub is_custom_field: bool,
    #[serde(default = "SchemaItem::default_visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_disabled: bool,
    /// Set when the field kind was picked by hand instead of inferred. A
    /// reshaped sample then keeps the kind.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_field_type_overridden: bool,
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

impl SchemaItem {
    pub const fn default_visible() -> bool {
        true
    }

    pub fn is_array_item(&self) -> bool {
        self.identifier == ARRAY_ITEM_KEY
    }

    pub fn array_item(&self) -> Option<&SchemaItem> {
        self.children.get(ARRAY_ITEM_KEY)
    }

    /// Whether the item mirrors a key of the sample. Custom fields are added
    /// by hand in the property pane and are never removed by a re-parse.
    pub fn is_sample_driven(&self) -> bool {
        !self.is_custom_field
    }
}

pub fn root_item(schema: &Schema) -> Option<&SchemaItem> {
    schema.get(ROOT_SCHEMA_KEY)
}

/// Keeps an explicit `null` distinct from a missing key when reading a
/// persisted schema.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
