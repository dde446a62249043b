//! Schema node builder.
//!
//! Builds one [`SchemaItem`] per key/value pair and the nested schemas of
//! objects and arrays. Object and array conversion reconcile against the
//! previous children when there are any, so a nested rebuild keeps whatever
//! the user customised below it.

use heck::ToTitleCase;
use log::debug;
use serde_json::{Map, Value, json};

use crate::{
    error::Result,
    inference::{data_type_for, field_type_for, normalize_array_value, sub_data_type_for},
    path::{
        PathKey, get_source_data_path_from_schema_item_path, get_source_path,
        is_within_array_item, schema_item_at, schema_item_at_mut,
    },
    reconcile::{KeyFilter, KeyKind, apply_positions, keys_from_schema, reconcile_item},
    sanitize::sanitize_key,
    schema::{ARRAY_ITEM_KEY, DataType, FieldType, Schema, SchemaItem, UNPOSITIONED},
};

/// Settings shared by one recursive build.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub widget_name: &'a str,
    /// Fields under an array item template describe every element at once,
    /// so they get no default-value binding.
    pub skip_default_value: bool,
}

impl<'a> BuildContext<'a> {
    pub fn new(widget_name: &'a str) -> Self {
        Self {
            widget_name,
            skip_default_value: false,
        }
    }

    pub fn within_array(self) -> Self {
        Self {
            skip_default_value: true,
            ..self
        }
    }
}

/// Identity of the item being built.
#[derive(Debug, Clone, Copy)]
pub struct ItemSpec<'a> {
    /// Raw key as found in the sample.
    pub key: &'a str,
    pub identifier: &'a str,
    /// Source-data path of the sampled value.
    pub source_path: &'a str,
    /// Forces a field kind instead of inferring it from the sample.
    pub field_type: Option<FieldType>,
    pub is_custom_field: bool,
}

impl<'a> ItemSpec<'a> {
    pub fn new(key: &'a str, identifier: &'a str, source_path: &'a str) -> Self {
        Self {
            key,
            identifier,
            source_path,
            field_type: None,
            is_custom_field: false,
        }
    }
}

/// Binding expression the external evaluator resolves into a default value.
pub fn default_value_binding(widget_name: &str, source_path: &str) -> String {
    format!(
        "{{{{((sourceData, formData, fieldState) => ({source_path}))({widget_name}.sourceData, {widget_name}.formData, {widget_name}.fieldState)}}}}"
    )
}

/// Whether `text` holds a `{{ }}` expression rather than a literal.
pub fn is_binding(text: &str) -> bool {
    text.find("{{")
        .is_some_and(|start| text[start..].contains("}}"))
}

pub fn label_for(key: &str) -> String {
    if !key.is_ascii() || !key.chars().any(|c| c.is_ascii_alphanumeric()) {
        return key.to_string();
    }
    key.to_title_case()
}

fn props<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn color_options() -> Value {
    json!([
        { "label": "Blue", "value": "BLUE" },
        { "label": "Green", "value": "GREEN" },
        { "label": "Red", "value": "RED" },
    ])
}

/// Kind-specific options a fresh item of `field_type` starts with.
pub fn field_defaults(field_type: FieldType) -> Map<String, Value> {
    match field_type {
        FieldType::TextInput
        | FieldType::EmailInput
        | FieldType::PasswordInput
        | FieldType::MultilineTextInput => props([
            ("iconAlign", json!("left")),
            ("isSpellCheck", json!(false)),
        ]),
        FieldType::NumberInput => props([("iconAlign", json!("left"))]),
        FieldType::CurrencyInput => props([
            ("currencyCountryCode", json!("USD")),
            ("decimalsInCurrency", json!(0)),
            ("allowCurrencyChange", json!(false)),
        ]),
        FieldType::PhoneNumberInput => props([
            ("defaultDialCode", json!("+1")),
            ("allowDialCodeChange", json!(false)),
        ]),
        FieldType::Select | FieldType::Multiselect => props([
            ("options", color_options()),
            ("isFilterable", json!(false)),
            ("serverSideFiltering", json!(false)),
        ]),
        FieldType::Switch | FieldType::Checkbox => props([("alignWidget", json!("LEFT"))]),
        FieldType::RadioGroup => props([(
            "options",
            json!([
                { "label": "Yes", "value": "Y" },
                { "label": "No", "value": "N" },
            ]),
        )]),
        FieldType::Datepicker => props([
            ("dateFormat", json!("YYYY-MM-DD HH:mm")),
            ("convertToISO", json!(false)),
            ("closeOnSelection", json!(false)),
            ("shortcuts", json!(false)),
            ("minDate", json!("1920-12-31T18:30:00.000Z")),
            ("maxDate", json!("2121-12-31T18:29:00.000Z")),
        ]),
        FieldType::Array => props([
            ("backgroundColor", json!("#FAFAFA")),
            ("isCollapsible", json!(true)),
        ]),
        FieldType::Object => Map::new(),
    }
}

/// Stand-in sample for a field of `field_type` that has no backing data.
pub fn potential_data(field_type: FieldType) -> Value {
    match field_type {
        FieldType::NumberInput | FieldType::CurrencyInput => json!(0),
        FieldType::Switch | FieldType::Checkbox => json!(true),
        FieldType::Multiselect => json!([]),
        FieldType::Array => json!([{}]),
        FieldType::Object => json!({}),
        _ => json!(""),
    }
}

/// Builds a brand-new item for `spec` from `sample`.
pub fn get_schema_item_for(
    ctx: BuildContext<'_>,
    spec: &ItemSpec<'_>,
    sample: Option<&Value>,
) -> SchemaItem {
    let data_type = data_type_for(sample);
    let field_type = spec.field_type.unwrap_or_else(|| field_type_for(sample));
    let children = match field_type {
        FieldType::Object => sample
            .and_then(Value::as_object)
            .map(|object| convert_object_to_schema(ctx, Some(object), None, spec.source_path))
            .unwrap_or_default(),
        FieldType::Array => convert_array_to_schema(ctx, sample, None, spec.source_path),
        _ => Schema::new(),
    };
    let default_value = (!spec.is_custom_field && !ctx.skip_default_value)
        .then(|| Value::String(default_value_binding(ctx.widget_name, spec.source_path)));

    SchemaItem {
        identifier: spec.identifier.to_string(),
        original_identifier: spec.key.to_string(),
        accessor: spec.key.to_string(),
        label: label_for(spec.key),
        data_type,
        field_type,
        source_data: sample.cloned(),
        default_value,
        children,
        position: UNPOSITIONED,
        is_custom_field: spec.is_custom_field,
        is_visible: true,
        is_required: false,
        is_disabled: false,
        is_field_type_overridden: false,
        props: field_defaults(field_type),
    }
}

/// Fast path for an item whose sample kept its shape: everything the item
/// carries is reused, only the sample is refreshed and container children
/// are reconciled one level down.
pub fn get_unmodified_schema_item_for(
    ctx: BuildContext<'_>,
    previous: &SchemaItem,
    sample: Option<&Value>,
    source_path: &str,
) -> SchemaItem {
    let children = match previous.field_type {
        FieldType::Object => match sample.and_then(Value::as_object) {
            Some(object) => {
                convert_object_to_schema(ctx, Some(object), Some(&previous.children), source_path)
            }
            None => previous.children.clone(),
        },
        FieldType::Array => {
            convert_array_to_schema(ctx, sample, Some(&previous.children), source_path)
        }
        _ => previous.children.clone(),
    };
    SchemaItem {
        children,
        source_data: sample.cloned(),
        ..previous.clone()
    }
}

/// Builds or updates one child per key of `sample`.
///
/// Keys that vanished are dropped first, unless they belong to custom fields,
/// so new keys can reuse the identifiers they freed. New keys are appended
/// after the existing fields. Keys present on both sides go through the
/// per-item reconciliation.
pub fn convert_object_to_schema(
    ctx: BuildContext<'_>,
    sample: Option<&Map<String, Value>>,
    previous: Option<&Schema>,
    source_path: &str,
) -> Schema {
    let empty = Map::new();
    let current = sample.unwrap_or(&empty);
    let mut schema = previous.cloned().unwrap_or_default();

    let previous_keys = keys_from_schema(&schema, KeyKind::OriginalIdentifier, KeyFilter::NonCustom);
    let identifier_for = |schema: &Schema, key: &str| {
        schema
            .values()
            .find(|item| item.is_sample_driven() && item.original_identifier == key)
            .map(|item| item.identifier.clone())
    };

    let mut removed = 0usize;
    for key in previous_keys.iter().filter(|key| !current.contains_key(*key)) {
        if let Some(identifier) = identifier_for(&schema, key.as_str()) {
            schema.shift_remove(&identifier);
            removed += 1;
        }
    }

    let mut added = Vec::new();
    for (key, value) in current {
        if previous_keys.contains(key) {
            continue;
        }
        let identifier = sanitize_key(key, &schema.keys().collect::<Vec<_>>());
        let path = get_source_path(PathKey::Name(key), Some(source_path));
        let spec = ItemSpec::new(key, &identifier, &path);
        let item = reconcile_item(ctx, &spec, None, Some(value));
        schema.insert(identifier.clone(), item);
        added.push(identifier);
    }

    for key in previous_keys.iter().filter(|key| current.contains_key(*key)) {
        let Some(identifier) = identifier_for(&schema, key.as_str()) else {
            continue;
        };
        let path = get_source_path(PathKey::Name(key), Some(source_path));
        let spec = ItemSpec::new(key, &identifier, &path);
        let updated = reconcile_item(ctx, &spec, schema.get(&identifier), current.get(key));
        schema.insert(identifier, updated);
    }

    if !added.is_empty() || removed > 0 {
        debug!(
            "{source_path}: {} field(s) added, {removed} removed",
            added.len()
        );
    }
    apply_positions(&mut schema, &added);
    schema
}

/// Builds the single array item template for `sample`, reconciled against
/// the previous template when there is one.
pub fn convert_array_to_schema(
    ctx: BuildContext<'_>,
    sample: Option<&Value>,
    previous: Option<&Schema>,
    source_path: &str,
) -> Schema {
    let representative = array_representative(sample);
    let path = get_source_path(PathKey::Index(0), Some(source_path));
    let spec = ItemSpec::new(ARRAY_ITEM_KEY, ARRAY_ITEM_KEY, &path);
    let previous_item = previous.and_then(|schema| schema.get(ARRAY_ITEM_KEY));
    let item = reconcile_item(ctx.within_array(), &spec, previous_item, representative.as_ref());

    let mut schema = Schema::new();
    schema.insert(ARRAY_ITEM_KEY.to_string(), item);
    apply_positions(&mut schema, &[]);
    schema
}

/// The value an array's item template is inferred from. Arrays of objects
/// are folded into one plausible object; other arrays use their first
/// element. A non-array stands in as an empty object.
fn array_representative(sample: Option<&Value>) -> Option<Value> {
    match sample {
        Some(Value::Array(items)) => match sub_data_type_for(sample) {
            Some(DataType::Object) => Some(Value::Object(construct_plausible_object_from_array(items))),
            _ => normalize_array_value(items).cloned(),
        },
        _ => Some(Value::Object(Map::new())),
    }
}

/// Merges the keys of every object element into one object. Later elements
/// win on collisions, nested objects merge recursively, and an empty value
/// never replaces a populated one.
pub fn construct_plausible_object_from_array(items: &[Value]) -> Map<String, Value> {
    let mut merged = Map::new();
    for item in items {
        if let Value::Object(object) = item {
            merge_into(&mut merged, object);
        }
    }
    merged
}

fn merge_into(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, incoming) in source {
        if let (Some(Value::Object(existing)), Value::Object(nested)) = (target.get_mut(key), incoming)
        {
            merge_into(existing, nested);
            continue;
        }
        let keep_existing = is_empty_value(incoming)
            && target.get(key).is_some_and(|existing| !is_empty_value(existing));
        if !keep_existing {
            target.insert(key.clone(), incoming.clone());
        }
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(object) => object.is_empty(),
        _ => false,
    }
}

/// Rebuilds the item at `item_path` as a `field_type` field.
///
/// Identity (identifier, original key, accessor), label, position and
/// visibility flags carry over; data type, children, default value and kind
/// options are derived again for the new kind. The item is marked as
/// overridden so later re-parses keep the kind. Custom fields have no sample,
/// so they are rebuilt from the kind's stand-in data.
pub fn get_schema_item_by_field_type(
    field_type: FieldType,
    widget_name: &str,
    schema: &Schema,
    item_path: &str,
) -> Result<SchemaItem> {
    let item = schema_item_at(schema, item_path)?;
    let source_path = get_source_data_path_from_schema_item_path(schema, item_path)?;
    let mut ctx = BuildContext::new(widget_name);
    if is_within_array_item(item_path) {
        ctx = ctx.within_array();
    }
    let sample = if item.is_custom_field {
        Some(potential_data(field_type))
    } else {
        item.source_data.clone()
    };
    let spec = ItemSpec {
        key: &item.original_identifier,
        identifier: &item.identifier,
        source_path: &source_path,
        field_type: Some(field_type),
        is_custom_field: item.is_custom_field,
    };

    let mut updated = get_schema_item_for(ctx, &spec, sample.as_ref());
    updated.accessor = item.accessor.clone();
    updated.label = item.label.clone();
    updated.position = item.position;
    updated.is_visible = item.is_visible;
    updated.is_required = item.is_required;
    updated.is_disabled = item.is_disabled;
    updated.is_field_type_overridden = true;
    Ok(updated)
}

/// Applies [`get_schema_item_by_field_type`] in place.
pub fn set_schema_item_field_type(
    field_type: FieldType,
    widget_name: &str,
    schema: &mut Schema,
    item_path: &str,
) -> Result<()> {
    let updated = get_schema_item_by_field_type(field_type, widget_name, schema, item_path)?;
    *schema_item_at_mut(schema, item_path)? = updated;
    Ok(())
}
