//! Top-level schema computation for a widget.
//!
//! Wraps [`parse`] with the checks a widget runs before accepting a new
//! sample: nothing to do for an empty or identical sample, and a ceiling on
//! the number of generated fields.

use itertools::Itertools;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    builder::{construct_plausible_object_from_array, is_binding},
    error::Result,
    inference::normalize_array_value,
    path::{SCHEMA_PATH_ROOT, child_item_path, schema_item_at, top_level_item_path},
    reconcile::parse,
    schema::{Schema, SchemaItem, root_item},
};

pub const DEFAULT_WIDGET_NAME: &str = "JSONForm1";
pub const DEFAULT_FIELD_LIMIT: usize = 50;
const DEFAULT_VALUE_PROPERTY: &str = "defaultValue";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeOptions {
    /// Widget name used inside default-value bindings.
    pub widget_name: String,
    /// Largest number of fields a sample may produce.
    pub field_limit: usize,
}

impl Default for ComputeOptions {
    fn default() -> Self {
        Self {
            widget_name: DEFAULT_WIDGET_NAME.to_string(),
            field_limit: DEFAULT_FIELD_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComputedSchemaStatus {
    Unchanged,
    Updated,
    LimitExceeded,
}

/// A widget property whose value is a binding to be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DynamicPropertyPath {
    pub key: String,
}

impl DynamicPropertyPath {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedSchema {
    pub status: ComputedSchemaStatus,
    pub schema: Schema,
    pub dynamic_property_path_list: Vec<DynamicPropertyPath>,
}

/// Number of object keys in `sample`, arrays counted once through their
/// representative element.
pub fn count_fields(sample: &Value) -> usize {
    match sample {
        Value::Object(object) => object.len() + object.values().map(count_fields).sum::<usize>(),
        Value::Array(items) => {
            if items.iter().any(Value::is_object) {
                count_fields(&Value::Object(construct_plausible_object_from_array(items)))
            } else {
                normalize_array_value(items).map_or(0, count_fields)
            }
        }
        _ => 0,
    }
}

/// Reconciles `sample` into `previous` and reports what happened.
pub fn compute_schema(
    options: &ComputeOptions,
    sample: Option<&Value>,
    previous: &Schema,
    current_paths: &[DynamicPropertyPath],
) -> Result<ComputedSchema> {
    let unchanged = || ComputedSchema {
        status: ComputedSchemaStatus::Unchanged,
        schema: previous.clone(),
        dynamic_property_path_list: current_paths.to_vec(),
    };

    let Some(sample) = sample.filter(|value| !is_empty_sample(value)) else {
        debug!("empty sample, schema left as is");
        return Ok(unchanged());
    };
    if root_item(previous).is_some_and(|root| root.source_data.as_ref() == Some(sample)) {
        debug!("sample identical to the previous one, schema left as is");
        return Ok(unchanged());
    }

    let field_count = count_fields(sample);
    if field_count > options.field_limit {
        warn!(
            "sample has {field_count} fields, more than the limit of {}",
            options.field_limit
        );
        return Ok(ComputedSchema {
            status: ComputedSchemaStatus::LimitExceeded,
            ..unchanged()
        });
    }

    let schema = parse(&options.widget_name, Some(sample), previous)?;
    let dynamic_property_path_list = dynamic_property_path_list(&schema, current_paths);
    info!("schema updated with {field_count} field(s)");
    Ok(ComputedSchema {
        status: ComputedSchemaStatus::Updated,
        schema,
        dynamic_property_path_list,
    })
}

fn is_empty_sample(sample: &Value) -> bool {
    match sample {
        Value::Null => true,
        Value::Object(object) => object.is_empty(),
        _ => false,
    }
}

/// Dynamic paths after a re-parse: paths outside the schema and paths of
/// items that still exist are kept, then every default-value binding in
/// `schema` is listed.
pub fn dynamic_property_path_list(
    schema: &Schema,
    current_paths: &[DynamicPropertyPath],
) -> Vec<DynamicPropertyPath> {
    let schema_prefix = format!("{SCHEMA_PATH_ROOT}.");
    let kept = current_paths.iter().filter(|path| {
        if !path.key.starts_with(&schema_prefix) {
            return true;
        }
        let Some((item_path, property)) = path.key.rsplit_once('.') else {
            return false;
        };
        property != DEFAULT_VALUE_PROPERTY && schema_item_at(schema, item_path).is_ok()
    });

    let mut bindings = Vec::new();
    for (identifier, item) in schema {
        collect_bindings(item, &top_level_item_path(identifier), &mut bindings);
    }

    kept.cloned().chain(bindings).unique().collect()
}

fn collect_bindings(item: &SchemaItem, item_path: &str, out: &mut Vec<DynamicPropertyPath>) {
    if item.default_value.as_ref().and_then(Value::as_str).is_some_and(is_binding) {
        out.push(DynamicPropertyPath::new(format!(
            "{item_path}.{DEFAULT_VALUE_PROPERTY}"
        )));
    }
    for (identifier, child) in &item.children {
        collect_bindings(child, &child_item_path(item_path, identifier), out);
    }
}
