//! Schema reconciliation.
//!
//! [`parse`] walks a new sample against the previous schema and decides, key
//! by key, whether an item can be reused, only needs a fresh sample, or has
//! to be rebuilt because the sample changed shape. User edits (labels,
//! accessors, flags, positions, custom fields) survive every path.

use itertools::Itertools;
use log::debug;
use serde_json::Value;

use crate::{
    builder::{
        BuildContext, ItemSpec, field_defaults, get_schema_item_for,
        get_unmodified_schema_item_for, is_binding,
    },
    error::{Result, SchemaError},
    inference::{
        ValueShape, check_if_array_and_sub_data_type_changed, data_type_for,
        has_null_or_undefined,
    },
    schema::{
        FieldType, ROOT_SCHEMA_KEY, SOURCE_DATA_ROOT, Schema, SchemaItem, UNPOSITIONED,
        root_item,
    },
};

/// Which key of each item [`keys_from_schema`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Identifier,
    OriginalIdentifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFilter {
    All,
    Custom,
    NonCustom,
}

impl KeyFilter {
    fn accepts(self, item: &SchemaItem) -> bool {
        match self {
            KeyFilter::All => true,
            KeyFilter::Custom => item.is_custom_field,
            KeyFilter::NonCustom => !item.is_custom_field,
        }
    }
}

/// Keys of one schema level, in map order.
pub fn keys_from_schema(schema: &Schema, kind: KeyKind, filter: KeyFilter) -> Vec<String> {
    schema
        .values()
        .filter(|item| filter.accepts(item))
        .map(|item| match kind {
            KeyKind::Identifier => item.identifier.clone(),
            KeyKind::OriginalIdentifier => item.original_identifier.clone(),
        })
        .collect()
}

/// What happens to an existing item when its sample changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The sample went null or missing: the item is frozen, only the sample
    /// is replaced.
    KeepShape,
    /// Data type or array element type changed.
    Rebuild,
    Unchanged,
}

impl Reconciliation {
    pub fn between(previous: &SchemaItem, sample: Option<&Value>) -> Self {
        let current = ValueShape::of(sample);
        if has_null_or_undefined(sample, previous.source_data.as_ref())
            && current.is_nullish()
            && !previous.data_type.is_nullish()
        {
            return Reconciliation::KeepShape;
        }
        let both_nullish = current.is_nullish() && previous.data_type.is_nullish();
        if (!both_nullish && current.data_type != previous.data_type)
            || check_if_array_and_sub_data_type_changed(sample, previous.source_data.as_ref())
        {
            Reconciliation::Rebuild
        } else {
            Reconciliation::Unchanged
        }
    }
}

/// Produces the item for `spec` given what was there before.
pub fn reconcile_item(
    ctx: BuildContext<'_>,
    spec: &ItemSpec<'_>,
    previous: Option<&SchemaItem>,
    sample: Option<&Value>,
) -> SchemaItem {
    let Some(previous) = previous else {
        return get_schema_item_for(ctx, spec, sample);
    };
    match Reconciliation::between(previous, sample) {
        Reconciliation::KeepShape => SchemaItem {
            source_data: sample.cloned(),
            ..previous.clone()
        },
        Reconciliation::Unchanged => {
            get_unmodified_schema_item_for(ctx, previous, sample, spec.source_path)
        }
        Reconciliation::Rebuild => {
            debug!(
                "{}: rebuilding {} field as {}",
                spec.source_path,
                previous.data_type,
                data_type_for(sample)
            );
            rebuild_item(ctx, spec, previous, sample)
        }
    }
}

/// Rebuilds an item for a reshaped sample while keeping its identity and
/// user metadata. A field kind picked by hand is kept, along with its options
/// and any literal default value. When the kind is inferred again, options the
/// user changed are laid over the new kind's defaults.
fn rebuild_item(
    ctx: BuildContext<'_>,
    spec: &ItemSpec<'_>,
    previous: &SchemaItem,
    sample: Option<&Value>,
) -> SchemaItem {
    let kept_kind = previous
        .is_field_type_overridden
        .then_some(previous.field_type);
    let spec = ItemSpec {
        field_type: spec.field_type.or(kept_kind),
        is_custom_field: previous.is_custom_field,
        ..*spec
    };

    let mut rebuilt = get_schema_item_for(ctx, &spec, sample);
    rebuilt.identifier = previous.identifier.clone();
    rebuilt.original_identifier = previous.original_identifier.clone();
    rebuilt.accessor = previous.accessor.clone();
    rebuilt.label = previous.label.clone();
    rebuilt.position = previous.position;
    rebuilt.is_visible = previous.is_visible;
    rebuilt.is_required = previous.is_required;
    rebuilt.is_disabled = previous.is_disabled;
    rebuilt.is_field_type_overridden = previous.is_field_type_overridden;

    if let Some(literal) = previous
        .default_value
        .as_ref()
        .filter(|value| !value.as_str().is_some_and(is_binding))
    {
        rebuilt.default_value = Some(literal.clone());
    }

    if rebuilt.field_type == previous.field_type {
        rebuilt.props = previous.props.clone();
    } else {
        let stale = field_defaults(previous.field_type);
        for (key, value) in &previous.props {
            if stale.get(key) != Some(value) {
                rebuilt.props.insert(key.clone(), value.clone());
            }
        }
    }
    rebuilt
}

/// Renumbers a schema level: existing items keep their relative order (by
/// position, unplaced items last), `new_identifiers` follow in the order
/// given.
pub fn apply_positions(schema: &mut Schema, new_identifiers: &[String]) {
    let existing = schema
        .iter()
        .filter(|(identifier, _)| !new_identifiers.contains(*identifier))
        .sorted_by_key(|(_, item)| (item.position == UNPOSITIONED, item.position))
        .map(|(identifier, _)| identifier.clone())
        .collect::<Vec<_>>();

    for (position, identifier) in existing.iter().chain(new_identifiers).enumerate() {
        if let Some(item) = schema.get_mut(identifier) {
            item.position = i32::try_from(position).unwrap_or(i32::MAX);
        }
    }
}

/// Infers the widget schema for `sample`, reconciled against `previous`.
///
/// A missing sample leaves the previous schema as it is; a sample that is
/// not a JSON object is rejected.
pub fn parse(widget_name: &str, sample: Option<&Value>, previous: &Schema) -> Result<Schema> {
    let Some(sample) = sample else {
        return Ok(previous.clone());
    };
    if !sample.is_object() {
        return Err(SchemaError::RootNotObject {
            found: data_type_for(Some(sample)),
        });
    }

    let spec = ItemSpec {
        field_type: Some(FieldType::Object),
        ..ItemSpec::new(ROOT_SCHEMA_KEY, ROOT_SCHEMA_KEY, SOURCE_DATA_ROOT)
    };
    let root = reconcile_item(
        BuildContext::new(widget_name),
        &spec,
        root_item(previous),
        Some(sample),
    );
    debug!("parsed sample into {} top-level field(s)", root.children.len());

    let mut schema = Schema::new();
    schema.insert(ROOT_SCHEMA_KEY.to_string(), root);
    apply_positions(&mut schema, &[]);
    Ok(schema)
}
