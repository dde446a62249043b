//! Source-data paths and schema item paths.
//!
//! A schema item path addresses a node inside the persisted widget schema,
//! e.g. `schema.__root_schema__.children.education.children.__array_item__`.
//! A source-data path addresses the matching value inside the sample, e.g.
//! `sourceData.education[0]`. Source-data paths are emitted as text into
//! binding expressions, so the dot/bracket rules here are the whole contract.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    error::{Result, SchemaError},
    schema::{ARRAY_ITEM_KEY, SOURCE_DATA_ROOT, Schema, SchemaItem},
};

pub const SCHEMA_PATH_ROOT: &str = "schema";
const CHILDREN_SEGMENT: &str = "children";

static BARE_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid")
});

/// One step of a source-data path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKey<'a> {
    Name(&'a str),
    Index(usize),
}

/// Appends `key` to `base` using dot notation for bare identifiers and
/// bracket notation for everything else.
pub fn get_source_path(key: PathKey<'_>, base: Option<&str>) -> String {
    let segment = match key {
        PathKey::Name(name) if BARE_IDENTIFIER.is_match(name) => format!(".{name}"),
        PathKey::Name(name) => format!("[\"{}\"]", escape_quoted(name)),
        PathKey::Index(index) => format!("[{index}]"),
    };
    match base {
        Some(base) => format!("{base}{segment}"),
        None => segment,
    }
}

fn escape_quoted(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Path of the child `identifier` under the item at `parent_path`.
pub fn child_item_path(parent_path: &str, identifier: &str) -> String {
    format!("{parent_path}.{CHILDREN_SEGMENT}.{identifier}")
}

pub fn top_level_item_path(identifier: &str) -> String {
    format!("{SCHEMA_PATH_ROOT}.{identifier}")
}

/// Splits a schema item path into the identifiers it walks through.
pub fn item_path_identifiers(item_path: &str) -> Result<Vec<&str>> {
    let invalid = |reason: &str| SchemaError::InvalidItemPath {
        path: item_path.to_string(),
        reason: reason.to_string(),
    };
    let mut segments = item_path.split('.');
    if segments.next() != Some(SCHEMA_PATH_ROOT) {
        return Err(invalid("expected a leading 'schema' segment"));
    }
    let root = segments
        .next()
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| invalid("missing top-level identifier"))?;
    let mut identifiers = vec![root];
    while let Some(segment) = segments.next() {
        if segment != CHILDREN_SEGMENT {
            return Err(invalid(&format!("expected 'children' but found '{segment}'")));
        }
        let identifier = segments
            .next()
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| invalid("'children' must be followed by an identifier"))?;
        identifiers.push(identifier);
    }
    Ok(identifiers)
}

/// Whether the item at `item_path` lives inside an array item template.
pub fn is_within_array_item(item_path: &str) -> bool {
    item_path
        .split('.')
        .any(|segment| segment == ARRAY_ITEM_KEY)
}

pub fn schema_item_at<'a>(schema: &'a Schema, item_path: &str) -> Result<&'a SchemaItem> {
    let not_found = || SchemaError::ItemNotFound {
        path: item_path.to_string(),
    };
    let identifiers = item_path_identifiers(item_path)?;
    let (first, rest) = identifiers.split_first().ok_or_else(not_found)?;
    let mut item = schema.get(*first).ok_or_else(not_found)?;
    for identifier in rest {
        item = item.children.get(*identifier).ok_or_else(not_found)?;
    }
    Ok(item)
}

pub fn schema_item_at_mut<'a>(
    schema: &'a mut Schema,
    item_path: &str,
) -> Result<&'a mut SchemaItem> {
    let not_found = || SchemaError::ItemNotFound {
        path: item_path.to_string(),
    };
    let identifiers = item_path_identifiers(item_path)?;
    let (first, rest) = identifiers.split_first().ok_or_else(not_found)?;
    let mut item = schema.get_mut(*first).ok_or_else(not_found)?;
    for identifier in rest {
        item = item.children.get_mut(*identifier).ok_or_else(not_found)?;
    }
    Ok(item)
}

/// Rewrites a schema item path into the source-data path it was inferred
/// from. Array item templates become index `0`; every other step uses the
/// item's original (unsanitized) key.
pub fn get_source_data_path_from_schema_item_path(
    schema: &Schema,
    item_path: &str,
) -> Result<String> {
    let not_found = || SchemaError::ItemNotFound {
        path: item_path.to_string(),
    };
    let identifiers = item_path_identifiers(item_path)?;
    let (first, rest) = identifiers.split_first().ok_or_else(not_found)?;
    let mut item = schema.get(*first).ok_or_else(not_found)?;
    let mut source_path = SOURCE_DATA_ROOT.to_string();
    for identifier in rest {
        item = item.children.get(*identifier).ok_or_else(not_found)?;
        let key = if *identifier == ARRAY_ITEM_KEY {
            PathKey::Index(0)
        } else {
            PathKey::Name(&item.original_identifier)
        };
        source_path = get_source_path(key, Some(&source_path));
    }
    Ok(source_path)
}
