#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use jsonform_schema::{Schema, SchemaItem, parse, schema::ROOT_SCHEMA_KEY};
use serde_json::Value;
use tempfile::{TempDir, tempdir};

pub const WIDGET: &str = "JSONForm1";

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

pub fn initial_dataset() -> Value {
    let contents =
        fs::read_to_string(fixture_path("initial_dataset.json")).expect("read initial dataset");
    serde_json::from_str(&contents).expect("parse initial dataset")
}

pub fn initial_schema() -> Schema {
    parse(WIDGET, Some(&initial_dataset()), &Schema::new()).expect("parse initial dataset")
}

pub fn root(schema: &Schema) -> &SchemaItem {
    schema.get(ROOT_SCHEMA_KEY).expect("root entry")
}

pub fn root_mut(schema: &mut Schema) -> &mut SchemaItem {
    schema.get_mut(ROOT_SCHEMA_KEY).expect("root entry")
}

/// Identifiers of a schema level ordered by position.
pub fn ordered_identifiers(schema: &Schema) -> Vec<String> {
    let mut items: Vec<&SchemaItem> = schema.values().collect();
    items.sort_by_key(|item| item.position);
    items.iter().map(|item| item.identifier.clone()).collect()
}

pub fn positions(schema: &Schema) -> Vec<i32> {
    let mut positions: Vec<i32> = schema.values().map(|item| item.position).collect();
    positions.sort_unstable();
    positions
}

/// Asserts every level of the tree is numbered `0..n` without gaps.
pub fn assert_contiguous_positions(schema: &Schema) {
    let expected: Vec<i32> = (0..schema.len() as i32).collect();
    assert_eq!(positions(schema), expected);
    for item in schema.values() {
        assert_contiguous_positions(&item.children);
    }
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
