//! File I/O for samples, schemas and field state.
//!
//! Everything the CLI reads or writes goes through this module. Files with a
//! `.yml`/`.yaml` extension are YAML, anything else is JSON. The `-` path
//! routes through stdin/stdout.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{field_state::FieldState, schema::Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Json,
        }
    }
}

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

fn open_reader(path: &Path) -> Result<Box<dyn Read>> {
    if is_dash(path) {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
    Ok(Box::new(BufReader::new(file)))
}

fn open_writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(p) if !is_dash(p) => Ok(Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        ))),
        _ => Ok(Box::new(io::stdout())),
    }
}

pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = open_reader(path)?;
    match DocumentFormat::for_path(path) {
        DocumentFormat::Yaml => {
            serde_yaml::from_reader(reader).with_context(|| format!("Parsing YAML from {path:?}"))
        }
        DocumentFormat::Json => {
            serde_json::from_reader(reader).with_context(|| format!("Parsing JSON from {path:?}"))
        }
    }
}

/// Writes `value` pretty-printed to `path`, or stdout when `path` is `None`
/// or `-`.
pub fn write_document<T: Serialize>(path: Option<&Path>, value: &T) -> Result<()> {
    let format = path.map_or(DocumentFormat::Json, DocumentFormat::for_path);
    let mut writer = open_writer(path)?;
    match format {
        DocumentFormat::Yaml => {
            serde_yaml::to_writer(&mut writer, value).context("Writing schema YAML")?
        }
        DocumentFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, value).context("Writing JSON")?;
            writeln!(writer)?;
        }
    }
    writer.flush().context("Flushing output")
}

pub fn read_sample(path: &Path) -> Result<Value> {
    read_document(path).with_context(|| format!("Reading sample data from {path:?}"))
}

pub fn load_schema(path: &Path) -> Result<Schema> {
    read_document(path).with_context(|| format!("Loading schema from {path:?}"))
}

pub fn save_schema(path: Option<&Path>, schema: &Schema) -> Result<()> {
    write_document(path, schema)
}

pub fn read_field_state(path: &Path) -> Result<FieldState> {
    read_document(path).with_context(|| format!("Reading field state from {path:?}"))
}
