use thiserror::Error;

use crate::schema::DataType;

/// Failures surfaced to the widget controller. Odd sample shapes never end up
/// here; they degrade to a fallback classification instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Source data root must be an object but found {found}")]
    RootNotObject { found: DataType },
    #[error("No schema item found at '{path}'")]
    ItemNotFound { path: String },
    #[error("Malformed schema item path '{path}': {reason}")]
    InvalidItemPath { path: String, reason: String },
    #[error("Unknown field type '{0}'")]
    UnknownFieldType(String),
}

pub type Result<T, E = SchemaError> = std::result::Result<T, E>;
