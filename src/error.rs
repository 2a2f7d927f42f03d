//! Error types for formlog.
//! Malformed store files never surface here: the store fails open instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Duplicate field name '{0}'")]
    DuplicateName(String),

    #[error("Field name '{0}' is reserved for the record timestamp")]
    ReservedName(String),

    #[error("Field name must not be empty")]
    EmptyName,

    #[error("Field '{field}' depends on '{depends_on}', which is not declared before it")]
    UnknownDependency { field: String, depends_on: String },

    #[error("Field '{0}' cannot depend on itself")]
    SelfDependency(String),

    #[error("Select field '{0}' has no options")]
    EmptyOptions(String),

    #[error("Failed to read schema file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed schema file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on store {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Store {0} holds JSON that is not an array; refusing to overwrite it")]
    NotAnArray(PathBuf),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to read import file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Import file is not valid JSON: {0}")]
    Json(serde_json::Error),

    #[error("Import file must contain a JSON array of records")]
    NotAnArray,

    #[error("Import entry {index} is not a record: {source}")]
    BadRecord {
        index: usize,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
