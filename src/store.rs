//! Store module.
//! The whole record log lives in one JSON array on disk.
//! `load` fails open: a missing or unreadable file is an empty store, and
//! entries that are not records are skipped.
//! `append` rewrites the complete file every time, carrying every existing
//! entry over untouched, including ones `load` skipped. A file that is valid
//! JSON but not an array is never overwritten.
//!
//! There is no locking. Two processes appending at the same moment both read
//! the same snapshot and the last one to write wins, losing the other record.
//! This is a known limitation of the single-user design.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{ImportError, StoreError};
use crate::record::Record;

const INDENT: &[u8] = b"    ";

#[derive(Clone, Debug)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in insertion order; empty if the file is absent or malformed.
    pub fn load(&self) -> Vec<Record> {
        let entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("{}; treating the store as empty", e);
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!(
                        "Skipping entry {} of {}: {}",
                        index,
                        self.path.display(),
                        e
                    );
                    None
                }
            })
            .collect()
    }

    /// Reads the current entries, pushes `record` and writes everything back.
    pub fn append(&self, record: Record) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        entries.push(serde_json::to_value(&record)?);
        self.write_all(&entries)?;
        log::debug!(
            "Appended entry #{} to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }

    /// The last `n` records, newest first.
    pub fn recent(&self, n: usize) -> Vec<Record> {
        let records = self.load();
        records.into_iter().rev().take(n).collect()
    }

    /// Replaces the store with the records of a JSON array.
    /// Anything else is rejected and leaves the file untouched.
    pub fn import(&self, text: &str) -> Result<usize, ImportError> {
        let records = parse_import(text)?;
        let count = records.len();
        self.replace(&records)?;
        Ok(count)
    }

    /// Same as [`Store::import`], reading the array from a file.
    pub fn import_file(&self, path: &Path) -> Result<usize, ImportError> {
        let text = fs::read_to_string(path)?;
        self.import(&text)
    }

    pub fn replace(&self, records: &[Record]) -> Result<(), StoreError> {
        self.write_all(records)
    }

    /// Writes a snapshot of the file's entries as they are stored.
    pub fn export<W: Write>(&self, writer: W) -> Result<(), StoreError> {
        write_pretty(writer, &self.read_entries()?)
    }

    /// Raw entries of the file. A missing file or text that is not JSON at
    /// all yields no entries; valid JSON of any other shape is an error.
    fn read_entries(&self) -> Result<Vec<Value>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(entries)) => Ok(entries),
            Ok(_) => Err(StoreError::NotAnArray(self.path.clone())),
            Err(e) => {
                log::warn!(
                    "Store {} is not valid JSON, treating it as empty: {}",
                    self.path.display(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    fn write_all<T: Serialize>(&self, entries: &[T]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut buf = Vec::new();
        write_pretty(&mut buf, entries)?;
        fs::write(&self.path, buf).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Pretty JSON with four-space indentation; non-ASCII text is written as-is.
fn write_pretty<W: Write, T: Serialize + ?Sized>(writer: W, value: &T) -> Result<(), StoreError> {
    let mut ser = Serializer::with_formatter(writer, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut ser)?;
    Ok(())
}

fn parse_import(text: &str) -> Result<Vec<Record>, ImportError> {
    let value: Value = serde_json::from_str(text).map_err(ImportError::Json)?;
    let Value::Array(items) = value else {
        return Err(ImportError::NotAnArray);
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|source| ImportError::BadRecord { index, source })
        })
        .collect()
}
