//! Config module.
//! Resolves where the store lives and which schema to use.
//! CLI flags win over environment variables, which win over defaults.
//! Without a schema file the built-in journal schema is used.

use clap::ArgMatches;
use std::path::PathBuf;

use crate::error::SchemaError;
use crate::schema::Schema;
use crate::store::Store;

pub const DEFAULT_STORE: &str = "meu_banco.json";
pub const STORE_ENV: &str = "FORMLOG_STORE";
pub const SCHEMA_ENV: &str = "FORMLOG_SCHEMA";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub store_path: PathBuf,
    pub schema_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE),
            schema_path: None,
        }
    }
}

impl Config {
    /// Reads the global `store` and `schema` arguments.
    /// Their env fallbacks are declared on the args themselves.
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let defaults = Self::default();
        Self {
            store_path: matches
                .get_one::<PathBuf>("store")
                .cloned()
                .unwrap_or(defaults.store_path),
            schema_path: matches.get_one::<PathBuf>("schema").cloned(),
        }
    }

    pub fn load_schema(&self) -> Result<Schema, SchemaError> {
        match &self.schema_path {
            Some(path) => Schema::load(path),
            None => Ok(Schema::journal()),
        }
    }

    pub fn store(&self) -> Store {
        Store::new(&self.store_path)
    }
}
