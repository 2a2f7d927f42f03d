//! Form state.
//! Raw string values entered so far, passed explicitly to the visibility
//! evaluator and the normalizer. Front-ends keep one of these per form.

use indexmap::IndexMap;

use crate::schema::Schema;
use crate::visibility::is_visible;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormState {
    values: IndexMap<String, String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Stores a value, then clears every field the change hid.
    /// Returns the names of the cleared fields.
    pub fn set(&mut self, schema: &Schema, name: &str, value: impl Into<String>) -> Vec<String> {
        self.insert(name, value);
        self.clear_hidden(schema)
    }

    /// Walks the schema in order so a cleared dependency also hides the
    /// fields that depend on it.
    pub fn clear_hidden(&mut self, schema: &Schema) -> Vec<String> {
        let mut cleared = Vec::new();
        for field in schema.fields() {
            if !is_visible(field, self) && self.remove(&field.name).is_some() {
                log::debug!("Cleared hidden field '{}'", field.name);
                cleared.push(field.name.clone());
            }
        }
        cleared
    }
}
