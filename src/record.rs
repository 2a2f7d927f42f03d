//! Record module.
//! One persisted submission: a timestamp plus one value per schema field.
//! Serialized flat (`"timestamp"` first, then fields in schema order) so the
//! store file stays readable by hand.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp layout used for every record.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A stored field value. `None` in [`Record::fields`] stands for null.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    /// Empty strings count as empty when displaying history.
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: String,
    #[serde(flatten)]
    pub fields: IndexMap<String, Option<FieldValue>>,
}

impl Record {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            fields: IndexMap::new(),
        }
    }

    /// Value of a field; `None` when the field is null or absent.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name).and_then(|v| v.as_ref())
    }

    /// Non-null, non-empty values in stored order.
    pub fn filled(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().filter_map(|(k, v)| match v {
            Some(value) if !value.is_empty() => Some((k.as_str(), value)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_flat_with_timestamp_first() {
        let mut record = Record::new("2025-01-02 03:04:05");
        record
            .fields
            .insert("titulo".into(), Some(FieldValue::Text("Milkshake".into())));
        record.fields.insert("preco".into(), Some(FieldValue::Number(29.99)));
        record.fields.insert("autor".into(), None);

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"timestamp":"2025-01-02 03:04:05","titulo":"Milkshake","preco":29.99,"autor":null}"#
        );
    }

    #[test]
    fn test_record_deserializes_mixed_values() {
        let json = r#"{"timestamp":"t","nota":4.5,"obs":"ok","local":null}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.timestamp, "t");
        assert_eq!(record.get("nota"), Some(&FieldValue::Number(4.5)));
        assert_eq!(record.get("obs").and_then(FieldValue::as_text), Some("ok"));
        assert_eq!(record.get("local"), None);
        assert!(record.fields.contains_key("local"));
    }

    #[test]
    fn test_filled_skips_null_and_empty() {
        let mut record = Record::new("t");
        record.fields.insert("a".into(), None);
        record.fields.insert("b".into(), Some(FieldValue::Text(String::new())));
        record.fields.insert("c".into(), Some(FieldValue::Number(0.0)));
        let filled: Vec<_> = record.filled().map(|(k, _)| k).collect();
        assert_eq!(filled, vec!["c"]);
    }
}
