//! Record normalizer.
//! Turns a raw submission (field name -> string) into a typed [`Record`].
//! Hidden fields are nulled, blank values become null, numbers accept a
//! comma decimal separator and dates are stored as `YYYY-MM-DD`.
//! Nothing here fails: a value that does not parse is kept as the raw string.

use chrono::{Local, NaiveDate};

use crate::form::FormState;
use crate::record::{FieldValue, Record, TIMESTAMP_FORMAT};
use crate::schema::{FieldKind, Schema};
use crate::visibility::is_visible;

/// Canonical layout for stored dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Day-first layouts accepted besides the canonical one.
const DATE_INPUT_FORMATS: [&str; 3] = [DATE_FORMAT, "%d/%m/%Y", "%d-%m-%Y"];

/// Normalizes with the current local time as timestamp.
pub fn normalize(schema: &Schema, raw: &FormState) -> Record {
    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    normalize_at(schema, raw, timestamp)
}

/// Normalizes with a caller-supplied timestamp.
pub fn normalize_at(schema: &Schema, raw: &FormState, timestamp: impl Into<String>) -> Record {
    let mut record = Record::new(timestamp);
    // Only values of fields found visible so far, so chains of hidden
    // dependencies collapse the same way they do in an interactive form.
    let mut collected = FormState::new();

    for field in schema.fields() {
        let input = raw.get(&field.name);

        if !is_visible(field, &collected) {
            if input.is_some_and(|v| !is_blank(v)) {
                log::debug!("Dropping value of hidden field '{}'", field.name);
            }
            record.fields.insert(field.name.clone(), None);
            continue;
        }

        let Some(input) = input.filter(|v| !is_blank(v)) else {
            record.fields.insert(field.name.clone(), None);
            continue;
        };
        collected.insert(field.name.as_str(), input);

        let value = match &field.kind {
            FieldKind::Number { .. } => match parse_decimal(input) {
                Some(n) => FieldValue::Number(n),
                None => {
                    log::warn!(
                        "Field '{}': '{}' is not a number, storing as text",
                        field.name,
                        input
                    );
                    FieldValue::Text(input.to_string())
                }
            },
            FieldKind::Date => match canonical_date(input) {
                Some(date) => FieldValue::Text(date),
                None => {
                    log::warn!(
                        "Field '{}': '{}' is not a date, storing as text",
                        field.name,
                        input
                    );
                    FieldValue::Text(input.to_string())
                }
            },
            FieldKind::Select { options } => {
                if !options.iter().any(|o| o == input) {
                    log::warn!(
                        "Field '{}': '{}' is not one of the options",
                        field.name,
                        input
                    );
                }
                FieldValue::Text(input.to_string())
            }
            FieldKind::Text { .. } | FieldKind::Textarea { .. } => {
                FieldValue::Text(input.to_string())
            }
        };

        record.fields.insert(field.name.clone(), Some(value));
    }

    record
}

/// Blank means empty or whitespace only.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Parses a decimal written with either `.` or `,` as separator.
/// Non-finite results (`nan`, `inf`) are rejected since JSON cannot hold them.
pub fn parse_decimal(input: &str) -> Option<f64> {
    let cleaned = input.trim().replace(',', ".");
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Reformats a date to `YYYY-MM-DD`.
pub fn canonical_date(input: &str) -> Option<String> {
    let input = input.trim();
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .map(|date| date.format(DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, Visibility};

    const TS: &str = "2025-03-01 12:00:00";

    fn two_fields() -> Schema {
        Schema::new(vec![
            FieldDescriptor::new("a", "A", FieldKind::select(["X", "Y"])),
            FieldDescriptor::new("b", "B", FieldKind::text()).shown_if(Visibility::new("a", ["X"])),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_decimal_accepts_comma() {
        assert_eq!(parse_decimal("4,5"), Some(4.5));
        assert_eq!(parse_decimal("29.99"), Some(29.99));
        assert_eq!(parse_decimal(" 2020 "), Some(2020.0));
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("1,234,5"), None);
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_decimal("inf"), None);
    }

    #[test]
    fn test_canonical_date_formats() {
        assert_eq!(canonical_date("2024-02-29").as_deref(), Some("2024-02-29"));
        assert_eq!(canonical_date("05/03/2024").as_deref(), Some("2024-03-05"));
        assert_eq!(canonical_date("05-03-2024").as_deref(), Some("2024-03-05"));
        assert_eq!(canonical_date("2023-02-29"), None);
        assert_eq!(canonical_date("yesterday"), None);
    }

    #[test]
    fn test_number_with_comma_normalizes() {
        let schema = Schema::journal();
        let raw = FormState::from_pairs([("categoria", "Jogo"), ("nota", "4,5")]);
        let record = normalize_at(&schema, &raw, TS);
        assert_eq!(record.get("nota"), Some(&FieldValue::Number(4.5)));
    }

    #[test]
    fn test_non_numeric_falls_back_to_text() {
        let schema = Schema::journal();
        let raw = FormState::from_pairs([("categoria", "Jogo"), ("nota", "abc")]);
        let record = normalize_at(&schema, &raw, TS);
        assert_eq!(record.get("nota"), Some(&FieldValue::Text("abc".into())));
    }

    #[test]
    fn test_hidden_field_is_nulled() {
        let raw = FormState::from_pairs([("a", "Y"), ("b", "some text")]);
        let record = normalize_at(&two_fields(), &raw, TS);
        assert_eq!(record.get("b"), None);
        assert!(record.fields.contains_key("b"));
    }

    #[test]
    fn test_visible_dependent_is_kept() {
        let raw = FormState::from_pairs([("a", "X"), ("b", "some text")]);
        let record = normalize_at(&two_fields(), &raw, TS);
        assert_eq!(record.get("b"), Some(&FieldValue::Text("some text".into())));
    }

    #[test]
    fn test_blank_values_become_null() {
        let schema = Schema::journal();
        let raw = FormState::from_pairs([
            ("categoria", "Comida"),
            ("titulo", "   "),
            ("preco", ""),
            ("obs", ""),
        ]);
        let record = normalize_at(&schema, &raw, TS);
        assert_eq!(record.get("titulo"), None);
        assert_eq!(record.get("preco"), None);
        assert_eq!(record.get("obs"), None);
    }

    #[test]
    fn test_every_schema_field_present_in_order() {
        let schema = Schema::journal();
        let record = normalize_at(&schema, &FormState::new(), TS);
        let keys: Vec<&str> = record.fields.keys().map(String::as_str).collect();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(keys, names);
        assert_eq!(record.timestamp, TS);
    }

    #[test]
    fn test_hidden_dependency_hides_its_dependents() {
        let schema = Schema::new(vec![
            FieldDescriptor::new("a", "A", FieldKind::select(["X", "Y"])),
            FieldDescriptor::new("b", "B", FieldKind::select(["on", "off"]))
                .shown_if(Visibility::new("a", ["X"])),
            FieldDescriptor::new("c", "C", FieldKind::text()).shown_if(Visibility::new("b", ["on"])),
        ])
        .unwrap();
        // b was submitted but is hidden, so c must not see it.
        let raw = FormState::from_pairs([("a", "Y"), ("b", "on"), ("c", "kept?")]);
        let record = normalize_at(&schema, &raw, TS);
        assert_eq!(record.get("b"), None);
        assert_eq!(record.get("c"), None);
    }

    #[test]
    fn test_date_is_canonicalized_or_kept_raw() {
        let schema = Schema::journal();
        let record = normalize_at(
            &schema,
            &FormState::from_pairs([("data_ref", "01/02/2025")]),
            TS,
        );
        assert_eq!(record.get("data_ref"), Some(&FieldValue::Text("2025-02-01".into())));

        let record = normalize_at(
            &schema,
            &FormState::from_pairs([("data_ref", "someday")]),
            TS,
        );
        assert_eq!(record.get("data_ref"), Some(&FieldValue::Text("someday".into())));
    }
}
