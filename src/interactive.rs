//! Interactive form (the `add` command).
//! Asks for each visible field in schema order, re-evaluating visibility
//! after every answer so dependent questions appear or vanish as the user
//! goes. Values that will not parse cleanly only raise a soft warning; the
//! normalizer decides what is stored.

use anyhow::{Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

use crate::form::FormState;
use crate::normalize::{canonical_date, is_blank, parse_decimal};
use crate::schema::{FieldDescriptor, FieldKind, Schema};
use crate::visibility::is_visible;

/// Source of answers. The terminal implementation uses dialoguer.
pub trait Prompter {
    fn select(&mut self, label: &str, options: &[String]) -> Result<usize>;
    fn input(&mut self, label: &str, hint: Option<&str>) -> Result<String>;
    fn warn(&mut self, message: &str);
}

pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn select(&mut self, label: &str, options: &[String]) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(label)
            .items(options)
            .default(0)
            .interact()
            .with_context(|| format!("Failed to read selection for '{}'", label))
    }

    fn input(&mut self, label: &str, hint: Option<&str>) -> Result<String> {
        let prompt = match hint {
            Some(hint) => format!("{} ({})", label, hint),
            None => label.to_string(),
        };
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .with_context(|| format!("Failed to read input for '{}'", label))
    }

    fn warn(&mut self, message: &str) {
        eprintln!("⚠ {}", message);
    }
}

/// Walks the schema and returns the answers of every field that ended up visible.
pub fn fill_form(schema: &Schema, prompter: &mut dyn Prompter) -> Result<FormState> {
    let mut state = FormState::new();

    for field in schema.fields() {
        if !is_visible(field, &state) {
            continue;
        }

        let value = ask(field, prompter)?;
        for warning in soft_warnings(field, &value) {
            prompter.warn(&warning);
        }
        state.set(schema, &field.name, value);
    }

    Ok(state)
}

fn ask(field: &FieldDescriptor, prompter: &mut dyn Prompter) -> Result<String> {
    match &field.kind {
        FieldKind::Select { options } => {
            let index = prompter.select(&field.label, options)?;
            options
                .get(index)
                .cloned()
                .with_context(|| format!("Selection {} out of range for '{}'", index, field.name))
        }
        FieldKind::Date => prompter.input(&field.label, Some("YYYY-MM-DD or DD/MM/YYYY")),
        kind => prompter.input(&field.label, kind.placeholder()),
    }
}

/// Hints shown to the user; they never block the submission.
pub fn soft_warnings(field: &FieldDescriptor, value: &str) -> Vec<String> {
    if is_blank(value) {
        return Vec::new();
    }

    match &field.kind {
        FieldKind::Number { min, max, .. } => match parse_decimal(value) {
            None => vec![format!(
                "'{}' is not a number; it will be stored as text",
                value
            )],
            Some(n) => {
                let mut warnings = Vec::new();
                if let Some(min) = min.filter(|&min| n < min) {
                    warnings.push(format!("{} is below the minimum {}", n, min));
                }
                if let Some(max) = max.filter(|&max| n > max) {
                    warnings.push(format!("{} is above the maximum {}", n, max));
                }
                warnings
            }
        },
        FieldKind::Date if canonical_date(value).is_none() => vec![format!(
            "'{}' is not a date; it will be stored as text",
            value
        )],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays canned answers and records which labels were asked.
    #[derive(Default)]
    struct Scripted {
        selects: VecDeque<usize>,
        inputs: VecDeque<String>,
        asked: Vec<String>,
        warnings: Vec<String>,
    }

    impl Prompter for Scripted {
        fn select(&mut self, label: &str, _options: &[String]) -> Result<usize> {
            self.asked.push(label.to_string());
            self.selects.pop_front().context("no select answer left")
        }

        fn input(&mut self, label: &str, _hint: Option<&str>) -> Result<String> {
            self.asked.push(label.to_string());
            self.inputs.pop_front().context("no input answer left")
        }

        fn warn(&mut self, message: &str) {
            self.warnings.push(message.to_string());
        }
    }

    fn scripted(selects: &[usize], inputs: &[&str]) -> Scripted {
        Scripted {
            selects: selects.iter().copied().collect(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_food_entry_asks_food_fields_only() {
        let schema = Schema::journal();
        // categoria = Comida, then titulo, local, preco, nota, data_ref, obs
        let mut prompter = scripted(&[0], &["Milkshake", "Padaria", "12,50", "4,5", "", ""]);
        let state = fill_form(&schema, &mut prompter).unwrap();

        assert_eq!(state.get("categoria"), Some("Comida"));
        assert_eq!(state.get("preco"), Some("12,50"));
        assert_eq!(state.get("autor"), None);
        assert_eq!(prompter.asked.len(), 7);
        assert!(!prompter.asked.iter().any(|l| l.contains("Autor")));
        assert!(prompter.warnings.is_empty());
    }

    #[test]
    fn test_game_entry_skips_price_and_place() {
        let schema = Schema::journal();
        // categoria = Jogo (index 4): titulo, ano_lancamento, nota, data_ref, obs
        let mut prompter = scripted(&[4], &["Celeste", "2018", "5", "2024-01-10", "ótimo"]);
        let state = fill_form(&schema, &mut prompter).unwrap();

        assert_eq!(state.get("ano_lancamento"), Some("2018"));
        assert_eq!(state.get("preco"), None);
        assert_eq!(state.get("local"), None);
        assert_eq!(prompter.asked.len(), 6);
    }

    #[test]
    fn test_soft_warnings_do_not_block() {
        let schema = Schema::journal();
        let mut prompter = scripted(&[4], &["X", "soon", "7", "someday", ""]);
        let state = fill_form(&schema, &mut prompter).unwrap();

        assert_eq!(state.get("ano_lancamento"), Some("soon"));
        assert_eq!(prompter.warnings.len(), 3);
        assert!(prompter.warnings[1].contains("above the maximum"));
    }

    #[test]
    fn test_soft_warnings_for_number_bounds() {
        let schema = Schema::journal();
        let nota = schema.field("nota").unwrap();
        assert!(soft_warnings(nota, "4,5").is_empty());
        assert!(soft_warnings(nota, "").is_empty());
        assert_eq!(soft_warnings(nota, "-1").len(), 1);
        assert_eq!(soft_warnings(nota, "abc").len(), 1);
    }
}
