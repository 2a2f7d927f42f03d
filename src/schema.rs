//! Schema module.
//! Declares the ordered list of form fields and their visibility clauses.
//! Loaded from a JSON file or taken from the built-in journal schema.
//! Every schema is validated on construction, so the rest of the crate can
//! rely on dependencies always pointing at an earlier field.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::SchemaError;

/// Condition under which a field is shown and collected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Visibility {
    #[serde(alias = "field")]
    pub depends_on: String,
    #[serde(alias = "values")]
    pub allowed_values: Vec<String>,
}

impl Visibility {
    pub fn new<I, S>(depends_on: &str, allowed_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            depends_on: depends_on.to_string(),
            allowed_values: allowed_values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, value: &str) -> bool {
        self.allowed_values.iter().any(|v| v == value)
    }
}

/// Kind-specific attributes of a field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldKind {
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Date,
    Select { options: Vec<String> },
    Textarea {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
}

impl FieldKind {
    pub fn text() -> Self {
        FieldKind::Text { placeholder: None }
    }

    pub fn number() -> Self {
        FieldKind::Number {
            placeholder: None,
            step: None,
            min: None,
            max: None,
        }
    }

    pub fn textarea() -> Self {
        FieldKind::Textarea { placeholder: None }
    }

    pub fn select<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldKind::Select {
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    pub fn placeholder(&self) -> Option<&str> {
        match self {
            FieldKind::Text { placeholder }
            | FieldKind::Number { placeholder, .. }
            | FieldKind::Textarea { placeholder } => placeholder.as_deref(),
            FieldKind::Date | FieldKind::Select { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text { .. } => "text",
            FieldKind::Number { .. } => "number",
            FieldKind::Date => "date",
            FieldKind::Select { .. } => "select",
            FieldKind::Textarea { .. } => "textarea",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(
        default,
        alias = "show_if",
        skip_serializing_if = "Option::is_none"
    )]
    pub visibility: Option<Visibility>,
}

impl FieldDescriptor {
    pub fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            visibility: None,
        }
    }

    pub fn shown_if(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn with_placeholder(mut self, text: &str) -> Self {
        match &mut self.kind {
            FieldKind::Text { placeholder }
            | FieldKind::Number { placeholder, .. }
            | FieldKind::Textarea { placeholder } => *placeholder = Some(text.to_string()),
            FieldKind::Date | FieldKind::Select { .. } => {}
        }
        self
    }
}

/// Ordered, validated list of field descriptors.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    /// Validates names and dependency order.
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self, SchemaError> {
        let mut seen: HashSet<&str> = HashSet::new();

        for field in &fields {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyName);
            }
            if field.name == "timestamp" {
                return Err(SchemaError::ReservedName(field.name.clone()));
            }
            if let FieldKind::Select { options } = &field.kind {
                if options.is_empty() {
                    return Err(SchemaError::EmptyOptions(field.name.clone()));
                }
            }
            if let Some(vis) = &field.visibility {
                if vis.depends_on == field.name {
                    return Err(SchemaError::SelfDependency(field.name.clone()));
                }
                if !seen.contains(vis.depends_on.as_str()) {
                    return Err(SchemaError::UnknownDependency {
                        field: field.name.clone(),
                        depends_on: vis.depends_on.clone(),
                    });
                }
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateName(field.name.clone()));
            }
        }

        Ok(Self { fields })
    }

    /// Reads a JSON array of field descriptors and validates it.
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let text = fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let fields: Vec<FieldDescriptor> =
            serde_json::from_str(&text).map_err(|source| SchemaError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        log::debug!("Loaded {} fields from {}", fields.len(), path.display());
        Self::new(fields)
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The built-in journal schema: food, reading, video, audio and games.
    pub fn journal() -> Self {
        let fields = vec![
            FieldDescriptor::new(
                "categoria",
                "📂 Categoria",
                FieldKind::select(["Comida", "Leitura", "Vídeo", "Áudio", "Jogo"]),
            ),
            FieldDescriptor::new("titulo", "🏷️ Título / Item", FieldKind::text())
                .with_placeholder("Ex: Milkshake, O Alienista..."),
            FieldDescriptor::new("autor", "✍️ Autor / Diretor", FieldKind::text())
                .with_placeholder("Quem escreveu/dirigiu?")
                .shown_if(Visibility::new("categoria", ["Leitura", "Vídeo", "Áudio"])),
            FieldDescriptor::new("local", "📍 Local de Compra/Consumo", FieldKind::text())
                .with_placeholder("Ex: Mart Minas, Padaria Pão Nosso...")
                .shown_if(Visibility::new("categoria", ["Comida"])),
            FieldDescriptor::new(
                "preco",
                "💲 Preço (R$)",
                FieldKind::Number {
                    placeholder: Some("Ex: 29,99".into()),
                    step: Some(0.01),
                    min: Some(0.0),
                    max: None,
                },
            )
            .shown_if(Visibility::new("categoria", ["Comida"])),
            FieldDescriptor::new("ano_lancamento", "📆 Ano de Lançamento", FieldKind::number())
                .shown_if(Visibility::new("categoria", ["Vídeo", "Áudio", "Jogo"])),
            FieldDescriptor::new(
                "nota",
                "🔢 Nota (0,0 a 5,0)",
                FieldKind::Number {
                    placeholder: Some("Ex: 4,5".into()),
                    step: Some(0.5),
                    min: Some(0.0),
                    max: Some(5.0),
                },
            ),
            FieldDescriptor::new("data_ref", "📅 Data de Referência", FieldKind::Date),
            FieldDescriptor::new("obs", "📝 Observações", FieldKind::textarea())
                .with_placeholder("Detalhes adicionais..."),
        ];

        Self { fields }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::journal()
    }
}
