//! Evaluation Form Schemas
//!
//! A form is an ordered list of typed fields; submitted answers are kept
//! on the stage completion as a map of field id to [`FormValue`].

use serde::{Deserialize, Serialize};

/// The input widget / value shape of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Rating,
    Dropdown,
    Checkbox,
    Date,
    File,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Rating => "rating",
            Self::Dropdown => "dropdown",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::File => "file",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One field of an evaluation form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    pub label: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    /// Choices for dropdown/checkbox fields.
    #[serde(default)]
    pub options: Vec<String>,

    /// Lower bound for rating/number fields.
    pub min: Option<i32>,

    /// Upper bound for rating/number fields.
    pub max: Option<i32>,

    pub placeholder: Option<String>,
    pub help_text: Option<String>,
}

/// A form schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationForm {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub fields: Vec<FormField>,
}

impl EvaluationForm {
    pub fn field_by_id(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }
}

/// A submitted answer.
///
/// Untagged on the wire: numbers for rating/number fields, string lists
/// for checkbox selections, plain text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Number(f64),
    Selections(Vec<String>),
    Text(String),
}

impl FormValue {
    /// The numeric value, when this answer lies in the 1–5 rating band.
    ///
    /// Rating aggregation is field-type-agnostic: any number in range
    /// counts, whichever field produced it.
    pub fn rating_value(&self) -> Option<f64> {
        match self {
            Self::Number(n) if (1.0..=5.0).contains(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value shape is acceptable for a field of this type.
    pub fn is_compatible_with(&self, field_type: FieldType) -> bool {
        match field_type {
            FieldType::Rating | FieldType::Number => matches!(self, Self::Number(_)),
            FieldType::Checkbox => matches!(self, Self::Selections(_)),
            _ => matches!(self, Self::Text(_)),
        }
    }
}

impl From<f64> for FormValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for FormValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}
