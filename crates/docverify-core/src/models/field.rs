//! Expected metadata fields and their comparison kind.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::debug;

/// A scalar expected value sourced from document metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpectedValue {
    /// Declared as a JSON number.
    Number(Number),
    /// Any other scalar, kept as text.
    Text(String),
}

impl ExpectedValue {
    /// Convert a metadata value, excluding `null`, empty strings and the
    /// literal `"null"`. Arrays and objects are not scalars and are skipped.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) if is_null_like(s) => None,
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::Bool(b) => Some(Self::Text(b.to_string())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Textual form used by the string-based comparators.
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }
}

fn is_null_like(s: &str) -> bool {
    let trimmed = s.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null")
}

impl fmt::Display for ExpectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for ExpectedValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ExpectedValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ExpectedValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<f64> for ExpectedValue {
    fn from(n: f64) -> Self {
        match Number::from_f64(n) {
            Some(num) => Self::Number(num),
            None => Self::Text(n.to_string()),
        }
    }
}

/// One expected field of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedField {
    pub key: String,
    pub value: ExpectedValue,
}

impl ExpectedField {
    pub fn new(key: impl Into<String>, value: impl Into<ExpectedValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Build the comparable fields of a flat metadata mapping.
    ///
    /// Excluded values never become fields, so they can never produce a
    /// match result.
    pub fn from_metadata(metadata: &Map<String, Value>) -> Vec<Self> {
        metadata
            .iter()
            .filter_map(|(key, value)| match ExpectedValue::from_json(value) {
                Some(value) => Some(Self {
                    key: key.clone(),
                    value,
                }),
                None => {
                    debug!("Skipping metadata field '{}' ({})", key, value);
                    None
                }
            })
            .collect()
    }
}

/// Which comparison strategy a field uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Monetary or quantity value, compared with numeric tolerance.
    Numeric,
    /// Anything else, compared with token-sort similarity.
    Text,
}

impl FieldKind {
    /// Numeric when the value was declared as a number or the key is one of
    /// `numeric_fields` (case-insensitive).
    pub fn classify(field: &ExpectedField, numeric_fields: &[String]) -> Self {
        let key = field.key.trim();
        if field.value.is_number() || numeric_fields.iter().any(|k| k.eq_ignore_ascii_case(key)) {
            Self::Numeric
        } else {
            Self::Text
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Text => write!(f, "text"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_excluded_values_never_become_fields() {
        let metadata = json!({
            "valor": "150,00",
            "nome": "João Paulo",
            "vazio": "",
            "espacos": "   ",
            "nulo": null,
            "texto_nulo": "null",
            "lista": [1, 2],
        });

        let fields = ExpectedField::from_metadata(metadata.as_object().unwrap());
        let mut keys: Vec<&str> = fields.iter().map(|f| f.key.as_str()).collect();
        keys.sort_unstable();

        assert_eq!(keys, vec!["nome", "valor"]);
    }

    #[test]
    fn test_scalar_conversion() {
        assert_eq!(
            ExpectedValue::from_json(&json!(150.5)),
            Some(ExpectedValue::from(150.5_f64))
        );
        assert_eq!(
            ExpectedValue::from_json(&json!(true)),
            Some(ExpectedValue::Text("true".to_string()))
        );
        assert_eq!(ExpectedValue::from_json(&json!("NULL")), None);
        assert_eq!(ExpectedValue::from(42_i64).as_text(), "42");
    }

    #[test]
    fn test_classify_by_key_and_declared_type() {
        let numeric_fields = vec!["valor".to_string(), "quantidade".to_string()];

        let by_key = ExpectedField::new("Valor", "10,00");
        let by_type = ExpectedField::new("codigo", 12345_i64);
        let text = ExpectedField::new("nome", "Maria Silva");

        assert_eq!(FieldKind::classify(&by_key, &numeric_fields), FieldKind::Numeric);
        assert_eq!(FieldKind::classify(&by_type, &numeric_fields), FieldKind::Numeric);
        assert_eq!(FieldKind::classify(&text, &numeric_fields), FieldKind::Text);
    }
}
