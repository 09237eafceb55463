//! Structured output schemas and their validation.
//!
//! Every planning step declares the fields it expects back from the
//! generation backend. The same schema is rendered as JSON Schema for
//! providers that support constrained decoding, and used to validate the
//! parsed response before anything is written to the session.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Errors that can occur during schema validation.
///
/// These errors contain detailed information for logging. When returning
/// errors to clients, use `to_client_message()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaValidationError {
    #[error("Missing required field: {field}")]
    MissingRequired { field: String },

    #[error("Field {field} must not be empty")]
    EmptyField { field: String },

    #[error("Invalid type for field {field}: expected {expected}, got {actual}")]
    InvalidType {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Array too short for field {field}: minimum {min}, got {actual}")]
    ArrayTooShort {
        field: String,
        min: usize,
        actual: usize,
    },

    #[error("Response is not valid JSON: {message}")]
    Unparseable { message: String },

    #[error("Validation errors: {0:?}")]
    Multiple(Vec<SchemaValidationError>),
}

impl SchemaValidationError {
    /// Convert to a message suitable for API clients.
    pub fn to_client_message(&self) -> String {
        match self {
            SchemaValidationError::MissingRequired { field } => {
                format!("The response was missing '{}'", field)
            }
            SchemaValidationError::EmptyField { field } => {
                format!("The response left '{}' empty", field)
            }
            SchemaValidationError::InvalidType { field, expected, .. } => {
                format!("The response had the wrong type for '{}': expected {}", field, expected)
            }
            SchemaValidationError::ArrayTooShort { field, min, .. } => {
                format!("The response needs at least {} entries in '{}'", min, field)
            }
            SchemaValidationError::Unparseable { .. } => {
                "The response could not be read as a JSON object".to_string()
            }
            SchemaValidationError::Multiple(errors) => errors
                .iter()
                .map(|e| e.to_client_message())
                .collect::<Vec<_>>()
                .join("; "),
        }
    }

    /// Get the count of validation errors.
    pub fn error_count(&self) -> usize {
        match self {
            SchemaValidationError::Multiple(errors) => errors.len(),
            _ => 1,
        }
    }

    /// Names of the fields that failed, in reporting order.
    pub fn fields(&self) -> Vec<String> {
        match self {
            SchemaValidationError::MissingRequired { field }
            | SchemaValidationError::EmptyField { field }
            | SchemaValidationError::InvalidType { field, .. }
            | SchemaValidationError::ArrayTooShort { field, .. } => vec![field.clone()],
            SchemaValidationError::Unparseable { .. } => Vec::new(),
            SchemaValidationError::Multiple(errors) => {
                errors.iter().flat_map(|e| e.fields()).collect()
            }
        }
    }

    fn from_errors(mut errors: Vec<SchemaValidationError>) -> Result<(), Self> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(SchemaValidationError::Multiple(errors)),
        }
    }
}

/// Field types in output schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Non-empty text.
    String,
    /// Array of objects, each shaped by the field's `items`.
    Array,
}

impl FieldType {
    fn json_type(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Array => "array",
        }
    }
}

/// A field in an output schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaField {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub description: String,
    /// Shape of each element when `field_type` is `Array`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<SchemaField>,
    /// Minimum element count when `field_type` is `Array`.
    #[serde(default)]
    pub min_items: usize,
}

impl SchemaField {
    /// A required, non-empty text field.
    pub fn text(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::String,
            required: true,
            description: description.into(),
            items: Vec::new(),
            min_items: 0,
        }
    }

    /// A required array of objects with the given item fields.
    pub fn list(
        name: impl Into<String>,
        description: impl Into<String>,
        items: Vec<SchemaField>,
        min_items: usize,
    ) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Array,
            required: true,
            description: description.into(),
            items,
            min_items,
        }
    }

    fn to_json_schema(&self) -> Value {
        match self.field_type {
            FieldType::String => json!({
                "type": "string",
                "description": self.description,
            }),
            FieldType::Array => json!({
                "type": "array",
                "description": self.description,
                "items": object_schema(&self.items),
            }),
        }
    }

    fn validate_at(&self, path: &str, value: Option<&Value>, errors: &mut Vec<SchemaValidationError>) {
        let value = match value {
            Some(Value::Null) | None if self.required => {
                errors.push(SchemaValidationError::MissingRequired {
                    field: path.to_string(),
                });
                return;
            }
            Some(Value::Null) | None => return,
            Some(v) => v,
        };

        match (self.field_type, value) {
            (FieldType::String, Value::String(s)) => {
                if s.trim().is_empty() {
                    errors.push(SchemaValidationError::EmptyField {
                        field: path.to_string(),
                    });
                }
            }
            (FieldType::Array, Value::Array(elements)) => {
                if elements.len() < self.min_items {
                    errors.push(SchemaValidationError::ArrayTooShort {
                        field: path.to_string(),
                        min: self.min_items,
                        actual: elements.len(),
                    });
                }
                for (idx, element) in elements.iter().enumerate() {
                    let element_path = format!("{}[{}]", path, idx);
                    validate_object(&self.items, &element_path, element, errors);
                }
            }
            (expected, actual) => errors.push(SchemaValidationError::InvalidType {
                field: path.to_string(),
                expected: expected.json_type().to_string(),
                actual: json_type_name(actual).to_string(),
            }),
        }
    }
}

/// Schema for a step's structured output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputSchema {
    /// Identifier passed to providers that name their schemas.
    pub name: String,
    pub fields: Vec<SchemaField>,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, fields: Vec<SchemaField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Names of all top-level fields, in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Whether the schema declares a top-level field with this name.
    pub fn declares(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Renders the schema as a JSON Schema object.
    pub fn to_json_schema(&self) -> Value {
        object_schema(&self.fields)
    }

    /// Validates a parsed response, reporting every failing field.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaValidationError> {
        let mut errors = Vec::new();
        if !value.is_object() {
            return Err(SchemaValidationError::InvalidType {
                field: self.name.clone(),
                expected: "object".to_string(),
                actual: json_type_name(value).to_string(),
            });
        }
        validate_object(&self.fields, "", value, &mut errors);
        SchemaValidationError::from_errors(errors)
    }
}

fn object_schema(fields: &[SchemaField]) -> Value {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|f| (f.name.clone(), f.to_json_schema()))
        .collect();
    let required: Vec<&str> = fields
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name.as_str())
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn validate_object(
    fields: &[SchemaField],
    prefix: &str,
    value: &Value,
    errors: &mut Vec<SchemaValidationError>,
) {
    let Some(object) = value.as_object() else {
        errors.push(SchemaValidationError::InvalidType {
            field: prefix.to_string(),
            expected: "object".to_string(),
            actual: json_type_name(value).to_string(),
        });
        return;
    };

    for field in fields {
        let path = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{}.{}", prefix, field.name)
        };
        field.validate_at(&path, object.get(&field.name), errors);
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_schema() -> OutputSchema {
        OutputSchema::new(
            "wine_analysis",
            vec![
                SchemaField::text("characteristics", "Tasting notes"),
                SchemaField::text("pairing_suggestions", "Food pairings"),
                SchemaField::list(
                    "suggestions",
                    "Entree ideas",
                    vec![
                        SchemaField::text("name", "Dish name"),
                        SchemaField::text("description", "Why it works"),
                    ],
                    1,
                ),
            ],
        )
    }

    fn valid_payload() -> Value {
        json!({
            "characteristics": "Dark fruit, velvety tannins",
            "pairing_suggestions": "Grilled red meats",
            "suggestions": [
                {"name": "Ribeye", "description": "Charred crust meets ripe fruit"}
            ]
        })
    }

    #[test]
    fn valid_payload_passes() {
        assert!(record_schema().validate(&valid_payload()).is_ok());
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let mut payload = valid_payload();
        payload.as_object_mut().unwrap().remove("pairing_suggestions");

        let err = record_schema().validate(&payload).unwrap_err();
        assert_eq!(
            err,
            SchemaValidationError::MissingRequired {
                field: "pairing_suggestions".to_string()
            }
        );
    }

    #[test]
    fn null_counts_as_missing() {
        let mut payload = valid_payload();
        payload["characteristics"] = Value::Null;

        let err = record_schema().validate(&payload).unwrap_err();
        assert_eq!(err.fields(), vec!["characteristics".to_string()]);
    }

    #[test]
    fn whitespace_only_text_is_empty() {
        let mut payload = valid_payload();
        payload["characteristics"] = json!("   ");

        let err = record_schema().validate(&payload).unwrap_err();
        assert!(matches!(err, SchemaValidationError::EmptyField { .. }));
    }

    #[test]
    fn all_failures_are_collected() {
        let payload = json!({ "characteristics": 7 });

        let err = record_schema().validate(&payload).unwrap_err();
        assert_eq!(err.error_count(), 3);
        assert_eq!(
            err.fields(),
            vec!["characteristics", "pairing_suggestions", "suggestions"]
        );
    }

    #[test]
    fn nested_item_fields_use_indexed_paths() {
        let mut payload = valid_payload();
        payload["suggestions"] = json!([
            {"name": "Ribeye", "description": "ok"},
            {"name": "", "description": "missing name"}
        ]);

        let err = record_schema().validate(&payload).unwrap_err();
        assert_eq!(err.fields(), vec!["suggestions[1].name"]);
    }

    #[test]
    fn empty_suggestion_list_is_too_short() {
        let mut payload = valid_payload();
        payload["suggestions"] = json!([]);

        let err = record_schema().validate(&payload).unwrap_err();
        assert!(matches!(
            err,
            SchemaValidationError::ArrayTooShort { min: 1, actual: 0, .. }
        ));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = record_schema().validate(&json!(["a"])).unwrap_err();
        assert!(matches!(err, SchemaValidationError::InvalidType { .. }));
    }

    #[test]
    fn json_schema_lists_required_fields_and_forbids_extras() {
        let schema = record_schema().to_json_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(
            schema["required"],
            json!(["characteristics", "pairing_suggestions", "suggestions"])
        );
        assert_eq!(schema["properties"]["suggestions"]["type"], "array");
        assert_eq!(
            schema["properties"]["suggestions"]["items"]["required"],
            json!(["name", "description"])
        );
    }

    #[test]
    fn client_message_joins_multiple_failures() {
        let err = SchemaValidationError::Multiple(vec![
            SchemaValidationError::MissingRequired {
                field: "a".to_string(),
            },
            SchemaValidationError::EmptyField {
                field: "b".to_string(),
            },
        ]);
        assert_eq!(
            err.to_client_message(),
            "The response was missing 'a'; The response left 'b' empty"
        );
    }

    #[test]
    fn equality_compares_variants_and_fields() {
        let missing = SchemaValidationError::MissingRequired {
            field: "a".to_string(),
        };
        let empty = SchemaValidationError::EmptyField {
            field: "a".to_string(),
        };
        assert_ne!(missing, empty);
        assert_ne!(SchemaValidationError::Multiple(vec![missing.clone()]), missing);
        assert_eq!(
            missing,
            SchemaValidationError::MissingRequired {
                field: "a".to_string()
            }
        );
    }

    #[test]
    fn declares_only_top_level_fields() {
        let schema = record_schema();
        assert!(schema.declares("suggestions"));
        assert!(!schema.declares("name"));
        assert!(!schema.declares("serving_recommendations"));
    }
}
