//! Values produced and collected while planning a menu.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::output_schema::SchemaValidationError;
use super::step::Course;
use crate::domain::foundation::ValidationError;

/// A course the user has settled on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub course: Course,
    pub text: String,
    /// Description of the suggestion the user picked, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Selection {
    /// Creates a selection from free text.
    pub fn new(course: Course, text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::empty_field(course.label().to_lowercase()));
        }
        Ok(Self {
            course,
            text,
            description: None,
        })
    }

    /// Creates a selection from a previously offered suggestion.
    pub fn from_suggestion(course: Course, suggestion: &Suggestion) -> Self {
        Self {
            course,
            text: suggestion.name.clone(),
            description: Some(suggestion.description.clone()),
        }
    }
}

/// An option proposed for the next course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub description: String,
}

/// Expert analysis of one selected course.
///
/// Immutable once accepted; discarded only when the session is reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub characteristics: String,
    pub pairing_suggestions: String,
    pub serving_recommendations: String,
}

/// Closing review of the whole menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuAnalysis {
    pub wine_pairing: String,
    pub flavor_progression: String,
    pub highlights: String,
    pub overall_harmony: String,
}

/// Decodes a payload that already passed schema validation.
///
/// Extra keys (such as `suggestions` alongside a record) are ignored.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    payload: &Value,
) -> Result<T, SchemaValidationError> {
    T::deserialize(payload).map_err(|e| SchemaValidationError::Unparseable {
        message: e.to_string(),
    })
}

/// Payload key holding suggestions for the next course.
pub(crate) const SUGGESTIONS_FIELD: &str = "suggestions";

/// Reads the `suggestions` array from a validated payload.
pub(crate) fn decode_suggestions(payload: &Value) -> Result<Vec<Suggestion>, SchemaValidationError> {
    match payload.get(SUGGESTIONS_FIELD) {
        Some(list) => decode(list),
        None => Ok(Vec::new()),
    }
}
