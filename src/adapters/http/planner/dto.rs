//! HTTP DTOs for planner endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::application::PlannerError;
use crate::domain::menu::{
    AnalysisRecord, Course, LatestRecord, MenuAnalysis, PlanningError, PlanningSession,
    Selection, Suggestion,
};
use crate::ports::AIError;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to run the current step.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitStepRequest {
    /// Wine or course choice; omitted at the analysis step.
    #[serde(default)]
    pub input: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Everything a client needs to render a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: String,
    pub step: String,
    pub step_title: String,
    pub prompt_hint: String,
    pub requires_input: bool,
    pub selections: Vec<SelectionView>,
    /// Course records in menu order.
    pub analyses: Vec<CourseAnalysisView>,
    /// Options for the current step's course.
    pub suggestions: Vec<SuggestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_analysis: Option<MenuAnalysisView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_record: Option<LatestRecordView>,
    pub version: u64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SelectionView {
    pub course: Course,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CourseAnalysisView {
    pub course: Course,
    pub characteristics: String,
    pub pairing_suggestions: String,
    pub serving_recommendations: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SuggestionView {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MenuAnalysisView {
    pub wine_pairing: String,
    pub flavor_progression: String,
    pub highlights: String,
    pub overall_harmony: String,
}

/// Most recently stored record, for display.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LatestRecordView {
    Course(CourseAnalysisView),
    Menu(MenuAnalysisView),
}

impl From<&Selection> for SelectionView {
    fn from(selection: &Selection) -> Self {
        Self {
            course: selection.course,
            text: selection.text.clone(),
            description: selection.description.clone(),
        }
    }
}

impl CourseAnalysisView {
    fn new(course: Course, record: &AnalysisRecord) -> Self {
        Self {
            course,
            characteristics: record.characteristics.clone(),
            pairing_suggestions: record.pairing_suggestions.clone(),
            serving_recommendations: record.serving_recommendations.clone(),
        }
    }
}

impl From<&Suggestion> for SuggestionView {
    fn from(suggestion: &Suggestion) -> Self {
        Self {
            name: suggestion.name.clone(),
            description: suggestion.description.clone(),
        }
    }
}

impl From<&MenuAnalysis> for MenuAnalysisView {
    fn from(analysis: &MenuAnalysis) -> Self {
        Self {
            wine_pairing: analysis.wine_pairing.clone(),
            flavor_progression: analysis.flavor_progression.clone(),
            highlights: analysis.highlights.clone(),
            overall_harmony: analysis.overall_harmony.clone(),
        }
    }
}

impl From<&PlanningSession> for SessionView {
    fn from(session: &PlanningSession) -> Self {
        let step = session.step();
        Self {
            id: session.id().to_string(),
            step: step.to_string(),
            step_title: step.title().to_string(),
            prompt_hint: step.prompt_hint().to_string(),
            requires_input: step.requires_input(),
            selections: session.selections().iter().map(Into::into).collect(),
            analyses: session
                .analyses()
                .iter()
                .map(|(course, record)| CourseAnalysisView::new(*course, record))
                .collect(),
            suggestions: session.suggestions().iter().map(Into::into).collect(),
            final_analysis: session.final_analysis().map(Into::into),
            latest_record: session.latest_record().map(|latest| match latest {
                LatestRecord::Course { course, record } => {
                    LatestRecordView::Course(CourseAnalysisView::new(course, record))
                }
                LatestRecord::Menu(analysis) => LatestRecordView::Menu(analysis.into()),
            }),
            version: session.version(),
            created_at: session.created_at().to_rfc3339(),
            updated_at: session.updated_at().to_rfc3339(),
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }

    /// Status and body for a planner failure.
    pub fn from_planner_error(error: &PlannerError) -> (StatusCode, Self) {
        let status = match error {
            PlannerError::NotFound(_) => StatusCode::NOT_FOUND,
            PlannerError::Planning(PlanningError::InputInvalid(_)) => StatusCode::BAD_REQUEST,
            PlannerError::Planning(PlanningError::SchemaValidation(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PlannerError::Planning(PlanningError::SessionComplete)
            | PlannerError::Planning(PlanningError::StaleRequest { .. })
            | PlannerError::Conflict(_) => StatusCode::CONFLICT,
            PlannerError::Provider(AIError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
            PlannerError::Provider(_) => StatusCode::BAD_GATEWAY,
            PlannerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match error {
            PlannerError::Planning(e) => e.client_message(),
            PlannerError::Storage(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        let details = match error {
            PlannerError::Planning(PlanningError::SchemaValidation(e)) => {
                Some(serde_json::json!({ "fields": e.fields() }))
            }
            PlannerError::Provider(AIError::RateLimited { retry_after_secs }) => {
                Some(serde_json::json!({ "retry_after_secs": retry_after_secs }))
            }
            _ => None,
        };

        (
            status,
            Self {
                code: error.code().to_string(),
                message,
                details,
            },
        )
    }
}
