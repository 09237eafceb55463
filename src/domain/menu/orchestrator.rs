//! Step Orchestrator - wizard flow management.
//!
//! Turns the current session plus user input into a structured generation
//! request, and applies a validated response back onto the session.
//! Pure domain logic, no AI provider knowledge.

use serde_json::Value;
use std::fmt::Write as _;

use super::errors::PlanningError;
use super::experts::{ExpertBrief, ExpertRole, DEFAULT_SUGGESTION_COUNT};
use super::extractor::ResponseExtractor;
use super::output_schema::OutputSchema;
use super::records::{self, AnalysisRecord, MenuAnalysis, Selection, Suggestion};
use super::session::PlanningSession;
use super::step::PlanningStep;
use crate::domain::foundation::{SessionId, ValidationError};

/// A fully prepared request for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRequest {
    pub session_id: SessionId,
    pub step: PlanningStep,
    pub expert: ExpertRole,
    pub system_prompt: String,
    /// User message embedding all accumulated context.
    pub prompt: String,
    pub schema: OutputSchema,
    /// The resolved choice for course steps; `None` at `Analysis`.
    pub selection: Option<Selection>,
}

/// What an accepted step did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    CourseRecorded {
        selection: Selection,
        record: AnalysisRecord,
        suggestions: Vec<Suggestion>,
        next: PlanningStep,
    },
    MenuCompleted {
        analysis: MenuAnalysis,
    },
}

impl StepOutcome {
    /// Step the session moved to.
    pub fn next_step(&self) -> PlanningStep {
        match self {
            StepOutcome::CourseRecorded { next, .. } => *next,
            StepOutcome::MenuCompleted { .. } => PlanningStep::Done,
        }
    }
}

/// Drives sessions through the planning wizard.
#[derive(Debug, Clone)]
pub struct StepOrchestrator {
    suggestion_count: usize,
    extractor: ResponseExtractor,
}

impl Default for StepOrchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_SUGGESTION_COUNT)
    }
}

impl StepOrchestrator {
    /// Creates an orchestrator asking for `suggestion_count` options per
    /// course (at least one).
    pub fn new(suggestion_count: usize) -> Self {
        Self {
            suggestion_count: suggestion_count.max(1),
            extractor: ResponseExtractor::new(),
        }
    }

    pub fn suggestion_count(&self) -> usize {
        self.suggestion_count
    }

    /// Builds the request for the session's current step.
    ///
    /// Course steps need non-empty input. When suggestions are pending the
    /// input may be a 1-based index or a suggestion name (any case); other
    /// text is taken verbatim. Input is ignored at `Analysis`.
    pub fn prepare(
        &self,
        session: &PlanningSession,
        input: Option<&str>,
    ) -> Result<StepRequest, PlanningError> {
        let step = session.step();
        let brief = ExpertBrief::for_step(step, self.suggestion_count)
            .ok_or(PlanningError::SessionComplete)?;

        let selection = match step.course() {
            Some(course) => {
                let input = input.map(str::trim).unwrap_or_default();
                if input.is_empty() {
                    return Err(ValidationError::empty_field(course.label().to_lowercase()).into());
                }
                Some(match resolve_suggestion(session.suggestions(), input) {
                    Some(suggestion) => Selection::from_suggestion(course, suggestion),
                    None => Selection::new(course, input)?,
                })
            }
            None => None,
        };

        let prompt = render_prompt(session, selection.as_ref(), &brief);

        Ok(StepRequest {
            session_id: session.id(),
            step,
            expert: brief.role,
            system_prompt: brief.role.system_prompt().to_string(),
            prompt,
            schema: brief.schema,
            selection,
        })
    }

    /// Extracts the JSON object from raw completion text.
    pub fn parse_completion(&self, content: &str) -> Result<Value, PlanningError> {
        Ok(self.extractor.extract(content)?)
    }

    /// Validates `payload` against the request's schema and, only if it
    /// passes, records it on the session and advances one step.
    pub fn accept(
        &self,
        session: &mut PlanningSession,
        request: &StepRequest,
        payload: &Value,
    ) -> Result<StepOutcome, PlanningError> {
        if session.is_complete() {
            return Err(PlanningError::SessionComplete);
        }
        if request.step != session.step() {
            return Err(PlanningError::StaleRequest {
                prepared: request.step,
                current: session.step(),
            });
        }

        request.schema.validate(payload)?;

        match &request.selection {
            Some(selection) => {
                let record: AnalysisRecord = records::decode(payload)?;
                // Only steps that offer the next course read suggestions.
                let suggestions = if request.schema.declares(records::SUGGESTIONS_FIELD) {
                    records::decode_suggestions(payload)?
                } else {
                    Vec::new()
                };
                let next = session.record_course(
                    selection.clone(),
                    record.clone(),
                    suggestions.clone(),
                )?;
                Ok(StepOutcome::CourseRecorded {
                    selection: selection.clone(),
                    record,
                    suggestions,
                    next,
                })
            }
            None => {
                let analysis: MenuAnalysis = records::decode(payload)?;
                session.record_menu(analysis.clone())?;
                Ok(StepOutcome::MenuCompleted { analysis })
            }
        }
    }
}

fn resolve_suggestion<'a>(suggestions: &'a [Suggestion], input: &str) -> Option<&'a Suggestion> {
    if let Ok(index) = input.parse::<usize>() {
        if let Some(found) = index.checked_sub(1).and_then(|i| suggestions.get(i)) {
            return Some(found);
        }
    }
    suggestions
        .iter()
        .find(|s| s.name.trim().eq_ignore_ascii_case(input))
}

fn render_prompt(
    session: &PlanningSession,
    selection: Option<&Selection>,
    brief: &ExpertBrief,
) -> String {
    let mut prompt = String::new();

    if !session.selections().is_empty() {
        prompt.push_str("Menu so far:\n");
        for prior in session.selections() {
            write_selection(&mut prompt, prior);
            if let Some(record) = session.analysis_for(prior.course) {
                let _ = writeln!(prompt, "  Characteristics: {}", record.characteristics);
                let _ = writeln!(prompt, "  Pairing: {}", record.pairing_suggestions);
                let _ = writeln!(prompt, "  Serving: {}", record.serving_recommendations);
            }
        }
        prompt.push('\n');
    }

    if let Some(selection) = selection {
        prompt.push_str("Chosen now:\n");
        write_selection(&mut prompt, selection);
        prompt.push('\n');
    }

    let _ = writeln!(prompt, "Task: {}", brief.instruction);
    let _ = write!(
        prompt,
        "\nRespond with a single JSON object with exactly these fields: {}. \
         Do not include any text before or after the JSON object.",
        brief.schema.field_names().join(", ")
    );
    prompt
}

fn write_selection(prompt: &mut String, selection: &Selection) {
    let _ = match &selection.description {
        Some(description) => writeln!(
            prompt,
            "- {}: {} ({})",
            selection.course, selection.text, description
        ),
        None => writeln!(prompt, "- {}: {}", selection.course, selection.text),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::menu::output_schema::SchemaValidationError;
    use crate::domain::menu::step::Course;
    use serde_json::json;

    fn course_payload(tag: &str, with_suggestions: bool) -> Value {
        let mut payload = json!({
            "characteristics": format!("{} characteristics", tag),
            "pairing_suggestions": format!("{} pairing", tag),
            "serving_recommendations": format!("{} serving", tag),
        });
        if with_suggestions {
            payload["suggestions"] = json!([
                {"name": format!("{} one", tag), "description": "first"},
                {"name": format!("{} two", tag), "description": "second"},
                {"name": format!("{} three", tag), "description": "third"}
            ]);
        }
        payload
    }

    fn advance(orchestrator: &StepOrchestrator, session: &mut PlanningSession, input: &str) {
        let request = orchestrator.prepare(session, Some(input)).unwrap();
        let has_suggestions = request.step.suggests().is_some();
        let payload = course_payload(&request.step.to_string(), has_suggestions);
        orchestrator.accept(session, &request, &payload).unwrap();
    }

    #[test]
    fn prepare_rejects_blank_input() {
        let orchestrator = StepOrchestrator::default();
        let session = PlanningSession::new(None);

        for input in [None, Some(""), Some("   ")] {
            let err = orchestrator.prepare(&session, input).unwrap_err();
            assert!(matches!(err, PlanningError::InputInvalid(_)));
        }
    }

    #[test]
    fn prepare_wine_step_uses_sommelier_and_embeds_wine() {
        let orchestrator = StepOrchestrator::default();
        let session = PlanningSession::new(None);

        let request = orchestrator
            .prepare(&session, Some("2018 Caymus Cabernet Sauvignon"))
            .unwrap();

        assert_eq!(request.step, PlanningStep::WineSelection);
        assert_eq!(request.expert, ExpertRole::Sommelier);
        assert!(request.prompt.contains("- Wine: 2018 Caymus Cabernet Sauvignon"));
        assert!(request.prompt.contains("suggest 3 dinner entrees"));
        assert_eq!(
            request.selection.unwrap().text,
            "2018 Caymus Cabernet Sauvignon"
        );
    }

    #[test]
    fn selection_resolves_by_index_or_name() {
        let orchestrator = StepOrchestrator::default();
        let mut session = PlanningSession::new(None);
        advance(&orchestrator, &mut session, "Pinot Noir");

        let by_index = orchestrator.prepare(&session, Some("2")).unwrap();
        let selection = by_index.selection.unwrap();
        assert_eq!(selection.text, "wine_selection two");
        assert_eq!(selection.description.as_deref(), Some("second"));

        let by_name = orchestrator
            .prepare(&session, Some("WINE_SELECTION THREE"))
            .unwrap();
        assert_eq!(by_name.selection.unwrap().text, "wine_selection three");

        let out_of_range = orchestrator.prepare(&session, Some("9")).unwrap();
        let selection = out_of_range.selection.unwrap();
        assert_eq!(selection.text, "9");
        assert_eq!(selection.description, None);
    }

    #[test]
    fn accept_stores_record_verbatim_and_advances() {
        let orchestrator = StepOrchestrator::default();
        let mut session = PlanningSession::new(None);
        let request = orchestrator.prepare(&session, Some("Barolo")).unwrap();
        let payload = course_payload("wine", true);

        let outcome = orchestrator.accept(&mut session, &request, &payload).unwrap();

        assert_eq!(outcome.next_step(), PlanningStep::Entree);
        assert_eq!(session.step(), PlanningStep::Entree);
        let stored = session.analysis_for(Course::Wine).unwrap();
        assert_eq!(stored.characteristics, "wine characteristics");
        assert_eq!(session.suggestions().len(), 3);
    }

    #[test]
    fn invalid_payload_leaves_session_untouched() {
        let orchestrator = StepOrchestrator::default();
        let mut session = PlanningSession::new(None);
        let before = session.clone();
        let request = orchestrator.prepare(&session, Some("Barolo")).unwrap();

        let mut payload = course_payload("wine", true);
        payload.as_object_mut().unwrap().remove("pairing_suggestions");

        let err = orchestrator.accept(&mut session, &request, &payload).unwrap_err();
        assert_eq!(
            err,
            PlanningError::SchemaValidation(SchemaValidationError::MissingRequired {
                field: "pairing_suggestions".to_string()
            })
        );
        assert_eq!(session, before);
    }

    #[test]
    fn stale_request_is_rejected() {
        let orchestrator = StepOrchestrator::default();
        let mut session = PlanningSession::new(None);
        let request = orchestrator.prepare(&session, Some("Barolo")).unwrap();
        orchestrator
            .accept(&mut session, &request, &course_payload("wine", true))
            .unwrap();

        let err = orchestrator
            .accept(&mut session, &request, &course_payload("wine", true))
            .unwrap_err();
        assert_eq!(
            err,
            PlanningError::StaleRequest {
                prepared: PlanningStep::WineSelection,
                current: PlanningStep::Entree,
            }
        );
        assert_eq!(session.completed_courses(), 1);
    }

    #[test]
    fn analysis_prompt_carries_every_prior_record_in_order() {
        let orchestrator = StepOrchestrator::default();
        let mut session = PlanningSession::new(None);
        advance(&orchestrator, &mut session, "Barolo");
        advance(&orchestrator, &mut session, "1");
        advance(&orchestrator, &mut session, "1");
        advance(&orchestrator, &mut session, "1");
        assert_eq!(session.step(), PlanningStep::Analysis);

        let request = orchestrator.prepare(&session, None).unwrap();
        assert!(request.selection.is_none());

        let positions: Vec<usize> = [
            "wine_selection characteristics",
            "entree characteristics",
            "appetizer characteristics",
            "dessert characteristics",
        ]
        .iter()
        .map(|needle| request.prompt.find(needle).unwrap())
        .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
        assert!(request.prompt.contains("wine_pairing, flavor_progression"));
    }

    #[test]
    fn analysis_completes_the_menu() {
        let orchestrator = StepOrchestrator::default();
        let mut session = PlanningSession::new(None);
        for input in ["Barolo", "1", "1", "1"] {
            advance(&orchestrator, &mut session, input);
        }

        let request = orchestrator.prepare(&session, Some("ignored")).unwrap();
        let payload = json!({
            "wine_pairing": "w",
            "flavor_progression": "f",
            "highlights": "h",
            "overall_harmony": "o"
        });
        let outcome = orchestrator.accept(&mut session, &request, &payload).unwrap();

        assert_eq!(outcome.next_step(), PlanningStep::Done);
        assert!(session.is_complete());
        assert_eq!(session.final_analysis().unwrap().highlights, "h");
        assert_eq!(
            orchestrator.prepare(&session, Some("more")).unwrap_err(),
            PlanningError::SessionComplete
        );
    }

    #[test]
    fn parse_completion_maps_garbage_to_schema_error() {
        let err = StepOrchestrator::default()
            .parse_completion("no json here")
            .unwrap_err();
        assert!(matches!(err, PlanningError::SchemaValidation(_)));
    }

    #[test]
    fn dessert_ignores_undeclared_suggestions_key() {
        let orchestrator = StepOrchestrator::default();

        for extra in [
            json!(["Port", "Madeira"]),
            json!([{"name": "Port", "description": "fortified"}]),
        ] {
            let mut session = PlanningSession::new(None);
            advance(&orchestrator, &mut session, "Barolo");
            advance(&orchestrator, &mut session, "1");
            advance(&orchestrator, &mut session, "1");
            assert_eq!(session.step(), PlanningStep::Dessert);

            let request = orchestrator.prepare(&session, Some("1")).unwrap();
            let mut payload = course_payload("dessert", false);
            payload["suggestions"] = extra;
            assert!(request.schema.validate(&payload).is_ok());

            let outcome = orchestrator.accept(&mut session, &request, &payload).unwrap();

            assert_eq!(outcome.next_step(), PlanningStep::Analysis);
            assert_eq!(session.step(), PlanningStep::Analysis);
            assert!(session.suggestions().is_empty());
            assert!(session.analysis_for(Course::Dessert).is_some());
        }
    }
}
