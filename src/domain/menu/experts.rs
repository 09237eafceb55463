//! Expert personas and per-step briefs.
//!
//! Each step is answered by one structured completion. The expert role only
//! selects the system prompt; there is no coordination between experts.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::output_schema::{OutputSchema, SchemaField};
use super::records::SUGGESTIONS_FIELD;
use super::step::PlanningStep;

/// Default number of suggestions requested for the next course.
pub const DEFAULT_SUGGESTION_COUNT: usize = 3;

/// Persona that answers a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpertRole {
    Sommelier,
    Chef,
}

impl ExpertRole {
    /// System prompt establishing the persona.
    pub fn system_prompt(&self) -> &'static str {
        match self {
            ExpertRole::Sommelier => {
                "You are an expert sommelier and food pairing specialist. You have decades of \
                 experience in wine and food pairing and an encyclopedic knowledge of wines and \
                 their characteristics. Your goal is to help create perfect food and wine pairings."
            }
            ExpertRole::Chef => {
                "You are an expert chef with deep knowledge of flavors, cooking techniques, and \
                 food pairings. You excel at creating cohesive, harmonious menus."
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpertRole::Sommelier => "Sommelier",
            ExpertRole::Chef => "Chef",
        }
    }
}

impl fmt::Display for ExpertRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything needed to ask one step's question.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpertBrief {
    pub step: PlanningStep,
    pub role: ExpertRole,
    /// Task wording appended after the accumulated context.
    pub instruction: String,
    pub schema: OutputSchema,
}

impl ExpertBrief {
    /// Brief for a step, or `None` at `Done`.
    pub fn for_step(step: PlanningStep, suggestion_count: usize) -> Option<Self> {
        let count = suggestion_count.max(1);
        let brief = match step {
            PlanningStep::WineSelection => Self {
                step,
                role: ExpertRole::Sommelier,
                instruction: format!(
                    "Analyze the chosen wine and describe its key characteristics and flavor \
                     profile, considering body, tannins, acidity and primary flavors. Explain \
                     what foods it pairs with and how to serve it. Then suggest {} dinner \
                     entrees that would pair well with it.",
                    count
                ),
                schema: course_schema("wine_analysis", Some(("entree", count))),
            },
            PlanningStep::Entree => Self {
                step,
                role: ExpertRole::Chef,
                instruction: format!(
                    "Analyze the chosen entree and how it works with the wine. Explain how an \
                     appetizer should set up the progression of flavors toward it and how the \
                     entree should be served. Then suggest {} appetizers that create a \
                     harmonious progression to the entree.",
                    count
                ),
                schema: course_schema("entree_analysis", Some(("appetizer", count))),
            },
            PlanningStep::Appetizer => Self {
                step,
                role: ExpertRole::Chef,
                instruction: format!(
                    "Analyze the chosen appetizer against the wine and entree, considering the \
                     progression of flavors through the meal. Explain how a dessert should close \
                     the meal and how the appetizer should be served. Then suggest {} desserts \
                     that complete the progression.",
                    count
                ),
                schema: course_schema("appetizer_analysis", Some(("dessert", count))),
            },
            PlanningStep::Dessert => Self {
                step,
                role: ExpertRole::Sommelier,
                instruction: "Analyze the chosen dessert and how it complements both the wine \
                              and the rest of the menu. Explain its pairing and how it should \
                              be served."
                    .to_string(),
                schema: course_schema("dessert_analysis", None),
            },
            PlanningStep::Analysis => Self {
                step,
                role: ExpertRole::Sommelier,
                instruction: "Analyze how all of the menu components will interact together: \
                              how the wine pairs with each course, how flavors develop from \
                              appetizer through dessert, the notable combinations, and the \
                              overall balance of the menu."
                    .to_string(),
                schema: MENU_SCHEMA.clone(),
            },
            PlanningStep::Done => return None,
        };
        Some(brief)
    }
}

fn course_schema(name: &str, suggestions: Option<(&str, usize)>) -> OutputSchema {
    let mut fields = vec![
        SchemaField::text(
            "characteristics",
            "Key characteristics and flavor profile of the chosen item",
        ),
        SchemaField::text(
            "pairing_suggestions",
            "How the chosen item pairs with the wine and the rest of the menu",
        ),
        SchemaField::text(
            "serving_recommendations",
            "How to serve the chosen item (temperature, preparation, presentation)",
        ),
    ];

    if let Some((course, count)) = suggestions {
        fields.push(SchemaField::list(
            SUGGESTIONS_FIELD,
            format!("Exactly {} {} suggestions", count, course),
            vec![
                SchemaField::text("name", format!("Name of the {}", course)),
                SchemaField::text("description", "Why it fits the menu"),
            ],
            1,
        ));
    }

    OutputSchema::new(name, fields)
}

static MENU_SCHEMA: Lazy<OutputSchema> = Lazy::new(|| {
    OutputSchema::new(
        "menu_analysis",
        vec![
            SchemaField::text(
                "wine_pairing",
                "Detailed analysis of how the wine pairs with each course",
            ),
            SchemaField::text(
                "flavor_progression",
                "How flavors develop from appetizer through dessert",
            ),
            SchemaField::text("highlights", "Notable flavor combinations and interactions"),
            SchemaField::text("overall_harmony", "Assessment of the menu's overall balance"),
        ],
    )
});

#[cfg(test)]
mod tests {
    use super::*;

    fn brief(step: PlanningStep) -> ExpertBrief {
        ExpertBrief::for_step(step, DEFAULT_SUGGESTION_COUNT).unwrap()
    }

    #[test]
    fn roles_follow_the_menu() {
        assert_eq!(brief(PlanningStep::WineSelection).role, ExpertRole::Sommelier);
        assert_eq!(brief(PlanningStep::Entree).role, ExpertRole::Chef);
        assert_eq!(brief(PlanningStep::Appetizer).role, ExpertRole::Chef);
        assert_eq!(brief(PlanningStep::Dessert).role, ExpertRole::Sommelier);
        assert_eq!(brief(PlanningStep::Analysis).role, ExpertRole::Sommelier);
    }

    #[test]
    fn done_has_no_brief() {
        assert!(ExpertBrief::for_step(PlanningStep::Done, 3).is_none());
    }

    #[test]
    fn suggestion_steps_request_suggestions() {
        for step in [
            PlanningStep::WineSelection,
            PlanningStep::Entree,
            PlanningStep::Appetizer,
        ] {
            let names = brief(step).schema.field_names().join(",");
            assert_eq!(
                names,
                "characteristics,pairing_suggestions,serving_recommendations,suggestions"
            );
        }
    }

    #[test]
    fn dessert_has_record_fields_only() {
        assert_eq!(
            brief(PlanningStep::Dessert).schema.field_names(),
            vec!["characteristics", "pairing_suggestions", "serving_recommendations"]
        );
    }

    #[test]
    fn analysis_has_menu_fields() {
        assert_eq!(
            brief(PlanningStep::Analysis).schema.field_names(),
            vec!["wine_pairing", "flavor_progression", "highlights", "overall_harmony"]
        );
    }

    #[test]
    fn suggestion_count_appears_in_instruction_and_is_at_least_one() {
        let five = ExpertBrief::for_step(PlanningStep::WineSelection, 5).unwrap();
        assert!(five.instruction.contains("suggest 5 dinner entrees"));

        let zero = ExpertBrief::for_step(PlanningStep::Entree, 0).unwrap();
        assert!(zero.instruction.contains("suggest 1 appetizers"));
    }

    #[test]
    fn personas_have_distinct_system_prompts() {
        assert_ne!(
            ExpertRole::Sommelier.system_prompt(),
            ExpertRole::Chef.system_prompt()
        );
        assert!(ExpertRole::Sommelier.system_prompt().contains("sommelier"));
    }
}
