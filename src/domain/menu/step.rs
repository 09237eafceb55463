//! Planning steps and menu courses.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// A course of the dinner menu, in serving-plan order.
///
/// `Ord` follows declaration order, so maps keyed by course iterate in the
/// order the courses were chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Course {
    Wine,
    Entree,
    Appetizer,
    Dessert,
}

impl Course {
    /// All courses in selection order.
    pub const ALL: [Course; 4] = [Course::Wine, Course::Entree, Course::Appetizer, Course::Dessert];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Course::Wine => "Wine",
            Course::Entree => "Entree",
            Course::Appetizer => "Appetizer",
            Course::Dessert => "Dessert",
        }
    }

    /// Step at which this course is chosen.
    pub fn step(&self) -> PlanningStep {
        match self {
            Course::Wine => PlanningStep::WineSelection,
            Course::Entree => PlanningStep::Entree,
            Course::Appetizer => PlanningStep::Appetizer,
            Course::Dessert => PlanningStep::Dessert,
        }
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Current position of a session in the planning wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanningStep {
    WineSelection,
    Entree,
    Appetizer,
    Dessert,
    Analysis,
    Done,
}

impl PlanningStep {
    /// Every step in wizard order.
    pub const ORDER: [PlanningStep; 6] = [
        PlanningStep::WineSelection,
        PlanningStep::Entree,
        PlanningStep::Appetizer,
        PlanningStep::Dessert,
        PlanningStep::Analysis,
        PlanningStep::Done,
    ];

    /// Step every new or reset session starts at.
    pub fn initial() -> Self {
        PlanningStep::WineSelection
    }

    /// The step that follows this one, if any.
    pub fn next(&self) -> Option<Self> {
        let idx = Self::ORDER.iter().position(|s| s == self)?;
        Self::ORDER.get(idx + 1).copied()
    }

    /// Course the user selects at this step.
    pub fn course(&self) -> Option<Course> {
        match self {
            PlanningStep::WineSelection => Some(Course::Wine),
            PlanningStep::Entree => Some(Course::Entree),
            PlanningStep::Appetizer => Some(Course::Appetizer),
            PlanningStep::Dessert => Some(Course::Dessert),
            PlanningStep::Analysis | PlanningStep::Done => None,
        }
    }

    /// Course whose options this step's response proposes.
    pub fn suggests(&self) -> Option<Course> {
        match self {
            PlanningStep::WineSelection => Some(Course::Entree),
            PlanningStep::Entree => Some(Course::Appetizer),
            PlanningStep::Appetizer => Some(Course::Dessert),
            _ => None,
        }
    }

    /// Whether submitting at this step requires user input.
    pub fn requires_input(&self) -> bool {
        self.course().is_some()
    }

    /// Heading shown for the step.
    pub fn title(&self) -> &'static str {
        match self {
            PlanningStep::WineSelection => "Wine Selection",
            PlanningStep::Entree => "Entree Selection",
            PlanningStep::Appetizer => "Appetizer Selection",
            PlanningStep::Dessert => "Dessert Selection",
            PlanningStep::Analysis => "Menu Analysis",
            PlanningStep::Done => "Your Perfect Menu",
        }
    }

    /// Hint describing what the UI should collect next.
    pub fn prompt_hint(&self) -> &'static str {
        match self {
            PlanningStep::WineSelection => {
                "What wine would you like to plan your dinner around?"
            }
            PlanningStep::Entree => "Choose your entree from the suggestions (name or number)",
            PlanningStep::Appetizer => {
                "Choose your appetizer from the suggestions (name or number)"
            }
            PlanningStep::Dessert => "Choose your dessert from the suggestions (name or number)",
            PlanningStep::Analysis => "Submit to see the final menu analysis",
            PlanningStep::Done => "Menu complete. Reset to plan another dinner",
        }
    }
}

impl fmt::Display for PlanningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlanningStep::WineSelection => "wine_selection",
            PlanningStep::Entree => "entree",
            PlanningStep::Appetizer => "appetizer",
            PlanningStep::Dessert => "dessert",
            PlanningStep::Analysis => "analysis",
            PlanningStep::Done => "done",
        };
        f.write_str(s)
    }
}

impl StateMachine for PlanningStep {
    fn valid_transitions(&self) -> Vec<Self> {
        self.next().into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_advance_linearly_to_done() {
        let mut step = PlanningStep::initial();
        let mut visited = vec![step];
        while let Some(next) = step.next() {
            step = next;
            visited.push(step);
        }
        assert_eq!(visited, PlanningStep::ORDER.to_vec());
        assert_eq!(step, PlanningStep::Done);
    }

    #[test]
    fn done_is_terminal() {
        assert!(PlanningStep::Done.is_terminal());
        assert!(!PlanningStep::Analysis.is_terminal());
    }

    #[test]
    fn skipping_a_step_is_rejected() {
        assert!(PlanningStep::WineSelection
            .transition_to(PlanningStep::Appetizer)
            .is_err());
        assert_eq!(
            PlanningStep::Dessert.transition_to(PlanningStep::Analysis),
            Ok(PlanningStep::Analysis)
        );
    }

    #[test]
    fn course_steps_require_input() {
        assert!(PlanningStep::WineSelection.requires_input());
        assert!(PlanningStep::Dessert.requires_input());
        assert!(!PlanningStep::Analysis.requires_input());
        assert!(!PlanningStep::Done.requires_input());
    }

    #[test]
    fn suggestion_chain_matches_next_course() {
        assert_eq!(PlanningStep::WineSelection.suggests(), Some(Course::Entree));
        assert_eq!(PlanningStep::Entree.suggests(), Some(Course::Appetizer));
        assert_eq!(PlanningStep::Appetizer.suggests(), Some(Course::Dessert));
        assert_eq!(PlanningStep::Dessert.suggests(), None);
    }

    #[test]
    fn course_and_step_round_trip() {
        for course in Course::ALL {
            assert_eq!(course.step().course(), Some(course));
        }
    }

    #[test]
    fn course_ordering_follows_selection_order() {
        let mut courses = vec![Course::Dessert, Course::Wine, Course::Appetizer, Course::Entree];
        courses.sort();
        assert_eq!(courses, Course::ALL.to_vec());
    }

    #[test]
    fn step_serializes_snake_case() {
        let json = serde_json::to_string(&PlanningStep::WineSelection).unwrap();
        assert_eq!(json, "\"wine_selection\"");
        assert_eq!(PlanningStep::WineSelection.to_string(), "wine_selection");
    }
}
