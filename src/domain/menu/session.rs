//! Planning session aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::errors::PlanningError;
use super::records::{AnalysisRecord, MenuAnalysis, Selection, Suggestion};
use super::step::{Course, PlanningStep};
use crate::domain::foundation::{SessionId, StateMachine, UserEmail};

/// The most recent result stored on a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LatestRecord<'a> {
    Course {
        course: Course,
        record: &'a AnalysisRecord,
    },
    Menu(&'a MenuAnalysis),
}

/// One user's walk through the wizard.
///
/// Mutated only through accepted steps and `reset`. Every mutation bumps
/// `version`, which stores use for optimistic concurrency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningSession {
    id: SessionId,
    owner: Option<UserEmail>,
    step: PlanningStep,
    selections: Vec<Selection>,
    analyses: BTreeMap<Course, AnalysisRecord>,
    suggestions: Vec<Suggestion>,
    final_analysis: Option<MenuAnalysis>,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PlanningSession {
    /// Starts a fresh session at the wine step.
    pub fn new(owner: Option<UserEmail>) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            owner,
            step: PlanningStep::initial(),
            selections: Vec::new(),
            analyses: BTreeMap::new(),
            suggestions: Vec::new(),
            final_analysis: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn owner(&self) -> Option<&UserEmail> {
        self.owner.as_ref()
    }

    /// Whether `user` may read or drive this session.
    ///
    /// Sessions created without an identity are open to any caller.
    pub fn is_accessible_by(&self, user: Option<&UserEmail>) -> bool {
        match &self.owner {
            None => true,
            Some(owner) => user == Some(owner),
        }
    }

    pub fn step(&self) -> PlanningStep {
        self.step
    }

    /// Accepted selections in the order they were made.
    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    /// Analyses keyed by course, iterated in course order.
    pub fn analyses(&self) -> &BTreeMap<Course, AnalysisRecord> {
        &self.analyses
    }

    pub fn analysis_for(&self, course: Course) -> Option<&AnalysisRecord> {
        self.analyses.get(&course)
    }

    pub fn selection_for(&self, course: Course) -> Option<&Selection> {
        self.selections.iter().find(|s| s.course == course)
    }

    /// Options offered for the course chosen at the current step.
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn final_analysis(&self) -> Option<&MenuAnalysis> {
        self.final_analysis.as_ref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Number of course steps accepted so far.
    pub fn completed_courses(&self) -> usize {
        self.selections.len()
    }

    pub fn is_complete(&self) -> bool {
        self.step == PlanningStep::Done
    }

    /// The record to display after the last accepted step.
    pub fn latest_record(&self) -> Option<LatestRecord<'_>> {
        if let Some(menu) = &self.final_analysis {
            return Some(LatestRecord::Menu(menu));
        }
        let course = self.selections.last()?.course;
        self.analyses
            .get(&course)
            .map(|record| LatestRecord::Course { course, record })
    }

    /// Clears all progress and returns to the wine step.
    pub fn reset(&mut self) {
        self.step = PlanningStep::initial();
        self.selections.clear();
        self.analyses.clear();
        self.suggestions.clear();
        self.final_analysis = None;
        self.touch();
    }

    /// Stores a validated course result and advances one step.
    pub(crate) fn record_course(
        &mut self,
        selection: Selection,
        record: AnalysisRecord,
        suggestions: Vec<Suggestion>,
    ) -> Result<PlanningStep, PlanningError> {
        self.expect_step(selection.course.step())?;
        let next = self.advance_target()?;

        self.analyses.insert(selection.course, record);
        self.selections.push(selection);
        self.suggestions = suggestions;
        self.step = next;
        self.touch();
        Ok(next)
    }

    /// Stores the closing analysis and finishes the session.
    pub(crate) fn record_menu(&mut self, analysis: MenuAnalysis) -> Result<PlanningStep, PlanningError> {
        self.expect_step(PlanningStep::Analysis)?;
        let next = self.advance_target()?;

        self.final_analysis = Some(analysis);
        self.suggestions.clear();
        self.step = next;
        self.touch();
        Ok(next)
    }

    fn expect_step(&self, prepared: PlanningStep) -> Result<(), PlanningError> {
        if self.step == prepared {
            Ok(())
        } else if self.is_complete() {
            Err(PlanningError::SessionComplete)
        } else {
            Err(PlanningError::StaleRequest {
                prepared,
                current: self.step,
            })
        }
    }

    fn advance_target(&self) -> Result<PlanningStep, PlanningError> {
        let next = self.step.next().ok_or(PlanningError::SessionComplete)?;
        Ok(self.step.transition_to(next)?)
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}
