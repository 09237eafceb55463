//! SubmitStepHandler - Command handler for advancing a planning session.
//!
//! One submission makes exactly one provider call. The session is only
//! written back when the response passes schema validation, so every
//! failure leaves the stored session at the step it was on.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, UserEmail};
use crate::domain::menu::{PlanningSession, StepOrchestrator, StepOutcome, StepRequest};
use crate::ports::{
    AIProvider, CompletionRequest, FinishReason, MessageRole, RequestMetadata, SessionStore, TokenUsage,
};

use super::{load_visible, PlannerError};

/// Sampling settings passed to the provider on every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

/// Command to run the session's current step.
#[derive(Debug, Clone)]
pub struct SubmitStepCommand {
    pub session_id: SessionId,
    pub user: Option<UserEmail>,
    /// The user's choice for course steps. Ignored at `Analysis`.
    pub input: Option<String>,
}

/// Result of an accepted step.
#[derive(Debug, Clone)]
pub struct SubmitStepResult {
    /// The session as stored after the step.
    pub session: PlanningSession,
    pub outcome: StepOutcome,
    pub usage: TokenUsage,
}

/// Handler for submitting planning steps.
pub struct SubmitStepHandler<P: ?Sized + AIProvider> {
    store: Arc<dyn SessionStore>,
    ai_provider: Arc<P>,
    orchestrator: StepOrchestrator,
    settings: GenerationSettings,
}

impl<P: ?Sized + AIProvider> SubmitStepHandler<P> {
    pub fn new(
        store: Arc<dyn SessionStore>,
        ai_provider: Arc<P>,
        orchestrator: StepOrchestrator,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            store,
            ai_provider,
            orchestrator,
            settings,
        }
    }

    pub async fn handle(&self, cmd: SubmitStepCommand) -> Result<SubmitStepResult, PlannerError> {
        let mut session = load_visible(self.store.as_ref(), cmd.session_id, cmd.user.as_ref()).await?;
        let expected_version = session.version();

        let request = self
            .orchestrator
            .prepare(&session, cmd.input.as_deref())
            .map_err(|e| {
                tracing::warn!(session_id = %cmd.session_id, step = %session.step(), error = %e, "Step input rejected");
                e
            })?;

        tracing::debug!(
            session_id = %request.session_id,
            step = %request.step,
            expert = request.expert.label(),
            prompt = %request.prompt,
            "Prepared step request"
        );

        let response = self
            .ai_provider
            .complete(self.completion_request(&request))
            .await
            .map_err(|e| {
                tracing::warn!(
                    session_id = %request.session_id,
                    step = %request.step,
                    error = %e,
                    transient = e.is_transient(),
                    "AI provider call failed"
                );
                e
            })?;

        if response.finish_reason == FinishReason::Length {
            tracing::warn!(session_id = %request.session_id, step = %request.step, "Completion hit the token limit");
        }

        let outcome = self
            .orchestrator
            .parse_completion(&response.content)
            .and_then(|payload| self.orchestrator.accept(&mut session, &request, &payload))
            .map_err(|e| {
                tracing::warn!(session_id = %request.session_id, step = %request.step, error = %e, "Step response rejected");
                e
            })?;

        self.store.update(&session, expected_version).await?;

        tracing::info!(
            session_id = %session.id(),
            from = %request.step,
            to = %outcome.next_step(),
            tokens = response.usage.total_tokens,
            "Planning step completed"
        );

        Ok(SubmitStepResult {
            session,
            outcome,
            usage: response.usage,
        })
    }

    fn completion_request(&self, request: &StepRequest) -> CompletionRequest {
        let metadata = RequestMetadata::new(
            request.session_id,
            request.step.to_string(),
            uuid::Uuid::new_v4().to_string(),
        );

        CompletionRequest::new(metadata)
            .with_system_prompt(request.system_prompt.clone())
            .with_message(MessageRole::User, request.prompt.clone())
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens)
            .with_json_schema(request.schema.name.clone(), request.schema.to_json_schema())
    }
}
