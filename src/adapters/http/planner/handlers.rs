//! HTTP handlers for planner endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::Caller;
use crate::application::{
    DeleteSessionCommand, DeleteSessionHandler, GetSessionHandler, GetSessionQuery, PlannerError,
    ResetSessionCommand, ResetSessionHandler, StartSessionCommand, StartSessionHandler,
    SubmitStepCommand, SubmitStepHandler,
};
use crate::application::GenerationSettings;
use crate::domain::foundation::SessionId;
use crate::domain::menu::StepOrchestrator;
use crate::ports::{AIProvider, SessionStore};

use super::dto::{ErrorResponse, SessionView, SubmitStepRequest};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct PlannerHandlers {
    start_handler: Arc<StartSessionHandler>,
    get_handler: Arc<GetSessionHandler>,
    submit_handler: Arc<SubmitStepHandler<dyn AIProvider>>,
    reset_handler: Arc<ResetSessionHandler>,
    delete_handler: Arc<DeleteSessionHandler>,
}

impl PlannerHandlers {
    pub fn new(
        start_handler: Arc<StartSessionHandler>,
        get_handler: Arc<GetSessionHandler>,
        submit_handler: Arc<SubmitStepHandler<dyn AIProvider>>,
        reset_handler: Arc<ResetSessionHandler>,
        delete_handler: Arc<DeleteSessionHandler>,
    ) -> Self {
        Self {
            start_handler,
            get_handler,
            submit_handler,
            reset_handler,
            delete_handler,
        }
    }

    /// Wires every handler to one store and provider.
    pub fn build(
        store: Arc<dyn SessionStore>,
        ai_provider: Arc<dyn AIProvider>,
        orchestrator: StepOrchestrator,
        settings: GenerationSettings,
    ) -> Self {
        Self::new(
            Arc::new(StartSessionHandler::new(store.clone())),
            Arc::new(GetSessionHandler::new(store.clone())),
            Arc::new(SubmitStepHandler::new(
                store.clone(),
                ai_provider,
                orchestrator,
                settings,
            )),
            Arc::new(ResetSessionHandler::new(store.clone())),
            Arc::new(DeleteSessionHandler::new(store)),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/sessions - Start a new planning session
pub async fn start_session(
    State(handlers): State<PlannerHandlers>,
    Caller(user): Caller,
) -> Response {
    match handlers
        .start_handler
        .handle(StartSessionCommand { owner: user })
        .await
    {
        Ok(session) => (StatusCode::CREATED, Json(SessionView::from(&session))).into_response(),
        Err(e) => handle_planner_error(e),
    }
}

/// GET /api/sessions/:id - Get session state
pub async fn get_session(
    State(handlers): State<PlannerHandlers>,
    Caller(user): Caller,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .get_handler
        .handle(GetSessionQuery { session_id, user })
        .await
    {
        Ok(session) => (StatusCode::OK, Json(SessionView::from(&session))).into_response(),
        Err(e) => handle_planner_error(e),
    }
}

/// POST /api/sessions/:id/steps - Run the current step
pub async fn submit_step(
    State(handlers): State<PlannerHandlers>,
    Caller(user): Caller,
    Path(session_id): Path<String>,
    body: Option<Json<SubmitStepRequest>>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let Json(req) = body.unwrap_or_default();

    let cmd = SubmitStepCommand {
        session_id,
        user,
        input: req.input,
    };

    match handlers.submit_handler.handle(cmd).await {
        Ok(result) => (StatusCode::OK, Json(SessionView::from(&result.session))).into_response(),
        Err(e) => handle_planner_error(e),
    }
}

/// POST /api/sessions/:id/reset - Start the menu over
pub async fn reset_session(
    State(handlers): State<PlannerHandlers>,
    Caller(user): Caller,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .reset_handler
        .handle(ResetSessionCommand { session_id, user })
        .await
    {
        Ok(session) => (StatusCode::OK, Json(SessionView::from(&session))).into_response(),
        Err(e) => handle_planner_error(e),
    }
}

/// DELETE /api/sessions/:id - Remove a session
pub async fn delete_session(
    State(handlers): State<PlannerHandlers>,
    Caller(user): Caller,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .delete_handler
        .handle(DeleteSessionCommand { session_id, user })
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_planner_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn parse_session_id(raw: &str) -> Result<SessionId, Response> {
    raw.parse::<SessionId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid session ID")),
        )
            .into_response()
    })
}

fn handle_planner_error(error: PlannerError) -> Response {
    if let PlannerError::Storage(msg) = &error {
        tracing::error!(error = %msg, "Session storage failure");
    }
    let (status, body) = ErrorResponse::from_planner_error(&error);
    (status, Json(body)).into_response()
}
