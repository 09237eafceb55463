//! Access gate middleware and extractor for axum.
//!
//! This module provides:
//! - `access_middleware` - Layer that runs the `AccessChecker` on the identity header
//! - `Caller` - Extractor for the identity the gate admitted
//!
//! # Architecture
//!
//! ```text
//! Request → access_middleware → 403 on deny, else injects Caller into extensions
//!                                      ↓
//!                              Handler → Caller extractor reads from extensions
//! ```
//!
//! # Example
//!
//! ```ignore
//! let access = AccessState::new(Arc::new(AllowListAccessChecker::open()), "x-user-email")?;
//!
//! let app = Router::new()
//!     .route("/api/sessions", post(start_session))
//!     .layer(middleware::from_fn_with_state(access, access_middleware));
//! ```

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderName, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::{ErrorCode, UserEmail};
use crate::ports::{AccessChecker, AccessError};

/// Middleware state - the checker plus the header it reads.
#[derive(Clone)]
pub struct AccessState {
    checker: Arc<dyn AccessChecker>,
    identity_header: HeaderName,
}

impl AccessState {
    /// # Errors
    /// Returns the rejected name if `identity_header` is not a valid header name.
    pub fn new(checker: Arc<dyn AccessChecker>, identity_header: &str) -> Result<Self, String> {
        let identity_header = HeaderName::from_bytes(identity_header.as_bytes())
            .map_err(|_| identity_header.to_string())?;
        Ok(Self {
            checker,
            identity_header,
        })
    }
}

/// Identity admitted by the gate; `None` when the gate is open and the
/// request carried no identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Caller(pub Option<UserEmail>);

/// Access middleware.
///
/// This middleware:
/// 1. Reads the identity header (if any)
/// 2. Asks the `AccessChecker` whether to admit it
/// 3. On allow, injects `Caller` into request extensions
/// 4. On deny, returns 403 Forbidden without reaching the handler
pub async fn access_middleware(
    State(access): State<AccessState>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = request
        .headers()
        .get(&access.identity_header)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    match access.checker.check(identity.as_deref()) {
        Ok(user) => {
            request.extensions_mut().insert(Caller(user));
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(error = %e, path = %request.uri().path(), "Access denied");
            let message = match &e {
                AccessError::MissingIdentity => "Identity required",
                AccessError::InvalidIdentity(_) => "Invalid identity",
                AccessError::NotAuthorized(_) => "Not authorized to use the planner",
            };
            (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({
                    "code": ErrorCode::Forbidden.to_string(),
                    "message": message,
                })),
            )
                .into_response()
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Caller>()
            .cloned()
            .unwrap_or(Caller(None)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::AllowListAccessChecker;
    use axum::{body::Body, http::Request as HttpRequest, middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn whoami(Caller(user): Caller) -> String {
        user.map(|u| u.to_string()).unwrap_or_else(|| "anonymous".to_string())
    }

    fn app(checker: AllowListAccessChecker) -> Router {
        let access = AccessState::new(Arc::new(checker), "x-user-email").unwrap();
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(access, access_middleware))
    }

    fn request(identity: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri("/whoami");
        if let Some(identity) = identity {
            builder = builder.header("x-user-email", identity);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn gated() -> AllowListAccessChecker {
        AllowListAccessChecker::new(["host@example.com"], Vec::<String>::new())
    }

    #[tokio::test]
    async fn allowed_identity_reaches_handler() {
        let response = app(gated()).oneshot(request(Some("host@example.com"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "host@example.com");
    }

    #[tokio::test]
    async fn unknown_identity_is_forbidden() {
        let response = app(gated()).oneshot(request(Some("guest@other.com"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(body_text(response).await.contains("FORBIDDEN"));
    }

    #[tokio::test]
    async fn missing_identity_is_forbidden_when_gated() {
        let response = app(gated()).oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn open_gate_admits_anonymous_callers() {
        let response = app(AllowListAccessChecker::open()).oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "anonymous");
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let result = AccessState::new(Arc::new(AllowListAccessChecker::open()), "bad header");
        assert!(result.is_err());
    }
}
