//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Structured completions from an LLM backend
//! - `SessionStore` - Versioned persistence of planning sessions
//! - `AccessChecker` - Allow/deny gate in front of the planner

mod access_checker;
mod ai_provider;
mod session_store;

pub use access_checker::{AccessChecker, AccessError};
pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, ResponseFormat, TokenUsage,
};
pub use session_store::{SessionStore, SessionStoreError};
