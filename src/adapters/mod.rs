//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - LLM providers (OpenAI, Anthropic, mock)
//! - `auth` - Access checkers
//! - `http` - axum REST API
//! - `storage` - Session stores

pub mod ai;
pub mod auth;
pub mod http;
pub mod storage;

pub use ai::{AnthropicProvider, MockAIProvider, OpenAIProvider};
pub use auth::AllowListAccessChecker;
pub use storage::{InMemorySessionStore, RetentionPolicy};
