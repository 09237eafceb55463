//! Storage adapters for planning sessions.

mod in_memory_session_store;

pub use in_memory_session_store::{InMemorySessionStore, RetentionPolicy};
