//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors, state machine)
//! - `menu` - Planning steps, session aggregate, expert briefs and the step orchestrator

pub mod foundation;
pub mod menu;
