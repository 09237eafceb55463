//! Dinner Planner - Guided wine-first menu planning
//!
//! This crate walks a user from a chosen wine through entree, appetizer and
//! dessert to a final menu analysis, with each step answered by one
//! structured LLM completion that is validated before it is recorded.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
