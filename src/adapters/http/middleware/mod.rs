//! HTTP middleware for axum.
//!
//! This module contains middleware layers for cross-cutting concerns:
//!
//! - `access` - Allow-list gate and the caller identity extractor

pub mod access;

pub use access::{access_middleware, AccessState, Caller};
