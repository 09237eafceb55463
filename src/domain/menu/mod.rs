//! Menu Planning Domain Module
//!
//! Guides a user from a chosen wine through entree, appetizer and dessert to a
//! closing menu analysis. Each step is one structured completion whose output
//! is validated before it becomes context for the next step.
//!
//! # Architecture
//!
//! - **StepOrchestrator**: Prepares step requests and applies validated responses
//! - **ExpertBrief**: Persona, instruction and output schema for each step
//! - **PlanningSession**: Selections, analyses and suggestions accumulated so far
//! - **OutputSchema**: Field contract rendered as JSON Schema and used for validation
//!
//! # Example
//!
//! ```ignore
//! let orchestrator = StepOrchestrator::new(3);
//! let request = orchestrator.prepare(&session, Some("2018 Caymus Cabernet Sauvignon"))?;
//! let payload = orchestrator.parse_completion(&completion.content)?;
//! let outcome = orchestrator.accept(&mut session, &request, &payload)?;
//! ```

pub mod errors;
pub mod experts;
pub mod extractor;
pub mod orchestrator;
pub mod output_schema;
pub mod records;
pub mod session;
pub mod step;

pub use errors::*;
pub use experts::*;
pub use extractor::*;
pub use orchestrator::*;
pub use output_schema::*;
pub use records::{AnalysisRecord, MenuAnalysis, Selection, Suggestion};
pub use session::*;
pub use step::*;
