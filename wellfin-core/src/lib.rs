//! # wellfin-core
//!
//! Core types for the WellFin planning API.
//!
//! - [`TextModel`] - the seam between the planning pipeline and a generative model
//! - [`TaskDescriptor`], [`ScheduledTask`], [`RecommendationItem`] - domain data
//! - [`ExecutionReport`] - presentational summary attached to every response
//! - [`Tuning`] - named defaults for every heuristic threshold
//! - [`WellfinError`] / [`Result`] - unified error handling

pub mod error;
pub mod ids;
pub mod model;
pub mod tuning;
pub mod types;

pub use error::{Result, WellfinError};
pub use ids::generate_id;
pub use model::{FinishReason, ModelCandidate, ModelReply, ProviderInfo, TextModel};
pub use tuning::Tuning;
pub use types::{
    ActionKind, Complexity, ExecutionAction, ExecutionReport, ExecutionStatus, GENERAL_CATEGORY,
    Level, Priority, PriorityInput, RecommendationItem, RecommendationType, ScheduledTask,
    TaskDescriptor, TaskStatus, round_hundredths,
};
