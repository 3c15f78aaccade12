//! # wellfin-agent
//!
//! The planning pipeline behind the WellFin API.
//!
//! ```text
//! request ─► prompt ─► ModelGateway ─► normalizer ─► outcome
//!                           │ error
//!                           └────────► fallback ──► outcome (aiPowered: false)
//! ```
//!
//! [`PlanningService`] is the entry point; the modules below are public so
//! handlers and tests can use the pieces directly.

mod clock;
pub mod analysis;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod gateway;
pub mod prompt;
pub mod recommendations;
pub mod schedule;
pub mod service;

pub use analysis::{AnalysisOutcome, AnalysisRequest, TaskAnalysis};
pub use clock::{local_offset, parse_date, parse_instant};
pub use error::{AgentError, GatewayError, NormalizeError, Result};
pub use gateway::ModelGateway;
pub use recommendations::{
    RecommendationAnalytics, RecommendationOutcome, RecommendationRequest, UserContext, UserProfile,
};
pub use schedule::{CompletedTask, ScheduleOutcome, ScheduleRequest, ScheduleSummary};
pub use service::{ConnectionReport, PlanSource, Planned, PlanningService};
