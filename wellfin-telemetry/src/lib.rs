//! # wellfin-telemetry
//!
//! Structured logging for the WellFin services.
//!
//! ```rust
//! use wellfin_telemetry::{LogFormat, init_telemetry, info};
//!
//! init_telemetry("wellfin-api", LogFormat::Pretty);
//! info!(port = 8080, "server starting");
//! ```

pub mod init;
pub mod spans;

// Re-export tracing macros for convenience
pub use tracing::{Span, debug, error, info, instrument, trace, warn};

pub use init::{LogFormat, init_telemetry};
pub use spans::*;
