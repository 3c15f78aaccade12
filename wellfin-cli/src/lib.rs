//! # wellfin-cli
//!
//! Command-line launcher for the WellFin planning API.
//!
//! ## Commands
//!
//! - `wellfin serve` starts the HTTP API
//! - `wellfin check-model` runs the model connection probe
//! - `wellfin generate-api-key` prints a new API key and `.env` lines
//!
//! Configuration comes from the environment; a `.env` file in the working
//! directory is loaded first. See [`AppConfig`].

pub mod cli;
pub mod config;
pub mod keys;
pub mod serve;

pub use config::AppConfig;
pub use keys::{env_lines, generate_api_key};
pub use serve::{build_model, build_notifications, build_planning, build_server_config, run_check_model, run_serve};
