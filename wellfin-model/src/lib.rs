//! # wellfin-model
//!
//! [`TextModel`](wellfin_core::TextModel) implementations:
//!
//! - [`GeminiModel`] - Gemini via AI Studio or Vertex AI, with the service's
//!   generation and safety settings
//! - [`MockModel`] - scripted replies for tests

pub mod gemini;
pub mod mock;

pub use gemini::{GeminiModel, GenerationSettings};
pub use mock::MockModel;
