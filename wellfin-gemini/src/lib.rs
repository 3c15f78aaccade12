//! # wellfin-gemini
//!
//! A small REST client for Gemini `generateContent`, on either Google AI
//! Studio (API key) or Vertex AI (OAuth bearer tokens).
//!
//! ```rust,no_run
//! use wellfin_gemini::{GeminiBuilder, TokenSource};
//!
//! # async fn run() -> Result<(), wellfin_gemini::ClientError> {
//! let client = GeminiBuilder::new_without_api_key()
//!     .with_token_source(TokenSource::from_environment()?)
//!     .with_google_cloud("my-project", "asia-northeast1")
//!     .build()?;
//! let response = client.generate_content().with_user_message("Hello").execute().await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

#[macro_use]
mod macros;

pub mod auth;
pub mod backend;
pub mod builder;
pub mod client;
pub mod common;
pub mod error;
pub mod generation;
pub mod safety;
mod types;

pub use auth::{
    CLOUD_PLATFORM_SCOPE, FIREBASE_MESSAGING_SCOPE, MetadataTokenSource, ServiceAccountKey,
    ServiceAccountTokenSource, TokenSource,
};
pub use backend::{BackendDescription, GeminiBackend};
pub use builder::GeminiBuilder;
pub use client::GeminiClient;
pub use common::Model;
pub use error::Error as ClientError;
pub use generation::{
    BlockReason, Candidate, ContentBuilder, FinishReason, GenerateContentRequest, GenerationConfig,
    GenerationResponse, PromptFeedback, UsageMetadata,
};
pub use safety::{HarmBlockThreshold, HarmCategory, HarmProbability, SafetyRating, SafetySetting};
pub use types::{Content, Part, Role};
