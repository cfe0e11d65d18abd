//! AI description and tag enrichment through a Gemini-style
//! `generateContent` endpoint.

pub mod batch;
pub mod client;
pub mod enricher;
pub mod error;
pub mod prompts;
pub(crate) mod retry;
pub mod types;

pub use batch::{enrich_rows, BatchOptions};
pub use client::{GeminiClient, TextGenerator};
pub use enricher::Enricher;
pub use error::EnrichError;
pub use retry::RetryPolicy;
