//! Docagram Extractor
//!
//! Drives a language model over page text and aggregates the relationships it
//! writes into a [`RelationshipStore`](docagram_store::RelationshipStore).
//!
//! # Architecture
//!
//! ```text
//! page text → [summarize] → split_into_chunks → PromptBuilder
//!           → LanguageModel (snapshot stream) → RelationshipStore
//! ```
//!
//! # Key Features
//!
//! - **Snapshot streaming**: only the latest snapshot of a chunk is kept and
//!   parsed when the stream ends
//! - **Retries**: transient model failures are retried, then the chunk is
//!   skipped and the run continues
//! - **Session recovery**: an invalid model session is reinitialised once
//! - **Progress events**: optional channel of [`AnalysisEvent`]s
//! - **Cancellation**: a `CancellationToken` stops the run at the next await
//! - **Section mode**: per-chunk results merged by [`combine_sections`]
//!
//! # Example Usage
//!
//! ```
//! use docagram_extractor::{AnalysisOptions, AnalysisRequest, Analyzer};
//! use docagram_llm::MockModel;
//! use docagram_store::RelationshipStore;
//!
//! # tokio_test::block_on(async {
//! let model = MockModel::with_default_output("Alice to Acme Corp (works at)");
//! let analyzer = Analyzer::new(model, AnalysisOptions::default());
//! let mut store = RelationshipStore::new();
//!
//! let report = analyzer
//!     .analyze(&mut store, AnalysisRequest::new("Alice works at Acme Corp.", "http://a"))
//!     .await
//!     .unwrap();
//!
//! assert_eq!(report.relationships_added, 1);
//! assert_eq!(store.get_entity_count("Acme Corp"), 1);
//! # });
//! ```

#![warn(missing_docs)]

mod analyzer;
mod chunking;
mod config;
mod error;
mod prompt;
mod sections;
mod types;

#[cfg(test)]
mod tests;

pub use analyzer::{Analyzer, SUMMARIZE_FIRST_THRESHOLD};
pub use chunking::{collapse_whitespace, split_into_chunks};
pub use config::{AnalysisOptions, RetryPolicy, DEFAULT_SYSTEM_PROMPT};
pub use error::AnalysisError;
pub use prompt::PromptBuilder;
pub use sections::{combine_sections, CombinedView};
pub use types::{AnalysisEvent, AnalysisReport, AnalysisRequest, Section};
