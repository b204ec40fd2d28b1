//! Docagram Model Layer
//!
//! The calling contract between the analysis loop and a language model, plus
//! the backends that implement it.
//!
//! # Contract
//!
//! - [`LanguageModel::prompt_streaming`] opens a stream of **snapshots**. Every
//!   item is the full text generated so far, so a consumer keeps only the
//!   latest one and never concatenates.
//! - Failures carry a [`ModelError`] whose [`kind`](ModelError::kind) tells the
//!   caller whether to retry ([`is_transient`](ModelError::is_transient)),
//!   reinitialise the session, or give up.
//! - [`Summarizer::summarize`] condenses text; [`summarize_with_retry`] wraps it
//!   with backoff and a failure marker.
//!
//! # Backends
//!
//! - `MockModel`: scripted snapshots and errors for tests
//! - `OllamaModel`: local Ollama `/api/generate` streaming
//!
//! # Examples
//!
//! ```
//! use docagram_llm::{LanguageModel, MockModel};
//! use futures::StreamExt;
//!
//! # tokio_test::block_on(async {
//! let model = MockModel::new();
//! model.push_snapshots(["Google to", "Google to Chrome (develops)"]);
//!
//! let mut stream = model.prompt_streaming("prompt").await.unwrap();
//! let mut latest = String::new();
//! while let Some(snapshot) = stream.next().await {
//!     latest = snapshot.unwrap();
//! }
//! assert_eq!(latest, "Google to Chrome (develops)");
//! # });
//! ```

#![warn(missing_docs)]

pub mod mock;
pub mod ollama;
pub mod summarize;

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

pub use mock::MockModel;
pub use ollama::OllamaModel;
pub use summarize::{summarize_with_retry, SummaryPolicy, SUMMARIZER_UNAVAILABLE};

/// Stream of full-text snapshots from one prompt
pub type SnapshotStream = BoxStream<'static, Result<String, ModelError>>;

/// Errors a model backend can report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The session must be reinitialised before it can be used again
    #[error("Model session is no longer valid: {0}")]
    InvalidState(String),

    /// Output could not be read; usually worth retrying
    #[error("Model output could not be read: {0}")]
    NotReadable(String),

    /// The request was refused for now; usually worth retrying
    #[error("Model request not supported: {0}")]
    NotSupported(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Response did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Generic error
    #[error("Model error: {0}")]
    Other(String),
}

impl ModelError {
    /// Error name shown next to the message in fatal reports
    pub fn kind(&self) -> &'static str {
        match self {
            ModelError::InvalidState(_) => "InvalidStateError",
            ModelError::NotReadable(_) => "NotReadableError",
            ModelError::NotSupported(_) => "NotSupportedError",
            ModelError::ModelNotAvailable(_) => "ModelNotAvailableError",
            ModelError::Communication(_) => "NetworkError",
            ModelError::InvalidResponse(_) => "InvalidResponseError",
            ModelError::Other(_) => "Error",
        }
    }

    /// Whether the failed call may succeed if repeated
    pub fn is_transient(&self) -> bool {
        matches!(self, ModelError::NotReadable(_) | ModelError::NotSupported(_))
    }
}

/// A language model that streams snapshots for a prompt
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Open a snapshot stream for `prompt`
    async fn prompt_streaming(&self, prompt: &str) -> Result<SnapshotStream, ModelError>;

    /// Recreate the underlying session after [`ModelError::InvalidState`]
    async fn reinitialize(&self) -> Result<(), ModelError> {
        Ok(())
    }
}

/// A backend that condenses long text
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `text`
    async fn summarize(&self, text: &str) -> Result<String, ModelError>;

    /// Recreate the underlying session after [`ModelError::InvalidState`]
    async fn reinitialize(&self) -> Result<(), ModelError> {
        Ok(())
    }
}
