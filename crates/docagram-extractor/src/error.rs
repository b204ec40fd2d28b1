//! Error types for analysis runs

use docagram_llm::ModelError;
use thiserror::Error;

/// Errors that abort an analysis run
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Non-transient model failure
    #[error("{0}")]
    Model(#[from] ModelError),

    /// The run was cancelled before it finished
    #[error("Analysis cancelled")]
    Cancelled,

    /// Invalid analysis options
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalysisError {
    /// Error name shown next to the message
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Model(e) => e.kind(),
            AnalysisError::Cancelled => "AbortError",
            AnalysisError::Config(_) => "ConfigError",
        }
    }

    /// Status line for a failed run, `Analysis failed: message (kind)`
    pub fn report(&self) -> String {
        format!("Analysis failed: {} ({})", self, self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_format() {
        let err = AnalysisError::from(ModelError::InvalidState("session destroyed".into()));
        assert_eq!(
            err.report(),
            "Analysis failed: Model session is no longer valid: session destroyed (InvalidStateError)"
        );
    }

    #[test]
    fn test_cancelled_kind() {
        assert_eq!(AnalysisError::Cancelled.kind(), "AbortError");
    }
}
