//! Request, progress and result types for analysis runs

use docagram_domain::Relationship;
use serde::Serialize;

/// Request to analyze one page of text
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Page text, already flattened
    pub text: String,

    /// URL recorded as the source of every relationship found
    pub source_url: String,

    /// Condense long text with the summarizer before chunking
    pub summarize_first: bool,
}

impl AnalysisRequest {
    /// Request without the summarize step
    pub fn new(text: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_url: source_url.into(),
            summarize_first: false,
        }
    }

    /// Enable or disable the summarize step
    pub fn with_summarize_first(mut self, summarize_first: bool) -> Self {
        self.summarize_first = summarize_first;
        self
    }
}

/// Progress reported while a run is in flight
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisEvent {
    /// Page text is being condensed before chunking
    Summarizing {
        /// Characters in the page text
        length: usize,
    },

    /// Summarization finished; `used` is false when the original text is kept
    Summarized {
        /// Characters in the text that will be chunked
        length: usize,
        /// Whether the summary replaced the page text
        used: bool,
    },

    /// A chunk stream is about to be opened
    ChunkStarted {
        /// Zero-based chunk index
        index: usize,
        /// Number of chunks in the run
        total: usize,
    },

    /// Latest full-text snapshot for a chunk
    Snapshot {
        /// Zero-based chunk index
        index: usize,
        /// Everything generated so far for this chunk
        text: String,
    },

    /// A transient failure; the chunk will be tried again
    Retrying {
        /// Zero-based chunk index
        index: usize,
        /// Attempt that just failed, starting at 1
        attempt: u32,
        /// Attempt ceiling
        max_attempts: u32,
        /// Failure message
        error: String,
    },

    /// Retries ran out; whatever was received is kept and the run moves on
    ChunkSkipped {
        /// Zero-based chunk index
        index: usize,
        /// Last failure message
        error: String,
    },

    /// Chunk output was parsed into the store
    ChunkCompleted {
        /// Zero-based chunk index
        index: usize,
        /// New relationships from this chunk
        added: usize,
    },

    /// The run finished
    Finished {
        /// Relationships in the store
        relationships: usize,
        /// Entities in the store
        entities: usize,
    },
}

impl AnalysisEvent {
    /// One-line status text for this event
    pub fn status(&self) -> String {
        match self {
            AnalysisEvent::Summarizing { .. } => "Summarizing content for analysis...".to_string(),
            AnalysisEvent::Summarized { used: true, .. } => {
                "Summarization complete. Starting analysis...".to_string()
            }
            AnalysisEvent::Summarized { used: false, .. } => {
                "Summary unavailable. Analyzing original content...".to_string()
            }
            AnalysisEvent::ChunkStarted { index, total } => {
                format!("Analyzing chunk {} of {}...", index + 1, total)
            }
            AnalysisEvent::Snapshot { index, text } => {
                format!("Chunk {} output: {} chars", index + 1, text.chars().count())
            }
            AnalysisEvent::Retrying {
                index,
                attempt,
                max_attempts,
                error,
            } => format!(
                "Chunk {} failed (attempt {}/{}): {}. Retrying...",
                index + 1,
                attempt,
                max_attempts,
                error
            ),
            AnalysisEvent::ChunkSkipped { index, error } => {
                format!("Skipping chunk {}: {}", index + 1, error)
            }
            AnalysisEvent::ChunkCompleted { index, added } => {
                format!("Chunk {} complete: {} new relationships", index + 1, added)
            }
            AnalysisEvent::Finished {
                relationships,
                entities,
            } => format!(
                "Analysis complete: {} relationships, {} entities",
                relationships, entities
            ),
        }
    }
}

/// Outcome of a finished run
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Chunks the text was split into
    pub chunks_total: usize,

    /// Zero-based indices of chunks skipped after exhausting retries
    pub chunks_skipped: Vec<usize>,

    /// Relationships added to the store by this run
    pub relationships_added: usize,

    /// Whether a summary replaced the page text
    pub summarized: bool,

    /// Final output of every chunk, labeled by chunk number
    pub transcript: String,

    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

/// Result of analyzing one chunk on its own
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Zero-based chunk index
    pub index: usize,

    /// Summary the relationships were extracted from; empty when the chunk
    /// itself was analyzed
    pub summary: String,

    /// Relationships found in this chunk alone
    pub relationships: Vec<Relationship>,

    /// Final model output for this chunk
    pub output: String,

    /// Failure message when the section could not be fully processed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lines() {
        assert_eq!(
            AnalysisEvent::ChunkStarted { index: 0, total: 3 }.status(),
            "Analyzing chunk 1 of 3..."
        );
        assert_eq!(
            AnalysisEvent::Retrying {
                index: 1,
                attempt: 2,
                max_attempts: 3,
                error: "busy".into()
            }
            .status(),
            "Chunk 2 failed (attempt 2/3): busy. Retrying..."
        );
    }

    #[test]
    fn test_request_builder() {
        let request = AnalysisRequest::new("text", "http://a").with_summarize_first(true);
        assert!(request.summarize_first);
        assert_eq!(request.source_url, "http://a");
    }
}
