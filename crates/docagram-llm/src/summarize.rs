//! Summarization with bounded retries
//!
//! Short text is never summarized: the caller gets an empty string and keeps
//! the original. Transient failures are retried with capped exponential
//! backoff. When every attempt fails, or no summarizer can be reached, the
//! caller gets [`SUMMARIZER_UNAVAILABLE`] instead of a summary.

use crate::{ModelError, Summarizer};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Returned in place of a summary when summarization could not be done
pub const SUMMARIZER_UNAVAILABLE: &str = "Summarizer not available";

/// Text at or below this many characters is not summarized by default
pub const DEFAULT_MIN_LENGTH: usize = 1000;

/// Retry policy for summarization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry; doubles on each further retry
    pub base_delay_ms: u64,

    /// Upper bound for a single delay
    pub max_delay_ms: u64,
}

impl Default for SummaryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 4000,
        }
    }
}

impl SummaryPolicy {
    /// Policy with no delays, for tests
    pub fn immediate() -> Self {
        Self {
            base_delay_ms: 0,
            max_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (starting at 1)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u64.saturating_pow(retry.saturating_sub(1));
        let delay = self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

/// Summarize `text` if it is longer than `min_length` characters
///
/// - Text of `min_length` characters or fewer returns `""`.
/// - `InvalidState` reinitialises the summarizer once and tries again.
/// - Transient errors are retried according to `policy`.
/// - Exhausted retries, an unavailable model, or a failed reinitialisation
///   return [`SUMMARIZER_UNAVAILABLE`].
/// - Any other error returns `text` unchanged.
pub async fn summarize_with_retry<S>(
    summarizer: &S,
    text: &str,
    min_length: usize,
    policy: &SummaryPolicy,
) -> String
where
    S: Summarizer + ?Sized,
{
    let length = text.chars().count();
    if text.is_empty() || length <= min_length {
        debug!("Text of {} chars does not need summarizing", length);
        return String::new();
    }

    let mut retries = 0;
    let mut reinitialized = false;

    loop {
        match summarizer.summarize(text).await {
            Ok(summary) => {
                debug!("Summarized {} chars into {}", length, summary.chars().count());
                return summary;
            }
            Err(ModelError::InvalidState(msg)) if !reinitialized => {
                warn!("Summarizer session invalid ({}), reinitializing", msg);
                reinitialized = true;
                if let Err(e) = summarizer.reinitialize().await {
                    warn!("Failed to reinitialize summarizer: {}", e);
                    return SUMMARIZER_UNAVAILABLE.to_string();
                }
            }
            Err(e) if e.is_transient() && retries < policy.max_retries => {
                retries += 1;
                let delay = policy.delay_for(retries);
                warn!(
                    "Summarization failed ({}), retry {}/{} in {:?}",
                    e, retries, policy.max_retries, delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e @ ModelError::ModelNotAvailable(_)) | Err(e @ ModelError::InvalidState(_)) => {
                warn!("Summarizer not available: {}", e);
                return SUMMARIZER_UNAVAILABLE.to_string();
            }
            Err(e) if e.is_transient() => {
                warn!("Summarization failed after {} retries: {}", retries, e);
                return SUMMARIZER_UNAVAILABLE.to_string();
            }
            Err(e) => {
                warn!("Summarization failed, using original content: {}", e);
                return text.to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockModel;

    fn long_text() -> String {
        "word ".repeat(300)
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = SummaryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(4), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(10), Duration::from_millis(4000));
    }

    #[tokio::test]
    async fn test_short_text_is_not_summarized() {
        let model = MockModel::new();
        let result = summarize_with_retry(&model, "short", DEFAULT_MIN_LENGTH, &SummaryPolicy::immediate()).await;
        assert_eq!(result, "");
        assert_eq!(model.summarize_count(), 0);
    }

    #[tokio::test]
    async fn test_boundary_length_is_not_summarized() {
        let model = MockModel::new();
        let text = "x".repeat(10);
        assert_eq!(summarize_with_retry(&model, &text, 10, &SummaryPolicy::immediate()).await, "");
    }

    #[tokio::test]
    async fn test_success() {
        let model = MockModel::new();
        model.push_summary(Ok("condensed".into()));
        let result = summarize_with_retry(&model, &long_text(), DEFAULT_MIN_LENGTH, &SummaryPolicy::immediate()).await;
        assert_eq!(result, "condensed");
    }

    #[tokio::test]
    async fn test_transient_then_success() {
        let model = MockModel::new();
        model.push_summary(Err(ModelError::NotReadable("busy".into())));
        model.push_summary(Err(ModelError::NotSupported("later".into())));
        model.push_summary(Ok("condensed".into()));

        let result = summarize_with_retry(&model, &long_text(), 10, &SummaryPolicy::immediate()).await;
        assert_eq!(result, "condensed");
        assert_eq!(model.summarize_count(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_return_marker() {
        let model = MockModel::new();
        for _ in 0..4 {
            model.push_summary(Err(ModelError::NotReadable("busy".into())));
        }

        let result = summarize_with_retry(&model, &long_text(), 10, &SummaryPolicy::immediate()).await;
        assert_eq!(result, SUMMARIZER_UNAVAILABLE);
        assert_eq!(model.summarize_count(), 4);
    }

    #[tokio::test]
    async fn test_invalid_state_reinitializes_once() {
        let model = MockModel::new();
        model.push_summary(Err(ModelError::InvalidState("gone".into())));
        model.push_summary(Ok("condensed".into()));

        let result = summarize_with_retry(&model, &long_text(), 10, &SummaryPolicy::immediate()).await;
        assert_eq!(result, "condensed");
        assert_eq!(model.reinitialize_count(), 1);
    }

    #[tokio::test]
    async fn test_repeated_invalid_state_returns_marker() {
        let model = MockModel::new();
        model.push_summary(Err(ModelError::InvalidState("gone".into())));
        model.push_summary(Err(ModelError::InvalidState("still gone".into())));

        let result = summarize_with_retry(&model, &long_text(), 10, &SummaryPolicy::immediate()).await;
        assert_eq!(result, SUMMARIZER_UNAVAILABLE);
        assert_eq!(model.reinitialize_count(), 1);
    }

    #[tokio::test]
    async fn test_other_error_keeps_original() {
        let model = MockModel::new();
        model.push_summary(Err(ModelError::InvalidResponse("garbled".into())));
        let text = long_text();

        let result = summarize_with_retry(&model, &text, 10, &SummaryPolicy::immediate()).await;
        assert_eq!(result, text);
    }

    #[tokio::test]
    async fn test_unavailable_model_returns_marker() {
        let model = MockModel::new();
        model.push_summary(Err(ModelError::ModelNotAvailable("none".into())));

        let result = summarize_with_retry(&model, &long_text(), 10, &SummaryPolicy::immediate()).await;
        assert_eq!(result, SUMMARIZER_UNAVAILABLE);
    }
}
