//! Scripted model for deterministic tests
//!
//! Each call to `prompt_streaming` consumes the next queued script. When the
//! queue is empty the default output is streamed as a single snapshot.

use crate::{LanguageModel, ModelError, SnapshotStream, Summarizer};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
enum Script {
    Open(ModelError),
    Stream(Vec<Result<String, ModelError>>),
}

#[derive(Debug, Default)]
struct MockState {
    scripts: VecDeque<Script>,
    summaries: VecDeque<Result<String, ModelError>>,
    default_output: String,
    prompts: Vec<String>,
    summarize_calls: usize,
    reinitialize_calls: usize,
}

/// Mock model returning queued snapshot streams
///
/// Clones share their queue and counters.
///
/// # Examples
///
/// ```
/// use docagram_llm::{LanguageModel, MockModel, ModelError};
///
/// # tokio_test::block_on(async {
/// let model = MockModel::new();
/// model.push_open_error(ModelError::NotReadable("busy".into()));
///
/// assert!(model.prompt_streaming("p").await.is_err());
/// assert_eq!(model.call_count(), 1);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockModel {
    state: Arc<Mutex<MockState>>,
}

impl MockModel {
    /// Create a mock with an empty default output
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that streams `output` whenever no script is queued
    pub fn with_default_output(output: impl Into<String>) -> Self {
        let model = Self::default();
        model.lock().default_output = output.into();
        model
    }

    /// Queue a stream that yields these snapshots in order
    pub fn push_snapshots<I, S>(&self, snapshots: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = snapshots.into_iter().map(|s| Ok(s.into())).collect();
        self.lock().scripts.push_back(Script::Stream(items));
    }

    /// Queue a stream of arbitrary items, including mid-stream errors
    pub fn push_stream(&self, items: Vec<Result<String, ModelError>>) {
        self.lock().scripts.push_back(Script::Stream(items));
    }

    /// Queue a failure to open the stream
    pub fn push_open_error(&self, error: ModelError) {
        self.lock().scripts.push_back(Script::Open(error));
    }

    /// Queue a summarize result
    pub fn push_summary(&self, result: Result<String, ModelError>) {
        self.lock().summaries.push_back(result);
    }

    /// Number of `prompt_streaming` calls so far
    pub fn call_count(&self) -> usize {
        self.lock().prompts.len()
    }

    /// Every prompt received, in order
    pub fn prompts(&self) -> Vec<String> {
        self.lock().prompts.clone()
    }

    /// Number of `summarize` calls so far
    pub fn summarize_count(&self) -> usize {
        self.lock().summarize_calls
    }

    /// Number of `reinitialize` calls so far
    pub fn reinitialize_count(&self) -> usize {
        self.lock().reinitialize_calls
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn prompt_streaming(&self, prompt: &str) -> Result<SnapshotStream, ModelError> {
        let mut state = self.lock();
        state.prompts.push(prompt.to_string());

        let items = match state.scripts.pop_front() {
            Some(Script::Open(error)) => return Err(error),
            Some(Script::Stream(items)) => items,
            None if state.default_output.is_empty() => Vec::new(),
            None => vec![Ok(state.default_output.clone())],
        };

        Ok(stream::iter(items).boxed())
    }

    async fn reinitialize(&self) -> Result<(), ModelError> {
        self.lock().reinitialize_calls += 1;
        Ok(())
    }
}

#[async_trait]
impl Summarizer for MockModel {
    async fn summarize(&self, text: &str) -> Result<String, ModelError> {
        let mut state = self.lock();
        state.summarize_calls += 1;
        state
            .summaries
            .pop_front()
            .unwrap_or_else(|| Ok(text.chars().take(100).collect()))
    }

    async fn reinitialize(&self) -> Result<(), ModelError> {
        self.lock().reinitialize_calls += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(s: &str) -> Result<String, ModelError> {
        Ok(s.to_string())
    }

    async fn collect(model: &MockModel) -> Vec<Result<String, ModelError>> {
        model
            .prompt_streaming("p")
            .await
            .unwrap()
            .collect::<Vec<_>>()
            .await
    }

    #[tokio::test]
    async fn test_scripts_are_consumed_in_order() {
        let model = MockModel::new();
        model.push_snapshots(["a", "ab"]);
        model.push_snapshots(["x"]);

        assert_eq!(collect(&model).await, vec![ok("a"), ok("ab")]);
        assert_eq!(collect(&model).await, vec![ok("x")]);
        assert!(collect(&model).await.is_empty());
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn test_default_output() {
        let model = MockModel::with_default_output("A to B (x)");
        assert_eq!(collect(&model).await, vec![ok("A to B (x)")]);
    }

    #[tokio::test]
    async fn test_mid_stream_error() {
        let model = MockModel::new();
        model.push_stream(vec![
            Ok("partial".into()),
            Err(ModelError::NotReadable("dropped".into())),
        ]);

        let items = collect(&model).await;
        assert_eq!(items.len(), 2);
        assert!(items[1].as_ref().unwrap_err().is_transient());
    }

    #[tokio::test]
    async fn test_prompts_are_recorded() {
        let model = MockModel::new();
        model.prompt_streaming("first").await.unwrap();
        model.prompt_streaming("second").await.unwrap();
        assert_eq!(model.prompts(), vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let model = MockModel::new();
        let other = model.clone();
        other.push_open_error(ModelError::InvalidState("gone".into()));

        assert!(model.prompt_streaming("p").await.is_err());
        assert_eq!(other.call_count(), 1);

        LanguageModel::reinitialize(&model).await.unwrap();
        assert_eq!(other.reinitialize_count(), 1);
    }

    #[tokio::test]
    async fn test_summaries() {
        let model = MockModel::new();
        model.push_summary(Ok("short".into()));
        assert_eq!(model.summarize("long text").await.unwrap(), "short");
        assert_eq!(model.summarize("fallback").await.unwrap(), "fallback");
        assert_eq!(model.summarize_count(), 2);
    }
}
