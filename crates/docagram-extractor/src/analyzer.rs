//! Chunk loop that drives the model and feeds the store

use crate::chunking::split_into_chunks;
use crate::config::{AnalysisOptions, RetryPolicy};
use crate::error::AnalysisError;
use crate::prompt::PromptBuilder;
use crate::types::{AnalysisEvent, AnalysisReport, AnalysisRequest};
use docagram_llm::summarize::DEFAULT_MIN_LENGTH;
use docagram_llm::{
    summarize_with_retry, LanguageModel, ModelError, SnapshotStream, SummaryPolicy, Summarizer,
    SUMMARIZER_UNAVAILABLE,
};
use docagram_store::RelationshipStore;
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Page text longer than this many characters is summarized first when asked
pub const SUMMARIZE_FIRST_THRESHOLD: usize = 2000;

/// Final text of one chunk after streaming and retries
pub(crate) struct ChunkOutcome {
    pub(crate) output: String,
    pub(crate) skipped: Option<ModelError>,
}

/// Runs page text through a language model, chunk by chunk
///
/// One stream is open at a time. Every snapshot replaces the previous one;
/// the last snapshot of a chunk is parsed into the store when the stream ends.
/// `NotReadable` and `NotSupported` failures are retried with a fixed delay
/// and the chunk is skipped once the attempts run out. Any other model error
/// ends the run.
pub struct Analyzer<M: LanguageModel> {
    model: M,
    summarizer: Option<Arc<dyn Summarizer>>,
    options: AnalysisOptions,
    retry: RetryPolicy,
    summary_policy: SummaryPolicy,
    events: Option<UnboundedSender<AnalysisEvent>>,
    cancel: CancellationToken,
}

impl<M: LanguageModel> Analyzer<M> {
    /// Create an analyzer with default retry policies
    pub fn new(model: M, options: AnalysisOptions) -> Self {
        Self {
            model,
            summarizer: None,
            options,
            retry: RetryPolicy::default(),
            summary_policy: SummaryPolicy::default(),
            events: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Use `summarizer` for summarize-first runs and sections
    pub fn with_summarizer(mut self, summarizer: impl Summarizer + 'static) -> Self {
        self.summarizer = Some(Arc::new(summarizer));
        self
    }

    /// Replace the chunk retry policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the summarization retry policy
    pub fn with_summary_policy(mut self, policy: SummaryPolicy) -> Self {
        self.summary_policy = policy;
        self
    }

    /// Send progress events to `events`
    pub fn with_events(mut self, events: UnboundedSender<AnalysisEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Stop at the next suspension point once `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Options this analyzer runs with
    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Analyze `request.text` and add what is found to `store`
    ///
    /// The store is not reset first. Relationships parsed before a fatal
    /// error or cancellation stay in the store.
    pub async fn analyze(
        &self,
        store: &mut RelationshipStore,
        request: AnalysisRequest,
    ) -> Result<AnalysisReport, AnalysisError> {
        self.options.validate().map_err(AnalysisError::Config)?;
        let started = Instant::now();

        info!(
            "Starting analysis of {} chars from '{}'",
            request.text.chars().count(),
            request.source_url
        );

        let mut report = AnalysisReport::default();
        let text = if request.summarize_first {
            match self.summarize_page(&request.text).await? {
                Some(summary) => {
                    report.summarized = true;
                    summary
                }
                None => request.text,
            }
        } else {
            request.text
        };

        let chunks = split_into_chunks(&text, self.options.chunk_size);
        report.chunks_total = chunks.len();
        info!("Split text into {} chunks", chunks.len());

        for (index, chunk) in chunks.iter().enumerate() {
            self.check_cancelled()?;
            self.emit(AnalysisEvent::ChunkStarted {
                index,
                total: chunks.len(),
            });
            tokio::task::yield_now().await;

            let prompt = PromptBuilder::new(chunk, index, chunks.len()).build();
            let outcome = self.run_chunk(index, &prompt).await?;

            report
                .transcript
                .push_str(&format!("\n\nChunk {} results:\n{}", index + 1, outcome.output));
            let added = store
                .parse_relationships(&outcome.output, &request.source_url)
                .len();
            report.relationships_added += added;

            match outcome.skipped {
                Some(error) => {
                    report.chunks_skipped.push(index);
                    self.emit(AnalysisEvent::ChunkSkipped {
                        index,
                        error: error.to_string(),
                    });
                }
                None => self.emit(AnalysisEvent::ChunkCompleted { index, added }),
            }

            tokio::task::yield_now().await;
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            "Analysis finished: {} new relationships, {} chunks skipped, {}ms",
            report.relationships_added,
            report.chunks_skipped.len(),
            report.duration_ms
        );
        self.emit(AnalysisEvent::Finished {
            relationships: store.len(),
            entities: store.get_entities_list().len(),
        });

        Ok(report)
    }

    /// Summarize long page text, returning `None` to keep the original
    async fn summarize_page(&self, text: &str) -> Result<Option<String>, AnalysisError> {
        let length = text.chars().count();
        if length <= SUMMARIZE_FIRST_THRESHOLD {
            return Ok(None);
        }

        let Some(summarizer) = &self.summarizer else {
            warn!("Summarize-first requested but no summarizer is configured");
            return Ok(None);
        };

        self.emit(AnalysisEvent::Summarizing { length });
        let summary = self
            .cancellable(summarize_with_retry(
                summarizer.as_ref(),
                text,
                DEFAULT_MIN_LENGTH,
                &self.summary_policy,
            ))
            .await?;

        let usable = usable_summary(&summary);
        self.emit(AnalysisEvent::Summarized {
            length: usable.map_or(length, |s| s.chars().count()),
            used: usable.is_some(),
        });
        Ok(usable.map(str::to_string))
    }

    /// Summarize one chunk for section mode, returning the summary text
    pub(crate) async fn summarize_chunk(&self, chunk: &str) -> Result<String, AnalysisError> {
        match &self.summarizer {
            Some(summarizer) => {
                self.cancellable(summarize_with_retry(
                    summarizer.as_ref(),
                    chunk,
                    DEFAULT_MIN_LENGTH,
                    &self.summary_policy,
                ))
                .await
            }
            None => Ok(String::new()),
        }
    }

    /// Stream one chunk to completion, retrying transient failures
    pub(crate) async fn run_chunk(
        &self,
        index: usize,
        prompt: &str,
    ) -> Result<ChunkOutcome, AnalysisError> {
        let mut latest = String::new();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let result = match self.open_stream(prompt).await {
                Ok(stream) => {
                    // Each opened stream starts from nothing
                    latest.clear();
                    self.drain(index, stream, &mut latest).await
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => {
                    debug!("Chunk {} produced {} chars", index + 1, latest.len());
                    return Ok(ChunkOutcome {
                        output: latest,
                        skipped: None,
                    });
                }
                Err(AnalysisError::Model(error)) if error.is_transient() => {
                    if attempt >= self.retry.max_attempts {
                        warn!(
                            "Chunk {} failed after {} attempts, skipping: {}",
                            index + 1,
                            attempt,
                            error
                        );
                        return Ok(ChunkOutcome {
                            output: latest,
                            skipped: Some(error),
                        });
                    }

                    warn!(
                        "Chunk {} attempt {}/{} failed: {}",
                        index + 1,
                        attempt,
                        self.retry.max_attempts,
                        error
                    );
                    self.emit(AnalysisEvent::Retrying {
                        index,
                        attempt,
                        max_attempts: self.retry.max_attempts,
                        error: error.to_string(),
                    });
                    self.cancellable(tokio::time::sleep(self.retry.delay()))
                        .await?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Open a stream, reinitialising the model once on `InvalidState`
    async fn open_stream(&self, prompt: &str) -> Result<SnapshotStream, AnalysisError> {
        match self.cancellable(self.model.prompt_streaming(prompt)).await? {
            Err(ModelError::InvalidState(msg)) => {
                warn!("Model session invalid ({}), reinitializing", msg);
                self.cancellable(self.model.reinitialize()).await??;
                Ok(self.cancellable(self.model.prompt_streaming(prompt)).await??)
            }
            other => Ok(other?),
        }
    }

    /// Read snapshots until the stream ends, keeping only the latest
    async fn drain(
        &self,
        index: usize,
        mut stream: SnapshotStream,
        latest: &mut String,
    ) -> Result<(), AnalysisError> {
        while let Some(item) = self.cancellable(stream.next()).await? {
            *latest = item?;
            if self.events.is_some() {
                self.emit(AnalysisEvent::Snapshot {
                    index,
                    text: latest.clone(),
                });
            }
        }
        Ok(())
    }

    /// Await `fut` unless the run is cancelled first
    async fn cancellable<F: Future>(&self, fut: F) -> Result<F::Output, AnalysisError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AnalysisError::Cancelled),
            out = fut => Ok(out),
        }
    }

    pub(crate) fn check_cancelled(&self) -> Result<(), AnalysisError> {
        if self.cancel.is_cancelled() {
            info!("Analysis cancelled");
            return Err(AnalysisError::Cancelled);
        }
        Ok(())
    }

    pub(crate) fn emit(&self, event: AnalysisEvent) {
        if let Some(events) = &self.events {
            // A dropped receiver only means nobody is watching
            let _ = events.send(event);
        }
    }
}

/// A summary worth analyzing instead of the original text
pub(crate) fn usable_summary(summary: &str) -> Option<&str> {
    let summary = summary.trim();
    if summary.is_empty() || summary == SUMMARIZER_UNAVAILABLE {
        None
    } else {
        Some(summary)
    }
}
