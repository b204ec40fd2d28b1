//! Ollama Model Implementation
//!
//! Streams completions from a local Ollama server's `/api/generate` endpoint.
//!
//! Ollama streams newline-delimited JSON, one token delta per line. The
//! deltas are accumulated here so callers receive full-text snapshots like any
//! other [`LanguageModel`].
//!
//! # Examples
//!
//! ```no_run
//! use docagram_llm::OllamaModel;
//!
//! let model = OllamaModel::new("http://localhost:11434", "llama3.2")
//!     .unwrap()
//!     .with_sampling(0.7, 40);
//! ```

use crate::{LanguageModel, ModelError, SnapshotStream, Summarizer};
use async_trait::async_trait;
use futures::future;
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default model name
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Default timeout for one whole request, stream included
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

const SUMMARY_INSTRUCTION: &str = "Summarize the following text in a few short paragraphs. \
Keep the names of people, organizations, products and places, and the facts that connect them. \
Output only the summary.";

/// Ollama backend
#[derive(Clone)]
pub struct OllamaModel {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    temperature: f32,
    top_k: u32,
    system_prompt: Option<String>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_k: u32,
}

/// One line of Ollama's generate response
#[derive(Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[allow(dead_code)]
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

impl OllamaModel {
    /// Create a model client for `model` served at `endpoint`
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, ModelError> {
        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
            temperature: 0.7,
            top_k: 40,
            system_prompt: None,
        })
    }

    /// Create a model client on [`DEFAULT_ENDPOINT`]
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, ModelError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Replace the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ModelError> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    /// Set sampling temperature and top-k
    pub fn with_sampling(mut self, temperature: f32, top_k: u32) -> Self {
        self.temperature = temperature;
        self.top_k = top_k;
        self
    }

    /// Set the system prompt sent with every chunk prompt
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Endpoint this client talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Model name sent with each request
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(
        &self,
        prompt: &str,
        system: Option<&str>,
        stream: bool,
    ) -> Result<reqwest::Response, ModelError> {
        let url = format!("{}/api/generate", self.endpoint.trim_end_matches('/'));
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream,
            options: GenerateOptions {
                temperature: self.temperature,
                top_k: self.top_k,
            },
        };

        debug!("POST {} (model {}, stream {})", url, self.model, stream);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(match status {
            reqwest::StatusCode::NOT_FOUND => ModelError::ModelNotAvailable(self.model.clone()),
            reqwest::StatusCode::TOO_MANY_REQUESTS | reqwest::StatusCode::SERVICE_UNAVAILABLE => {
                ModelError::NotReadable(format!("HTTP {}: {}", status, error_text))
            }
            _ => ModelError::Communication(format!("HTTP {}: {}", status, error_text)),
        })
    }
}

#[async_trait]
impl LanguageModel for OllamaModel {
    async fn prompt_streaming(&self, prompt: &str) -> Result<SnapshotStream, ModelError> {
        let response = self
            .send(prompt, self.system_prompt.as_deref(), true)
            .await?;
        Ok(ndjson_snapshots(response.bytes_stream()))
    }
}

#[async_trait]
impl Summarizer for OllamaModel {
    async fn summarize(&self, text: &str) -> Result<String, ModelError> {
        let response = self.send(text, Some(SUMMARY_INSTRUCTION), false).await?;
        let chunk: GenerateChunk = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        match chunk.error {
            Some(error) => Err(ModelError::Other(error)),
            None => Ok(chunk.response.trim().to_string()),
        }
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, ModelError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ModelError::Communication(format!("Failed to build HTTP client: {}", e)))
}

/// Turn a byte stream of NDJSON generate chunks into full-text snapshots
///
/// Lines may be split across byte chunks. Each line with a non-empty
/// `response` yields the accumulated text so far. Transport errors surface as
/// [`ModelError::NotReadable`].
pub fn ndjson_snapshots<S, B, E>(bytes: S) -> SnapshotStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    bytes
        .map(Some)
        .chain(stream::once(future::ready(None)))
        .scan(SnapshotBuffer::default(), |buffer, item| {
            let out = match item {
                Some(Ok(chunk)) => buffer.push(chunk.as_ref()),
                Some(Err(e)) => vec![Err(ModelError::NotReadable(format!("Stream error: {}", e)))],
                None => buffer.finish(),
            };
            future::ready(Some(out))
        })
        .flat_map(stream::iter)
        .boxed()
}

#[derive(Default)]
struct SnapshotBuffer {
    pending: Vec<u8>,
    text: String,
}

impl SnapshotBuffer {
    fn push(&mut self, chunk: &[u8]) -> Vec<Result<String, ModelError>> {
        self.pending.extend_from_slice(chunk);
        let mut out = Vec::new();

        while let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            out.extend(self.line(&line));
        }

        out
    }

    fn finish(&mut self) -> Vec<Result<String, ModelError>> {
        let line = std::mem::take(&mut self.pending);
        self.line(&line).into_iter().collect()
    }

    fn line(&mut self, line: &[u8]) -> Option<Result<String, ModelError>> {
        if line.iter().all(u8::is_ascii_whitespace) {
            return None;
        }

        let chunk: GenerateChunk = match serde_json::from_slice(line) {
            Ok(chunk) => chunk,
            Err(e) => {
                return Some(Err(ModelError::InvalidResponse(format!(
                    "Failed to parse stream line: {}",
                    e
                ))))
            }
        };

        if let Some(error) = chunk.error {
            return Some(Err(ModelError::Other(error)));
        }
        if chunk.response.is_empty() {
            return None;
        }

        self.text.push_str(&chunk.response);
        Some(Ok(self.text.clone()))
    }
}
