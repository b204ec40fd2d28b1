//! Configuration for analysis runs

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// System prompt used when none is configured
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that analyzes text to identify key entities and their relationships.
For each relationship, explain the connection between entities in a clear and concise way.
Focus on the most important and meaningful relationships.
Keep entity names concise and relationship descriptions brief but clear.
Only include relationships that are explicitly stated or strongly implied in the text.";

/// User-tunable analysis settings
///
/// Field names serialize in camelCase so a saved settings object from the
/// browser extension loads unchanged. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisOptions {
    /// Sampling temperature
    pub temperature: f32,

    /// Top-k sampling cutoff
    pub top_k: u32,

    /// Entities named fewer times than this are hidden from the entity list
    pub minimum_entity_count: usize,

    /// Characters per chunk sent to the model
    pub chunk_size: usize,

    /// System prompt for the model session
    pub system_prompt: String,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            minimum_entity_count: 2,
            chunk_size: 3000,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl AnalysisOptions {
    /// Validate the options
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunkSize must be greater than 0".to_string());
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err("temperature must be a non-negative number".to_string());
        }
        if self.top_k == 0 {
            return Err("topK must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Set one option from its name and a string value
    ///
    /// Accepts camelCase and snake_case names. The options are left unchanged
    /// when the value does not parse or fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let mut updated = self.clone();
        let invalid = |e: &dyn std::fmt::Display| format!("Invalid value '{}' for {}: {}", value, key, e);

        match key {
            "temperature" => updated.temperature = value.parse::<f32>().map_err(|e| invalid(&e))?,
            "topK" | "top_k" => updated.top_k = value.parse::<u32>().map_err(|e| invalid(&e))?,
            "minimumEntityCount" | "minimum_entity_count" => {
                updated.minimum_entity_count = value.parse::<usize>().map_err(|e| invalid(&e))?
            }
            "chunkSize" | "chunk_size" => updated.chunk_size = value.parse::<usize>().map_err(|e| invalid(&e))?,
            "systemPrompt" | "system_prompt" => updated.system_prompt = value.to_string(),
            other => return Err(format!("Unknown option '{}'", other)),
        }

        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Load options from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize options to a TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

/// Retry policy for the chunk loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Attempts per chunk, including the first
    pub max_attempts: u32,

    /// Fixed delay between attempts
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// Same attempts, no delay
    pub fn immediate() -> Self {
        Self {
            delay_ms: 0,
            ..Self::default()
        }
    }

    /// Delay between attempts as a Duration
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}
