//! Section mode: analyze every chunk on its own, then merge
//!
//! Each chunk is summarized, the summary (or the chunk itself when no summary
//! is available) is analyzed into a scratch store, and the result is kept as a
//! [`Section`]. A failing section is recorded and the loop moves on.

use crate::analyzer::{usable_summary, Analyzer};
use crate::chunking::split_into_chunks;
use crate::error::AnalysisError;
use crate::prompt::PromptBuilder;
use crate::types::{AnalysisEvent, Section};
use docagram_domain::{Relationship, SessionExport};
use docagram_llm::LanguageModel;
use docagram_store::{EntitySummary, RelationshipStore};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

impl<M: LanguageModel> Analyzer<M> {
    /// Analyze each chunk of `text` separately, appending to `sections`
    ///
    /// Only cancellation and invalid options end the run early; model errors
    /// are stored on the section they happened in. Sections finished before
    /// a cancellation stay in `sections`.
    pub async fn analyze_sections(
        &self,
        sections: &mut Vec<Section>,
        text: &str,
        source_url: &str,
    ) -> Result<(), AnalysisError> {
        self.options().validate().map_err(AnalysisError::Config)?;

        let chunks = split_into_chunks(text, self.options().chunk_size);
        info!("Processing {} sections", chunks.len());
        sections.reserve(chunks.len());

        for (index, chunk) in chunks.iter().enumerate() {
            self.check_cancelled()?;
            self.emit(AnalysisEvent::ChunkStarted {
                index,
                total: chunks.len(),
            });

            let section = match self.process_section(index, chunks.len(), chunk, source_url).await {
                Ok(section) => section,
                Err(AnalysisError::Cancelled) => {
                    info!("Section run cancelled after {} sections", sections.len());
                    return Err(AnalysisError::Cancelled);
                }
                Err(e) => {
                    warn!("Error processing section {}: {}", index + 1, e);
                    Section {
                        index,
                        error: Some(e.to_string()),
                        ..Section::default()
                    }
                }
            };

            self.emit(AnalysisEvent::ChunkCompleted {
                index,
                added: section.relationships.len(),
            });
            sections.push(section);
            tokio::task::yield_now().await;
        }

        Ok(())
    }

    async fn process_section(
        &self,
        index: usize,
        total: usize,
        chunk: &str,
        source_url: &str,
    ) -> Result<Section, AnalysisError> {
        let summary = self.summarize_chunk(chunk).await?;
        let input = usable_summary(&summary).unwrap_or(chunk);

        let prompt = PromptBuilder::new(input, index, total).build();
        let outcome = self.run_chunk(index, &prompt).await?;

        let mut scratch = RelationshipStore::new();
        scratch.parse_relationships(&outcome.output, source_url);

        Ok(Section {
            index,
            summary: usable_summary(&summary).unwrap_or_default().to_string(),
            relationships: scratch.get_relationships().to_vec(),
            output: outcome.output,
            error: outcome.skipped.map(|e| e.to_string()),
        })
    }
}

/// All sections merged into one view
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedView {
    /// Deduplicated relationships in section order
    pub relationships: Vec<Relationship>,

    /// Entities with counts recomputed over `relationships`, most frequent first
    pub entities: Vec<EntitySummary>,
}

impl CombinedView {
    /// Session export of the combined view
    pub fn to_export(&self) -> SessionExport {
        SessionExport {
            relationships: self.relationships.clone(),
            entities: self
                .entities
                .iter()
                .filter_map(|e| e.source.clone().map(|source| (e.name.clone(), source)))
                .collect(),
            selected_entity: None,
        }
    }
}

/// Merge sections, dropping relationships repeated across sections
pub fn combine_sections(sections: &[Section]) -> CombinedView {
    let all: Vec<Relationship> = sections
        .iter()
        .flat_map(|section| section.relationships.iter().cloned())
        .collect();
    let relationships = RelationshipStore::get_unique_relationships(&all);

    let mut counts: HashMap<&str, (usize, &str)> = HashMap::new();
    for rel in &relationships {
        for entity in [&rel.entity1, &rel.entity2] {
            counts
                .entry(entity.as_str())
                .or_insert((0, rel.source_url.as_str()))
                .0 += 1;
        }
    }

    let mut entities: Vec<EntitySummary> = counts
        .into_iter()
        .map(|(name, (count, source))| EntitySummary {
            name: name.to_string(),
            count,
            source: Some(source.to_string()),
        })
        .collect();
    entities.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

    CombinedView {
        relationships,
        entities,
    }
}
