//! Docagram Relationship Store
//!
//! The aggregation engine for one analysis session. Model output is parsed
//! line by line into relationships, deduplicated direction-insensitively, and
//! indexed by entity so the accumulated graph can be queried while chunks are
//! still streaming in.
//!
//! # Architecture
//!
//! - An ordered `Vec` of relationships (insertion order is significant)
//! - A key index for constant-time duplicate rejection
//! - `entity_sources`: first source URL each entity was seen at
//! - `entity_counts`: how many relationship endpoints name each entity
//!
//! # Examples
//!
//! ```
//! use docagram_store::RelationshipStore;
//!
//! let mut store = RelationshipStore::new();
//! let added = store.parse_relationships(
//!     "Google to Chrome Browser (develops and maintains the browser)",
//!     "http://a",
//! );
//! assert_eq!(added.len(), 1);
//! assert_eq!(store.get_entity_count("Google"), 1);
//! ```

#![warn(missing_docs)]

pub mod parser;

use docagram_domain::{Relationship, RelationshipKey, SessionExport};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur reading or writing session text
#[derive(Error, Debug)]
pub enum StoreError {
    /// Session text is not valid JSON
    #[error("Invalid session JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One entry of the entity list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySummary {
    /// Entity name as written by the model
    pub name: String,

    /// Number of relationship endpoints naming this entity
    pub count: usize,

    /// First source URL the entity was seen at
    pub source: Option<String>,
}

/// In-memory relationship store for one session
///
/// All operations are synchronous and infallible on normal input. Mutation
/// takes `&mut self`, so one analysis run at a time owns the store.
#[derive(Debug, Clone, Default)]
pub struct RelationshipStore {
    relationships: Vec<Relationship>,
    keys: HashSet<RelationshipKey>,
    entity_sources: HashMap<String, String>,
    entity_counts: HashMap<String, usize>,
    selected_entity: Option<String>,
}

impl RelationshipStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse model output and add every new relationship it names
    ///
    /// Returns exactly the relationships that were appended, in order.
    /// Lines that do not match the grammar and duplicates (of stored
    /// relationships or of earlier lines in `text`) are dropped.
    pub fn parse_relationships(&mut self, text: &str, source_url: &str) -> Vec<Relationship> {
        let mut added = Vec::new();
        let mut candidates = 0usize;

        for line in parser::parse_lines(text) {
            candidates += 1;
            let rel = Relationship::new(line.entity1, line.entity2, line.description, source_url);
            if self.add(rel.clone()) {
                added.push(rel);
            }
        }

        debug!(
            "Parsed {} candidate relationships, {} new (store now holds {})",
            candidates,
            added.len(),
            self.relationships.len()
        );

        added
    }

    /// Add one relationship, returning `false` if an equal one is stored
    pub fn add(&mut self, relationship: Relationship) -> bool {
        if !self.keys.insert(relationship.key()) {
            return false;
        }

        for entity in [&relationship.entity1, &relationship.entity2] {
            *self.entity_counts.entry(entity.clone()).or_insert(0) += 1;
            self.entity_sources
                .entry(entity.clone())
                .or_insert_with(|| relationship.source_url.clone());
        }

        self.relationships.push(relationship);
        true
    }

    /// Deduplicate an arbitrary list, keeping the first of each equal group
    ///
    /// Independent of any stored state.
    pub fn get_unique_relationships(list: &[Relationship]) -> Vec<Relationship> {
        let mut seen = HashSet::with_capacity(list.len());
        list.iter()
            .filter(|rel| seen.insert(rel.key()))
            .cloned()
            .collect()
    }

    /// All stored relationships in insertion order
    pub fn get_relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Number of stored relationships
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    /// Whether the store holds no relationships
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    /// Entity names with a recorded source, lexicographically sorted
    ///
    /// After an import this is exactly the imported `entities` mapping, even
    /// where it disagrees with the imported relationships.
    pub fn get_entities_list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entity_sources.keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether `name` is in the entity list
    pub fn has_entity(&self, name: &str) -> bool {
        self.entity_sources.contains_key(name)
    }

    /// First source URL `name` was seen at
    pub fn get_entity_source(&self, name: &str) -> Option<&str> {
        self.entity_sources.get(name).map(String::as_str)
    }

    /// Endpoint count for `name`, 0 if unknown
    pub fn get_entity_count(&self, name: &str) -> usize {
        self.entity_counts.get(name).copied().unwrap_or(0)
    }

    /// Relationships naming `name` on either side, in stored order
    pub fn get_entity_relationships(&self, name: &str) -> Vec<Relationship> {
        self.relationships
            .iter()
            .filter(|rel| rel.involves(name))
            .cloned()
            .collect()
    }

    /// Focus on `name` and return its relationships
    pub fn select_entity(&mut self, name: &str) -> Vec<Relationship> {
        self.selected_entity = Some(name.to_string());
        self.get_entity_relationships(name)
    }

    /// Currently selected entity
    pub fn selected_entity(&self) -> Option<&str> {
        self.selected_entity.as_deref()
    }

    /// Drop the selection and go back to the full view
    pub fn clear_selection(&mut self) {
        self.selected_entity = None;
    }

    /// Relationships of the selected entity, or everything when none is selected
    pub fn visible_relationships(&self) -> Vec<Relationship> {
        match &self.selected_entity {
            Some(name) => self.get_entity_relationships(name),
            None => self.relationships.clone(),
        }
    }

    /// Remove `name` and every relationship touching it
    ///
    /// Only `name` leaves the indices. Counts and sources of the entities on
    /// the other side of removed relationships are left as they were, so a
    /// neighbour can stay listed with no remaining relationship.
    ///
    /// Returns the number of relationships removed.
    pub fn delete_entity(&mut self, name: &str) -> usize {
        let before = self.relationships.len();
        let keys = &mut self.keys;

        self.relationships.retain(|rel| {
            if rel.involves(name) {
                keys.remove(&rel.key());
                false
            } else {
                true
            }
        });

        self.entity_sources.remove(name);
        self.entity_counts.remove(name);
        if self.selected_entity.as_deref() == Some(name) {
            self.selected_entity = None;
        }

        let removed = before - self.relationships.len();
        debug!("Deleted entity '{}' and {} relationships", name, removed);
        removed
    }

    /// Clear every relationship, index and the selection
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Entities with at least `minimum_count` endpoints, most frequent first
    ///
    /// Ties are broken by name.
    pub fn entity_summaries(&self, minimum_count: usize) -> Vec<EntitySummary> {
        let mut summaries: Vec<EntitySummary> = self
            .get_entities_list()
            .into_iter()
            .map(|name| EntitySummary {
                count: self.get_entity_count(&name),
                source: self.get_entity_source(&name).map(str::to_string),
                name,
            })
            .filter(|summary| summary.count >= minimum_count)
            .collect();

        summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        summaries
    }

    /// Snapshot of the session in its export shape
    pub fn export_to_json(&self) -> SessionExport {
        SessionExport {
            relationships: self.relationships.clone(),
            entities: self
                .entity_sources
                .iter()
                .map(|(name, url)| (name.clone(), url.clone()))
                .collect::<BTreeMap<_, _>>(),
            selected_entity: self.selected_entity.clone(),
        }
    }

    /// Replace all state with an exported session
    ///
    /// Entity sources are taken as given. Counts are rebuilt from the
    /// imported relationships. An empty selected entity means no selection.
    pub fn import_from_json(&mut self, data: SessionExport) {
        let mut entity_counts: HashMap<String, usize> = HashMap::new();
        for rel in &data.relationships {
            *entity_counts.entry(rel.entity1.clone()).or_insert(0) += 1;
            *entity_counts.entry(rel.entity2.clone()).or_insert(0) += 1;
        }

        self.keys = data.relationships.iter().map(Relationship::key).collect();
        self.relationships = data.relationships;
        self.entity_sources = data.entities.into_iter().collect();
        self.entity_counts = entity_counts;
        self.selected_entity = data.selected_entity.filter(|name| !name.is_empty());

        debug!("Imported session with {} relationships", self.relationships.len());
    }

    /// Serialize the session to pretty JSON text
    pub fn export_json_string(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.export_to_json())?)
    }

    /// Replace all state from session JSON text
    ///
    /// Missing or `null` fields fall back to empty values. Only text that is
    /// not JSON at all, or has the wrong types, is an error; state is left
    /// untouched in that case.
    pub fn import_json_str(&mut self, json: &str) -> Result<(), StoreError> {
        let data: SessionExport = serde_json::from_str(json)?;
        self.import_from_json(data);
        Ok(())
    }
}
