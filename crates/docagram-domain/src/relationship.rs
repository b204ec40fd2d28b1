//! Relationship module - the unit of knowledge extracted from model output

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A relationship between two entities
///
/// Written by the model as `Entity1 to Entity2 (Description)`. The pair is
/// directed-looking but compares symmetrically: two relationships are equal
/// when their entity sets match in either order and their descriptions match
/// exactly. `source_url` is provenance only.
///
/// # Examples
///
/// ```
/// use docagram_domain::Relationship;
///
/// let forward = Relationship::new("Google", "Chrome", "develops", "http://a");
/// let reverse = Relationship::new("Chrome", "Google", "develops", "http://b");
/// assert_eq!(forward, reverse);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// First entity as written by the model
    #[serde(default)]
    pub entity1: String,

    /// Second entity as written by the model
    #[serde(default)]
    pub entity2: String,

    /// Contents of the parenthesized description
    #[serde(default)]
    pub description: String,

    /// URL of the page the relationship was extracted from
    #[serde(default)]
    pub source_url: String,
}

impl Relationship {
    /// Create a new relationship
    pub fn new(
        entity1: impl Into<String>,
        entity2: impl Into<String>,
        description: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            entity1: entity1.into(),
            entity2: entity2.into(),
            description: description.into(),
            source_url: source_url.into(),
        }
    }

    /// Whether `entity` appears on either side of this relationship
    pub fn involves(&self, entity: &str) -> bool {
        self.entity1 == entity || self.entity2 == entity
    }

    /// Direction-insensitive identity of this relationship
    pub fn key(&self) -> RelationshipKey {
        let (low, high) = if self.entity1 <= self.entity2 {
            (&self.entity1, &self.entity2)
        } else {
            (&self.entity2, &self.entity1)
        };

        RelationshipKey {
            low: low.clone(),
            high: high.clone(),
            description: self.description.clone(),
        }
    }
}

impl PartialEq for Relationship {
    fn eq(&self, other: &Self) -> bool {
        self.description == other.description
            && ((self.entity1 == other.entity1 && self.entity2 == other.entity2)
                || (self.entity1 == other.entity2 && self.entity2 == other.entity1))
    }
}

impl Eq for Relationship {}

impl Hash for Relationship {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Ordered entity pair plus description
///
/// Two relationships have the same key exactly when they are equal, so the key
/// can back a hash index without cloning whole relationships.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationshipKey {
    low: String,
    high: String,
    description: String,
}
