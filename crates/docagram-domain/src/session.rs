//! Session export format
//!
//! The JSON shape used to save and restore one analysis session:
//!
//! ```json
//! {
//!   "relationships": [{"entity1": "A", "entity2": "B", "description": "d", "sourceUrl": "u"}],
//!   "entities": {"A": "u", "B": "u"},
//!   "selectedEntity": null
//! }
//! ```
//!
//! Every field is optional on input. A missing or `null` field falls back to
//! its empty value instead of failing the import.

use crate::Relationship;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Serializable snapshot of a relationship session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    /// Relationships in insertion order
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationships: Vec<Relationship>,

    /// Entity name to the first source URL it was seen at
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: BTreeMap<String, String>,

    /// Entity the view was focused on, if any
    #[serde(default)]
    pub selected_entity: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
