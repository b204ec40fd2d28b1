//! Docagram Domain Layer
//!
//! This crate contains the core value types shared by every other Docagram crate.
//! It depends only on `serde`, because the session export format is part of the
//! domain rather than of any one storage or transport layer.
//!
//! ## Key Concepts
//!
//! - **Relationship**: two entities joined by a description, plus the URL it came from
//! - **Entity**: an exact, trimmed name appearing on either side of a relationship
//! - **Session export**: the JSON shape used to save and restore one analysis session
//! - **Diagram**: a renderer-ready projection of relationships into nodes and edges
//!
//! ## Equality
//!
//! Relationships compare direction-insensitively: `A to B (d)` and `B to A (d)`
//! are the same relationship. The source URL never takes part in equality.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diagram;
pub mod relationship;
pub mod session;

// Re-exports for convenience
pub use diagram::{DiagramEdge, DiagramGraph, DiagramNode, Direction};
pub use relationship::{Relationship, RelationshipKey};
pub use session::SessionExport;
