//! Diagram command implementation.

use crate::cli::DiagramArgs;
use crate::error::Result;
use crate::output::Formatter;
use docagram_domain::{DiagramGraph, Direction};
use docagram_store::RelationshipStore;

/// Execute the diagram command.
pub fn execute_diagram(args: DiagramArgs, store: &RelationshipStore, formatter: &Formatter) -> Result<()> {
    match render_diagram(store, args.entity.as_deref(), args.direction) {
        Some(mermaid) => print!("{}", mermaid),
        None => println!("{}", formatter.info("No relationships to diagram")),
    }
    Ok(())
}

/// Mermaid text for `entity`'s relationships, or the visible view when
/// `entity` is `None`. Returns `None` when there is nothing to draw.
pub fn render_diagram(store: &RelationshipStore, entity: Option<&str>, direction: Direction) -> Option<String> {
    let relationships = match entity {
        Some(name) => store.get_entity_relationships(name),
        None => store.visible_relationships(),
    };

    let graph = DiagramGraph::project(&relationships);
    if graph.is_empty() {
        return None;
    }
    Some(graph.to_mermaid(direction))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RelationshipStore {
        let mut store = RelationshipStore::new();
        store.parse_relationships(
            "Google to Chrome (develops)\nGoogle to Android (owns)\nLinux to Android (powers)",
            "http://g",
        );
        store
    }

    #[test]
    fn test_full_view() {
        let mermaid = render_diagram(&store(), None, Direction::LeftRight).unwrap();
        assert!(mermaid.starts_with("graph LR\n"));
        assert_eq!(mermaid.matches("-->").count(), 3);
    }

    #[test]
    fn test_selection_narrows_view() {
        let mut store = store();
        store.select_entity("Linux");

        let mermaid = render_diagram(&store, None, Direction::TopDown).unwrap();
        assert!(mermaid.starts_with("graph TD\n"));
        assert_eq!(mermaid.matches("-->").count(), 1);
    }

    #[test]
    fn test_explicit_entity_overrides_selection() {
        let mut store = store();
        store.select_entity("Linux");

        let mermaid = render_diagram(&store, Some("Google"), Direction::LeftRight).unwrap();
        assert_eq!(mermaid.matches("-->").count(), 2);
    }

    #[test]
    fn test_nothing_to_draw() {
        assert!(render_diagram(&RelationshipStore::new(), None, Direction::LeftRight).is_none());
        assert!(render_diagram(&store(), Some("Nobody"), Direction::LeftRight).is_none());
    }
}
