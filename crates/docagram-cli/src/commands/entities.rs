//! Entity and relationship listing.

use crate::cli::EntitiesArgs;
use crate::error::Result;
use crate::output::Formatter;
use docagram_extractor::AnalysisOptions;
use docagram_store::RelationshipStore;

/// Execute the entities command.
///
/// Entities named fewer than `--min` times (or `minimumEntityCount`) are left out.
pub fn execute_entities(
    args: EntitiesArgs,
    store: &RelationshipStore,
    options: &AnalysisOptions,
    formatter: &Formatter,
) -> Result<()> {
    let minimum = args.min.unwrap_or(options.minimum_entity_count);
    let entities = store.entity_summaries(minimum);
    println!("{}", formatter.format_entities(&entities, store.selected_entity())?);
    Ok(())
}

/// Print the relationships in view: the selected entity's, or all of them.
pub fn execute_relationships(store: &RelationshipStore, formatter: &Formatter) -> Result<()> {
    if let Some(name) = store.selected_entity() {
        if !formatter.is_quiet() {
            println!("{}", formatter.info(&format!("Showing relationships of '{}'", name)));
        }
    }
    println!("{}", formatter.format_relationships(&store.visible_relationships())?);
    Ok(())
}
