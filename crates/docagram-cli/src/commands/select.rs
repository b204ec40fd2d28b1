//! Select command implementation.

use crate::cli::SelectArgs;
use crate::error::Result;
use crate::output::Formatter;
use docagram_store::RelationshipStore;

/// Name that clears the selection.
pub const ALL_ENTITIES: &str = "all";

/// Execute the select command.
///
/// Returns whether the store changed.
pub fn execute_select(args: SelectArgs, store: &mut RelationshipStore, formatter: &Formatter) -> Result<bool> {
    if args.entity.eq_ignore_ascii_case(ALL_ENTITIES) {
        store.clear_selection();
        println!("{}", formatter.info("Showing all relationships"));
        println!("{}", formatter.format_relationships(store.get_relationships())?);
        return Ok(true);
    }

    if !store.has_entity(&args.entity) && store.get_entity_relationships(&args.entity).is_empty() {
        println!("{}", formatter.warning(&format!("Unknown entity '{}'", args.entity)));
        return Ok(false);
    }

    let relationships = store.select_entity(&args.entity);
    println!("{}", formatter.format_relationships(&relationships)?);
    Ok(true)
}
