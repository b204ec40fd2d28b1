//! Delete command implementation.

use crate::cli::DeleteArgs;
use crate::error::Result;
use crate::output::Formatter;
use docagram_store::RelationshipStore;
use std::io::{self, Write};

/// Execute the delete command.
///
/// Returns whether the store changed. A listed entity with no remaining
/// relationships still counts as a change when it is removed.
pub fn execute_delete(args: DeleteArgs, store: &mut RelationshipStore, formatter: &Formatter) -> Result<bool> {
    let affected = store.get_entity_relationships(&args.entity).len();
    let listed = store.has_entity(&args.entity);
    if affected == 0 && !listed {
        println!("{}", formatter.warning(&format!("Unknown entity '{}'", args.entity)));
        return Ok(false);
    }

    if !args.yes {
        print!(
            "Delete '{}' and {} relationship(s)? [y/N] ",
            args.entity, affected
        );
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().read_line(&mut response)?;

        if !response.trim().eq_ignore_ascii_case("y") {
            println!("{}", formatter.info("Operation cancelled"));
            return Ok(false);
        }
    }

    let removed = store.delete_entity(&args.entity);
    println!(
        "{}",
        formatter.success(&format!("Deleted '{}' and {} relationship(s)", args.entity, removed))
    );
    Ok(listed || removed > 0)
}
