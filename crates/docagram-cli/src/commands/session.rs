//! Export, import and reset of the session.

use crate::cli::FileArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::session::{read_export, write_export};
use docagram_store::RelationshipStore;

/// Execute the export command.
pub fn execute_export(args: FileArgs, store: &RelationshipStore, formatter: &Formatter) -> Result<()> {
    write_export(store, &args.file)?;
    println!(
        "{}",
        formatter.success(&format!(
            "Exported {} relationship(s) to {}",
            store.len(),
            args.file.display()
        ))
    );
    Ok(())
}

/// Execute the import command.
pub fn execute_import(args: FileArgs, store: &mut RelationshipStore, formatter: &Formatter) -> Result<()> {
    read_export(store, &args.file)?;
    println!(
        "{}",
        formatter.success(&format!(
            "Imported {} relationship(s), {} entities",
            store.len(),
            store.get_entities_list().len()
        ))
    );
    Ok(())
}

/// Execute the reset command.
pub fn execute_reset(store: &mut RelationshipStore, formatter: &Formatter) -> Result<()> {
    store.reset();
    println!("{}", formatter.success("Session cleared"));
    Ok(())
}
