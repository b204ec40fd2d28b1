//! Session files: a relationship store persisted as export JSON.

use crate::error::Result;
use docagram_store::RelationshipStore;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A store bound to the file it was loaded from.
#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    /// Relationships and entity indices of this session
    pub store: RelationshipStore,
}

impl Session {
    /// Load the session at `path`. A missing file starts an empty session.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut store = RelationshipStore::new();

        if path.exists() {
            let json = fs::read_to_string(&path)?;
            store.import_json_str(&json)?;
            debug!("Loaded {} relationships from {}", store.len(), path.display());
        }

        Ok(Self { path, store })
    }

    /// Write the session back to its file.
    pub fn save(&self) -> Result<()> {
        write_export(&self.store, &self.path)
    }

    /// File this session is stored in.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write the export JSON of `store` to `path`, creating parent directories.
pub fn write_export(store: &RelationshipStore, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, store.export_json_string()?)?;
    debug!("Wrote {} relationships to {}", store.len(), path.display());
    Ok(())
}

/// Replace the contents of `store` with the export JSON at `path`.
pub fn read_export(store: &mut RelationshipStore, path: &Path) -> Result<()> {
    let json = fs::read_to_string(path)?;
    store.import_json_str(&json)?;
    Ok(())
}
