//! Durable device-local preference cache.

use std::fs;
use std::path::{Path, PathBuf};

use crate::schema::PreferenceDoc;
use crate::{PrefsResult, decode_document, encode_document};

/// Device-local durable replica of the preference document. The engine
/// writes through it on every local edit, so it survives restarts and is
/// the fallback when the remote store is unreachable.
pub trait LocalReplica {
    fn load(&self) -> PrefsResult<Option<PreferenceDoc>>;
    fn store(&mut self, doc: &PreferenceDoc) -> PrefsResult<()>;
}

/// File-backed local replica, one JSON document per account.
#[derive(Debug, Clone)]
pub struct FileReplica {
    path: PathBuf,
}

impl FileReplica {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Conventional location inside an app data directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocalReplica for FileReplica {
    fn load(&self) -> PrefsResult<Option<PreferenceDoc>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let doc = decode_document(&content)?;
        Ok(Some(doc))
    }

    fn store(&mut self, doc: &PreferenceDoc) -> PrefsResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, encode_document(doc)?)?;
        Ok(())
    }
}

/// In-memory replica for tests and ephemeral embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryReplica {
    doc: Option<PreferenceDoc>,
    store_count: usize,
}

impl MemoryReplica {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(doc: PreferenceDoc) -> Self {
        Self {
            doc: Some(doc),
            store_count: 0,
        }
    }

    /// How many times `store` ran; tests assert on write-through behavior.
    pub fn store_count(&self) -> usize {
        self.store_count
    }
}

impl LocalReplica for MemoryReplica {
    fn load(&self) -> PrefsResult<Option<PreferenceDoc>> {
        Ok(self.doc.clone())
    }

    fn store(&mut self, doc: &PreferenceDoc) -> PrefsResult<()> {
        self.doc = Some(doc.clone());
        self.store_count += 1;
        Ok(())
    }
}
