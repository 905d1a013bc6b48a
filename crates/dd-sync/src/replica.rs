//! Remote preference replica seam.
//!
//! Transport (HTTP, auth) lives outside this crate; the engine only needs
//! account-scoped get/put of one document. Implementations decode leniently
//! on their side and surface transport problems as [`SyncError::Transport`].

use chrono::{DateTime, Utc};

use dd_prefs::PreferenceDoc;

use crate::{SyncError, SyncResult};

/// A remote read: the document plus the server-observed update time.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDoc {
    pub doc: PreferenceDoc,
    pub server_updated_at: DateTime<Utc>,
}

/// Server-held copy of the preference document.
pub trait RemoteReplica {
    /// Fetch the current remote document, if the account has one.
    fn fetch(&mut self) -> SyncResult<Option<RemoteDoc>>;

    /// Publish the document; returns the server-observed update time.
    fn publish(&mut self, doc: &PreferenceDoc) -> SyncResult<DateTime<Utc>>;
}

/// In-memory remote store: reference implementation and test double.
///
/// The fake server adopts the client's `updatedAt` stamp as its observed
/// time, which is what the production endpoint does as well.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRemote {
    doc: Option<PreferenceDoc>,
    publish_count: usize,
    fail_next_fetch: bool,
    fail_next_publish: bool,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(doc: PreferenceDoc) -> Self {
        Self {
            doc: Some(doc),
            ..Self::default()
        }
    }

    /// Overwrite the held document, simulating a foreign device's publish.
    pub fn put_foreign(&mut self, doc: PreferenceDoc) {
        self.doc = Some(doc);
    }

    pub fn document(&self) -> Option<&PreferenceDoc> {
        self.doc.as_ref()
    }

    pub fn publish_count(&self) -> usize {
        self.publish_count
    }

    pub fn fail_next_fetch(&mut self) {
        self.fail_next_fetch = true;
    }

    pub fn fail_next_publish(&mut self) {
        self.fail_next_publish = true;
    }
}

impl RemoteReplica for InMemoryRemote {
    fn fetch(&mut self) -> SyncResult<Option<RemoteDoc>> {
        if self.fail_next_fetch {
            self.fail_next_fetch = false;
            return Err(SyncError::Transport {
                what: "fetch unavailable".to_string(),
            });
        }
        Ok(self.doc.clone().map(|doc| {
            let server_updated_at = doc.updated_at;
            RemoteDoc {
                doc,
                server_updated_at,
            }
        }))
    }

    fn publish(&mut self, doc: &PreferenceDoc) -> SyncResult<DateTime<Utc>> {
        if self.fail_next_publish {
            self.fail_next_publish = false;
            return Err(SyncError::Transport {
                what: "publish unavailable".to_string(),
            });
        }
        self.doc = Some(doc.clone());
        self.publish_count += 1;
        Ok(doc.updated_at)
    }
}
