//! Content-based hashing of preference documents.
//!
//! The envelope (device id, update time) is excluded so two devices holding
//! identical content hash alike. Used to suppress no-op publishes and to
//! compare local/remote payloads cheaply.

use sha2::{Digest, Sha256};

use crate::schema::PreferenceDoc;

pub fn content_hash(doc: &PreferenceDoc) -> String {
    let mut stripped = doc.clone();
    stripped.device_id = Default::default();
    stripped.updated_at = crate::schema::epoch();

    let mut hasher = Sha256::new();
    let json = serde_json::to_string(&stripped).unwrap_or_default();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dd_core::DeviceId;

    #[test]
    fn hash_stability() {
        let doc = PreferenceDoc::default();
        assert_eq!(content_hash(&doc), content_hash(&doc.clone()));
    }

    #[test]
    fn envelope_does_not_affect_hash() {
        let doc = PreferenceDoc::default();
        let mut restamped = doc.clone();
        restamped.device_id = DeviceId::new("other-device");
        restamped.updated_at = Utc::now();
        assert_eq!(content_hash(&doc), content_hash(&restamped));
    }

    #[test]
    fn content_change_changes_hash() {
        let doc = PreferenceDoc::default();
        let mut edited = doc.clone();
        edited.playback_speed = 8.0;
        assert_ne!(content_hash(&doc), content_hash(&edited));
    }
}
