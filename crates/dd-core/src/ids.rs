//! Identifiers shared across the engine.
//!
//! All three ids travel through the persisted preference document, so they
//! are string-backed rather than compact integers. Equality is exact string
//! equality; no normalization is applied.

use core::fmt;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(transparent)
        )]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id! {
    /// Identifies one uploaded sensor dataset.
    DatasetId
}

string_id! {
    /// Identifies one user-drawn boundary within a dataset.
    BoundaryId
}

string_id! {
    /// Opaque per-installation identifier. Distinguishes this device's
    /// published snapshots from foreign ones during reconciliation.
    DeviceId
}

impl BoundaryId {
    /// Fresh random id for a newly drawn boundary.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl DeviceId {
    /// Fresh random id, generated once per installation and then persisted.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}
