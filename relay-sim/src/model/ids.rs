//! Stable 8-hex identifiers and the typed id newtypes built on them.
//!
//! Every entity in a [`Document`](super::Document) is addressed by the
//! first 8 characters of a freshly generated UUID. Identifiers are unique
//! document-wide across *all* entity kinds, so a bare [`Id`] can be looked
//! up against any arena without ambiguity; the typed wrappers below exist
//! only to keep e.g. a `PinId` from being passed where a `TabId` is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An 8-character lowercase hexadecimal token, unique within its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id([u8; 8]);

impl Id {
    /// Generate a fresh id from a random UUID's first 8 hex characters.
    pub fn generate() -> Self {
        let uuid = uuid::Uuid::new_v4();
        let hex = format!("{:032x}", uuid.as_u128());
        Self::from_str_checked(&hex[..8]).expect("uuid hex prefix is always valid")
    }

    /// Parse an id, validating the `^[0-9a-f]{8}$` pattern from the file format.
    pub fn from_str_checked(s: &str) -> Option<Self> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()) {
            return None;
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(s.as_bytes());
        Some(Self(buf))
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).expect("id bytes are always ascii hex")
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.as_str())
    }
}

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Id);

        impl $name {
            pub fn generate() -> Self {
                Self(Id::generate())
            }

            pub fn raw(&self) -> Id {
                self.0
            }
        }

        impl From<Id> for $name {
            fn from(id: Id) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0.as_str())
            }
        }
    };
}

typed_id!(PageId);
typed_id!(ComponentId);
typed_id!(PinId);
typed_id!(TabId);
typed_id!(WireId);
typed_id!(JunctionId);
typed_id!(WaypointId);
typed_id!(SubCircuitId);
typed_id!(InstanceId);

/// Runtime-only identifiers: never persisted, freshly allocated per
/// simulation start (see SPEC_FULL.md §3 "Lifecycles").
typed_id!(NetId);
typed_id!(BridgeId);

/// Builds a document-wide uniqueness check: `Err` names the first
/// duplicate id encountered.
pub fn check_unique<I>(ids: impl IntoIterator<Item = I>) -> Result<(), Id>
where
    I: Into<Id>,
{
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        let id = id.into();
        if !seen.insert(id) {
            return Err(id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_well_formed() {
        let id = Id::generate();
        assert_eq!(id.as_str().len(), 8);
        assert!(id.as_str().bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!(Id::from_str_checked("deadbeef").is_some());
        assert!(Id::from_str_checked("DEADBEEF").is_none());
        assert!(Id::from_str_checked("deadbee").is_none());
        assert!(Id::from_str_checked("deadbeefz").is_none());
        assert!(Id::from_str_checked("zzzzzzzz").is_none());
    }

    #[test]
    fn uniqueness_check_flags_duplicates() {
        let a = ComponentId::generate();
        let b = ComponentId::generate();
        assert!(check_unique([a, b]).is_ok());
        assert_eq!(check_unique([a, a]).unwrap_err(), a.raw());
    }
}
