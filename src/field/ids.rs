//! Record identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier assigned to a record when it is created.
///
/// Freshly generated ids are random version-4 UUIDs in hyphenated form.
/// Ids read back from a dict are kept verbatim, whatever their format.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Draws a new random id.
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::random();
        let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
        Self(uuid.hyphenated().to_string())
    }

    /// Wraps an existing id.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_v4_uuids() {
        let id = RecordId::generate();
        let parsed = uuid::Uuid::parse_str(id.as_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(id.as_str().len(), 36);
    }

    #[test]
    fn test_generated_ids_differ() {
        use std::collections::HashSet;
        let ids: HashSet<_> = (0..100).map(|_| RecordId::generate()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = RecordId::new("ann-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ann-1\"");
        assert_eq!(format!("{id}"), "ann-1");
        assert_eq!(format!("{id:?}"), "RecordId(ann-1)");
    }
}
