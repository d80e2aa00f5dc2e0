use crate::error::Result;
use crate::object::{Entity, ObjectId};

/// An object as the store reports it: its type name and pretty-printed lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub kind: String,
    pub lines: Vec<String>,
}

impl ObjectRecord {
    /// Parse this record into an entity for `hash`.
    pub fn into_entity(self, hash: &str, head_labels: &[String]) -> Result<Entity> {
        Entity::parse(&self.kind, hash, self.lines, head_labels)
    }
}

/// Trait for resolving hashes against an object store
pub trait ObjectAccessor {
    /// Look up an object by hash.
    /// Returns `Error::ObjectNotFound` if the store does not have it.
    fn resolve_object(&self, hash: &str) -> Result<ObjectRecord>;

    /// Hashes of commits reachable from the store's refs, used as extra
    /// traversal roots. Backends that cannot enumerate them return nothing.
    fn reachable_commits(&self) -> Result<Vec<ObjectId>>;
}
