//! Hash-keyed collection of every object the run discovers

use std::collections::HashMap;

use crate::error::Result;
use crate::object::{Entity, ObjectId};
use crate::store::ObjectAccessor;

/// Exactly one entity per hash, in discovery order.
///
/// Built once per run by the two collection strategies and then handed to
/// [`crate::graph::Graph::build`].
#[derive(Debug, Default)]
pub struct Repository {
    entities: Vec<Entity>,
    index: HashMap<ObjectId, usize>,
    head_labels: HashMap<ObjectId, Vec<String>>,
}

impl Repository {
    /// Create a repository that attaches the given branch/HEAD labels to
    /// commits as they are parsed.
    pub fn with_head_labels(head_labels: impl IntoIterator<Item = (ObjectId, Vec<String>)>) -> Self {
        Self {
            head_labels: head_labels.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.index.contains_key(hash)
    }

    pub fn get(&self, hash: &str) -> Option<&Entity> {
        self.index.get(hash).map(|&i| &self.entities[i])
    }

    pub fn into_entities(self) -> Vec<Entity> {
        self.entities
    }

    pub fn labels_for(&self, hash: &str) -> &[String] {
        self.head_labels
            .get(hash)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Add an entity unless its hash is already present. First seen wins.
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.contains(entity.hash()) {
            return false;
        }
        self.index
            .insert(entity.hash().to_string(), self.entities.len());
        self.entities.push(entity);
        true
    }

    /// Resolve and parse `hash` if it is not known yet.
    fn construct(&mut self, accessor: &impl ObjectAccessor, hash: &str) -> Result<bool> {
        if self.contains(hash) {
            return Ok(false);
        }
        let record = accessor.resolve_object(hash)?;
        let entity = record.into_entity(hash, self.labels_for(hash))?;
        tracing::debug!("collected {} {}", crate::object::kind_name(entity.kind()), hash);
        Ok(self.insert(entity))
    }

    /// Depth-first descent from `hash` through every referenced hash.
    ///
    /// Stops at hashes already collected, so shared history is resolved once.
    pub fn descend(&mut self, accessor: &impl ObjectAccessor, hash: &str) -> Result<()> {
        let mut stack = vec![hash.to_string()];
        while let Some(hash) = stack.pop() {
            if !self.construct(accessor, &hash)? {
                continue;
            }
            if let Some(entity) = self.get(&hash) {
                let mut targets: Vec<ObjectId> = entity
                    .references()
                    .targets()
                    .filter(|target| !self.contains(target))
                    .cloned()
                    .collect();
                targets.reverse();
                stack.extend(targets);
            }
        }
        Ok(())
    }

    /// Collect everything reachable from tags, branch/HEAD commits and the
    /// store's reachable commit list, in that order.
    pub fn collect_from_anchors(
        &mut self,
        accessor: &impl ObjectAccessor,
        tags: &[ObjectId],
        heads: &[ObjectId],
    ) -> Result<()> {
        let before = self.len();
        for hash in tags.iter().chain(heads) {
            self.descend(accessor, hash)?;
        }
        for hash in accessor.reachable_commits()? {
            self.descend(accessor, &hash)?;
        }
        tracing::info!(
            "collected {} object(s) reachable from {} tag(s) and {} head(s)",
            self.len() - before,
            tags.len(),
            heads.len()
        );
        Ok(())
    }

    /// Collect every enumerated loose object not already present.
    pub fn collect_from_loose_objects(
        &mut self,
        accessor: &impl ObjectAccessor,
        hashes: &[ObjectId],
    ) -> Result<()> {
        let mut added = 0;
        for hash in hashes {
            if self.construct(accessor, hash)? {
                added += 1;
            }
        }
        tracing::info!(
            "collected {} unreachable or unvisited loose object(s) of {}",
            added,
            hashes.len()
        );
        Ok(())
    }
}
