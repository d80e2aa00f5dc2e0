//! Reference resolution: link a complete set of entities into a DAG
//!
//! Entities only know the hashes they mention. Once every entity exists,
//! [`Graph::build`] resolves those hashes into edges and records, for each
//! entity, who refers to it and under which names.
//!
//! # Ordering
//!
//! Edges follow entity order: all edges of the first referrer come first,
//! and within a referrer edges are ordered by the position of the
//! referenced entity. This is the order a pairwise scan over the entity list
//! would produce.

use std::collections::{BTreeSet, HashMap};

use crate::object::Entity;

/// Label of an edge whose references carry no name.
pub const ANONYMOUS: &str = "anonymous";

/// A directed edge between two entities, by position in [`Graph::entities`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    names: Vec<String>,
}

impl Edge {
    pub fn is_anonymous(&self) -> bool {
        self.names.is_empty()
    }

    /// Names joined with `-`, or [`ANONYMOUS`].
    pub fn label(&self) -> String {
        if self.is_anonymous() {
            ANONYMOUS.to_string()
        } else {
            self.names.join("-")
        }
    }
}

/// Entities plus resolved edges and the from/to indexes over them.
#[derive(Debug, Default)]
pub struct Graph {
    entities: Vec<Entity>,
    edges: Vec<Edge>,
    edges_from: HashMap<usize, Vec<usize>>,
    edges_to: HashMap<usize, Vec<usize>>,
    referenced_by_names: Vec<BTreeSet<String>>,
    positions: HashMap<String, usize>,
}

impl Graph {
    /// Resolve every reference between `entities`.
    ///
    /// Entities are expected to be unique by hash; the first entity with a
    /// given hash is the one references resolve to. References to hashes not
    /// in the set produce no edge.
    pub fn build(entities: Vec<Entity>) -> Self {
        let mut positions = HashMap::with_capacity(entities.len());
        for (i, entity) in entities.iter().enumerate() {
            positions.entry(entity.hash().to_string()).or_insert(i);
        }

        let mut graph = Graph {
            referenced_by_names: vec![BTreeSet::new(); entities.len()],
            positions,
            ..Graph::default()
        };

        for (from, referrer) in entities.iter().enumerate() {
            let mut targets: Vec<usize> = referrer
                .references()
                .targets()
                .filter_map(|hash| graph.positions.get(hash.as_str()).copied())
                .collect();
            targets.sort_unstable();

            for to in targets {
                let mut names: Vec<String> = Vec::new();
                for reference in referrer.references().get(entities[to].hash()) {
                    if let Some(name) = &reference.name {
                        graph.referenced_by_names[to].insert(name.clone());
                        if !names.contains(name) {
                            names.push(name.clone());
                        }
                    }
                }
                graph.push_edge(Edge { from, to, names });
            }
        }

        tracing::info!(
            "resolved {} edge(s) between {} object(s)",
            graph.edges.len(),
            entities.len()
        );
        graph.entities = entities;
        graph
    }

    fn push_edge(&mut self, edge: Edge) {
        let idx = self.edges.len();
        self.edges_from.entry(edge.from).or_default().push(idx);
        self.edges_to.entry(edge.to).or_default().push(idx);
        self.edges.push(edge);
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, idx: usize) -> &Entity {
        &self.entities[idx]
    }

    /// Position of the entity with `hash`.
    #[cfg(test)]
    pub fn position(&self, hash: &str) -> Option<usize> {
        self.positions.get(hash).copied()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges leaving the entity at `idx`.
    pub fn edges_from(&self, idx: usize) -> impl Iterator<Item = &Edge> {
        self.edges_from
            .get(&idx)
            .into_iter()
            .flatten()
            .map(|&e| &self.edges[e])
    }

    /// Edges arriving at the entity at `idx`.
    pub fn edges_to(&self, idx: usize) -> impl Iterator<Item = &Edge> {
        self.edges_to
            .get(&idx)
            .into_iter()
            .flatten()
            .map(|&e| &self.edges[e])
    }

    /// Entities the entity at `idx` refers to.
    pub fn referenced(&self, idx: usize) -> impl Iterator<Item = &Entity> {
        self.edges_from(idx).map(|edge| &self.entities[edge.to])
    }

    /// Entities that refer to the entity at `idx`.
    pub fn referrers(&self, idx: usize) -> impl Iterator<Item = &Entity> {
        self.edges_to(idx).map(|edge| &self.entities[edge.from])
    }

    /// Every name under which other entities refer to the entity at `idx`.
    pub fn names_referenced_by(&self, idx: usize) -> &BTreeSet<String> {
        &self.referenced_by_names[idx]
    }
}
