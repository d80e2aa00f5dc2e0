use std::collections::HashMap;

use super::ObjectId;

/// A hash an object mentions, optionally under a name.
///
/// Trees name their entries; commit parents, commit trees and tag targets are
/// anonymous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub target: ObjectId,
    pub name: Option<String>,
}

impl Reference {
    pub fn anonymous(target: impl Into<ObjectId>) -> Self {
        Self {
            target: target.into(),
            name: None,
        }
    }

    pub fn named(target: impl Into<ObjectId>, name: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            name: Some(name.into()),
        }
    }
}

/// Referenced hash -> every reference made to it, in the order noticed.
///
/// The same blob can appear twice in one tree under different names (a copy
/// without content change), so a target keeps a list rather than a single
/// reference. Targets iterate in first-noticed order.
#[derive(Debug, Clone, Default)]
pub struct ReferenceMap {
    targets: Vec<ObjectId>,
    by_target: HashMap<ObjectId, Vec<Reference>>,
}

impl ReferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reference. Never replaces an earlier one.
    pub fn notice(&mut self, reference: Reference) {
        match self.by_target.get_mut(&reference.target) {
            Some(existing) => existing.push(reference),
            None => {
                self.targets.push(reference.target.clone());
                self.by_target
                    .insert(reference.target.clone(), vec![reference]);
            }
        }
    }

    /// All references to `target`, or an empty slice.
    pub fn get(&self, target: &str) -> &[Reference] {
        self.by_target
            .get(target)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Distinct referenced hashes in first-noticed order.
    pub fn targets(&self) -> impl Iterator<Item = &ObjectId> {
        self.targets.iter()
    }

    /// Number of distinct referenced hashes.
    pub fn len(&self) -> usize {
        self.targets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_target_keeps_every_name() {
        let mut refs = ReferenceMap::new();
        refs.notice(Reference::named("aaaa", "a"));
        refs.notice(Reference::anonymous("bbbb"));
        refs.notice(Reference::named("aaaa", "b"));

        assert_eq!(refs.len(), 2);
        let names: Vec<_> = refs
            .get("aaaa")
            .iter()
            .map(|r| r.name.as_deref())
            .collect();
        assert_eq!(names, vec![Some("a"), Some("b")]);

        let targets: Vec<_> = refs.targets().cloned().collect();
        assert_eq!(targets, vec!["aaaa".to_string(), "bbbb".to_string()]);
    }

    #[test]
    fn test_missing_target() {
        let refs = ReferenceMap::new();
        assert!(refs.get("cccc").is_empty());
        assert_eq!(refs.len(), 0);
    }
}
