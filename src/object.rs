//! Git object parsing
//!
//! Turns the pretty-printed text of an object (as `git cat-file -p` shows it)
//! into an [`Entity`] that knows which other hashes it refers to.

mod reference;

pub use gix_object::Kind;
pub use reference::{Reference, ReferenceMap};

use crate::error::{Error, Result};

/// Git object SHA-1 identifier (40 hex characters)
pub type ObjectId = String;

/// Length of the short display id.
pub const SHORT_ID_LEN: usize = 6;

/// Map an object type name onto its kind.
pub fn parse_kind(kind: &str, hash: &str) -> Result<Kind> {
    match kind {
        "commit" => Ok(Kind::Commit),
        "tree" => Ok(Kind::Tree),
        "blob" => Ok(Kind::Blob),
        "tag" => Ok(Kind::Tag),
        other => Err(Error::UnknownObjectKind {
            kind: other.to_string(),
            hash: hash.to_string(),
        }),
    }
}

pub fn kind_name(kind: Kind) -> &'static str {
    match kind {
        Kind::Commit => "commit",
        Kind::Tree => "tree",
        Kind::Blob => "blob",
        Kind::Tag => "tag",
    }
}

/// Per-kind data extracted while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// An annotated tag; `label` is the tag's own name.
    Tag { label: Option<String> },
    /// A commit; `labels` are the branch/HEAD names pointing at it.
    Commit { labels: Vec<String> },
    Tree,
    Blob,
}

/// A parsed object from the object database.
///
/// Immutable once built. Who refers to an entity is only known after the
/// whole collection exists, so that lives in [`crate::graph::Graph`].
#[derive(Debug, Clone)]
pub struct Entity {
    hash: ObjectId,
    lines: Vec<String>,
    references: ReferenceMap,
    body: Body,
}

impl Entity {
    /// Build an entity from its type name, hash and pretty-printed lines.
    ///
    /// `head_labels` are attached when the object is a commit and ignored
    /// otherwise.
    pub fn parse(
        kind: &str,
        hash: impl Into<ObjectId>,
        lines: Vec<String>,
        head_labels: &[String],
    ) -> Result<Self> {
        let hash = hash.into();
        let kind = parse_kind(kind, &hash)?;
        Ok(Self::from_kind(kind, hash, lines, head_labels))
    }

    pub fn from_kind(
        kind: Kind,
        hash: ObjectId,
        lines: Vec<String>,
        head_labels: &[String],
    ) -> Self {
        let mut references = ReferenceMap::new();
        let body = match kind {
            Kind::Tag => parse_tag(&lines, &mut references),
            Kind::Commit => {
                parse_commit(&lines, &mut references);
                Body::Commit {
                    labels: head_labels.to_vec(),
                }
            }
            Kind::Tree => {
                parse_tree(&lines, &mut references);
                Body::Tree
            }
            Kind::Blob => Body::Blob,
        };

        tracing::trace!(
            "parsed {} {} with {} reference(s)",
            kind_name(kind),
            hash,
            references.len()
        );

        Self {
            hash,
            lines,
            references,
            body,
        }
    }

    pub fn kind(&self) -> Kind {
        match self.body {
            Body::Tag { .. } => Kind::Tag,
            Body::Commit { .. } => Kind::Commit,
            Body::Tree => Kind::Tree,
            Body::Blob => Kind::Blob,
        }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Short display id: the first six characters of the hash.
    ///
    /// Not guaranteed unique across a store.
    pub fn id(&self) -> &str {
        self.hash.get(..SHORT_ID_LEN).unwrap_or(&self.hash)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn references(&self) -> &ReferenceMap {
        &self.references
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Branch/HEAD names for a commit; empty for everything else.
    pub fn labels(&self) -> &[String] {
        match &self.body {
            Body::Commit { labels } => labels,
            _ => &[],
        }
    }

    /// The tag's own name, if this is a tag that declares one.
    pub fn tag_label(&self) -> Option<&str> {
        match &self.body {
            Body::Tag { label } => label.as_deref(),
            _ => None,
        }
    }

    /// Raw file content for a blob.
    pub fn content(&self) -> Option<&[String]> {
        match self.body {
            Body::Blob => Some(&self.lines),
            _ => None,
        }
    }
}

/// Header fields of a commit or tag: lines before the first blank line,
/// minus the indented continuation lines of multi-line fields such as
/// `gpgsig` and `mergetag`.
fn header(lines: &[String]) -> impl Iterator<Item = &String> {
    lines
        .iter()
        .take_while(|line| !line.is_empty())
        .filter(|line| !line.starts_with([' ', '\t']))
}

fn part(line: &str, idx: usize) -> Option<&str> {
    line.split_whitespace().nth(idx)
}

fn parse_tag(lines: &[String], references: &mut ReferenceMap) -> Body {
    let mut label = None;
    for line in header(lines) {
        match part(line, 0) {
            Some("tag") => label = part(line, 1).map(str::to_string),
            Some("object") => {
                if let Some(target) = part(line, 1) {
                    references.notice(Reference::anonymous(target));
                }
            }
            _ => {}
        }
    }
    Body::Tag { label }
}

fn parse_commit(lines: &[String], references: &mut ReferenceMap) {
    for line in header(lines) {
        if let Some("parent" | "tree") = part(line, 0) {
            if let Some(target) = part(line, 1) {
                references.notice(Reference::anonymous(target));
            }
        }
    }
}

/// Tree lines look like `<mode> <kind> <hash>\t<name>`.
fn parse_tree(lines: &[String], references: &mut ReferenceMap) {
    for line in lines {
        let mut parts = line.split_whitespace();
        let (_mode, kind, target) = (parts.next(), parts.next(), parts.next());
        let (Some("blob" | "tree"), Some(target)) = (kind, target) else {
            continue;
        };
        let reference = match parts.next() {
            Some(name) => Reference::named(target, name),
            None => Reference::anonymous(target),
        };
        references.notice(reference);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";
    const PARENT_A: &str = "1111111111111111111111111111111111111111";
    const PARENT_B: &str = "2222222222222222222222222222222222222222";
    const BLOB: &str = "9daeafb9864cf43055ae93beb0afd6c7d144bfa4";

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_id_is_hash_prefix() {
        let entity = Entity::parse("blob", BLOB, lines("test"), &[]).unwrap();
        assert_eq!(entity.id(), "9daeaf");
        assert_eq!(entity.id(), entity.id());
    }

    #[test]
    fn test_tag() {
        let text = format!(
            "object {PARENT_A}\ntype commit\ntag v1.0\ntagger A <a@b.c> 0 +0000\n\nobject in message"
        );
        let entity = Entity::parse("tag", "abcdef0123", lines(&text), &[]).unwrap();

        assert_eq!(entity.kind(), Kind::Tag);
        assert_eq!(entity.tag_label(), Some("v1.0"));
        let targets: Vec<_> = entity.references().targets().cloned().collect();
        assert_eq!(targets, vec![PARENT_A.to_string()]);
        assert_eq!(entity.references().get(PARENT_A)[0].name, None);
    }

    #[test]
    fn test_merge_commit_with_labels() {
        let text = format!(
            "tree {TREE}\nparent {PARENT_A}\nparent {PARENT_B}\nauthor A <a@b.c> 0 +0000\n\nmerge\n\ntree not-a-hash"
        );
        let labels = vec!["main".to_string(), "HEAD".to_string()];
        let entity = Entity::parse("commit", "c0ffee0000", lines(&text), &labels).unwrap();

        assert_eq!(entity.kind(), Kind::Commit);
        assert_eq!(entity.labels(), labels.as_slice());
        let targets: Vec<_> = entity.references().targets().cloned().collect();
        assert_eq!(targets, vec![TREE, PARENT_A, PARENT_B]);
    }

    #[test]
    fn test_continuation_lines_are_not_fields() {
        let text = format!(
            "tree {TREE}\nparent {PARENT_A}\nmergetag object {PARENT_B}\n type commit\n tag v2\n \n parent company sign-off\n tree of life\ngpgsig -----BEGIN PGP SIGNATURE-----\n parent x\n -----END PGP SIGNATURE-----\n\nmerge v2"
        );
        let entity = Entity::parse("commit", "c0ffee0000", lines(&text), &[]).unwrap();
        let targets: Vec<_> = entity.references().targets().cloned().collect();
        assert_eq!(targets, vec![TREE, PARENT_A]);
    }

    #[test]
    fn test_root_commit_has_only_tree() {
        let text = format!("tree {TREE}\nauthor A <a@b.c> 0 +0000\n\ninitial");
        let entity = Entity::parse("commit", "c0ffee0000", lines(&text), &[]).unwrap();
        assert_eq!(entity.references().len(), 1);
        assert!(entity.labels().is_empty());
    }

    #[test]
    fn test_tree_entries_are_named() {
        let text = format!(
            "100644 blob {BLOB}\ta\n100644 blob {BLOB}\tb\n040000 tree {TREE}\tsrc\n160000 commit {PARENT_A}\tvendor"
        );
        let entity = Entity::parse("tree", "7ree000000", lines(&text), &[]).unwrap();

        let refs = entity.references();
        assert_eq!(refs.len(), 2);
        let names: Vec<_> = refs.get(BLOB).iter().map(|r| r.name.clone()).collect();
        assert_eq!(names, vec![Some("a".to_string()), Some("b".to_string())]);
        assert_eq!(refs.get(TREE)[0].name.as_deref(), Some("src"));
        assert!(refs.get(PARENT_A).is_empty());
    }

    #[test]
    fn test_blob_keeps_content() {
        let entity = Entity::parse("blob", BLOB, lines("tree x\nparent y"), &[]).unwrap();
        assert_eq!(entity.references().len(), 0);
        assert_eq!(entity.content().map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_unknown_kind() {
        let err = Entity::parse("note", BLOB, Vec::new(), &[]).unwrap_err();
        match err {
            Error::UnknownObjectKind { kind, hash } => {
                assert_eq!(kind, "note");
                assert_eq!(hash, BLOB);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
