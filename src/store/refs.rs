//! Anchor discovery: tags, branches, HEAD and the loose object tree

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::object::ObjectId;

const TAGS_NAMESPACE: &str = "refs/tags/";
const HEADS_NAMESPACE: &str = "refs/heads/";

/// Subdirectories of `objects/` that do not hold loose objects.
const NON_OBJECT_DIRS: [&str; 2] = ["info", "pack"];

/// A commit named by a branch or by HEAD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadAnchor {
    pub hash: ObjectId,
    pub label: String,
}

/// One hash per tag reference, in tag name order, without duplicates.
pub fn list_tag_anchors(git_dir: &Path) -> Result<Vec<ObjectId>> {
    let mut seen = HashSet::new();
    Ok(collect_refs(git_dir, TAGS_NAMESPACE)?
        .into_values()
        .filter(|hash| seen.insert(hash.clone()))
        .collect())
}

/// Hashes of refs outside `refs/heads/` and `refs/tags/` (remote-tracking
/// branches, stash, notes), in ref name order, without duplicates.
pub fn list_other_ref_anchors(git_dir: &Path) -> Result<Vec<ObjectId>> {
    let mut seen = HashSet::new();
    Ok(collect_refs(git_dir, "refs/")?
        .into_iter()
        .filter(|(refname, _)| {
            !refname.starts_with(HEADS_NAMESPACE) && !refname.starts_with(TAGS_NAMESPACE)
        })
        .map(|(_, hash)| hash)
        .filter(|hash| seen.insert(hash.clone()))
        .collect())
}

/// Every branch (labelled by its short name, in name order), then `HEAD`
/// attached to whichever commit it currently names.
///
/// An unborn HEAD (a symbolic ref to a branch with no commits) contributes
/// nothing.
pub fn list_head_anchors(git_dir: &Path) -> Result<Vec<HeadAnchor>> {
    let branches = collect_refs(git_dir, HEADS_NAMESPACE)?;
    let mut anchors: Vec<HeadAnchor> = branches
        .iter()
        .map(|(refname, hash)| HeadAnchor {
            hash: hash.clone(),
            label: refname
                .strip_prefix(HEADS_NAMESPACE)
                .unwrap_or(refname)
                .to_string(),
        })
        .collect();

    let head_path = git_dir.join("HEAD");
    let head = fs::read_to_string(&head_path).map_err(|e| Error::io(&head_path, e))?;
    let head = head.trim();

    if let Some(target) = head.strip_prefix("ref:") {
        let target = target.trim();
        if target.is_empty() {
            return Err(Error::MalformedRef {
                path: head_path,
                reason: "symbolic reference without a target".to_string(),
            });
        }
        match branches.get(target) {
            Some(hash) => anchors.push(HeadAnchor {
                hash: hash.clone(),
                label: "HEAD".to_string(),
            }),
            None => tracing::debug!("HEAD points at unborn branch {}", target),
        }
    } else {
        anchors.push(HeadAnchor {
            hash: parse_hash(&head_path, head)?,
            label: "HEAD".to_string(),
        });
    }

    Ok(anchors)
}

/// Group anchors by commit, keeping first-seen order of both hashes and labels.
pub fn group_head_labels(anchors: &[HeadAnchor]) -> Vec<(ObjectId, Vec<String>)> {
    let mut grouped: Vec<(ObjectId, Vec<String>)> = Vec::new();
    for anchor in anchors {
        match grouped.iter_mut().find(|(hash, _)| *hash == anchor.hash) {
            Some((_, labels)) => labels.push(anchor.label.clone()),
            None => grouped.push((anchor.hash.clone(), vec![anchor.label.clone()])),
        }
    }
    grouped
}

/// Enumerate loose objects: `objects/ab/cdef...` reconstructs `abcdef...`.
///
/// `info/` and `pack/` are skipped, as is any file whose path does not
/// spell a full hash (temporary files, for instance). Sorted by hash.
pub fn walk_loose_objects(objects_dir: &Path) -> Result<Vec<ObjectId>> {
    let mut hashes = Vec::new();
    let entries = fs::read_dir(objects_dir).map_err(|e| Error::io(objects_dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| Error::io(objects_dir, e))?;
        let container = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        if !path.is_dir() || NON_OBJECT_DIRS.contains(&container.as_str()) {
            continue;
        }

        for object in fs::read_dir(&path).map_err(|e| Error::io(&path, e))? {
            let object = object.map_err(|e| Error::io(&path, e))?;
            let hash = format!("{}{}", container, object.file_name().to_string_lossy());
            if is_hash(&hash) {
                hashes.push(hash.to_ascii_lowercase());
            } else {
                tracing::debug!("skipping non-object file {}", object.path().display());
            }
        }
    }

    hashes.sort();
    Ok(hashes)
}

/// Refs under `namespace` from `packed-refs` and loose files, loose winning.
fn collect_refs(git_dir: &Path, namespace: &str) -> Result<BTreeMap<String, ObjectId>> {
    let mut refs: BTreeMap<String, ObjectId> = read_packed_refs(git_dir)?
        .into_iter()
        .filter(|(refname, _)| refname.starts_with(namespace))
        .collect();

    let dir = git_dir.join(namespace.trim_end_matches('/'));
    read_loose_refs(&dir, namespace, &mut refs)?;
    Ok(refs)
}

fn read_loose_refs(dir: &Path, prefix: &str, refs: &mut BTreeMap<String, ObjectId>) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let refname = format!("{}{}", prefix, entry.file_name().to_string_lossy());

        if path.is_dir() {
            read_loose_refs(&path, &format!("{}/", refname), refs)?;
        } else {
            let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
            let content = content.trim();
            // Symbolic refs (`refs/remotes/origin/HEAD`) name a ref listed on its own.
            if content.starts_with("ref:") {
                tracing::debug!("skipping symbolic ref {}", refname);
                continue;
            }
            refs.insert(refname, parse_hash(&path, content)?);
        }
    }
    Ok(())
}

/// Parse `packed-refs`, ignoring the header and peeled (`^`) lines.
fn read_packed_refs(git_dir: &Path) -> Result<Vec<(String, ObjectId)>> {
    let path = git_dir.join("packed-refs");
    if !path.is_file() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    let mut refs = Vec::new();
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with('^') {
            continue;
        }
        let Some((hash, refname)) = line.split_once(' ') else {
            return Err(Error::MalformedRef {
                path,
                reason: format!("unparseable line: {line}"),
            });
        };
        refs.push((refname.trim().to_string(), parse_hash(&path, hash)?));
    }
    Ok(refs)
}

fn parse_hash(path: &Path, value: &str) -> Result<ObjectId> {
    if is_hash(value) {
        Ok(value.to_ascii_lowercase())
    } else if value.is_empty() {
        Err(Error::MalformedRef {
            path: path.to_path_buf(),
            reason: "empty reference".to_string(),
        })
    } else {
        Err(Error::MalformedRef {
            path: path.to_path_buf(),
            reason: format!("not an object hash: {value}"),
        })
    }
}

/// SHA-1 (40) or SHA-256 (64) hex digits.
fn is_hash(value: &str) -> bool {
    matches!(value.len(), 40 | 64) && value.chars().all(|c| c.is_ascii_hexdigit())
}
