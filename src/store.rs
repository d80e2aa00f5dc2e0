//! Access to an on-disk git object store
//!
//! Everything the graph builder needs from a repository: resolving a hash to
//! its kind and text, and discovering the anchors (tags, branches, HEAD) and
//! loose objects to start from.

mod accessor;
mod git_cli;
mod loose;
mod refs;

pub use accessor::ObjectAccessor;
#[cfg(test)]
pub(crate) use accessor::ObjectRecord;
pub use git_cli::GitCli;
pub use loose::LooseObjects;
pub use refs::{group_head_labels, list_head_anchors, list_tag_anchors, walk_loose_objects};

use std::path::{Path, PathBuf};

/// Locate the git directory for a repository path.
///
/// A work tree root resolves to its `.git` directory; a bare repository
/// (one that has `objects/` directly) is used as is.
pub fn git_dir_for(repo: &Path) -> PathBuf {
    let dotgit = repo.join(".git");
    if dotgit.is_dir() || !repo.join("objects").is_dir() {
        dotgit
    } else {
        repo.to_path_buf()
    }
}
