use std::path::PathBuf;

use crate::object::ObjectId;

/// Errors raised while reading an object store and building its graph.
///
/// Every variant is fatal to the run; nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The object store reported a kind outside tag/commit/tree/blob.
    #[error("unknown object type - {kind} (object {hash})")]
    UnknownObjectKind { kind: String, hash: ObjectId },

    /// A hash could not be resolved by the object store.
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    /// A loose object exists but its content could not be decoded.
    #[error("corrupt object {hash}: {reason}")]
    CorruptObject { hash: ObjectId, reason: String },

    /// A branch, tag or HEAD reference file is empty or garbled.
    #[error("malformed reference {}: {reason}", .path.display())]
    MalformedRef { path: PathBuf, reason: String },

    /// The external git binary could not be run or failed.
    #[error("git command failed: {command}: {stderr}")]
    GitCommand { command: String, stderr: String },

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
