//! Direct reading of loose objects under `objects/`

use std::io::Read;
use std::path::{Path, PathBuf};

use gix_object::TreeRefIter;

use super::accessor::{ObjectAccessor, ObjectRecord};
use crate::error::{Error, Result};
use crate::object::ObjectId;

/// Resolves objects by inflating `objects/ab/cdef...` files.
///
/// Packed objects are not read, so a hash that only exists in a pack
/// reports `ObjectNotFound`.
pub struct LooseObjects {
    git_dir: PathBuf,
    objects_dir: PathBuf,
}

impl LooseObjects {
    pub fn new(git_dir: impl AsRef<Path>) -> Self {
        let git_dir = git_dir.as_ref().to_path_buf();
        Self {
            objects_dir: git_dir.join("objects"),
            git_dir,
        }
    }

    fn object_path(&self, hash: &str) -> Option<PathBuf> {
        if hash.len() <= 2 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let (dir, file) = hash.split_at(2);
        Some(self.objects_dir.join(dir).join(file))
    }
}

impl ObjectAccessor for LooseObjects {
    fn resolve_object(&self, hash: &str) -> Result<ObjectRecord> {
        let path = self
            .object_path(hash)
            .filter(|path| path.is_file())
            .ok_or_else(|| Error::ObjectNotFound(hash.to_string()))?;

        let content = inflate(&path)?;
        decode_loose(hash, &content)
    }

    /// Without a revision walker, roots come from the refs that the branch
    /// and tag anchors do not cover: remote-tracking branches, stash, notes.
    fn reachable_commits(&self) -> Result<Vec<ObjectId>> {
        super::refs::list_other_ref_anchors(&self.git_dir)
    }
}

/// Read and zlib-decompress a loose object file.
fn inflate(path: &Path) -> Result<Vec<u8>> {
    let file = std::fs::File::open(path).map_err(|e| Error::io(path, e))?;
    let mut decoder = flate2::read::ZlibDecoder::new(file);
    let mut content = Vec::new();
    decoder
        .read_to_end(&mut content)
        .map_err(|e| Error::io(path, e))?;
    Ok(content)
}

/// Split a decompressed loose object (`"<kind> <size>\0<data>"`) into a
/// record, rendering trees the way `git cat-file -p` does.
pub(crate) fn decode_loose(hash: &str, content: &[u8]) -> Result<ObjectRecord> {
    let corrupt = |reason: &str| Error::CorruptObject {
        hash: hash.to_string(),
        reason: reason.to_string(),
    };

    let null_pos = content
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| corrupt("no null terminator in object header"))?;
    let header = std::str::from_utf8(&content[..null_pos])
        .map_err(|_| corrupt("invalid UTF-8 in object header"))?;

    let parts: Vec<&str> = header.split_whitespace().collect();
    let [kind, _size] = parts.as_slice() else {
        return Err(corrupt(&format!("invalid object header format: {header}")));
    };

    let data = &content[null_pos + 1..];
    let lines = if *kind == "tree" {
        tree_lines(hash, data)?
    } else {
        String::from_utf8_lossy(data)
            .lines()
            .map(str::to_string)
            .collect()
    };

    Ok(ObjectRecord {
        kind: kind.to_string(),
        lines,
    })
}

/// Render binary tree entries as `<mode> <kind> <hash>\t<name>` lines.
fn tree_lines(hash: &str, data: &[u8]) -> Result<Vec<String>> {
    TreeRefIter::from_bytes(data)
        .map(|entry| {
            let entry = entry.map_err(|e| Error::CorruptObject {
                hash: hash.to_string(),
                reason: e.to_string(),
            })?;
            let entry_kind = if entry.mode.is_tree() {
                "tree"
            } else if entry.mode.is_commit() {
                "commit"
            } else {
                "blob"
            };
            Ok(format!(
                "{:06o} {} {}\t{}",
                entry.mode.value(),
                entry_kind,
                entry.oid.to_hex(),
                entry.filename
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    /// Raw SHA-1 length inside tree entries.
    const RAW_HASH_LEN: usize = 20;

    /// Write `content` as a zlib-compressed loose object under `objects_dir`.
    fn write_loose(objects_dir: &Path, hash: &str, kind: &str, data: &[u8]) {
        let (dir, file) = hash.split_at(2);
        std::fs::create_dir_all(objects_dir.join(dir)).unwrap();
        let mut content = format!("{} {}\0", kind, data.len()).into_bytes();
        content.extend_from_slice(data);

        let file = std::fs::File::create(objects_dir.join(dir).join(file)).unwrap();
        let mut encoder = flate2::write::ZlibEncoder::new(file, flate2::Compression::default());
        encoder.write_all(&content).unwrap();
        encoder.finish().unwrap();
    }

    fn tree_entry(mode: &str, name: &str, raw: [u8; RAW_HASH_LEN]) -> Vec<u8> {
        let mut entry = format!("{} {}\0", mode, name).into_bytes();
        entry.extend_from_slice(&raw);
        entry
    }

    #[test]
    fn test_read_commit() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let hash = "0123456789abcdef0123456789abcdef01234567";
        let data = b"tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904\n\ninitial\n";
        write_loose(&temp.path().join("objects"), hash, "commit", data);

        let record = LooseObjects::new(temp.path()).resolve_object(hash)?;
        assert_eq!(record.kind, "commit");
        assert_eq!(
            record.lines,
            vec![
                "tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904".to_string(),
                String::new(),
                "initial".to_string(),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_tree_is_rendered_like_cat_file() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let hash = "abcdefabcdefabcdefabcdefabcdefabcdefabcd";
        let mut data = tree_entry("100644", "README.md", [0x11; RAW_HASH_LEN]);
        data.extend(tree_entry("40000", "src", [0xab; RAW_HASH_LEN]));
        data.extend(tree_entry("160000", "vendor", [0xcd; RAW_HASH_LEN]));
        write_loose(&temp.path().join("objects"), hash, "tree", &data);

        let record = LooseObjects::new(temp.path()).resolve_object(hash)?;
        assert_eq!(record.kind, "tree");
        assert_eq!(
            record.lines,
            vec![
                format!("100644 blob {}\tREADME.md", "11".repeat(RAW_HASH_LEN)),
                format!("040000 tree {}\tsrc", "ab".repeat(RAW_HASH_LEN)),
                format!("160000 commit {}\tvendor", "cd".repeat(RAW_HASH_LEN)),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_missing_object() {
        let temp = TempDir::new().unwrap();
        let store = LooseObjects::new(temp.path());
        let err = store.resolve_object("0123456789abcdef0123456789abcdef01234567");
        assert!(matches!(err, Err(Error::ObjectNotFound(_))));
        assert!(matches!(
            store.resolve_object("zz"),
            Err(Error::ObjectNotFound(_))
        ));
    }

    #[test]
    fn test_roots_from_remote_and_stash_refs() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let remote = "0123456789abcdef0123456789abcdef01234567";
        let stash = "89abcdef0123456789abcdef0123456789abcdef";
        let refs = temp.path().join("refs");
        std::fs::create_dir_all(refs.join("remotes/origin"))?;
        std::fs::create_dir_all(refs.join("heads"))?;
        std::fs::write(refs.join("remotes/origin/main"), format!("{remote}\n"))?;
        std::fs::write(refs.join("remotes/origin/HEAD"), "ref: refs/remotes/origin/main\n")?;
        std::fs::write(refs.join("stash"), format!("{stash}\n"))?;
        std::fs::write(refs.join("heads/main"), format!("{stash}\n"))?;

        let roots = LooseObjects::new(temp.path()).reachable_commits()?;
        assert_eq!(roots, vec![remote.to_string(), stash.to_string()]);
        Ok(())
    }

    #[test]
    fn test_truncated_tree_is_corrupt() {
        let data = b"tree 9\0100644 a\0abc";
        let err = decode_loose("feedface", data);
        assert!(matches!(err, Err(Error::CorruptObject { .. })));
    }

    #[test]
    fn test_bad_header_is_corrupt() {
        let err = decode_loose("feedface", b"blob\0data");
        assert!(matches!(err, Err(Error::CorruptObject { .. })));
    }
}
