//! Object access by shelling out to `git cat-file`

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use super::accessor::{ObjectAccessor, ObjectRecord};
use crate::error::{Error, Result};
use crate::object::ObjectId;

/// Resolves objects with the `git` binary, so packed objects work too.
///
/// Each lookup costs two process spawns; callers are expected to resolve a
/// hash at most once.
pub struct GitCli {
    git_binary: String,
    git_dir: PathBuf,
}

impl GitCli {
    pub fn new(git_binary: impl Into<String>, git_dir: impl AsRef<Path>) -> Self {
        Self {
            git_binary: git_binary.into(),
            git_dir: git_dir.as_ref().to_path_buf(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        Command::new(&self.git_binary)
            .arg("--git-dir")
            .arg(&self.git_dir)
            .args(args)
            .output()
            .map_err(|e| Error::GitCommand {
                command: self.describe(args),
                stderr: e.to_string(),
            })
    }

    fn describe(&self, args: &[&str]) -> String {
        format!(
            "{} --git-dir {} {}",
            self.git_binary,
            self.git_dir.display(),
            args.join(" ")
        )
    }

    /// Run `git cat-file <flag> <hash>`, mapping failure to a missing object.
    fn cat_file(&self, flag: &str, hash: &str) -> Result<String> {
        let output = self.run(&["cat-file", flag, hash])?;
        if !output.status.success() {
            tracing::debug!(
                "git cat-file {} {} failed: {}",
                flag,
                hash,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Err(Error::ObjectNotFound(hash.to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl ObjectAccessor for GitCli {
    fn resolve_object(&self, hash: &str) -> Result<ObjectRecord> {
        let kind = self.cat_file("-t", hash)?;
        let pretty = self.cat_file("-p", hash)?;

        Ok(ObjectRecord {
            kind: kind.lines().next().unwrap_or_default().trim().to_string(),
            lines: pretty.lines().map(str::to_string).collect(),
        })
    }

    fn reachable_commits(&self) -> Result<Vec<ObjectId>> {
        let args = ["rev-list", "--all"];
        let output = self.run(&args)?;
        if !output.status.success() {
            return Err(Error::GitCommand {
                command: self.describe(&args),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}
