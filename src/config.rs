use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str() {
        if let Some(stripped) = s.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if s == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

/// How objects are read from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// `git cat-file`; sees packed objects too.
    Git,
    /// Inflate loose object files directly.
    Loose,
}

impl std::str::FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "git" => Ok(Backend::Git),
            "loose" => Ok(Backend::Loose),
            other => anyhow::bail!("Unknown backend: {} (expected git or loose)", other),
        }
    }
}

/// Configuration for git-object-graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    /// Where the DOT file is written
    #[serde(default = "defaults::output")]
    pub output: PathBuf,
    /// Object store backend
    #[serde(default = "defaults::backend")]
    pub backend: Backend,
    /// git executable used by the git backend
    #[serde(default = "defaults::git_binary")]
    pub git_binary: String,
    /// Print every object to stdout
    #[serde(default)]
    pub print_objects: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            output: defaults::output(),
            backend: defaults::backend(),
            git_binary: defaults::git_binary(),
            print_objects: false,
        }
    }
}

impl GraphConfig {
    /// Load configuration from the config file (if any) and environment variables
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;
        tracing::debug!("loading git-object-graph config from {:?}", config_path);
        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `GIT_OBJECT_GRAPH_*` overrides looked up through `var`.
    pub fn apply_overrides<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = var("GIT_OBJECT_GRAPH_OUTPUT") {
            self.output = expand_tilde(&PathBuf::from(path));
        }

        if let Some(backend) = var("GIT_OBJECT_GRAPH_BACKEND") {
            self.backend = backend
                .parse()
                .context("Failed to parse GIT_OBJECT_GRAPH_BACKEND")?;
        }

        if let Some(git) = var("GIT_OBJECT_GRAPH_GIT") {
            self.git_binary = git;
        }
        Ok(())
    }

    /// Load configuration from a file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: GraphConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.output = expand_tilde(&config.output);
        Ok(config)
    }

    /// Config file path: `GIT_OBJECT_GRAPH_CONFIG` or the default location
    pub fn config_file_path() -> Result<PathBuf> {
        if let Ok(path) = env::var("GIT_OBJECT_GRAPH_CONFIG") {
            return Ok(expand_tilde(&PathBuf::from(path)));
        }
        dirs::home_dir()
            .map(|home| home.join(".config/git-object-graph/config.yaml"))
            .context("Could not determine home directory for config file")
    }
}

mod defaults {
    use std::path::PathBuf;

    use super::Backend;

    pub(crate) fn output() -> PathBuf {
        dirs::home_dir()
            .map(|home| home.join("git.dot"))
            .unwrap_or_else(|| PathBuf::from("git.dot"))
    }

    pub(crate) fn backend() -> Backend {
        Backend::Git
    }

    pub(crate) fn git_binary() -> String {
        "git".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "backend: loose\nprint_objects: true\n").unwrap();

        let loaded = GraphConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.backend, Backend::Loose);
        assert!(loaded.print_objects);
        assert_eq!(loaded.git_binary, "git");
        assert_eq!(loaded.output, defaults::output());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "colour: red\n").unwrap();

        assert!(GraphConfig::load_from_file(&config_path).is_err());
    }

    #[test]
    fn test_env_override() {
        let vars: HashMap<&str, &str> = [
            ("GIT_OBJECT_GRAPH_OUTPUT", "/tmp/out.dot"),
            ("GIT_OBJECT_GRAPH_BACKEND", "loose"),
            ("GIT_OBJECT_GRAPH_GIT", "/usr/local/bin/git"),
        ]
        .into_iter()
        .collect();

        let mut config = GraphConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.output, PathBuf::from("/tmp/out.dot"));
        assert_eq!(config.backend, Backend::Loose);
        assert_eq!(config.git_binary, "/usr/local/bin/git");
    }

    #[test]
    fn test_bad_backend_override() {
        let mut config = GraphConfig::default();
        let err = config.apply_overrides(|key| {
            (key == "GIT_OBJECT_GRAPH_BACKEND").then(|| "svn".to_string())
        });
        assert!(err.is_err());
    }

    #[test]
    fn test_tilde_expansion() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "output: ~/graphs/repo.dot\n").unwrap();

        let loaded = GraphConfig::load_from_file(&config_path).unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(loaded.output, home.join("graphs/repo.dot"));
        }
    }
}
