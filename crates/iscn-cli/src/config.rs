use std::path::{Path, PathBuf};

use anyhow::Context;
use iscn_types::HashAlgorithm;
use serde::{Deserialize, Serialize};

/// Settings read from `iscn.toml`. Every key is optional.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Directory of the filesystem block store.
    pub store_dir: PathBuf,
    /// Hash algorithm for newly encoded documents.
    pub hash: HashAlgorithm,
    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(".iscn/blocks"),
            hash: HashAlgorithm::Blake3,
            pretty: true,
        }
    }
}

impl CliConfig {
    /// Load `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
