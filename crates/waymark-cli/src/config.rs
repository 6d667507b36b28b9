//! `.waymark/config.json` handling.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use waymark_graph::{GraphError, WeightPolicy};

/// Directory holding Waymark's local state.
pub const WAYMARK_DIR: &str = ".waymark";

const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid weight policy in {path}: {source}")]
    Weight { path: PathBuf, source: GraphError },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: String,
    /// Room store directory.
    pub store: PathBuf,
    /// How edges to connected anchors are weighted when hosting.
    pub weight: WeightPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            store: Path::new(WAYMARK_DIR).join("rooms"),
            weight: WeightPolicy::default(),
        }
    }
}

/// Path of the config file under `root`.
pub fn config_path(root: &Path) -> PathBuf {
    root.join(WAYMARK_DIR).join(CONFIG_FILE)
}

/// Loads the config under `root`, falling back to defaults if there is none.
pub fn load_from(root: &Path) -> Result<Config, ConfigError> {
    let path = config_path(root);
    if !path.exists() {
        debug!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let config: Config = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
        path: path.clone(),
        source,
    })?;
    if let Err(source) = config.weight.validate() {
        return Err(ConfigError::Weight { path, source });
    }

    debug!("Loaded config from {} (weight: {})", path.display(), config.weight);
    Ok(config)
}

/// Loads the config of the current directory and applies `--store`.
pub fn load(store_override: Option<PathBuf>) -> Result<Config, ConfigError> {
    let mut config = load_from(Path::new("."))?;
    if let Some(store) = store_override {
        config.store = store;
    }
    Ok(config)
}
