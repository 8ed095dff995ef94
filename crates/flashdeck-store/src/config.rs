//! Configuration loading and store factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use flashdeck_core::model::DeckLimits;
use flashdeck_core::scheduler::SchedulerConfig;
use flashdeck_core::traits::DeckStore;

use crate::json::JsonStore;
use crate::memory::MemoryStore;

/// Which [`DeckStore`] implementation to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Json,
    Memory,
}

/// Top-level flashdeck configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashdeckConfig {
    /// Username commands act as.
    #[serde(default = "default_user")]
    pub user: String,
    /// Root directory of the JSON store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub store: StoreKind,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub limits: DeckLimits,
}

fn default_user() -> String {
    "me".to_string()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./flashdeck-data")
}

impl Default for FlashdeckConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            data_dir: default_data_dir(),
            store: StoreKind::default(),
            scheduler: SchedulerConfig::default(),
            limits: DeckLimits::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables expand to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + len];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `flashdeck.toml` in the current directory
/// 2. `~/.config/flashdeck/config.toml`
///
/// Environment variable overrides: `FLASHDECK_USER`, `FLASHDECK_DATA_DIR`.
pub fn load_config() -> Result<FlashdeckConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<FlashdeckConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("flashdeck.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<FlashdeckConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => FlashdeckConfig::default(),
    };

    if let Ok(user) = std::env::var("FLASHDECK_USER") {
        config.user = user;
    }
    if let Ok(dir) = std::env::var("FLASHDECK_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }

    config.user = resolve_env_vars(&config.user);
    config.data_dir = PathBuf::from(resolve_env_vars(&config.data_dir.to_string_lossy()));

    // A relative data_dir in a config file is relative to that file.
    if config.data_dir.is_relative() && std::env::var_os("FLASHDECK_DATA_DIR").is_none() {
        if let Some(base) = config_path.as_deref().and_then(Path::parent) {
            if !base.as_os_str().is_empty() {
                config.data_dir = base.join(&config.data_dir);
            }
        }
    }

    config
        .scheduler
        .validate()
        .with_context(|| match &config_path {
            Some(p) => format!("invalid [scheduler] section in {}", p.display()),
            None => "invalid default scheduler config".to_string(),
        })?;

    tracing::debug!(
        path = ?config_path,
        user = %config.user,
        data_dir = %config.data_dir.display(),
        "configuration loaded"
    );
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("flashdeck"))
}

/// Open the store selected by `config`.
pub fn open_store(config: &FlashdeckConfig) -> Result<Arc<dyn DeckStore>> {
    match config.store {
        StoreKind::Json => {
            std::fs::create_dir_all(&config.data_dir).with_context(|| {
                format!(
                    "failed to create data directory: {}",
                    config.data_dir.display()
                )
            })?;
            Ok(Arc::new(JsonStore::new(&config.data_dir)))
        }
        StoreKind::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
