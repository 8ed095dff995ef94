//! Subcommand implementations.

pub mod feedback;
pub mod import;
pub mod info;
pub mod init;
pub mod list;
pub mod next;
pub mod remove;
pub mod stats;
pub mod train;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use flashdeck_core::engine::TrainingService;
use flashdeck_core::model::{Caller, DeckKey};
use flashdeck_core::scheduler::Scheduler;
use flashdeck_store::config::{load_config_from, open_store};

/// Loaded configuration, opened store, and the acting user.
pub struct Session {
    pub service: TrainingService,
    pub caller: Caller,
}

impl Session {
    pub fn open(config_path: Option<PathBuf>, user: Option<String>) -> Result<Self> {
        let mut config = load_config_from(config_path.as_deref())?;
        if let Some(user) = user {
            config.user = user;
        }

        let scheduler = Scheduler::new(config.scheduler.clone())?;
        let store = open_store(&config)?;
        tracing::debug!(store = store.name(), user = %config.user, "session opened");

        Ok(Self {
            service: TrainingService::new(store, scheduler, config.limits.clone()),
            caller: Caller::new(config.user),
        })
    }

    /// Resolve `owner/name`, or a bare `name` owned by the caller.
    pub fn deck_key(&self, reference: &str) -> Result<DeckKey> {
        DeckKey::parse_or_owned(reference, &self.caller.username).map_err(anyhow::Error::msg)
    }
}

/// The given date, or today's local date.
pub fn today_or(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| chrono::Local::now().date_naive())
}

/// Write `content` to `path`, creating parent directories.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
