use std::{
    env,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    errors::EngineResult,
    obligation::ScheduleOptions,
    utils::{
        persistence::{load_json, save_json},
        DEFAULT_LOG_FILTER,
    },
};

const HOME_ENV: &str = "OBLIGATION_CORE_HOME";
const DEFAULT_DIR_NAME: &str = ".obligation_core";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BatchConfig {
    /// Size of the batch worker pool; `None` lets rayon use every core.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_threads: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub schedule: ScheduleOptions,
    pub batch: BatchConfig,
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schedule: ScheduleOptions::default(),
            batch: BatchConfig::default(),
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

/// Handles persistence of [`EngineConfig`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Uses `<base>/config/config.json`.
    pub fn with_base_dir(base: impl AsRef<Path>) -> Self {
        Self::new(base.as_ref().join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Resolves `$OBLIGATION_CORE_HOME`, defaulting to `~/.obligation_core`.
    pub fn default_location() -> Self {
        Self::with_base_dir(app_data_dir())
    }

    /// Loads the stored configuration, or defaults when no file exists yet.
    pub fn load(&self) -> EngineResult<EngineConfig> {
        if self.path.exists() {
            load_json(&self.path)
        } else {
            Ok(EngineConfig::default())
        }
    }

    pub fn save(&self, config: &EngineConfig) -> EngineResult<()> {
        save_json(config, &self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}
