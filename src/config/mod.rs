use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::autosave::{AUTOSAVE_DELAY, AUTOSAVE_KEY};
use crate::history::DEFAULT_HISTORY_CAPACITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigPathError {
    #[error("neither XDG_CONFIG_HOME nor HOME is set")]
    MissingHomeDirectory,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Path(#[from] ConfigPathError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

const APP_DIR: &str = "textplate";
const APP_CONFIG_FILE: &str = "config.json";

/// Editor settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history_capacity: usize,
    pub autosave_delay_ms: u64,
    pub autosave_key: String,
    pub autosave_dir: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            autosave_delay_ms: u64::try_from(AUTOSAVE_DELAY.as_millis()).unwrap_or(2000),
            autosave_key: AUTOSAVE_KEY.to_string(),
            autosave_dir: None,
        }
    }
}

impl EditorConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}

pub fn load_editor_config() -> EditorConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_editor_config_with(xdg_config_home.as_deref(), home.as_deref())
}

/// Missing file means defaults; unreadable or malformed files are logged and replaced by defaults.
pub fn load_editor_config_with(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> EditorConfig {
    match read_editor_config(xdg_config_home, home) {
        Ok(Some(config)) => config,
        Ok(None) => EditorConfig::default(),
        Err(err) => {
            tracing::warn!(%err, "using default editor config");
            EditorConfig::default()
        }
    }
}

fn read_editor_config(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<Option<EditorConfig>, ConfigError> {
    let path = app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home)?;
    if !path.exists() {
        tracing::debug!(?path, "no config.json; using defaults");
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config = serde_json::from_str(&contents)
        .map_err(|source| ConfigError::Parse { path, source })?;
    Ok(Some(config))
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
