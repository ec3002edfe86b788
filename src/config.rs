// ── Configuration ─────────────────────────────────────────────────────────────
//
// Reads `%APPDATA%\GuiShell\config.json`, or the file named by the
// `GUI_SHELL_CONFIG` environment variable.
// No `unsafe`; pure safe Rust over serde_json.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{GuiError, Result};

// ── On-disk types ─────────────────────────────────────────────────────────────

/// Root of the JSON configuration file.  Every field is optional on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    pub window_title: String,
    /// Client width at 96 DPI.
    pub width: i32,
    /// Client height at 96 DPI.
    pub height: i32,
    pub show: ShowState,
    pub log: LogConfig,
}

/// How a new window is first shown (the `nCmdShow` of `ShowWindow`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowState {
    #[default]
    Normal,
    Maximized,
    Minimized,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Install the stderr logger at startup.
    pub enabled: bool,
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_owned(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            window_title: "GUI Shell".to_owned(),
            width: 640,
            height: 480,
            show: ShowState::Normal,
            log: LogConfig::default(),
        }
    }
}

// ── Format version ────────────────────────────────────────────────────────────

const CONFIG_VERSION: u32 = 1;

/// Environment variable that overrides the configuration file location.
pub const CONFIG_ENV: &str = "GUI_SHELL_CONFIG";

// ── Path ──────────────────────────────────────────────────────────────────────

/// Return the configuration file path.
///
/// `GUI_SHELL_CONFIG` wins; otherwise `%APPDATA%\GuiShell\config.json`.
/// Returns `None` when neither is set.
pub fn config_path() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(explicit));
    }
    let appdata = std::env::var_os("APPDATA")?;
    let mut p = PathBuf::from(appdata);
    p.push("GuiShell");
    p.push("config.json");
    Some(p)
}

// ── Load ──────────────────────────────────────────────────────────────────────

/// Read the configuration, falling back to defaults on any error: no path,
/// missing file, parse failure, wrong version or invalid size.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    match load_from(&path) {
        Ok(config) => config,
        Err(GuiError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring configuration file");
            Config::default()
        }
    }
}

/// Read and validate the configuration file at `path`.
pub fn load_from(path: &Path) -> Result<Config> {
    let data = fs::read(path)?;
    let config: Config = serde_json::from_slice(&data)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Reject versions we do not understand and non-positive sizes.
    pub fn validate(&self) -> Result<()> {
        if self.version != CONFIG_VERSION {
            return Err(GuiError::ConfigVersion {
                found: self.version,
                expected: CONFIG_VERSION,
            });
        }
        if self.width <= 0 || self.height <= 0 {
            return Err(GuiError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

// ── Save ──────────────────────────────────────────────────────────────────────

/// Write `config` to `path` as pretty JSON, creating the parent directory.
pub fn save_to(path: &Path, config: &Config) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(file, config)?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
