//! Where the settings file and the default log file live
//!
//! An explicit directory (`--config-dir`, then `AUTOTCLOG_CONFIG_DIR`) always wins.
//! Otherwise the working directory is used when it already holds an autotclog file,
//! which keeps portable setups next to the footage. Everything else goes to the
//! per-user directories reported by `dirs-next`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "autotclog";
const CONFIG_DIR_ENV: &str = "AUTOTCLOG_CONFIG_DIR";

pub const SETTINGS_FILE: &str = "autotclog.json";

/// Written by `--log` when no file is given
pub const LOG_FILE: &str = "autotclog.log";

/// Directory override collected at startup
#[derive(Debug, Clone)]
pub struct PathConfig {
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// `--config-dir` first, then a non-empty `AUTOTCLOG_CONFIG_DIR`
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| {
            std::env::var(CONFIG_DIR_ENV)
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
        });

        Self { config_dir }
    }
}

/// Settings-type file, e.g. `~/.config/autotclog/autotclog.json` on Linux
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::config_dir).join(name)
}

/// Log-type file, e.g. `~/.local/share/autotclog/autotclog.log` on Linux
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::data_dir).join(name)
}

/// Create the config and data directories if missing
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = resolve_dir(config, dirs_next::config_dir);
    let data_dir = resolve_dir(config, dirs_next::data_dir);

    for dir in [&config_dir, &data_dir] {
        if !dir.is_dir() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
    }

    Ok(())
}

fn has_local_config_files(dir: &Path) -> bool {
    [SETTINGS_FILE, LOG_FILE].iter().any(|f| dir.join(f).exists())
}

fn resolve_dir(config: &PathConfig, platform_dir: fn() -> Option<PathBuf>) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }

    let local = std::env::current_dir()
        .ok()
        .filter(|dir| has_local_config_files(dir));

    local
        .or_else(|| platform_dir().map(|dir| dir.join(APP_DIR)))
        .unwrap_or_else(|| PathBuf::from("."))
}
