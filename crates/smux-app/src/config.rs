//! Optional TOML configuration, read from the platform config
//! directory (`smux.toml`). A missing or broken file falls back to
//! defaults with a warning on stderr.

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_SCROLLBACK_BYTES: usize = 8192;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-window scrollback capacity in bytes.
    pub scrollback_bytes: usize,
    /// Shell to start in new windows. Falls back to $SHELL, then
    /// /bin/sh.
    pub shell: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scrollback_bytes: DEFAULT_SCROLLBACK_BYTES,
            shell: None,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Config::default(),
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("smux.toml"))
    }

    fn load_from_file(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                eprintln!("smux: failed to read {}: {err}", path.display());
                return Config::default();
            }
        };
        match toml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("smux: failed to parse {}: {err}", path.display());
                Config::default()
            }
        }
    }

    /// Effective shell, preferring an explicit override, then the
    /// config file, then the environment.
    pub fn resolve_shell(&self, override_shell: Option<&str>) -> String {
        if let Some(shell) = override_shell {
            return shell.to_string();
        }
        if let Some(shell) = &self.shell {
            return shell.clone();
        }
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }
}
