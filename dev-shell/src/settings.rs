//! Shell settings
//!
//! Settings are read once at startup from
//! `$XDG_CONFIG_HOME/devshell/settings.json` (falling back to
//! `~/.config/devshell/settings.json`). A missing or malformed file yields
//! the defaults. The shell never writes the file.

use std::path::{Path, PathBuf};

use dev_detect::{ProbeConfig, ScannerConfig};
use dev_select::SelectorType;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShellSettings {
    /// Log filter used when `RUST_LOG` is not set
    #[serde(default)]
    pub log_filter: Option<String>,
    /// Expand the selector (and run a discovery) on startup
    #[serde(default)]
    pub expand_on_start: bool,
    /// Use simulated transports instead of the real USB bus and serial ports
    #[serde(default)]
    pub simulate: bool,
    /// Serial port names containing any of these are not listed
    #[serde(default)]
    pub scanner_skip_patterns: Vec<String>,
    /// Baud rate used when opening a port for a liveness check
    #[serde(default = "default_probe_baud")]
    pub probe_baud_rate: u32,
    /// Selector type when no plugin asks for one
    #[serde(default)]
    pub selector_type: SelectorType,
}

fn default_probe_baud() -> u32 {
    ProbeConfig::default().baud_rate
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            log_filter: None,
            expand_on_start: false,
            simulate: false,
            scanner_skip_patterns: Vec::new(),
            probe_baud_rate: default_probe_baud(),
            selector_type: SelectorType::default(),
        }
    }
}

impl ShellSettings {
    /// Get the XDG config directory for devshell
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("devshell"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("devshell"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from the user's config directory
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!("No settings at {}: {}", path.display(), e);
                return Self::default();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!("Ignoring malformed settings at {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            skip_patterns: self.scanner_skip_patterns.clone(),
        }
    }

    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            baud_rate: self.probe_baud_rate,
            ..ProbeConfig::default()
        }
    }
}
