//! Device Selection Shell
//!
//! Hosts the device selector and the plugins built on it. The shell loads
//! its settings, starts the selector actor over real or simulated
//! transports, and hands every plugin an explicit [`HostContext`].

pub mod app;
pub mod error;
pub mod plugin;
pub mod selector_log;
pub mod settings;
pub mod transports;

pub use app::ShellApp;
pub use error::ShellError;
pub use plugin::{HostContext, Plugin, PluginConfig, PluginRegistry};
pub use selector_log::SelectorLog;
pub use settings::ShellSettings;
pub use transports::{HostTransports, SimDiscovery};

/// Log filter used when neither `RUST_LOG` nor the settings set one
pub const DEFAULT_LOG_FILTER: &str =
    "devshell=info,dev_shell=info,dev_detect=info,dev_select=info,dev_sim=info";
