//! Plugin host interface
//!
//! Plugins receive everything they may use through an explicit
//! [`HostContext`]: the selector handle, the shared serial transport
//! bindings, the shell settings and the runtime handle. The registry calls
//! each entry point on every plugin in registration order.

use std::sync::Arc;

use dev_select::{SelectorEvent, SelectorHandle, SelectorType};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ShellError;
use crate::settings::ShellSettings;
use crate::transports::HostTransports;

/// Static configuration a plugin declares to the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Which selector the plugin wants
    #[serde(default)]
    pub selector_type: Option<SelectorType>,
}

/// Everything the host shares with plugins
#[derive(Debug, Clone)]
pub struct HostContext {
    /// Commands for the device selector
    pub selector: SelectorHandle,
    /// The discovery and port probe the selector itself uses
    pub transports: HostTransports,
    pub settings: Arc<ShellSettings>,
    /// Selector type in effect (plugin request, else settings)
    pub selector_type: SelectorType,
    /// Runtime for spawning plugin work
    pub runtime: tokio::runtime::Handle,
}

/// A unit of application logic hosted by the shell
///
/// All entry points have no-op defaults.
pub trait Plugin: Send {
    fn name(&self) -> &str;

    fn config(&self) -> PluginConfig {
        PluginConfig::default()
    }

    /// Called once before the selector is used
    fn on_init(&mut self, _ctx: &HostContext) -> Result<(), ShellError> {
        Ok(())
    }

    /// Called once after every plugin is initialized
    fn on_ready(&mut self, _ctx: &HostContext) -> Result<(), ShellError> {
        Ok(())
    }

    /// Called for every selector event
    fn on_event(&mut self, _ctx: &HostContext, _event: &SelectorEvent) {}
}

/// Ordered collection of plugins
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        info!("Registered plugin {}", plugin.name());
        self.plugins.push(plugin);
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Selector type requested by the first plugin that asks for one
    pub fn selector_type(&self) -> Option<SelectorType> {
        self.plugins.iter().find_map(|p| p.config().selector_type)
    }

    /// Run `on_init` on every plugin, stopping at the first failure
    pub fn init_all(&mut self, ctx: &HostContext) -> Result<(), ShellError> {
        for plugin in &mut self.plugins {
            debug!("Initializing plugin {}", plugin.name());
            plugin.on_init(ctx)?;
        }
        Ok(())
    }

    /// Run `on_ready` on every plugin, stopping at the first failure
    pub fn ready_all(&mut self, ctx: &HostContext) -> Result<(), ShellError> {
        for plugin in &mut self.plugins {
            debug!("Plugin {} ready", plugin.name());
            plugin.on_ready(ctx)?;
        }
        Ok(())
    }

    /// Deliver an event to every plugin
    pub fn dispatch(&mut self, ctx: &HostContext, event: &SelectorEvent) {
        for plugin in &mut self.plugins {
            plugin.on_event(ctx, event);
        }
    }
}
