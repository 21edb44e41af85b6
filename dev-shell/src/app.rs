//! Shell application
//!
//! Wires the selector actor to either the real transports or the simulated
//! bench, builds the [`HostContext`], runs the plugin lifecycle, and fans
//! selector events out to plugins until shutdown.

use std::future::Future;
use std::sync::Arc;

use dev_detect::{
    PortProbe, SerialNumberFacade, SerialNumberResolver, SerialPortProbe, SerialSource, UsbSource,
};
use dev_select::{
    run_selector_actor, Discovery, SelectorCommand, SelectorEvent, SelectorHandle, SystemDiscovery,
};
use dev_sim::{demo_serial_ports, demo_usb_devices, SimFacade, SimProbe, SimSerialSource, SimUsbSource};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::ShellError;
use crate::plugin::{HostContext, PluginRegistry};
use crate::settings::ShellSettings;
use crate::transports::HostTransports;

/// The application shell
pub struct ShellApp {
    settings: Arc<ShellSettings>,
    registry: PluginRegistry,
}

fn spawn_actor<U, S, F, P>(
    discovery: &Arc<Discovery<U, S, F>>,
    probe: &Arc<P>,
    cmd_rx: mpsc::Receiver<SelectorCommand>,
    event_tx: mpsc::Sender<SelectorEvent>,
) -> JoinHandle<()>
where
    U: UsbSource,
    S: SerialSource,
    F: SerialNumberFacade,
    P: PortProbe,
{
    tokio::spawn(run_selector_actor(
        Arc::clone(discovery),
        Arc::clone(probe),
        cmd_rx,
        event_tx,
    ))
}

impl ShellApp {
    pub fn new(settings: ShellSettings, registry: PluginRegistry) -> Self {
        Self {
            settings: Arc::new(settings),
            registry,
        }
    }

    /// Run until `shutdown` resolves or the selector stops
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> Result<(), ShellError> {
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (event_tx, mut event_rx) = mpsc::channel(256);

        let transports = if self.settings.simulate {
            info!("Using simulated transports");
            let discovery = Arc::new(Discovery::new(
                SimUsbSource::new(demo_usb_devices()),
                SimSerialSource::new(demo_serial_ports()),
                SerialNumberResolver::new(SimFacade::new()),
            ));
            HostTransports::Simulated {
                discovery,
                probe: Arc::new(SimProbe::new()),
            }
        } else {
            let discovery = Arc::new(SystemDiscovery::system(self.settings.scanner_config()));
            let probe = Arc::new(SerialPortProbe::with_config(self.settings.probe_config()));
            HostTransports::System { discovery, probe }
        };

        let actor = match &transports {
            HostTransports::System { discovery, probe } => {
                spawn_actor(discovery, probe, cmd_rx, event_tx)
            }
            HostTransports::Simulated { discovery, probe } => {
                spawn_actor(discovery, probe, cmd_rx, event_tx)
            }
        };

        let ctx = HostContext {
            selector: SelectorHandle::new(cmd_tx),
            transports,
            settings: Arc::clone(&self.settings),
            selector_type: self
                .registry
                .selector_type()
                .unwrap_or(self.settings.selector_type),
            runtime: tokio::runtime::Handle::current(),
        };

        self.registry.init_all(&ctx)?;
        if self.settings.expand_on_start {
            ctx.selector.toggle_selector().await?;
        }
        self.registry.ready_all(&ctx)?;
        info!("Shell ready with {} plugin(s)", self.registry.len());

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                event = event_rx.recv() => {
                    let Some(event) = event else {
                        error!("Selector actor exited unexpectedly");
                        break;
                    };
                    self.registry.dispatch(&ctx, &event);
                }
                _ = &mut shutdown => {
                    info!("Shutting down");
                    // The actor may already be gone
                    let _ = ctx.selector.shutdown().await;
                    break;
                }
            }
        }

        actor.await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{Plugin, PluginConfig};
    use dev_select::{DiscoveryState, SelectorType};
    use tokio::sync::oneshot;

    /// Reports the first loaded snapshot and selects its first device
    struct FirstDevice {
        loaded: Option<oneshot::Sender<DiscoveryState>>,
        selected: Option<oneshot::Sender<String>>,
    }

    impl Plugin for FirstDevice {
        fn name(&self) -> &str {
            "first-device"
        }

        fn config(&self) -> PluginConfig {
            PluginConfig {
                selector_type: Some(SelectorType::SerialPort),
            }
        }

        fn on_event(&mut self, ctx: &HostContext, event: &SelectorEvent) {
            match event {
                SelectorEvent::StateChanged(state) if state.has_loaded() && !state.is_loading() => {
                    if let Some(tx) = self.loaded.take() {
                        let device = state.devices()[0].clone();
                        let selector = ctx.selector.clone();
                        ctx.runtime.spawn(async move {
                            let _ = selector.select_device(device).await;
                        });
                        let _ = tx.send(state.clone());
                    }
                }
                SelectorEvent::DeviceSelected(device) => {
                    if let Some(tx) = self.selected.take() {
                        let _ = tx.send(device.to_string());
                    }
                }
                _ => {}
            }
        }
    }

    #[tokio::test]
    async fn test_simulated_shell_expands_and_selects() {
        let settings = ShellSettings {
            simulate: true,
            expand_on_start: true,
            ..ShellSettings::default()
        };
        let (loaded_tx, loaded_rx) = oneshot::channel();
        let (selected_tx, selected_rx) = oneshot::channel();
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(FirstDevice {
            loaded: Some(loaded_tx),
            selected: Some(selected_tx),
        }));
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let shell = tokio::spawn(ShellApp::new(settings, registry).run(async {
            let _ = stop_rx.await;
        }));

        let state = loaded_rx.await.unwrap();
        assert!(state.is_selector_expanded());
        assert_eq!(state.devices().len(), 3);
        assert_eq!(selected_rx.await.unwrap(), "000683000000");

        stop_tx.send(()).unwrap();
        shell.await.unwrap().unwrap();
    }
}
