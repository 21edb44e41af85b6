//! Transports shared between the selector actor and plugins
//!
//! The shell builds the discovery and the port checker once. The actor and
//! the [`HostContext`](crate::HostContext) hold the same instances, so a
//! plugin listing ports or checking a port sees exactly what the selector
//! sees.

use std::fmt;
use std::sync::Arc;

use dev_detect::{DetectError, PortProbe, SerialPortProbe, SerialPortRecord};
use dev_select::{Discovery, DiscoveryError, SystemDiscovery};
use dev_sim::{SimFacade, SimProbe, SimSerialSource, SimUsbSource};

/// Discovery over the simulated bench
pub type SimDiscovery = Discovery<SimUsbSource, SimSerialSource, SimFacade>;

/// The discovery and port checker driving the selector
#[derive(Clone)]
pub enum HostTransports {
    System {
        discovery: Arc<SystemDiscovery>,
        probe: Arc<SerialPortProbe>,
    },
    Simulated {
        discovery: Arc<SimDiscovery>,
        probe: Arc<SimProbe>,
    },
}

impl HostTransports {
    /// Serial ports with serial numbers resolved, as the selector lists them
    pub async fn serial_ports(&self) -> Result<Vec<SerialPortRecord>, DiscoveryError> {
        match self {
            Self::System { discovery, .. } => discovery.serial_ports().await,
            Self::Simulated { discovery, .. } => discovery.serial_ports().await,
        }
    }

    /// Check that `path` can be opened, with the selector's own port check
    pub async fn is_port_available(&self, path: &str) -> Result<(), DetectError> {
        match self {
            Self::System { probe, .. } => probe.is_port_available(path).await,
            Self::Simulated { probe, .. } => probe.is_port_available(path).await,
        }
    }
}

impl fmt::Debug for HostTransports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System { probe, .. } => f.debug_struct("System").field("probe", probe).finish(),
            Self::Simulated { probe, .. } => {
                f.debug_struct("Simulated").field("probe", probe).finish()
            }
        }
    }
}
