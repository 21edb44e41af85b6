//! Simulated port probe

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use dev_detect::{DetectError, PortProbe};
use tracing::trace;

/// OS message reported for a busy simulated port
pub const BUSY_REASON: &str = "Device or resource busy";

/// Port probe where chosen ports are held by another process
#[derive(Debug, Clone, Default)]
pub struct SimProbe {
    busy: Arc<Mutex<HashSet<String>>>,
    checked: Arc<Mutex<Vec<String>>>,
}

impl SimProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `path` busy from the start
    pub fn with_busy(self, path: impl Into<String>) -> Self {
        self.set_busy(path, true);
        self
    }

    pub fn set_busy(&self, path: impl Into<String>, busy: bool) {
        let path = path.into();
        let mut set = lock(&self.busy);
        if busy {
            set.insert(path);
        } else {
            set.remove(&path);
        }
    }

    /// Paths checked so far, in order
    pub fn checked(&self) -> Vec<String> {
        lock(&self.checked).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl PortProbe for SimProbe {
    async fn is_port_available(&self, path: &str) -> Result<(), DetectError> {
        lock(&self.checked).push(path.to_string());
        let busy = lock(&self.busy).contains(path);
        trace!("Simulated open of {}: busy={}", path, busy);

        if busy {
            Err(DetectError::OpenFailed {
                port: path.to_string(),
                reason: BUSY_REASON.to_string(),
            })
        } else {
            Ok(())
        }
    }
}
