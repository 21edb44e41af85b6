//! Simulated serial-number facade

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dev_detect::{DetectError, SerialNumberFacade};
use tracing::trace;

/// Facade answering from a fixed path to serial number map
#[derive(Debug, Clone, Default)]
pub struct SimFacade {
    serial_numbers: HashMap<String, String>,
    failure: Option<String>,
    queries: Arc<AtomicUsize>,
}

impl SimFacade {
    pub fn new() -> Self {
        Self::default()
    }

    /// Facade that fails every query
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Map `path` to `serial_number`
    pub fn with_serial_number(mut self, path: impl Into<String>, serial_number: impl Into<String>) -> Self {
        self.serial_numbers.insert(path.into(), serial_number.into());
        self
    }

    /// Number of queries made so far
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl SerialNumberFacade for SimFacade {
    async fn serial_number_map(
        &self,
        paths: &[String],
        on_warning: &(dyn Fn(&str) + Send + Sync),
    ) -> Result<HashMap<String, String>, DetectError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        trace!("Simulated serial number lookup for {:?}", paths);

        if let Some(message) = &self.failure {
            return Err(DetectError::SerialNumberLookup(message.clone()));
        }

        let mut map = HashMap::new();
        for path in paths {
            match self.serial_numbers.get(path) {
                Some(serial_number) => {
                    map.insert(path.clone(), serial_number.clone());
                }
                None => on_warning(&format!("Unable to find serial number for {}", path)),
            }
        }
        Ok(map)
    }
}
