//! Scripted transport sources
//!
//! A [`SimSource`] answers each listing with the next scripted response, or
//! with its standing response once the script is used up. Clones share the
//! same script, so a test can keep a handle after moving a clone into the
//! discovery pipeline.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use dev_detect::{DetectError, SerialPortRecord, SerialSource, UsbRecord, UsbSource};
use tracing::trace;

/// One response of a simulated listing
#[derive(Debug, Clone)]
pub struct Scripted<T> {
    /// Records to return, or the failure message
    pub result: Result<Vec<T>, String>,
    /// How long the listing takes
    pub delay: Duration,
}

impl<T> Scripted<T> {
    pub fn records(records: Vec<T>) -> Self {
        Self {
            result: Ok(records),
            delay: Duration::ZERO,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            result: Err(message.into()),
            delay: Duration::ZERO,
        }
    }

    /// Resolve only after `delay`
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

struct Inner<T> {
    standing: Scripted<T>,
    script: VecDeque<Scripted<T>>,
}

/// A simulated transport listing
pub struct SimSource<T> {
    inner: Arc<Mutex<Inner<T>>>,
    calls: Arc<AtomicUsize>,
}

/// Simulated USB bus
pub type SimUsbSource = SimSource<UsbRecord>;

/// Simulated serial port listing
pub type SimSerialSource = SimSource<SerialPortRecord>;

impl<T: Clone> SimSource<T> {
    /// Source that always returns `records`
    pub fn new(records: Vec<T>) -> Self {
        Self::with_standing(Scripted::records(records))
    }

    /// Source that always fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_standing(Scripted::failure(message))
    }

    fn with_standing(standing: Scripted<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                standing,
                script: VecDeque::new(),
            })),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the standing response (e.g. to simulate hot-plug)
    pub fn set_standing(&self, standing: Scripted<T>) {
        self.lock().standing = standing;
    }

    /// Queue a response for a future listing
    pub fn push_script(&self, response: Scripted<T>) {
        self.lock().script.push_back(response);
    }

    /// Number of listings performed so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Scripted<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.lock();
        match inner.script.pop_front() {
            Some(response) => response,
            None => inner.standing.clone(),
        }
    }

    async fn respond(&self) -> Result<Vec<T>, String> {
        let response = self.next_response();
        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }
        response.result
    }
}

impl<T> Clone for SimSource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            calls: Arc::clone(&self.calls),
        }
    }
}

impl UsbSource for SimSource<UsbRecord> {
    async fn list_usb_devices(&self) -> Result<Vec<UsbRecord>, DetectError> {
        let result = self.respond().await;
        trace!("Simulated USB listing: {:?}", result);
        result.map_err(DetectError::UsbEnumerationFailed)
    }
}

impl SerialSource for SimSource<SerialPortRecord> {
    async fn list_serial_ports(&self) -> Result<Vec<SerialPortRecord>, DetectError> {
        let result = self.respond().await;
        trace!("Simulated serial listing: {:?}", result);
        result.map_err(DetectError::EnumerationFailed)
    }
}
