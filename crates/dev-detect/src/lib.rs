//! Device transport detection
//!
//! This crate lists devices attached over USB and serial transports and
//! produces raw, transport-level records for them:
//!
//! - **USB**: descriptor-level listing with transient string-descriptor reads
//! - **Serial**: OS-visible serial ports with vendor/product identifiers
//! - **Serial numbers**: platform-conditional lookup for ports whose
//!   enumerator cannot report one (Windows)
//! - **Liveness**: open-then-close probe of a serial transport
//!
//! # Example
//!
//! ```rust,no_run
//! use dev_detect::PortScanner;
//!
//! let scanner = PortScanner::new();
//! let ports = scanner.enumerate_ports().unwrap();
//!
//! for port in ports {
//!     println!("Found port: {}", port.path);
//! }
//! ```

pub mod error;
pub mod facade;
pub mod liveness;
pub mod platform;
pub mod record;
pub mod resolver;
pub mod scanner;
pub mod source;
pub mod usb;
pub mod usb_ids;

pub use error::DetectError;
pub use facade::SystemFacade;
pub use liveness::{is_port_available, PortProbe, ProbeConfig, SerialPortProbe};
pub use platform::Platform;
pub use record::{SerialPortRecord, UsbRecord};
pub use resolver::{SerialNumberFacade, SerialNumberResolver};
pub use scanner::{PortScanner, ScannerConfig};
pub use source::{SerialSource, UsbSource};
pub use usb::{
    DescriptorReader, DescriptorSummary, RusbBus, UsbBus, UsbEnumerator, UsbPeripheral,
};
