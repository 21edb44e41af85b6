//! Device Discovery Simulation Library
//!
//! This crate provides in-memory stand-ins for every collaborator of the
//! discovery pipeline so it can be exercised without physical hardware:
//!
//! - **SimUsbSource / SimSerialSource**: scripted transport listings with
//!   optional delays and failures
//! - **SimFacade**: a fixed path to serial number map
//! - **SimProbe**: a port probe where chosen ports are busy
//!
//! # Example
//!
//! ```rust
//! use dev_sim::{SimSerialSource, Scripted};
//! use dev_detect::SerialPortRecord;
//! use std::time::Duration;
//!
//! let serial = SimSerialSource::new(vec![SerialPortRecord::new("/dev/ttyACM0")]);
//!
//! // The next listing fails after 10ms, later ones return the records again
//! serial.push_script(Scripted::failure("port enumeration failed").after(Duration::from_millis(10)));
//! ```

pub mod bench;
pub mod facade;
pub mod probe;
pub mod source;

pub use bench::{demo_serial_ports, demo_usb_devices};
pub use facade::SimFacade;
pub use probe::{SimProbe, BUSY_REASON};
pub use source::{Scripted, SimSerialSource, SimSource, SimUsbSource};
