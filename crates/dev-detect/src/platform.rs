//! Host platform classification

/// Operating system family, as far as device detection cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    /// The platform this binary was built for
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }

    /// Whether the serial enumerator reports USB serial numbers itself
    ///
    /// On Windows the port list lacks them and they must be looked up
    /// through a [`SerialNumberFacade`](crate::SerialNumberFacade).
    pub fn reports_serial_numbers(&self) -> bool {
        !matches!(self, Platform::Windows)
    }
}
