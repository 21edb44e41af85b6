//! Platform serial-number facade
//!
//! Windows does not report USB serial numbers with its COM port list. The
//! serial number of a USB device is however the instance name of its device
//! key under `HKLM\SYSTEM\CurrentControlSet\Enum\USB`, and each CDC
//! interface of that device stores its `PortName`. [`SystemFacade`] walks
//! those keys to map COM port names back to serial numbers.

use std::collections::HashMap;

use tracing::debug;

use crate::error::DetectError;
use crate::resolver::SerialNumberFacade;
use crate::usb_ids::segger;

/// Serial-number lookup backed by the operating system
#[derive(Debug, Clone)]
pub struct SystemFacade {
    vendor_id: u16,
}

impl SystemFacade {
    pub fn new() -> Self {
        Self::for_vendor(segger::VID)
    }

    /// Look up ports of devices with the given USB vendor ID
    pub fn for_vendor(vendor_id: u16) -> Self {
        Self { vendor_id }
    }

    #[cfg(windows)]
    async fn port_serial_numbers(&self) -> Result<HashMap<String, String>, DetectError> {
        let vendor_id = self.vendor_id;
        tokio::task::spawn_blocking(move || registry::port_serial_numbers(vendor_id)).await?
    }

    #[cfg(not(windows))]
    async fn port_serial_numbers(&self) -> Result<HashMap<String, String>, DetectError> {
        debug!(
            "No serial number registry on this platform (vendor {:04X})",
            self.vendor_id
        );
        Ok(HashMap::new())
    }
}

impl Default for SystemFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialNumberFacade for SystemFacade {
    async fn serial_number_map(
        &self,
        paths: &[String],
        on_warning: &(dyn Fn(&str) + Send + Sync),
    ) -> Result<HashMap<String, String>, DetectError> {
        let known = self.port_serial_numbers().await?;
        debug!("Registry lists {} port(s) with serial numbers", known.len());

        let mut map = HashMap::new();
        for path in paths {
            match known.get(path) {
                Some(serial_number) => {
                    map.insert(path.clone(), serial_number.clone());
                }
                None => on_warning(&format!("Unable to find serial number for {}", path)),
            }
        }
        Ok(map)
    }
}

#[cfg(windows)]
mod registry {
    use std::collections::HashMap;
    use std::iter::once;

    use windows_sys::Win32::Foundation::ERROR_SUCCESS;
    use windows_sys::Win32::System::Registry::{
        RegCloseKey, RegEnumKeyExW, RegOpenKeyExW, RegQueryValueExW, HKEY, HKEY_LOCAL_MACHINE,
        KEY_READ, REG_SZ, REG_VALUE_TYPE,
    };

    use super::{pair_port_serial_numbers, UsbInstance};
    use crate::error::DetectError;

    const USB_ENUM_KEY: &str = r"SYSTEM\CurrentControlSet\Enum\USB";

    /// Open registry key, closed on drop
    struct RegKey(HKEY);

    impl RegKey {
        fn open(parent: HKEY, path: &str) -> Result<Self, DetectError> {
            let wide = to_wide(path);
            let mut key: HKEY = std::ptr::null_mut();
            // SAFETY: `wide` is NUL-terminated and `key` is a valid out pointer.
            let status = unsafe { RegOpenKeyExW(parent, wide.as_ptr(), 0, KEY_READ, &mut key) };
            if status != ERROR_SUCCESS {
                return Err(DetectError::SerialNumberLookup(format!(
                    "unable to open registry key {} (error {})",
                    path, status
                )));
            }
            Ok(Self(key))
        }

        fn open_subkey(&self, path: &str) -> Result<Self, DetectError> {
            Self::open(self.0, path)
        }

        fn subkeys(&self) -> Vec<String> {
            let mut names = Vec::new();
            let mut index = 0;
            loop {
                let mut buf = [0u16; 256];
                let mut len = buf.len() as u32;
                // SAFETY: `buf` holds `len` UTF-16 units; optional outputs are null.
                let status = unsafe {
                    RegEnumKeyExW(
                        self.0,
                        index,
                        buf.as_mut_ptr(),
                        &mut len,
                        std::ptr::null(),
                        std::ptr::null_mut(),
                        std::ptr::null_mut(),
                        std::ptr::null_mut(),
                    )
                };
                if status != ERROR_SUCCESS {
                    break;
                }
                names.push(String::from_utf16_lossy(&buf[..len as usize]));
                index += 1;
            }
            names
        }

        fn string_value(&self, name: &str) -> Option<String> {
            let wide = to_wide(name);
            let mut kind: REG_VALUE_TYPE = 0;
            let mut buf = [0u16; 256];
            let mut size = (buf.len() * 2) as u32;
            // SAFETY: `buf` is `size` bytes long and `wide` is NUL-terminated.
            let status = unsafe {
                RegQueryValueExW(
                    self.0,
                    wide.as_ptr(),
                    std::ptr::null(),
                    &mut kind,
                    buf.as_mut_ptr().cast(),
                    &mut size,
                )
            };
            if status != ERROR_SUCCESS || kind != REG_SZ {
                return None;
            }
            let units = (size as usize / 2).min(buf.len());
            Some(
                String::from_utf16_lossy(&buf[..units])
                    .trim_end_matches('\0')
                    .to_string(),
            )
        }

        fn port_name(&self) -> Option<String> {
            self.open_subkey("Device Parameters")
                .ok()?
                .string_value("PortName")
        }
    }

    impl Drop for RegKey {
        fn drop(&mut self) {
            // SAFETY: the key was opened by RegOpenKeyExW and is closed once.
            unsafe {
                RegCloseKey(self.0);
            }
        }
    }

    fn to_wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(once(0)).collect()
    }

    /// Map COM port names of `vendor_id` devices to their serial numbers
    pub(super) fn port_serial_numbers(
        vendor_id: u16,
    ) -> Result<HashMap<String, String>, DetectError> {
        let usb = RegKey::open(HKEY_LOCAL_MACHINE, USB_ENUM_KEY)?;
        let prefix = format!("VID_{:04X}&PID_", vendor_id);

        let mut instances = Vec::new();
        for device_name in usb.subkeys() {
            if !device_name.to_ascii_uppercase().starts_with(&prefix) {
                continue;
            }
            let Ok(device) = usb.open_subkey(&device_name) else {
                continue;
            };
            for instance in device.subkeys() {
                let Ok(key) = device.open_subkey(&instance) else {
                    continue;
                };
                instances.push(UsbInstance {
                    device_name: device_name.clone(),
                    parent_id_prefix: key.string_value("ParentIdPrefix"),
                    port_name: key.port_name(),
                    instance,
                });
            }
        }

        Ok(pair_port_serial_numbers(&instances))
    }
}

/// One instance key under `Enum\USB\<device>`
#[cfg_attr(not(windows), allow(dead_code))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct UsbInstance {
    /// Device key name, e.g. `VID_1366&PID_1015` or `VID_1366&PID_1015&MI_00`
    device_name: String,
    /// Instance key name; the serial number for a whole device
    instance: String,
    parent_id_prefix: Option<String>,
    port_name: Option<String>,
}

#[cfg_attr(not(windows), allow(dead_code))]
impl UsbInstance {
    fn is_interface(&self) -> bool {
        self.device_name.to_ascii_uppercase().contains("&MI_")
    }
}

/// Map port names to serial numbers
///
/// A whole-device instance is named by its serial number. An interface
/// instance (`&MI_xx`) is named by its parent's `ParentIdPrefix` followed by
/// a suffix, which links it back to the parent's serial number.
#[cfg_attr(not(windows), allow(dead_code))]
fn pair_port_serial_numbers(instances: &[UsbInstance]) -> HashMap<String, String> {
    let mut ports = HashMap::new();
    let (interfaces, devices): (Vec<_>, Vec<_>) =
        instances.iter().partition(|i| i.is_interface());

    for device in &devices {
        if let Some(port) = &device.port_name {
            ports.insert(port.clone(), device.instance.clone());
        }
    }

    for interface in interfaces {
        let Some(port) = &interface.port_name else {
            continue;
        };
        let parent = devices.iter().find(|d| {
            d.parent_id_prefix
                .as_deref()
                .is_some_and(|prefix| interface.instance.starts_with(prefix))
        });
        match parent {
            Some(parent) => {
                ports.insert(port.clone(), parent.instance.clone());
            }
            None => debug!(
                "No parent device for interface {}\\{}",
                interface.device_name, interface.instance
            ),
        }
    }

    ports
}
