//! Integration tests for device discovery and selection
//!
//! These tests drive the selector actor end to end over simulated transports:
//! - Discovery merging, ordering and canonicalization
//! - Failure handling that keeps the previous device list
//! - Toggle-triggered discovery
//! - USB and serial selection, including liveness rejection
//! - Concurrent discoveries resolving out of order

use std::time::Duration;

use dev_detect::usb_ids::segger;
use dev_detect::{
    Platform, RusbBus, SerialNumberResolver, SerialPortRecord, UsbEnumerator, UsbRecord, UsbSource,
};
use dev_select::{Device, DiscoveryState, SelectorEvent, SelectorHandle};
use dev_sim::{Scripted, SimFacade, SimProbe, SimSerialSource, SimUsbSource, BUSY_REASON};

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;
    use dev_select::{run_selector_actor, Discovery};
    use std::sync::Arc;
    use tokio::sync::mpsc;
    use tokio::task::JoinHandle;

    /// Simulated collaborators; clones share state with the running actor
    pub struct Bench {
        pub usb: SimUsbSource,
        pub serial: SimSerialSource,
        pub facade: SimFacade,
        pub probe: SimProbe,
        pub platform: Platform,
    }

    impl Bench {
        pub fn new(usb: Vec<UsbRecord>, serial: Vec<SerialPortRecord>) -> Self {
            Self {
                usb: SimUsbSource::new(usb),
                serial: SimSerialSource::new(serial),
                facade: SimFacade::new(),
                probe: SimProbe::new(),
                platform: Platform::Linux,
            }
        }

        pub fn spawn(&self) -> Running {
            self.spawn_with_usb(self.usb.clone())
        }

        /// Spawn with `usb` in place of the simulated USB source
        pub fn spawn_with_usb<U: UsbSource>(&self, usb: U) -> Running {
            let discovery = Discovery::new(
                usb,
                self.serial.clone(),
                SerialNumberResolver::for_platform(self.platform, self.facade.clone()),
            );
            let (cmd_tx, cmd_rx) = mpsc::channel(64);
            let (event_tx, event_rx) = mpsc::channel(256);
            let task = tokio::spawn(run_selector_actor(
                Arc::new(discovery),
                Arc::new(self.probe.clone()),
                cmd_rx,
                event_tx,
            ));
            Running {
                handle: SelectorHandle::new(cmd_tx),
                events: event_rx,
                task,
            }
        }
    }

    pub struct Running {
        pub handle: SelectorHandle,
        pub events: mpsc::Receiver<SelectorEvent>,
        pub task: JoinHandle<()>,
    }

    impl Running {
        /// Receive events until one matches
        pub async fn wait_for(&mut self, pred: impl Fn(&SelectorEvent) -> bool) -> SelectorEvent {
            loop {
                let event = tokio::time::timeout(Duration::from_secs(5), self.events.recv())
                    .await
                    .expect("timed out waiting for event")
                    .expect("event channel closed");
                if pred(&event) {
                    return event;
                }
            }
        }

        /// Receive snapshots until one matches
        pub async fn wait_for_state(
            &mut self,
            pred: impl Fn(&DiscoveryState) -> bool,
        ) -> DiscoveryState {
            match self
                .wait_for(|e| matches!(e, SelectorEvent::StateChanged(s) if pred(s)))
                .await
            {
                SelectorEvent::StateChanged(state) => state,
                _ => unreachable!(),
            }
        }

        /// Wait until a discovery has finished loading
        pub async fn wait_loaded(&mut self) -> DiscoveryState {
            self.wait_for_state(|s| s.has_loaded() && !s.is_loading())
                .await
        }
    }

    pub fn usb_record(bus: u8, address: u8, serial_number: &str) -> UsbRecord {
        UsbRecord {
            bus_number: Some(bus),
            device_address: Some(address),
            serial_number: Some(serial_number.to_string()),
            ..Default::default()
        }
    }

    pub fn serial_record(path: &str, serial_number: &str) -> SerialPortRecord {
        SerialPortRecord {
            serial_number: Some(serial_number.to_string()),
            ..SerialPortRecord::new(path)
        }
    }

    pub fn scenario_bench() -> Bench {
        Bench::new(
            vec![usb_record(1, 2, "ABC_654321")],
            vec![serial_record("/dev/ttyUSB0", "111111")],
        )
    }
}

use helpers::*;

// ============================================================================
// Discovery Tests
// ============================================================================

mod discovery_tests {
    use super::*;

    #[tokio::test]
    async fn merges_usb_then_serial() {
        let bench = scenario_bench();
        let mut running = bench.spawn();

        running.handle.load_devices().await.unwrap();
        let state = running.wait_loaded().await;

        assert_eq!(
            state.devices(),
            &[
                Device::usb(1, 2).with_serial_number("654321"),
                Device::serial("/dev/ttyUSB0").with_serial_number("111111"),
            ]
        );
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn loading_is_signalled_immediately() {
        let bench = scenario_bench();
        bench
            .serial
            .push_script(Scripted::records(vec![]).after(Duration::from_secs(1)));
        let mut running = bench.spawn();

        running.handle.load_devices().await.unwrap();
        let state = running.wait_for_state(|s| s.is_loading()).await;

        assert!(state.devices().is_empty());
        assert!(!state.has_loaded());
    }

    #[tokio::test]
    async fn failure_keeps_previous_devices() {
        let bench = scenario_bench();
        let mut running = bench.spawn();
        running.handle.load_devices().await.unwrap();
        let loaded = running.wait_loaded().await;

        bench.usb.push_script(Scripted::failure("LIBUSB_ERROR_ACCESS"));
        running.handle.load_devices().await.unwrap();

        let event = running
            .wait_for(|e| matches!(e, SelectorEvent::DevicesLoadFailed { .. }))
            .await;
        let SelectorEvent::DevicesLoadFailed { message } = event else {
            unreachable!()
        };
        assert_eq!(
            message,
            "Unable to load devices: Unable to get USB devices: LIBUSB_ERROR_ACCESS"
        );

        let state = running.handle.state().await.unwrap();
        assert!(!state.is_loading());
        assert_eq!(state.devices(), loaded.devices());
    }

    #[tokio::test]
    async fn serial_failure_fails_whole_cycle() {
        let bench = scenario_bench();
        bench.serial.push_script(Scripted::failure("enumeration failed"));
        let mut running = bench.spawn();

        running.handle.load_devices().await.unwrap();
        running
            .wait_for(|e| matches!(e, SelectorEvent::DevicesLoadFailed { .. }))
            .await;

        let state = running.handle.state().await.unwrap();
        assert!(state.devices().is_empty());
        assert!(!state.is_loading());
        assert!(!state.has_loaded());
    }

    #[tokio::test]
    async fn usb_stack_unavailable_fails_discovery() {
        let bench = scenario_bench();
        let mut running =
            bench.spawn_with_usb(UsbEnumerator::new(RusbBus::with_init(|| Err(rusb::Error::Access))));

        running.handle.load_devices().await.unwrap();
        let event = running
            .wait_for(|e| matches!(e, SelectorEvent::DevicesLoadFailed { .. }))
            .await;

        let SelectorEvent::DevicesLoadFailed { message } = event else {
            unreachable!()
        };
        assert!(
            message.starts_with(
                "Unable to load devices: Unable to get USB devices: unable to initialize libusb"
            ),
            "{}",
            message
        );

        let state = running.handle.state().await.unwrap();
        assert!(!state.is_loading());
        assert!(!state.has_loaded());
    }

    #[tokio::test]
    async fn windows_serial_numbers_come_from_facade() {
        let mut bench = Bench::new(
            vec![],
            vec![
                SerialPortRecord {
                    vid: Some(segger::VID),
                    ..SerialPortRecord::new("COM3")
                },
                SerialPortRecord::new("COM1"),
            ],
        );
        bench.platform = Platform::Windows;
        bench.facade = SimFacade::new().with_serial_number("COM3", "SEGGER_000683000000");
        let mut running = bench.spawn();

        running.handle.load_devices().await.unwrap();
        let state = running.wait_loaded().await;

        assert_eq!(state.devices().len(), 2);
        assert_eq!(
            state.devices()[0].serial_number.as_deref(),
            Some("000683000000")
        );
        assert_eq!(state.devices()[1].serial_number, None);
        assert_eq!(bench.facade.queries(), 1);
    }

    #[tokio::test]
    async fn windows_facade_failure_fails_cycle() {
        let mut bench = Bench::new(
            vec![],
            vec![SerialPortRecord {
                vid: Some(segger::VID),
                ..SerialPortRecord::new("COM3")
            }],
        );
        bench.platform = Platform::Windows;
        bench.facade = SimFacade::failing("registry unavailable");
        let mut running = bench.spawn();

        running.handle.load_devices().await.unwrap();
        let event = running
            .wait_for(|e| matches!(e, SelectorEvent::DevicesLoadFailed { .. }))
            .await;

        let SelectorEvent::DevicesLoadFailed { message } = event else {
            unreachable!()
        };
        assert!(message.contains("registry unavailable"));
    }

    #[tokio::test(start_paused = true)]
    async fn last_resolved_discovery_wins() {
        let bench = Bench::new(vec![], vec![]);
        bench.serial.push_script(
            Scripted::records(vec![serial_record("/dev/ttyACM0", "AAA")])
                .after(Duration::from_millis(50)),
        );
        bench.serial.push_script(
            Scripted::records(vec![
                serial_record("/dev/ttyACM1", "BBB"),
                serial_record("/dev/ttyACM2", "CCC"),
            ])
            .after(Duration::from_millis(10)),
        );
        let mut running = bench.spawn();

        running.handle.load_devices().await.unwrap();
        running.handle.load_devices().await.unwrap();

        let first = running.wait_loaded().await;
        assert_eq!(first.devices().len(), 2);

        let last = running
            .wait_for_state(|s| s.devices().len() == 1)
            .await;
        assert_eq!(last.devices()[0].serial_number.as_deref(), Some("AAA"));

        let state = running.handle.state().await.unwrap();
        assert_eq!(state.devices(), last.devices());
    }
}

// ============================================================================
// Toggle Tests
// ============================================================================

mod toggle_tests {
    use super::*;

    #[tokio::test]
    async fn expanding_runs_one_discovery() {
        let bench = scenario_bench();
        let mut running = bench.spawn();

        running.handle.toggle_selector().await.unwrap();
        let state = running.wait_loaded().await;

        assert!(state.is_selector_expanded());
        assert_eq!(state.devices().len(), 2);
        assert_eq!(bench.usb.calls(), 1);
        assert_eq!(bench.serial.calls(), 1);
    }

    #[tokio::test]
    async fn loading_starts_before_expansion() {
        let bench = scenario_bench();
        let mut running = bench.spawn();

        running.handle.toggle_selector().await.unwrap();

        let first = running
            .wait_for(|e| matches!(e, SelectorEvent::StateChanged(_)))
            .await;
        let SelectorEvent::StateChanged(first) = first else {
            unreachable!()
        };
        assert!(first.is_loading());
        assert!(!first.is_selector_expanded());

        let second = running
            .wait_for_state(|s| s.is_selector_expanded())
            .await;
        assert!(second.is_loading());
    }

    #[tokio::test]
    async fn collapsing_runs_no_discovery() {
        let bench = scenario_bench();
        let mut running = bench.spawn();
        running.handle.toggle_selector().await.unwrap();
        running.wait_loaded().await;

        running.handle.toggle_selector().await.unwrap();
        let state = running.handle.state().await.unwrap();

        assert!(!state.is_selector_expanded());
        assert!(!state.is_loading());
        assert_eq!(bench.usb.calls(), 1);
    }
}

// ============================================================================
// Selection Tests
// ============================================================================

mod selection_tests {
    use super::*;

    #[tokio::test]
    async fn usb_selection_skips_liveness_check() {
        let bench = scenario_bench();
        let mut running = bench.spawn();
        let device = Device::usb(1, 2).with_serial_number("654321");

        running.handle.select_device(device.clone()).await.unwrap();
        let event = running
            .wait_for(|e| matches!(e, SelectorEvent::DeviceSelected(_)))
            .await;

        assert!(matches!(event, SelectorEvent::DeviceSelected(d) if d == device));
        let state = running.handle.state().await.unwrap();
        assert_eq!(state.selected_device(), Some(&device));
        assert!(bench.probe.checked().is_empty());
    }

    #[tokio::test]
    async fn serial_selection_checks_port() {
        let bench = scenario_bench();
        let mut running = bench.spawn();
        let device = Device::serial("/dev/ttyUSB0").with_serial_number("111111");

        running.handle.select_device(device.clone()).await.unwrap();
        running
            .wait_for(|e| matches!(e, SelectorEvent::DeviceSelected(_)))
            .await;

        let state = running.handle.state().await.unwrap();
        assert_eq!(state.selected_device(), Some(&device));
        assert_eq!(bench.probe.checked(), vec!["/dev/ttyUSB0".to_string()]);
    }

    #[tokio::test]
    async fn busy_serial_port_is_rejected() {
        let bench = scenario_bench();
        bench.probe.set_busy("/dev/ttyUSB0", true);
        let mut running = bench.spawn();
        let previous = Device::usb(1, 2).with_serial_number("654321");
        running.handle.select_device(previous.clone()).await.unwrap();
        running
            .wait_for(|e| matches!(e, SelectorEvent::DeviceSelected(_)))
            .await;

        let device = Device::serial("/dev/ttyUSB0").with_serial_number("111111");
        running.handle.select_device(device.clone()).await.unwrap();
        let event = running
            .wait_for(|e| matches!(e, SelectorEvent::SelectionRejected { .. }))
            .await;

        let SelectorEvent::SelectionRejected { device: rejected, message } = event else {
            unreachable!()
        };
        assert_eq!(rejected, device);
        assert_eq!(message, BUSY_REASON);

        let state = running.handle.state().await.unwrap();
        assert_eq!(state.selected_device(), Some(&previous));
    }

    #[tokio::test]
    async fn deselect_clears_selection() {
        let bench = scenario_bench();
        let mut running = bench.spawn();
        running
            .handle
            .select_device(Device::usb(1, 2))
            .await
            .unwrap();

        running.handle.deselect_device().await.unwrap();
        running
            .wait_for(|e| matches!(e, SelectorEvent::DeviceDeselected))
            .await;

        let state = running.handle.state().await.unwrap();
        assert!(state.selected_device().is_none());
    }

    #[tokio::test]
    async fn selection_survives_rediscovery() {
        let bench = scenario_bench();
        let mut running = bench.spawn();
        let device = Device::usb(9, 9).with_serial_number("gone");
        running.handle.select_device(device.clone()).await.unwrap();

        running.handle.load_devices().await.unwrap();
        running.wait_loaded().await;

        let state = running.handle.state().await.unwrap();
        assert_eq!(state.selected_device(), Some(&device));
        assert!(!state.devices().contains(&device));
    }
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

mod lifecycle_tests {
    use super::*;
    use dev_select::SelectorError;

    #[tokio::test]
    async fn shutdown_stops_actor() {
        let bench = scenario_bench();
        let running = bench.spawn();

        running.handle.shutdown().await.unwrap();
        running.task.await.unwrap();

        assert!(matches!(
            running.handle.load_devices().await,
            Err(SelectorError::Closed)
        ));
    }
}
