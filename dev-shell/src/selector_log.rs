//! Built-in plugin that reports selector activity through the log

use dev_select::{DeviceFilter, SelectorEvent, SelectorView};
use tracing::{debug, info};

use crate::error::ShellError;
use crate::plugin::{HostContext, Plugin};

/// Logs selections, load failures and the selector contents
#[derive(Default)]
pub struct SelectorLog {
    filter: DeviceFilter,
    last_view: Option<SelectorView>,
}

impl SelectorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the selector as text, one entry per line
    pub fn render(view: &SelectorView) -> String {
        let mut lines = vec![format!(
            "[{}] {}",
            if view.is_expanded { "-" } else { "+" },
            view.toggle_label
        )];
        if view.is_expanded {
            lines.extend(view.items.iter().map(|item| format!("  {}", item.label)));
            if view.show_close_item {
                lines.push(format!("  {}", dev_select::CLOSE_DEVICE_LABEL));
            }
        }
        lines.join("\n")
    }
}

impl Plugin for SelectorLog {
    fn name(&self) -> &str {
        "selector-log"
    }

    fn on_init(&mut self, ctx: &HostContext) -> Result<(), ShellError> {
        self.filter = DeviceFilter::Selector(ctx.selector_type);
        Ok(())
    }

    fn on_event(&mut self, _ctx: &HostContext, event: &SelectorEvent) {
        match event {
            SelectorEvent::StateChanged(state) => {
                let view = SelectorView::new(state, &self.filter);
                if self.last_view.as_ref() != Some(&view) {
                    debug!("Selector:\n{}", Self::render(&view));
                    self.last_view = Some(view);
                }
            }
            // The selector already warned about the failure
            SelectorEvent::DevicesLoadFailed { message } => {
                debug!("Device list not refreshed: {}", message);
            }
            SelectorEvent::DeviceSelected(device) => {
                info!("Device selected: {}", device);
            }
            SelectorEvent::DeviceDeselected => {
                info!("Device deselected");
            }
            SelectorEvent::SelectionRejected { device, .. } => {
                info!("Selection of {} rejected", device);
            }
        }
    }
}
