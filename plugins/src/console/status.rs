use std::sync::Mutex;

use tlcrun_core::api::{StatusItem, StatusSurface};

use super::render::Markers;
use super::{write_lines, SharedWriter};

const SPIN_ICON: &str = "$(gear~spin)";

/// Writes a status line whenever the shown item changes.
pub struct ConsoleStatus {
    out: SharedWriter,
    markers: Markers,
    shown: Mutex<Option<StatusItem>>,
}

impl ConsoleStatus {
    pub fn new(out: SharedWriter, markers: Markers) -> Self {
        Self {
            out,
            markers,
            shown: Mutex::new(None),
        }
    }

    pub fn current(&self) -> Option<StatusItem> {
        self.shown.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn render(&self, item: &StatusItem) -> String {
        let text = item.text.replace(SPIN_ICON, self.markers.busy);
        format!("[{}] {}", text.trim(), item.tooltip)
    }
}

impl StatusSurface for ConsoleStatus {
    fn show(&self, item: &StatusItem) {
        let changed = {
            let mut shown = self.shown.lock().unwrap_or_else(|p| p.into_inner());
            let changed = shown.as_ref() != Some(item);
            *shown = Some(item.clone());
            changed
        };
        if changed {
            write_lines(&self.out, &[self.render(item)]);
        }
    }

    fn hide(&self) {
        let was_shown = self
            .shown
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take()
            .is_some();
        if was_shown {
            tracing::debug!(target: "tlcrun.console", "status hidden");
        }
    }
}
