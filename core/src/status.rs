use std::sync::{Arc, Mutex};

use crate::commands::CMD_CHECK_MODEL_DISPLAY;
use crate::surface::{StatusItem, StatusSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndicatorState {
    /// Nothing rendered yet, or forced off after a failed start.
    #[default]
    Hidden,
    Idle,
    Active,
}

/// Status line entry reflecting whether a check is running.
///
/// Nothing reaches the surface until the first state change.
pub struct StatusIndicator {
    surface: Arc<dyn StatusSurface>,
    state: Mutex<IndicatorState>,
}

impl StatusIndicator {
    pub fn new(surface: Arc<dyn StatusSurface>) -> Self {
        Self {
            surface,
            state: Mutex::new(IndicatorState::Hidden),
        }
    }

    pub fn state(&self) -> IndicatorState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn set_active(&self, active: bool) {
        let item = status_item(active);
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        *state = if active {
            IndicatorState::Active
        } else {
            IndicatorState::Idle
        };
        self.surface.show(&item);
    }

    pub fn hide(&self) {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        *state = IndicatorState::Hidden;
        self.surface.hide();
    }
}

pub fn status_item(active: bool) -> StatusItem {
    StatusItem {
        text: if active {
            "TLC $(gear~spin)".to_string()
        } else {
            "TLC".to_string()
        },
        tooltip: if active {
            "TLA+ model checking is running".to_string()
        } else {
            "TLA+ model checking result".to_string()
        },
        command: CMD_CHECK_MODEL_DISPLAY,
    }
}
