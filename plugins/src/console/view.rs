use std::sync::Mutex;

use tlcrun_core::api::{CheckSnapshot, ResultView};

use super::render::{header, render_summary, render_update, Markers, RenderCursor};
use super::{write_lines, SharedWriter};

#[derive(Default)]
struct ViewState {
    cursor: RenderCursor,
    last: Option<CheckSnapshot>,
}

/// Prints run progress as it arrives and a summary on request.
pub struct ConsoleResultView {
    out: SharedWriter,
    markers: Markers,
    state: Mutex<ViewState>,
}

impl ConsoleResultView {
    pub fn new(out: SharedWriter, markers: Markers) -> Self {
        Self {
            out,
            markers,
            state: Mutex::new(ViewState::default()),
        }
    }

    pub fn last_snapshot(&self) -> Option<CheckSnapshot> {
        self.lock().last.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl ResultView for ConsoleResultView {
    fn reveal_empty(&self) {
        *self.lock() = ViewState::default();
        write_lines(&self.out, &[header(&self.markers)]);
    }

    fn update(&self, snapshot: CheckSnapshot) {
        let lines = {
            let mut state = self.lock();
            let lines = render_update(&mut state.cursor, &snapshot, &self.markers);
            state.last = Some(snapshot);
            lines
        };
        write_lines(&self.out, &lines);
    }

    fn reveal(&self) {
        let lines = render_summary(self.lock().last.as_ref(), &self.markers);
        write_lines(&self.out, &lines);
    }
}
