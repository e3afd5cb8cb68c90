//! Terminal implementations of the presentation collaborators.
//!
//! Everything here writes to stderr so stdout stays free for diagnostics output.

mod notifier;
pub mod render;
mod status;
mod view;

use std::io::Write;
use std::sync::{Arc, Mutex};

pub use notifier::ConsoleNotifier;
pub use render::Markers;
pub use status::ConsoleStatus;
pub use view::ConsoleResultView;

pub type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

pub fn stderr_writer() -> SharedWriter {
    Arc::new(Mutex::new(Box::new(std::io::stderr())))
}

pub(crate) fn write_lines(out: &SharedWriter, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    let mut w = out.lock().unwrap_or_else(|p| p.into_inner());
    for line in lines {
        if let Err(e) = writeln!(w, "{line}") {
            tracing::debug!(target: "tlcrun.console", error = %e, "console write failed");
            return;
        }
    }
    let _ = w.flush();
}
