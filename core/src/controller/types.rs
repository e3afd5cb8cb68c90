use std::sync::Arc;

use crate::document::EditorContext;
use crate::runner::{OutputParser, ToolLauncher};
use crate::surface::{DiagnosticsSink, Notifier, ResultView, StatusSurface};

pub const TLC_TOOL_ID: &str = "tlc2.TLC";

/// Fixed TLC invocation: model-check mode, coverage every minute, tool output.
pub const TLC_CHECK_ARGS: [&str; 4] = ["-modelcheck", "-coverage", "1", "-tool"];

pub const MSG_ALREADY_RUNNING: &str = "Another model checking process is currently running";
pub const ACTION_SHOW_RUNNING: &str = "Show currently running process";
pub const MSG_NO_EDITOR: &str = "No editor is active, cannot find a TLA+ model to check";
pub const MSG_NOT_TLA: &str =
    "File in the active editor is not a TLA+ file, it cannot be checked as a model";
pub const MSG_NOTHING_RUNNING: &str = "There are no currently running model checking processes";

/// Collaborators the controller drives.
pub struct ControllerDeps {
    pub launcher: Arc<dyn ToolLauncher>,
    pub parser: Arc<dyn OutputParser>,
    pub view: Arc<dyn ResultView>,
    pub sink: Arc<dyn DiagnosticsSink>,
    pub notifier: Arc<dyn Notifier>,
    pub status_surface: Arc<dyn StatusSurface>,
    pub editor: Arc<dyn EditorContext>,
}

/// Why a start request was turned down. No state is changed on rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    AlreadyRunning,
    NoActiveEditor,
    NotTlaFile,
}

impl Rejection {
    pub fn message(self) -> &'static str {
        match self {
            Rejection::AlreadyRunning => MSG_ALREADY_RUNNING,
            Rejection::NoActiveEditor => MSG_NO_EDITOR,
            Rejection::NotTlaFile => MSG_NOT_TLA,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Output was read to the end and diagnostics were applied.
    Completed { diagnostics: usize },
    Rejected(Rejection),
    /// The run failed; the message was shown to the user.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    TerminationRequested,
    NothingRunning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Check(CheckOutcome),
    Stop(StopOutcome),
    Displayed,
}
