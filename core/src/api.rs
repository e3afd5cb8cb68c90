//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `tlcrun_core::api` instead of reaching into internal modules.

pub use crate::commands::{
    Command, CMD_CHECK_MODEL_DISPLAY, CMD_CHECK_MODEL_RUN, CMD_CHECK_MODEL_STOP,
};
pub use crate::config::{
    AppConfig, ConsoleConfig, DiagnosticsOutConfig, JavaConfig, LoggingConfig, ToolsConfig,
};
pub use crate::controller::{
    CheckController, CheckOutcome, CommandOutcome, ControllerDeps, Rejection, StopOutcome,
    TLC_CHECK_ARGS, TLC_TOOL_ID,
};
pub use crate::document::{ActiveDocument, EditorContext, TLA_LANGUAGE_ID};
pub use crate::error::{CheckError, CliError, ConfigError};
pub use crate::model::{
    CheckPhase, CheckSnapshot, CheckVerdict, CoverageItem, Diagnostic, DiagnosticCollection,
    Position, ProgressStats, Range, ReportedError, Severity, SourceLocation,
};
pub use crate::runner::{
    normalize_exit, Completion, OutputParser, ProcessControl, ProcessExit, ProcessHandle,
    ProcessOutput, RunState, ToolLauncher,
};
pub use crate::status::IndicatorState;
pub use crate::surface::{DiagnosticsSink, Notifier, ResultView, StatusItem, StatusSurface};
