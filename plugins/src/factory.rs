use std::sync::Arc;

use tlcrun_core::api::{
    AppConfig, CheckController, ControllerDeps, DiagnosticsSink, OutputParser, ToolLauncher,
};

use crate::console::{
    stderr_writer, ConsoleNotifier, ConsoleResultView, ConsoleStatus, Markers, SharedWriter,
};
use crate::editor::SessionEditor;
use crate::launcher::JavaToolLauncher;
use crate::parser::TlcToolOutputParser;
use crate::sink::JsonlDiagnosticsSink;

pub fn build_launcher(cfg: &AppConfig) -> Arc<dyn ToolLauncher> {
    Arc::new(JavaToolLauncher::from_config(cfg))
}

pub fn build_parser(_cfg: &AppConfig) -> Arc<dyn OutputParser> {
    Arc::new(TlcToolOutputParser::default())
}

pub fn build_sink(cfg: &AppConfig) -> Arc<dyn DiagnosticsSink> {
    Arc::new(JsonlDiagnosticsSink::new(cfg.diagnostics.path.clone()))
}

/// A controller wired to the console surfaces, plus the editor it reads from.
pub struct ConsoleSession {
    pub controller: CheckController,
    pub editor: Arc<SessionEditor>,
}

pub fn build_console_session(cfg: &AppConfig) -> ConsoleSession {
    build_console_session_with(cfg, stderr_writer())
}

pub fn build_console_session_with(cfg: &AppConfig, out: SharedWriter) -> ConsoleSession {
    let markers = Markers::select(cfg.console.ascii);
    let editor = Arc::new(SessionEditor::default());

    let controller = CheckController::new(ControllerDeps {
        launcher: build_launcher(cfg),
        parser: build_parser(cfg),
        view: Arc::new(ConsoleResultView::new(out.clone(), markers)),
        sink: build_sink(cfg),
        notifier: Arc::new(ConsoleNotifier::new(out.clone(), cfg.console.accept_offers)),
        status_surface: Arc::new(ConsoleStatus::new(out, markers)),
        editor: editor.clone(),
    });

    ConsoleSession { controller, editor }
}
