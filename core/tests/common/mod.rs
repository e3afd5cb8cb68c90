//! Fake collaborators for driving `CheckController` in tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::sync::{oneshot, Notify};

use tlcrun_core::api::{
    ActiveDocument, CheckController, CheckSnapshot, Completion, ControllerDeps, Diagnostic,
    DiagnosticCollection, DiagnosticsSink, EditorContext, Notifier, OutputParser, ProcessControl,
    ProcessExit, ProcessHandle, ProcessOutput, Range, ResultView, Severity, StatusItem,
    StatusSurface, ToolLauncher,
};

pub const SPEC: &str = "/specs/Queue.tla";

#[derive(Default)]
pub struct FakeEditor {
    pub doc: Mutex<Option<ActiveDocument>>,
}

impl FakeEditor {
    pub fn open(&self, path: &str) {
        *self.doc.lock().unwrap() = Some(ActiveDocument::from_path(path));
    }

    pub fn close(&self) {
        *self.doc.lock().unwrap() = None;
    }
}

impl EditorContext for FakeEditor {
    fn active_document(&self) -> Option<ActiveDocument> {
        self.doc.lock().unwrap().clone()
    }
}

/// Process side controlled by the test: it writes stdout lines and decides when
/// the process exits.
pub struct FakeControl {
    stdout: tokio::sync::Mutex<Option<DuplexStream>>,
    exit_tx: Mutex<Option<oneshot::Sender<ProcessExit>>>,
    terminations: AtomicUsize,
}

impl FakeControl {
    pub async fn write_line(&self, line: &str) {
        let mut guard = self.stdout.lock().await;
        if let Some(w) = guard.as_mut() {
            w.write_all(format!("{line}\n").as_bytes()).await.unwrap();
        }
    }

    /// Ends the stdout stream without exiting.
    pub async fn close_stdout(&self) {
        self.stdout.lock().await.take();
    }

    pub fn exit(&self, code: i32) -> bool {
        match self.exit_tx.lock().unwrap().take() {
            Some(tx) => tx.send(ProcessExit::exited(code)).is_ok(),
            None => false,
        }
    }

    pub fn terminations(&self) -> usize {
        self.terminations.load(Ordering::SeqCst)
    }
}

impl ProcessControl for FakeControl {
    fn terminate(&self) -> anyhow::Result<()> {
        self.terminations.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut stdout) = self.stdout.try_lock() {
            stdout.take();
        }
        if let Some(tx) = self.exit_tx.lock().unwrap().take() {
            let _ = tx.send(ProcessExit::killed(Some(137)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnCall {
    pub tool: String,
    pub file: PathBuf,
    pub args: Vec<String>,
}

#[derive(Default)]
pub struct FakeLauncher {
    pub calls: Mutex<Vec<SpawnCall>>,
    pub processes: Mutex<Vec<Arc<FakeControl>>>,
    pub fail_with: Mutex<Option<String>>,
    /// When set, spawning waits until the gate is opened.
    pub gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeLauncher {
    pub fn spawn_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn process(&self, index: usize) -> Arc<FakeControl> {
        self.processes.lock().unwrap()[index].clone()
    }

    pub fn close_gate(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl ToolLauncher for FakeLauncher {
    fn name(&self) -> &str {
        "fake"
    }

    async fn spawn(
        &self,
        tool_id: &str,
        file: &Path,
        args: &[String],
    ) -> anyhow::Result<ProcessHandle> {
        self.calls.lock().unwrap().push(SpawnCall {
            tool: tool_id.to_string(),
            file: file.to_path_buf(),
            args: args.to_vec(),
        });

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if let Some(msg) = self.fail_with.lock().unwrap().clone() {
            anyhow::bail!(msg);
        }

        let (reader, writer) = tokio::io::duplex(4096);
        let (exit_tx, exit_rx) = oneshot::channel();
        let control = Arc::new(FakeControl {
            stdout: tokio::sync::Mutex::new(Some(writer)),
            exit_tx: Mutex::new(Some(exit_tx)),
            terminations: AtomicUsize::new(0),
        });
        self.processes.lock().unwrap().push(control.clone());

        Ok(ProcessHandle::new(
            Some(4242),
            Box::new(reader),
            control,
            Completion::new(exit_rx),
        ))
    }
}

/// Line protocol: `snap:<text>` emits a snapshot, `diag:<text>` adds a final
/// diagnostic, `fail` aborts the read.
pub struct LineParser;

#[async_trait]
impl OutputParser for LineParser {
    async fn read_all(
        &self,
        output: ProcessOutput,
        file: &Path,
        on_snapshot: &mut (dyn FnMut(CheckSnapshot) + Send),
    ) -> anyhow::Result<DiagnosticCollection> {
        let mut lines = BufReader::new(output).lines();
        let mut collection = DiagnosticCollection::for_file(file);
        while let Some(line) = lines.next_line().await? {
            if let Some(text) = line.strip_prefix("snap:") {
                let mut snapshot = CheckSnapshot::new(file);
                snapshot.output_lines.push(text.to_string());
                on_snapshot(snapshot);
            } else if let Some(text) = line.strip_prefix("diag:") {
                collection.add(
                    file.to_path_buf(),
                    Diagnostic {
                        range: Range::default(),
                        severity: Severity::Error,
                        message: text.to_string(),
                    },
                );
            } else if line == "fail" {
                anyhow::bail!("malformed checker output");
            }
        }
        Ok(collection)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    RevealEmpty,
    Update(String),
    Reveal,
}

#[derive(Default)]
pub struct RecordingView {
    pub events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ResultView for RecordingView {
    fn reveal_empty(&self) {
        self.events.lock().unwrap().push(ViewEvent::RevealEmpty);
    }

    fn update(&self, snapshot: CheckSnapshot) {
        let text = snapshot.output_lines.join("|");
        self.events.lock().unwrap().push(ViewEvent::Update(text));
    }

    fn reveal(&self) {
        self.events.lock().unwrap().push(ViewEvent::Reveal);
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub applied: Mutex<Vec<DiagnosticCollection>>,
    pub fail_with: Mutex<Option<String>>,
}

#[async_trait]
impl DiagnosticsSink for RecordingSink {
    async fn apply(&self, collection: DiagnosticCollection) -> anyhow::Result<()> {
        if let Some(msg) = self.fail_with.lock().unwrap().clone() {
            anyhow::bail!(msg);
        }
        self.applied.lock().unwrap().push(collection);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Info(String),
    Warn(String),
    WarnWithAction(String, String),
    Error(String),
}

pub struct RecordingNotifier {
    pub messages: Mutex<Vec<Message>>,
    pub accept_offers: bool,
}

impl RecordingNotifier {
    pub fn new(accept_offers: bool) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            accept_offers,
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(Message::Info(message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(Message::Warn(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(Message::Error(message.to_string()));
    }

    async fn warn_with_action(&self, message: &str, action: &str) -> bool {
        self.messages.lock().unwrap().push(Message::WarnWithAction(
            message.to_string(),
            action.to_string(),
        ));
        self.accept_offers
    }
}

#[derive(Default)]
pub struct RecordingStatus {
    pub shown: Mutex<Vec<StatusItem>>,
    pub hides: AtomicUsize,
}

impl StatusSurface for RecordingStatus {
    fn show(&self, item: &StatusItem) {
        self.shown.lock().unwrap().push(item.clone());
    }

    fn hide(&self) {
        self.hides.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub controller: CheckController,
    pub editor: Arc<FakeEditor>,
    pub launcher: Arc<FakeLauncher>,
    pub view: Arc<RecordingView>,
    pub sink: Arc<RecordingSink>,
    pub notifier: Arc<RecordingNotifier>,
    pub status: Arc<RecordingStatus>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_offers(true)
    }

    pub fn with_offers(accept_offers: bool) -> Self {
        let editor = Arc::new(FakeEditor::default());
        editor.open(SPEC);
        let launcher = Arc::new(FakeLauncher::default());
        let view = Arc::new(RecordingView::default());
        let sink = Arc::new(RecordingSink::default());
        let notifier = Arc::new(RecordingNotifier::new(accept_offers));
        let status = Arc::new(RecordingStatus::default());

        let controller = CheckController::new(ControllerDeps {
            launcher: launcher.clone(),
            parser: Arc::new(LineParser),
            view: view.clone(),
            sink: sink.clone(),
            notifier: notifier.clone(),
            status_surface: status.clone(),
            editor: editor.clone(),
        });

        Self {
            controller,
            editor,
            launcher,
            view,
            sink,
            notifier,
            status,
        }
    }

    pub fn start(&self) -> tokio::task::JoinHandle<tlcrun_core::api::CheckOutcome> {
        let controller = self.controller.clone();
        tokio::spawn(async move { controller.check_model().await })
    }

    /// Waits until the `n`-th process is spawned and its view was opened.
    pub async fn spawned(&self, n: usize) -> Arc<FakeControl> {
        eventually(|| {
            let opened = self
                .view
                .events()
                .iter()
                .filter(|e| **e == ViewEvent::RevealEmpty)
                .count();
            self.launcher.processes.lock().unwrap().len() >= n && opened >= n
        })
        .await;
        self.launcher.process(n - 1)
    }

    pub async fn idle(&self) {
        tokio::time::timeout(Duration::from_secs(5), self.controller.wait_idle())
            .await
            .expect("run slot was never released");
    }
}

pub async fn eventually<F: Fn() -> bool>(cond: F) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
