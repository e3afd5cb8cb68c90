//! Run lifecycle controller.
//!
//! Owns the single in-flight model checking run: validates start requests,
//! spawns the checker, bridges parser snapshots to the result view, routes final
//! diagnostics to the sink and keeps the status indicator in step with the run.

mod slot;
mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::watch;
use uuid::Uuid;

use crate::commands::Command;
use crate::document::EditorContext;
use crate::error::CheckError;
use crate::model::CheckSnapshot;
use crate::runner::{
    Completion, OutputParser, ProcessControl, ProcessOutput, RunState, ToolLauncher,
};
use crate::status::{IndicatorState, StatusIndicator};
use crate::surface::{DiagnosticsSink, Notifier, ResultView};

use slot::{RunSlot, StopTarget};

pub use types::{
    CheckOutcome, CommandOutcome, ControllerDeps, Rejection, StopOutcome, ACTION_SHOW_RUNNING,
    MSG_ALREADY_RUNNING, MSG_NOTHING_RUNNING, MSG_NOT_TLA, MSG_NO_EDITOR, TLC_CHECK_ARGS,
    TLC_TOOL_ID,
};

struct Inner {
    launcher: Arc<dyn ToolLauncher>,
    parser: Arc<dyn OutputParser>,
    view: Arc<dyn ResultView>,
    sink: Arc<dyn DiagnosticsSink>,
    notifier: Arc<dyn Notifier>,
    editor: Arc<dyn EditorContext>,
    status: StatusIndicator,
    slot: RunSlot,
    state_tx: watch::Sender<RunState>,
}

/// Cheap to clone; all clones drive the same run slot.
#[derive(Clone)]
pub struct CheckController {
    inner: Arc<Inner>,
}

impl CheckController {
    pub fn new(deps: ControllerDeps) -> Self {
        let ControllerDeps {
            launcher,
            parser,
            view,
            sink,
            notifier,
            status_surface,
            editor,
        } = deps;
        let (state_tx, _) = watch::channel(RunState::Idle);
        Self {
            inner: Arc::new(Inner {
                launcher,
                parser,
                view,
                sink,
                notifier,
                editor,
                status: StatusIndicator::new(status_surface),
                slot: RunSlot::default(),
                state_tx,
            }),
        }
    }

    pub async fn execute(&self, command: Command) -> CommandOutcome {
        match command {
            Command::Run => CommandOutcome::Check(self.check_model().await),
            Command::Stop => CommandOutcome::Stop(self.stop_model_checking()),
            Command::Display => {
                self.display_model_checking();
                CommandOutcome::Displayed
            }
        }
    }

    /// Runs TLC on the active TLA+ document.
    ///
    /// Resolves once the checker output has been read to the end and diagnostics
    /// were applied, or once the run failed. The slot itself is released by the
    /// completion hook when the process exits.
    ///
    /// Dropping the future releases a reservation that has no process yet, or
    /// terminates the attached process so the completion hook can clean up.
    pub async fn check_model(&self) -> CheckOutcome {
        let (run_id, file) = match self.reserve() {
            Ok(reserved) => reserved,
            Err(rejection) => {
                self.report_rejection(rejection).await;
                return CheckOutcome::Rejected(rejection);
            }
        };

        tracing::info!(
            target: "tlcrun.controller",
            run_id = %run_id,
            file = %file.display(),
            "model checking started"
        );

        let mut reservation = Reservation::new(&self.inner, run_id);
        let result = self.run_pipeline(&mut reservation, &file).await;
        reservation.finish();

        match result {
            Ok(diagnostics) => {
                tracing::info!(
                    target: "tlcrun.controller",
                    run_id = %run_id,
                    diagnostics,
                    "model checking output processed"
                );
                CheckOutcome::Completed { diagnostics }
            }
            Err(err) => {
                let message = err.to_string();
                tracing::error!(
                    target: "tlcrun.controller",
                    run_id = %run_id,
                    error = %message,
                    "model checking failed"
                );
                if let Some(control) = self.inner.fail_run(run_id) {
                    // Nobody reads stdout anymore; the process has to go so the
                    // completion hook releases the slot.
                    if let Err(e) = control.terminate() {
                        tracing::debug!(
                            target: "tlcrun.controller",
                            run_id = %run_id,
                            error = %e,
                            "termination after failure"
                        );
                    }
                }
                self.inner.notifier.error(&message);
                CheckOutcome::Failed(message)
            }
        }
    }

    /// Requests termination of the current run and returns immediately.
    pub fn stop_model_checking(&self) -> StopOutcome {
        let target = slot::stop_target(&mut self.inner.slot.lock());
        match target {
            StopTarget::Process(run_id, control) => {
                tracing::info!(target: "tlcrun.controller", run_id = %run_id, "stop requested");
                if let Err(e) = control.terminate() {
                    tracing::warn!(
                        target: "tlcrun.controller",
                        run_id = %run_id,
                        error = %e,
                        "termination request failed"
                    );
                }
                StopOutcome::TerminationRequested
            }
            StopTarget::Deferred(run_id) => {
                tracing::info!(
                    target: "tlcrun.controller",
                    run_id = %run_id,
                    "stop requested while spawning, deferring"
                );
                StopOutcome::TerminationRequested
            }
            StopTarget::Nothing => {
                self.inner.notifier.info(MSG_NOTHING_RUNNING);
                StopOutcome::NothingRunning
            }
        }
    }

    pub fn display_model_checking(&self) {
        self.inner.view.reveal();
    }

    pub fn is_running(&self) -> bool {
        self.inner.slot.is_occupied()
    }

    pub fn running_file(&self) -> Option<PathBuf> {
        self.inner.slot.current_file()
    }

    pub fn indicator(&self) -> IndicatorState {
        self.inner.status.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.inner.state_tx.subscribe()
    }

    /// Waits until no run occupies the slot.
    pub async fn wait_idle(&self) {
        let mut rx = self.subscribe();
        let _ = rx.wait_for(RunState::is_idle).await;
    }

    /// Checks preconditions and reserves the slot in one critical section.
    fn reserve(&self) -> Result<(Uuid, PathBuf), Rejection> {
        let mut slot = self.inner.slot.lock();
        if slot.is_some() {
            return Err(Rejection::AlreadyRunning);
        }
        let doc = self
            .inner
            .editor
            .active_document()
            .ok_or(Rejection::NoActiveEditor)?;
        if !doc.is_tla() {
            return Err(Rejection::NotTlaFile);
        }

        let file = absolute_path(&doc.path);
        let run_id = slot::reserve(&mut slot, &file).ok_or(Rejection::AlreadyRunning)?;
        self.inner.status.set_active(true);
        self.inner.state_tx.send_replace(RunState::Starting {
            run_id,
            file: file.clone(),
        });
        Ok((run_id, file))
    }

    async fn report_rejection(&self, rejection: Rejection) {
        tracing::debug!(
            target: "tlcrun.controller",
            reason = ?rejection,
            "start request rejected"
        );
        match rejection {
            Rejection::AlreadyRunning => {
                let accepted = self
                    .inner
                    .notifier
                    .warn_with_action(rejection.message(), ACTION_SHOW_RUNNING)
                    .await;
                if accepted {
                    self.inner.view.reveal();
                }
            }
            Rejection::NoActiveEditor | Rejection::NotTlaFile => {
                self.inner.notifier.warn(rejection.message());
            }
        }
    }

    /// spawn -> stream -> apply diagnostics. Every failure surfaces here once.
    async fn run_pipeline(
        &self,
        reservation: &mut Reservation<'_>,
        file: &Path,
    ) -> Result<usize, CheckError> {
        let run_id = reservation.run_id;
        let args: Vec<String> = TLC_CHECK_ARGS.iter().map(|s| s.to_string()).collect();
        let handle = self
            .inner
            .launcher
            .spawn(TLC_TOOL_ID, file, &args)
            .await
            .map_err(|source| CheckError::Spawn {
                tool: TLC_TOOL_ID.to_string(),
                source,
            })?;

        let pid = handle.pid();
        let (stdout, control, completion) = handle.into_parts();
        let stop_requested = {
            let mut slot = self.inner.slot.lock();
            let stop_requested = slot::attach(&mut slot, run_id, control.clone());
            self.inner.state_tx.send_replace(RunState::Running {
                run_id,
                file: file.to_path_buf(),
                pid,
            });
            stop_requested
        };
        reservation.attached(control.clone());
        Inner::spawn_completion_hook(self.inner.clone(), run_id, completion);
        tracing::debug!(
            target: "tlcrun.controller",
            run_id = %run_id,
            pid = ?pid,
            launcher = self.inner.launcher.name(),
            "checker process attached"
        );

        if stop_requested {
            if let Err(e) = control.terminate() {
                tracing::warn!(
                    target: "tlcrun.controller",
                    run_id = %run_id,
                    error = %e,
                    "deferred termination failed"
                );
            }
        }

        self.stream_and_apply(stdout, file).await
    }

    async fn stream_and_apply(
        &self,
        stdout: Option<ProcessOutput>,
        file: &Path,
    ) -> Result<usize, CheckError> {
        self.inner.view.reveal_empty();
        let stdout = stdout.ok_or(CheckError::MissingOutput)?;

        let view = self.inner.view.clone();
        let mut forward = move |snapshot: CheckSnapshot| view.update(snapshot);
        let collection = self
            .inner
            .parser
            .read_all(stdout, file, &mut forward)
            .await
            .map_err(CheckError::Stream)?;

        let total = collection.total();
        self.inner
            .sink
            .apply(collection)
            .await
            .map_err(CheckError::Diagnostics)?;
        Ok(total)
    }
}

impl Inner {
    /// Releases the slot exactly once when the process exits, whatever the cause.
    fn spawn_completion_hook(inner: Arc<Inner>, run_id: Uuid, completion: Completion) {
        tokio::spawn(async move {
            let exit = completion.wait().await;
            tracing::info!(
                target: "tlcrun.controller",
                run_id = %run_id,
                code = ?exit.code,
                terminated = exit.terminated,
                "checker process exited"
            );
            let mut slot = inner.slot.lock();
            if let Some(run) = slot::release(&mut slot, run_id) {
                if !run.failed {
                    inner.status.set_active(false);
                }
                inner.state_tx.send_replace(RunState::Idle);
            }
        });
    }

    /// Top-level failure path: force the indicator off and drop a reservation
    /// that never got a process. A slot taken over by another run is left alone.
    ///
    /// Returns the control of an attached process, which the caller terminates
    /// once the run is marked failed.
    fn fail_run(&self, run_id: Uuid) -> Option<Arc<dyn ProcessControl>> {
        let mut slot = self.slot.lock();
        let control = match slot.as_mut() {
            Some(run) if run.id != run_id => return None,
            Some(run) => {
                run.failed = true;
                run.control.clone()
            }
            None => None,
        };
        if control.is_none() && slot::release(&mut slot, run_id).is_some() {
            self.state_tx.send_replace(RunState::Idle);
        }
        self.status.hide();
        control
    }

    /// Drops a reservation whose start was cancelled before a process existed.
    fn abandon_reservation(&self, run_id: Uuid) {
        let mut slot = self.slot.lock();
        let unattached = slot
            .as_ref()
            .is_some_and(|run| run.id == run_id && run.control.is_none());
        if unattached && slot::release(&mut slot, run_id).is_some() {
            self.status.set_active(false);
            self.state_tx.send_replace(RunState::Idle);
            tracing::info!(
                target: "tlcrun.controller",
                run_id = %run_id,
                "start cancelled before the checker was attached"
            );
        }
    }
}

enum Stage {
    Reserved,
    Attached(Arc<dyn ProcessControl>),
    Done,
}

/// Guards a reserved run for as long as `check_model` is driving it.
struct Reservation<'a> {
    inner: &'a Inner,
    run_id: Uuid,
    stage: Stage,
}

impl<'a> Reservation<'a> {
    fn new(inner: &'a Inner, run_id: Uuid) -> Self {
        Self {
            inner,
            run_id,
            stage: Stage::Reserved,
        }
    }

    fn attached(&mut self, control: Arc<dyn ProcessControl>) {
        self.stage = Stage::Attached(control);
    }

    fn finish(&mut self) {
        self.stage = Stage::Done;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        match std::mem::replace(&mut self.stage, Stage::Done) {
            Stage::Done => {}
            Stage::Reserved => self.inner.abandon_reservation(self.run_id),
            Stage::Attached(control) => {
                tracing::info!(
                    target: "tlcrun.controller",
                    run_id = %self.run_id,
                    "start cancelled while streaming, terminating checker"
                );
                if let Err(e) = control.terminate() {
                    tracing::warn!(
                        target: "tlcrun.controller",
                        run_id = %self.run_id,
                        error = %e,
                        "termination after cancel failed"
                    );
                }
            }
        }
    }
}

fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_are_anchored_to_cwd() {
        let abs = absolute_path(Path::new("specs/Queue.tla"));
        assert!(abs.is_absolute());
        assert!(abs.ends_with("specs/Queue.tla"));
        assert_eq!(
            absolute_path(Path::new("/specs/Queue.tla")),
            PathBuf::from("/specs/Queue.tla")
        );
    }

    #[test]
    fn rejections_carry_user_messages() {
        assert_eq!(Rejection::AlreadyRunning.message(), MSG_ALREADY_RUNNING);
        assert!(Rejection::NoActiveEditor.message().starts_with("No editor is active"));
        assert!(Rejection::NotTlaFile.message().contains("not a TLA+ file"));
    }
}
