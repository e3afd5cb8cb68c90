use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::runner::ProcessControl;

/// The single in-flight run.
pub(crate) struct ActiveRun {
    pub(crate) id: Uuid,
    pub(crate) file: PathBuf,
    /// `None` while the process is still being spawned.
    pub(crate) control: Option<Arc<dyn ProcessControl>>,
    pub(crate) stop_requested: bool,
    /// Set by the failure path; the indicator stays hidden after release.
    pub(crate) failed: bool,
}

pub(crate) enum StopTarget {
    Process(Uuid, Arc<dyn ProcessControl>),
    /// Spawn in progress; termination is applied once the handle is attached.
    Deferred(Uuid),
    Nothing,
}

/// Holds zero or one [`ActiveRun`].
///
/// Callers that must keep other state in step with the slot (status indicator,
/// published run state) do so while holding the guard from [`RunSlot::lock`].
#[derive(Default)]
pub(crate) struct RunSlot {
    inner: Mutex<Option<ActiveRun>>,
}

impl RunSlot {
    pub(crate) fn lock(&self) -> MutexGuard<'_, Option<ActiveRun>> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub(crate) fn is_occupied(&self) -> bool {
        self.lock().is_some()
    }

    pub(crate) fn current_file(&self) -> Option<PathBuf> {
        self.lock().as_ref().map(|r| r.file.clone())
    }
}

pub(crate) fn reserve(slot: &mut Option<ActiveRun>, file: &Path) -> Option<Uuid> {
    if slot.is_some() {
        return None;
    }
    let id = Uuid::new_v4();
    *slot = Some(ActiveRun {
        id,
        file: file.to_path_buf(),
        control: None,
        stop_requested: false,
        failed: false,
    });
    Some(id)
}

/// Stores the process control for `id`; returns whether a stop arrived meanwhile.
pub(crate) fn attach(
    slot: &mut Option<ActiveRun>,
    id: Uuid,
    control: Arc<dyn ProcessControl>,
) -> bool {
    match slot.as_mut() {
        Some(run) if run.id == id => {
            run.control = Some(control);
            run.stop_requested
        }
        _ => false,
    }
}

/// Clears the slot only if it still holds `id`, handing back the released run.
pub(crate) fn release(slot: &mut Option<ActiveRun>, id: Uuid) -> Option<ActiveRun> {
    if slot.as_ref().is_some_and(|r| r.id == id) {
        slot.take()
    } else {
        None
    }
}

pub(crate) fn stop_target(slot: &mut Option<ActiveRun>) -> StopTarget {
    match slot.as_mut() {
        Some(run) => match &run.control {
            Some(control) => StopTarget::Process(run.id, control.clone()),
            None => {
                run.stop_requested = true;
                StopTarget::Deferred(run.id)
            }
        },
        None => StopTarget::Nothing,
    }
}
