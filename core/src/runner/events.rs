use std::path::PathBuf;

use uuid::Uuid;

/// Run lifecycle as published to hosts.
///
/// This lives under `core::runner` so hosts can wait on run state without
/// depending on any presentation code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Starting {
        run_id: Uuid,
        file: PathBuf,
    },
    Running {
        run_id: Uuid,
        file: PathBuf,
        pid: Option<u32>,
    },
}

impl RunState {
    pub fn is_idle(&self) -> bool {
        matches!(self, RunState::Idle)
    }
}
