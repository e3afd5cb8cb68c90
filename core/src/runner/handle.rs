use std::sync::Arc;

use tokio::io::AsyncRead;
use tokio::sync::oneshot;

pub type ProcessOutput = Box<dyn AsyncRead + Unpin + Send>;

/// How a process ended, as observed by whoever owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Normalized exit code; `None` when the owner went away without reporting.
    pub code: Option<i32>,
    /// Set when the exit followed a termination request.
    pub terminated: bool,
}

impl ProcessExit {
    pub fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            terminated: false,
        }
    }

    pub fn killed(code: Option<i32>) -> Self {
        Self {
            code,
            terminated: true,
        }
    }

    pub fn lost() -> Self {
        Self {
            code: None,
            terminated: false,
        }
    }
}

/// Termination side of a running process.
pub trait ProcessControl: Send + Sync {
    /// Requests termination and returns immediately; exit is reported via [`Completion`].
    fn terminate(&self) -> anyhow::Result<()>;
}

/// Fires once when the process has exited.
pub struct Completion {
    rx: oneshot::Receiver<ProcessExit>,
}

impl Completion {
    pub fn new(rx: oneshot::Receiver<ProcessExit>) -> Self {
        Self { rx }
    }

    /// A dropped sender counts as completion: nobody can report an exit anymore.
    pub async fn wait(self) -> ProcessExit {
        self.rx.await.unwrap_or_else(|_| ProcessExit::lost())
    }
}

/// One spawned external process.
pub struct ProcessHandle {
    pid: Option<u32>,
    stdout: Option<ProcessOutput>,
    control: Arc<dyn ProcessControl>,
    completion: Completion,
}

impl ProcessHandle {
    pub fn new(
        pid: Option<u32>,
        stdout: ProcessOutput,
        control: Arc<dyn ProcessControl>,
        completion: Completion,
    ) -> Self {
        Self {
            pid,
            stdout: Some(stdout),
            control,
            completion,
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn into_parts(self) -> (Option<ProcessOutput>, Arc<dyn ProcessControl>, Completion) {
        (self.stdout, self.control, self.completion)
    }
}
