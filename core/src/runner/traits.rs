use std::path::Path;

use async_trait::async_trait;

use crate::model::{CheckSnapshot, DiagnosticCollection};

use super::handle::{ProcessHandle, ProcessOutput};

/// Spawns tools out of the verification toolbox (e.g. `tlc2.TLC`).
#[async_trait]
pub trait ToolLauncher: Send + Sync {
    fn name(&self) -> &str;

    async fn spawn(
        &self,
        tool_id: &str,
        file: &Path,
        args: &[String],
    ) -> anyhow::Result<ProcessHandle>;
}

/// Consumes a tool's stdout until exhaustion.
///
/// `on_snapshot` is called zero or more times, in stream order, before the final
/// collection is returned.
#[async_trait]
pub trait OutputParser: Send + Sync {
    async fn read_all(
        &self,
        output: ProcessOutput,
        file: &Path,
        on_snapshot: &mut (dyn FnMut(CheckSnapshot) + Send),
    ) -> anyhow::Result<DiagnosticCollection>;
}
