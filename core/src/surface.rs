//! Presentation collaborators driven by the controller.

use async_trait::async_trait;

use crate::model::{CheckSnapshot, DiagnosticCollection};

/// Live display of a run. All operations are best-effort renders.
pub trait ResultView: Send + Sync {
    /// Starts a fresh display for a new run.
    fn reveal_empty(&self);

    fn update(&self, snapshot: CheckSnapshot);

    /// Brings the current display to front without resetting it.
    fn reveal(&self);
}

/// Editor diagnostics surface.
#[async_trait]
pub trait DiagnosticsSink: Send + Sync {
    async fn apply(&self, collection: DiagnosticCollection) -> anyhow::Result<()>;
}

/// User-visible messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    fn error(&self, message: &str);

    /// Shows a warning with one offered action; returns whether the user took it.
    async fn warn_with_action(&self, message: &str, action: &str) -> bool;
}

/// What a status surface should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusItem {
    pub text: String,
    pub tooltip: String,
    pub command: &'static str,
}

pub trait StatusSurface: Send + Sync {
    fn show(&self, item: &StatusItem);

    fn hide(&self);
}
