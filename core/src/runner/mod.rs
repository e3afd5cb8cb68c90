pub mod exit;
mod events;
mod handle;
mod traits;

pub use events::RunState;
pub use exit::normalize_exit;
pub use handle::{Completion, ProcessControl, ProcessExit, ProcessHandle, ProcessOutput};
pub use traits::{OutputParser, ToolLauncher};
