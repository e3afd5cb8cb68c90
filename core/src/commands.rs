pub const CMD_CHECK_MODEL_RUN: &str = "tlaplus.model.check.run";
pub const CMD_CHECK_MODEL_STOP: &str = "tlaplus.model.check.stop";
pub const CMD_CHECK_MODEL_DISPLAY: &str = "tlaplus.model.check.display";

/// Commands exposed to the hosting environment. None take arguments; the
/// target comes from the active document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Run,
    Stop,
    Display,
}

impl Command {
    pub const ALL: [Command; 3] = [Command::Run, Command::Stop, Command::Display];

    pub fn id(self) -> &'static str {
        match self {
            Command::Run => CMD_CHECK_MODEL_RUN,
            Command::Stop => CMD_CHECK_MODEL_STOP,
            Command::Display => CMD_CHECK_MODEL_DISPLAY,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }
}
