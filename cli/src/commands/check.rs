use std::path::PathBuf;

use tlcrun_core::api::{CheckOutcome, CliError};
use tlcrun_plugins::factory::ConsoleSession;

/// Runs one check to the end. Ctrl-C stops the checker instead of killing us.
pub async fn run(session: ConsoleSession, file: PathBuf) -> Result<i32, CliError> {
    session.editor.open(file);

    let controller = session.controller.clone();
    let mut task = tokio::spawn(async move { controller.check_model().await });

    let outcome = loop {
        tokio::select! {
            res = &mut task => {
                break res.map_err(|e| CliError::Command(format!("check task failed: {e}")))?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!(target: "tlcrun.cli", "interrupt received, stopping model checker");
                session.controller.stop_model_checking();
            }
        }
    };

    loop {
        tokio::select! {
            _ = session.controller.wait_idle() => break,
            _ = tokio::signal::ctrl_c() => {
                session.controller.stop_model_checking();
            }
        }
    }

    Ok(exit_code(&outcome))
}

pub fn exit_code(outcome: &CheckOutcome) -> i32 {
    match outcome {
        CheckOutcome::Completed { .. } => 0,
        CheckOutcome::Rejected(_) | CheckOutcome::Failed(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlcrun_core::api::Rejection;

    #[test]
    fn only_completed_runs_succeed() {
        assert_eq!(exit_code(&CheckOutcome::Completed { diagnostics: 3 }), 0);
        assert_eq!(exit_code(&CheckOutcome::Rejected(Rejection::NotTlaFile)), 1);
        assert_eq!(exit_code(&CheckOutcome::Failed("boom".into())), 1);
    }
}
