use std::path::PathBuf;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use tlcrun_core::api::{CliError, Command};
use tlcrun_plugins::factory::ConsoleSession;

const HELP: &str = "\
commands:
  run            check the open specification
  stop           stop the running check
  display        show the latest results
  open <file>    make <file> the active document
  help           show this text
  quit           stop any running check and exit";

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Command(Command),
    Open(PathBuf),
    Help,
    Quit,
    Empty,
}

pub fn parse_line(line: &str) -> Result<SessionInput, CliError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    let input = match word {
        "" => SessionInput::Empty,
        "run" | "check" => SessionInput::Command(Command::Run),
        "stop" => SessionInput::Command(Command::Stop),
        "display" | "show" => SessionInput::Command(Command::Display),
        "open" if rest.is_empty() => {
            return Err(CliError::Command("open needs a file".to_string()))
        }
        "open" => SessionInput::Open(PathBuf::from(rest)),
        "help" | "?" => SessionInput::Help,
        "quit" | "exit" => SessionInput::Quit,
        other => match Command::from_id(other) {
            Some(cmd) => SessionInput::Command(cmd),
            None => return Err(CliError::Command(format!("unknown command: {other}"))),
        },
    };
    Ok(input)
}

pub async fn run(session: ConsoleSession, file: Option<PathBuf>) -> Result<i32, CliError> {
    if let Some(file) = file {
        session.editor.open(file);
    }
    eprintln!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Ok(SessionInput::Quit) => break,
                    Ok(input) => handle(&session, input).await,
                    Err(e) => eprintln!("{e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if session.controller.is_running() {
                    session.controller.stop_model_checking();
                } else {
                    break;
                }
            }
        }
    }

    shutdown(&session).await;
    Ok(0)
}

async fn handle(session: &ConsoleSession, input: SessionInput) {
    match input {
        SessionInput::Command(Command::Run) => {
            // Keep reading input while the check runs so `stop` can reach it.
            let controller = session.controller.clone();
            tokio::spawn(async move {
                let outcome = controller.execute(Command::Run).await;
                tracing::debug!(target: "tlcrun.cli", ?outcome, "run command finished");
            });
        }
        SessionInput::Command(cmd) => {
            session.controller.execute(cmd).await;
        }
        SessionInput::Open(path) => {
            let doc = session.editor.open(path);
            eprintln!("opened {} ({})", doc.path.display(), doc.language_id);
        }
        SessionInput::Help => eprintln!("{HELP}"),
        SessionInput::Quit | SessionInput::Empty => {}
    }
}

async fn shutdown(session: &ConsoleSession) {
    if !session.controller.is_running() {
        return;
    }
    session.controller.stop_model_checking();
    if tokio::time::timeout(SHUTDOWN_GRACE, session.controller.wait_idle())
        .await
        .is_err()
    {
        tracing::warn!(target: "tlcrun.cli", "model checker did not exit in time");
    }
}
