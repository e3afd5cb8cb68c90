use clap::Parser;
mod commands;
mod logging;
use commands::cli;
use tlcrun_core::api::{AppConfig, CliError};
use tlcrun_core::config;
use tlcrun_plugins::factory::build_console_session;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let args = cli::Args::parse();

    let mut cfg = match &args.config {
        Some(path) => config::load_from(path)?,
        None => config::load_default()?,
    };
    apply_flags(&mut cfg, &args);

    let log_guard = logging::init(&cfg.logging);
    tracing::debug!(
        target: "tlcrun.cli",
        java = %cfg.java.java_binary().display(),
        tla2tools = %cfg.tools.tla2tools_jar.display(),
        diagnostics = %cfg.diagnostics.path,
        "configuration resolved"
    );

    let exit = dispatch(args.command, &cfg).await?;
    drop(log_guard);
    if exit != 0 {
        std::process::exit(exit);
    }
    Ok(())
}

async fn dispatch(cmd: cli::Commands, cfg: &AppConfig) -> Result<i32, CliError> {
    let session = build_console_session(cfg);
    match cmd {
        cli::Commands::Check(check_args) => commands::check::run(session, check_args.file).await,
        cli::Commands::Session(session_args) => {
            commands::session::run(session, session_args.file).await
        }
    }
}

fn apply_flags(cfg: &mut AppConfig, args: &cli::Args) {
    if let Some(jar) = &args.tla2tools {
        cfg.tools.tla2tools_jar = jar.clone();
    }
    if let Some(home) = &args.java_home {
        cfg.java.home = Some(home.clone());
    }
    if let Some(path) = &args.diagnostics {
        cfg.diagnostics.path = path.clone();
    }
    if args.ascii {
        cfg.console.ascii = true;
    }
}
