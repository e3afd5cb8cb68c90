use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Run the TLC model checker on TLA+ specifications")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file; defaults to ./tlcrun.toml, then the user config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to tla2tools.jar.
    #[arg(long, global = true)]
    pub tla2tools: Option<PathBuf>,

    /// Java installation to run TLC with.
    #[arg(long, global = true)]
    pub java_home: Option<PathBuf>,

    /// Where diagnostics go: `stdout:` or a file to append JSON lines to.
    #[arg(long, global = true)]
    pub diagnostics: Option<String>,

    /// Use ASCII markers instead of Unicode symbols.
    #[arg(long, global = true, default_value_t = false)]
    pub ascii: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Check one specification and exit.
    Check(CheckArgs),
    /// Interactive session reading commands from stdin.
    Session(SessionArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CheckArgs {
    /// The TLA+ specification to check.
    pub file: PathBuf,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SessionArgs {
    /// Specification to open at start.
    pub file: Option<PathBuf>,
}
