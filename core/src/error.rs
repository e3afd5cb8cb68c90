use thiserror::Error;

/// Failures inside the start pipeline (spawn -> stream -> apply diagnostics).
///
/// These never escape `CheckController::check_model`; they are converted into a
/// single user-facing error message at the top of the pipeline.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("process produced no output stream")]
    MissingOutput,

    #[error("error while reading model checker output: {0}")]
    Stream(#[source] anyhow::Error),

    #[error("failed to apply diagnostics: {0}")]
    Diagnostics(#[source] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Command(String),
}
