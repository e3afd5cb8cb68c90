use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub java: JavaConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub diagnostics: DiagnosticsOutConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JavaConfig {
    /// Java installation directory; `java` from PATH is used when unset.
    #[serde(default)]
    pub home: Option<PathBuf>,

    #[serde(default = "default_java_options")]
    pub options: Vec<String>,
}

fn default_java_options() -> Vec<String> {
    vec!["-XX:+UseParallelGC".to_string()]
}

impl Default for JavaConfig {
    fn default() -> Self {
        Self {
            home: None,
            options: default_java_options(),
        }
    }
}

impl JavaConfig {
    pub fn java_binary(&self) -> PathBuf {
        match &self.home {
            Some(home) => {
                let exe = if cfg!(windows) { "java.exe" } else { "java" };
                home.join("bin").join(exe)
            }
            None => PathBuf::from("java"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_tla2tools_jar")]
    pub tla2tools_jar: PathBuf,
}

fn default_tla2tools_jar() -> PathBuf {
    PathBuf::from("tla2tools.jar")
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            tla2tools_jar: default_tla2tools_jar(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsOutConfig {
    /// `stdout:` or a file path that diagnostics are appended to as JSON lines.
    #[serde(default = "default_diagnostics_path")]
    pub path: String,
}

fn default_diagnostics_path() -> String {
    "stdout:".to_string()
}

impl Default for DiagnosticsOutConfig {
    fn default() -> Self {
        Self {
            path: default_diagnostics_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// When set, logs are also written to `<directory>/tlcrun.log`.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Answer "yes" to offers attached to warnings (e.g. revealing the running check).
    #[serde(default = "default_accept_offers")]
    pub accept_offers: bool,

    #[serde(default)]
    pub ascii: bool,
}

fn default_accept_offers() -> bool {
    true
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            accept_offers: default_accept_offers(),
            ascii: false,
        }
    }
}
