use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

use tlcrun_core::api::{AppConfig, Completion, ProcessHandle, ToolLauncher};

use super::supervise::supervise;

/// Runs tools from `tla2tools.jar` in a JVM, one process per spawn.
#[derive(Debug, Clone)]
pub struct JavaToolLauncher {
    java: PathBuf,
    java_options: Vec<String>,
    tools_jar: PathBuf,
}

impl JavaToolLauncher {
    pub fn new(java: PathBuf, java_options: Vec<String>, tools_jar: PathBuf) -> Self {
        Self {
            java,
            java_options,
            tools_jar,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(
            cfg.java.java_binary(),
            cfg.java.options.clone(),
            cfg.tools.tla2tools_jar.clone(),
        )
    }

    pub fn java(&self) -> &Path {
        &self.java
    }

    /// JVM arguments for one invocation; the file is passed by name because the
    /// process runs in the file's directory.
    pub fn command_args(&self, tool_id: &str, file: &Path, args: &[String]) -> Vec<String> {
        let mut out = self.java_options.clone();
        out.push("-cp".to_string());
        out.push(self.tools_jar.to_string_lossy().into_owned());
        out.push(tool_id.to_string());
        out.extend(args.iter().cloned());
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.to_string_lossy().into_owned());
        out.push(name);
        out
    }
}

#[async_trait]
impl ToolLauncher for JavaToolLauncher {
    fn name(&self) -> &str {
        "java"
    }

    async fn spawn(&self, tool_id: &str, file: &Path, args: &[String]) -> Result<ProcessHandle> {
        if !self.tools_jar.is_file() {
            anyhow::bail!(
                "tla2tools.jar not found at {} (set tools.tla2tools_jar or TLCRUN_TLA2TOOLS_JAR)",
                self.tools_jar.display()
            );
        }

        let argv = self.command_args(tool_id, file, args);
        tracing::info!(
            target: "tlcrun.launcher",
            java = %self.java.display(),
            args = ?argv,
            "spawning tool"
        );

        let mut cmd = Command::new(&self.java);
        cmd.args(&argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = file.parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to execute {}", self.java.display()))?;
        let pid = child.id();
        let stdout = child
            .stdout
            .take()
            .context("child stdout was not captured")?;
        let stderr = child.stderr.take();

        let (control, exit_rx) = supervise(child, stderr, tool_id.to_string());
        Ok(ProcessHandle::new(
            pid,
            Box::new(stdout),
            Arc::new(control),
            Completion::new(exit_rx),
        ))
    }
}
