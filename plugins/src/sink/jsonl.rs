use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use tlcrun_core::api::{Diagnostic, DiagnosticCollection, DiagnosticsSink};

pub const STDOUT_TARGET: &str = "stdout:";

#[derive(Serialize)]
struct FileDiagnostics<'a> {
    file: &'a Path,
    diagnostics: &'a [Diagnostic],
}

/// One JSON object per file and line, written to stdout or appended to a file.
#[derive(Debug, Clone)]
pub struct JsonlDiagnosticsSink {
    target: String,
}

impl JsonlDiagnosticsSink {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    async fn open(&self) -> Result<Box<dyn AsyncWrite + Unpin + Send>> {
        if self.target == STDOUT_TARGET {
            return Ok(Box::new(tokio::io::stdout()));
        }
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.target)
            .await
            .with_context(|| format!("opening diagnostics output {}", self.target))?;
        Ok(Box::new(file))
    }
}

pub fn encode(collection: &DiagnosticCollection) -> Result<String> {
    let mut out = String::new();
    for (file, diagnostics) in collection.files() {
        let line = serde_json::to_string(&FileDiagnostics { file, diagnostics })?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

#[async_trait]
impl DiagnosticsSink for JsonlDiagnosticsSink {
    async fn apply(&self, collection: DiagnosticCollection) -> Result<()> {
        let payload = encode(&collection)?;
        let mut writer = self.open().await?;
        writer
            .write_all(payload.as_bytes())
            .await
            .context("writing diagnostics")?;
        writer.flush().await.context("flushing diagnostics")?;
        tracing::debug!(
            target: "tlcrun.sink",
            target_path = %self.target,
            files = collection.files().count(),
            diagnostics = collection.total(),
            "diagnostics written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tlcrun_core::api::{Range, Severity};

    fn sample() -> DiagnosticCollection {
        let mut c = DiagnosticCollection::for_file(Path::new("/specs/Queue.tla"));
        c.add(
            PathBuf::from("/specs/Buffer.tla"),
            Diagnostic {
                range: Range::from_one_based(4, 9, 4, 13),
                severity: Severity::Error,
                message: "unknown operator".to_string(),
            },
        );
        c
    }

    #[test]
    fn every_file_gets_a_line() {
        let text = encode(&sample()).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["file"], "/specs/Buffer.tla");
        assert_eq!(lines[0]["diagnostics"][0]["severity"], "error");
        assert_eq!(lines[0]["diagnostics"][0]["range"]["start"]["line"], 3);
        assert_eq!(lines[1]["file"], "/specs/Queue.tla");
        assert_eq!(lines[1]["diagnostics"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn file_target_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagnostics.jsonl");
        let sink = JsonlDiagnosticsSink::new(path.to_string_lossy());

        sink.apply(sample()).await.unwrap();
        sink.apply(DiagnosticCollection::for_file(Path::new("/specs/Queue.tla")))
            .await
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[tokio::test]
    async fn unwritable_target_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlDiagnosticsSink::new(
            dir.path().join("missing").join("d.jsonl").to_string_lossy(),
        );
        assert!(sink.apply(sample()).await.is_err());
    }
}
