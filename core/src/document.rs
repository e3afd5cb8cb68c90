use std::path::{Path, PathBuf};

/// Language id a document must carry to be checked as a model.
pub const TLA_LANGUAGE_ID: &str = "tlaplus";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDocument {
    pub path: PathBuf,
    pub language_id: String,
}

impl ActiveDocument {
    /// Builds a document for `path`, deriving the language id from its extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let language_id = language_id_for_path(&path).to_string();
        Self { path, language_id }
    }

    pub fn is_tla(&self) -> bool {
        self.language_id == TLA_LANGUAGE_ID
    }
}

pub fn language_id_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tla") => TLA_LANGUAGE_ID,
        Some(ext) if ext.eq_ignore_ascii_case("cfg") => "tlaplus_cfg",
        _ => "plaintext",
    }
}

/// Ambient editor state read by the start operation.
pub trait EditorContext: Send + Sync {
    fn active_document(&self) -> Option<ActiveDocument>;
}
