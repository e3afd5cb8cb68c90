use std::path::PathBuf;
use std::sync::Mutex;

use tlcrun_core::api::{ActiveDocument, EditorContext};

/// Active document of a console session, set by `open` commands.
#[derive(Debug, Default)]
pub struct SessionEditor {
    active: Mutex<Option<ActiveDocument>>,
}

impl SessionEditor {
    pub fn open(&self, path: impl Into<PathBuf>) -> ActiveDocument {
        let doc = ActiveDocument::from_path(path);
        *self.active.lock().unwrap_or_else(|p| p.into_inner()) = Some(doc.clone());
        doc
    }

    pub fn close(&self) {
        self.active.lock().unwrap_or_else(|p| p.into_inner()).take();
    }
}

impl EditorContext for SessionEditor {
    fn active_document(&self) -> Option<ActiveDocument> {
        self.active
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}
