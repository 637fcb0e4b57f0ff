use std::collections::HashMap;

use folio_document::{Document, DocumentId, VersionToken};
use tracing::trace;

use crate::{DocumentStore, StorageResult};

/// Saves documents whose version moved since the last save it saw.
///
/// Hold one per store and call [`Autosave::tick`] on a timer or after an
/// editing burst. Cursor moves do not change the version, so they never
/// trigger a write.
#[derive(Debug, Default)]
pub struct Autosave {
    last_saved: HashMap<DocumentId, VersionToken>,
}

impl Autosave {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `document` is on disk at its current version.
    pub fn mark_saved(&mut self, document: &Document) {
        self.last_saved.insert(document.id(), document.version());
    }

    pub fn is_dirty(&self, document: &Document) -> bool {
        self.last_saved.get(&document.id()) != Some(&document.version())
    }

    /// Save `document` if dirty. Returns whether a write happened.
    pub fn tick(&mut self, store: &DocumentStore, document: &Document) -> StorageResult<bool> {
        if !self.is_dirty(document) {
            trace!(document = %document.id(), "autosave skipped, clean");
            return Ok(false);
        }
        store.save(document)?;
        self.mark_saved(document);
        Ok(true)
    }

    /// Stop tracking a document, e.g. after a purge.
    pub fn forget(&mut self, id: DocumentId) {
        self.last_saved.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untracked_document_is_dirty() {
        let autosave = Autosave::new();
        assert!(autosave.is_dirty(&Document::new()));
    }

    #[test]
    fn test_edit_after_mark_is_dirty() {
        let mut autosave = Autosave::new();
        let mut doc = Document::new();
        autosave.mark_saved(&doc);
        assert!(!autosave.is_dirty(&doc));

        let heading = doc.blocks()[0].id();
        doc.set_cursor(heading, 0).unwrap();
        assert!(!autosave.is_dirty(&doc));

        doc.set_block_content(heading, "Title").unwrap();
        assert!(autosave.is_dirty(&doc));
    }

    #[test]
    fn test_forget_makes_dirty_again() {
        let mut autosave = Autosave::new();
        let doc = Document::new();
        autosave.mark_saved(&doc);
        autosave.forget(doc.id());
        assert!(autosave.is_dirty(&doc));
    }
}
