//! # Edit Session Management
//!
//! An EditSession is one exclusively-owned editing context: the document,
//! its undo history and the text-sync state. The UI event loop serializes
//! all calls, so nothing here locks.
//!
//! Dirty tracking compares the document's version token against the one
//! recorded by the last successful save; an external timer polls
//! [`EditSession::is_dirty`] and persists when it is set.

use folio_document::{BlockId, BlockType, Document, VersionToken};

use crate::{Command, EditEvent, EditorResult, SyncOutcome, TextSync, UndoStack};

/// Single-user edit session over one document
#[derive(Debug)]
pub struct EditSession {
    document: Document,
    history: UndoStack,
    sync: TextSync,

    /// Version of the document as of the last save (or load)
    saved_version: VersionToken,
}

impl EditSession {
    /// Start editing a document. Its current state counts as saved.
    pub fn new(document: Document) -> Self {
        Self::with_history(document, UndoStack::new())
    }

    pub fn with_history(document: Document, history: UndoStack) -> Self {
        let saved_version = document.version();
        Self {
            document,
            history,
            sync: TextSync::new(),
            saved_version,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// End the session, handing the document back.
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Feed one UI event through the text-sync engine.
    pub fn handle(&mut self, event: EditEvent) -> EditorResult<SyncOutcome> {
        self.sync
            .handle(event, &mut self.document, &mut self.history)
    }

    pub fn text_changed(
        &mut self,
        block_id: BlockId,
        content: impl Into<String>,
    ) -> EditorResult<SyncOutcome> {
        self.handle(EditEvent::TextChanged {
            block_id,
            content: content.into(),
        })
    }

    /// Change a block's type. Returns false if it already had that type.
    pub fn change_type(&mut self, block_id: BlockId, block_type: BlockType) -> EditorResult<bool> {
        match Command::type_change(&self.document, block_id, block_type)? {
            Some(command) => {
                self.history.execute(command, &mut self.document)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Merge externally computed tags into the document.
    pub fn add_tags<I, S>(&mut self, tags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.document.add_tags(tags)
    }

    pub fn undo(&mut self) -> EditorResult<bool> {
        let undone = self.history.undo(&mut self.document)?;
        if undone {
            self.sync.reset();
        }
        Ok(undone)
    }

    pub fn redo(&mut self) -> EditorResult<bool> {
        let redone = self.history.redo(&mut self.document)?;
        if redone {
            self.sync.reset();
        }
        Ok(redone)
    }

    /// True if the document changed since the last save.
    pub fn is_dirty(&self) -> bool {
        self.document.version() != self.saved_version
    }

    /// Record that `version` has been persisted.
    pub fn mark_saved(&mut self, version: VersionToken) {
        self.saved_version = version;
    }
}
