//! # Text Sync
//!
//! Reconciles the seamless text surface with the block array.
//!
//! Every block is presented to the UI as an independent text field. The user
//! never sees block boundaries; certain keystroke patterns are read as
//! structural edits instead:
//!
//! ```text
//! DeleteAtStart on an empty, non-first paragraph → remove it, focus previous end
//! content gains a trailing "\n\n"              → split: strip it, new paragraph after
//! content goes from exactly 1 char to ""       → merge into previous, remove block
//! anything else                                → plain content change
//! Return in Heading                            → focus (or create) first paragraph
//! Return in Paragraph                          → new paragraph after, focus it
//! ```
//!
//! Content comparisons are on raw, untrimmed strings. Merges always target
//! the immediately preceding block and never touch the first block.
//!
//! Structural edits are executed as one batch on the [`UndoStack`], so a
//! split or a merge is a single undo step.

use std::collections::HashMap;

use folio_document::{BlockId, BlockType, Document, DocumentError};
use tracing::debug;

use crate::{Command, EditorResult, UndoStack};

const PARAGRAPH_BREAK: &str = "\n\n";

/// A raw event from the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    /// The field for `block_id` now holds `content`.
    TextChanged { block_id: BlockId, content: String },

    /// Delete/backspace pressed with the caret at offset 0 of `block_id`.
    DeleteAtStart { block_id: BlockId },

    /// Return submitted from the field for `block_id`.
    Return { block_id: BlockId },
}

/// Where the UI should move the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Focus {
    pub block_id: BlockId,
    /// Character offset into the block's content.
    pub offset: usize,
}

/// What the engine did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Nothing changed (no-op edit or guarded structural event).
    Unchanged,
    /// The block's content was replaced.
    Edited,
    /// The block was split on a paragraph break; `created` follows it.
    Split { created: BlockId },
    /// `removed` was folded into `into`.
    Merged { into: BlockId, removed: BlockId },
    /// An empty block was dropped.
    Removed { removed: BlockId },
    /// A fresh paragraph was created by Return.
    Inserted { created: BlockId },
    /// Focus moved without any mutation.
    Focused,
}

/// Outcome of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub action: SyncAction,
    pub focus: Option<Focus>,
}

impl SyncOutcome {
    fn unchanged() -> Self {
        Self {
            action: SyncAction::Unchanged,
            focus: None,
        }
    }

    fn new(action: SyncAction, focus: Focus) -> Self {
        Self {
            action,
            focus: Some(focus),
        }
    }
}

/// Per-session text reconciliation state.
#[derive(Debug, Default)]
pub struct TextSync {
    /// Text of each field as of its previous change notification.
    observed: HashMap<BlockId, String>,
}

impl TextSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch a UI event.
    pub fn handle(
        &mut self,
        event: EditEvent,
        doc: &mut Document,
        history: &mut UndoStack,
    ) -> EditorResult<SyncOutcome> {
        match event {
            EditEvent::DeleteAtStart { block_id } => self.delete_at_start(block_id, doc, history),
            EditEvent::TextChanged { block_id, content } => {
                self.text_changed(block_id, &content, doc, history)
            }
            EditEvent::Return { block_id } => self.return_pressed(block_id, doc, history),
        }
    }

    /// Handle a change notification for one field.
    pub fn text_changed(
        &mut self,
        block_id: BlockId,
        content: &str,
        doc: &mut Document,
        history: &mut UndoStack,
    ) -> EditorResult<SyncOutcome> {
        let index = doc
            .block_index(block_id)
            .ok_or(DocumentError::BlockNotFound(block_id))?;
        let previous = self.previous_content(block_id, doc);

        if content.ends_with(PARAGRAPH_BREAK) && !previous.ends_with(PARAGRAPH_BREAK) {
            let kept = &content[..content.len() - PARAGRAPH_BREAK.len()];
            return self.split(block_id, kept, doc, history);
        }

        if content.is_empty() && previous.chars().count() == 1 && index > 0 {
            return self.merge_into_previous(block_id, index, content, doc, history);
        }

        self.observed.insert(block_id, content.to_string());
        match Command::content_change(doc, block_id, content)? {
            Some(command) => {
                history.execute(command, doc)?;
                Ok(SyncOutcome {
                    action: SyncAction::Edited,
                    focus: None,
                })
            }
            None => Ok(SyncOutcome::unchanged()),
        }
    }

    /// Handle delete pressed at the very start of a field.
    ///
    /// An empty paragraph is dropped; a non-empty one is merged into the
    /// block before it. The first block and non-paragraph blocks are never
    /// affected.
    pub fn delete_at_start(
        &mut self,
        block_id: BlockId,
        doc: &mut Document,
        history: &mut UndoStack,
    ) -> EditorResult<SyncOutcome> {
        let index = doc
            .block_index(block_id)
            .ok_or(DocumentError::BlockNotFound(block_id))?;
        let block = &doc.blocks()[index];
        if block.block_type != BlockType::Paragraph {
            return Ok(SyncOutcome::unchanged());
        }
        let Some(previous) = doc.previous_block(block_id).map(|b| b.id()) else {
            return Ok(SyncOutcome::unchanged());
        };

        let content = block.content.clone();
        if !content.is_empty() {
            return self.merge_into_previous(block_id, index, &content, doc, history);
        }

        let command = Command::delete(doc, block_id)?;
        history.execute_batch(vec![command], "Remove block", doc)?;
        self.observed.remove(&block_id);
        debug!(block = %block_id, "removed empty block");

        let focus = self.focus_end(previous, doc)?;
        Ok(SyncOutcome::new(SyncAction::Removed { removed: block_id }, focus))
    }

    /// Handle Return submitted from a field.
    pub fn return_pressed(
        &mut self,
        block_id: BlockId,
        doc: &mut Document,
        history: &mut UndoStack,
    ) -> EditorResult<SyncOutcome> {
        let block_type = doc
            .block(block_id)
            .ok_or(DocumentError::BlockNotFound(block_id))?
            .block_type;

        match block_type {
            BlockType::Heading => {
                if let Some(paragraph) = doc.first_block_of_type(BlockType::Paragraph) {
                    let target = paragraph.id();
                    let focus = self.focus_at(target, 0, doc)?;
                    return Ok(SyncOutcome::new(SyncAction::Focused, focus));
                }
                self.insert_paragraph_after(block_id, doc, history)
            }
            BlockType::Paragraph => self.insert_paragraph_after(block_id, doc, history),
        }
    }

    /// The last observed text for a block, if it has been seen.
    pub fn observed(&self, block_id: BlockId) -> Option<&str> {
        self.observed.get(&block_id).map(String::as_str)
    }

    /// Drop observed state for one block.
    pub fn forget(&mut self, block_id: BlockId) {
        self.observed.remove(&block_id);
    }

    /// Drop all observed state, e.g. after undo/redo rewrote the document.
    pub fn reset(&mut self) {
        self.observed.clear();
    }

    fn previous_content(&self, block_id: BlockId, doc: &Document) -> String {
        match self.observed.get(&block_id) {
            Some(text) => text.clone(),
            None => doc
                .block(block_id)
                .map(|b| b.content.clone())
                .unwrap_or_default(),
        }
    }

    fn split(
        &mut self,
        block_id: BlockId,
        kept: &str,
        doc: &mut Document,
        history: &mut UndoStack,
    ) -> EditorResult<SyncOutcome> {
        let mut commands = Vec::with_capacity(2);
        if let Some(change) = Command::content_change(doc, block_id, kept)? {
            commands.push(change);
        }
        let insert = Command::insert_after(doc, block_id, BlockType::Paragraph)?;
        let created = insert.block_id();
        commands.push(insert);

        history.execute_batch(commands, "Split block", doc)?;
        self.observed.insert(block_id, kept.to_string());
        self.observed.insert(created, String::new());
        debug!(block = %block_id, created = %created, "split on paragraph break");

        let focus = self.focus_at(created, 0, doc)?;
        Ok(SyncOutcome::new(SyncAction::Split { created }, focus))
    }

    /// Append `content` to the block before `index` and delete the block at
    /// `index`. Focus lands at the join point.
    fn merge_into_previous(
        &mut self,
        block_id: BlockId,
        index: usize,
        content: &str,
        doc: &mut Document,
        history: &mut UndoStack,
    ) -> EditorResult<SyncOutcome> {
        let previous = &doc.blocks()[index - 1];
        let into = previous.id();
        let join = previous.char_len();
        let merged = format!("{}{}", previous.content, content);

        let mut commands = Vec::with_capacity(2);
        if let Some(change) = Command::content_change(doc, into, merged.as_str())? {
            commands.push(change);
        }
        commands.push(Command::delete(doc, block_id)?);

        history.execute_batch(commands, "Merge blocks", doc)?;
        self.observed.remove(&block_id);
        self.observed.insert(into, merged);
        debug!(into = %into, removed = %block_id, "merged into previous block");

        let focus = self.focus_at(into, join, doc)?;
        Ok(SyncOutcome::new(
            SyncAction::Merged {
                into,
                removed: block_id,
            },
            focus,
        ))
    }

    fn insert_paragraph_after(
        &mut self,
        block_id: BlockId,
        doc: &mut Document,
        history: &mut UndoStack,
    ) -> EditorResult<SyncOutcome> {
        let insert = Command::insert_after(doc, block_id, BlockType::Paragraph)?;
        let created = insert.block_id();
        history.execute(insert, doc)?;
        self.observed.insert(created, String::new());

        let focus = self.focus_at(created, 0, doc)?;
        Ok(SyncOutcome::new(SyncAction::Inserted { created }, focus))
    }

    fn focus_end(&self, block_id: BlockId, doc: &mut Document) -> EditorResult<Focus> {
        let end = doc
            .block(block_id)
            .ok_or(DocumentError::BlockNotFound(block_id))?
            .char_len();
        self.focus_at(block_id, end, doc)
    }

    fn focus_at(&self, block_id: BlockId, offset: usize, doc: &mut Document) -> EditorResult<Focus> {
        doc.set_cursor(block_id, offset)?;
        Ok(Focus { block_id, offset })
    }
}
