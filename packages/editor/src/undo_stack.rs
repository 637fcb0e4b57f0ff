//! # Undo/Redo Stack
//!
//! Tracks command history and enables undo/redo operations.
//!
//! ## Design
//!
//! - Each command carries its own inverse state (see [`Command`])
//! - Undo inverts the most recent batch and moves it to the redo stack
//! - Redo re-executes the original commands (it does not invert twice)
//! - Executing anything new clears the redo stack
//! - Batches group several commands into one user-facing undo step
//! - History is bounded; the oldest batches are evicted first
//!
//! The stack never owns the document. Every operation takes it by `&mut`.
//!
//! ## Example
//!
//! ```rust
//! use folio_document::Document;
//! use folio_editor::{Command, UndoStack};
//!
//! let mut doc = Document::new();
//! let mut stack = UndoStack::new();
//! let paragraph = doc.blocks()[1].id();
//!
//! let cmd = Command::content_change(&doc, paragraph, "Hello").unwrap().unwrap();
//! stack.execute(cmd, &mut doc).unwrap();
//!
//! assert!(stack.undo(&mut doc).unwrap());
//! assert_eq!(doc.blocks()[1].content, "");
//!
//! assert!(stack.redo(&mut doc).unwrap());
//! assert_eq!(doc.blocks()[1].content, "Hello");
//! ```

use std::collections::VecDeque;

use folio_document::Document;

use crate::{Command, EditorError, EditorResult};

/// Default bound on undo history depth.
pub const DEFAULT_MAX_UNDO_LEVELS: usize = 50;

/// A group of commands that are undone/redone together
#[derive(Debug, Clone, PartialEq)]
pub struct CommandBatch {
    /// The commands in this batch (in application order)
    pub commands: Vec<Command>,

    /// Optional description of this batch
    pub description: Option<String>,
}

impl CommandBatch {
    /// Create a single-command batch
    pub fn single(command: Command) -> Self {
        Self {
            commands: vec![command],
            description: None,
        }
    }

    fn undo(&self, doc: &mut Document) -> EditorResult<()> {
        for command in self.commands.iter().rev() {
            command.undo(doc)?;
        }
        Ok(())
    }

    fn redo(&self, doc: &mut Document) -> EditorResult<()> {
        for command in &self.commands {
            command.execute(doc)?;
        }
        Ok(())
    }
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of applied batches (most recent last, oldest evicted from the front)
    undo_stack: VecDeque<CommandBatch>,

    /// Stack of undone batches (most recent last)
    redo_stack: Vec<CommandBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<CommandBatch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (50)
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_MAX_UNDO_LEVELS)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Execute a command and record it for undo
    ///
    /// A command that fails is not recorded and leaves the history untouched.
    pub fn execute(&mut self, command: Command, doc: &mut Document) -> EditorResult<()> {
        command.execute(doc)?;
        tracing::trace!(command = command.name(), block = %command.block_id(), "executed");

        self.redo_stack.clear();
        if let Some(batch) = &mut self.current_batch {
            batch.commands.push(command);
        } else {
            self.push_batch(CommandBatch::single(command));
        }

        Ok(())
    }

    /// Execute several commands as one undo step.
    ///
    /// All-or-nothing: if any command fails, the ones already applied are
    /// rolled back and nothing is recorded.
    pub fn execute_batch(
        &mut self,
        commands: Vec<Command>,
        description: &str,
        doc: &mut Document,
    ) -> EditorResult<()> {
        if self.current_batch.is_some() {
            return Err(EditorError::BatchInProgress);
        }
        if commands.is_empty() {
            return Ok(());
        }

        for (applied, command) in commands.iter().enumerate() {
            if let Err(err) = command.execute(doc) {
                for done in commands[..applied].iter().rev() {
                    if let Err(rollback) = done.undo(doc) {
                        tracing::error!(command = done.name(), error = %rollback, "rollback failed");
                    }
                }
                return Err(err.into());
            }
        }

        self.redo_stack.clear();
        self.push_batch(CommandBatch {
            commands,
            description: Some(description.to_string()),
        });
        Ok(())
    }

    /// Start a batch of commands (will be undone/redone together)
    pub fn begin_batch(&mut self) -> EditorResult<()> {
        if self.current_batch.is_some() {
            return Err(EditorError::BatchInProgress);
        }
        self.current_batch = Some(CommandBatch {
            commands: Vec::new(),
            description: None,
        });
        Ok(())
    }

    /// End the current batch and push to undo stack
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.commands.is_empty() {
                self.push_batch(batch);
            }
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    /// Push a batch to the undo stack
    fn push_batch(&mut self, batch: CommandBatch) {
        self.undo_stack.push_back(batch);

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.pop_front();
        }
    }

    /// Undo the most recent command/batch
    ///
    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, doc: &mut Document) -> EditorResult<bool> {
        self.end_batch();

        if let Some(batch) = self.undo_stack.pop_back() {
            batch.undo(doc)?;

            // Move to redo stack
            self.redo_stack.push(batch);

            Ok(true)
        } else {
            Ok(false) // Nothing to undo
        }
    }

    /// Redo the most recently undone command/batch
    ///
    /// Returns `false` when there is nothing to redo.
    pub fn redo(&mut self, doc: &mut Document) -> EditorResult<bool> {
        if let Some(batch) = self.redo_stack.pop() {
            batch.redo(doc)?;

            // Move back to undo stack
            self.undo_stack.push_back(batch);

            Ok(true)
        } else {
            Ok(false) // Nothing to redo
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .back()
            .and_then(|batch| batch.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_document::{BlockId, BlockType};

    fn setup() -> (Document, BlockId) {
        let doc = Document::new();
        let paragraph = doc.blocks()[1].id();
        (doc, paragraph)
    }

    fn set_text(stack: &mut UndoStack, doc: &mut Document, id: BlockId, text: &str) {
        let cmd = Command::content_change(doc, id, text).unwrap().unwrap();
        stack.execute(cmd, doc).unwrap();
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert_eq!(stack.max_levels(), DEFAULT_MAX_UNDO_LEVELS);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_execute_and_undo_content_change() {
        let (mut doc, paragraph) = setup();
        let mut stack = UndoStack::new();

        set_text(&mut stack, &mut doc, paragraph, "World");
        assert_eq!(stack.undo_levels(), 1);

        // Undo
        assert!(stack.undo(&mut doc).unwrap());
        assert_eq!(doc.block(paragraph).unwrap().content, "");
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 1);

        // Redo
        assert!(stack.redo(&mut doc).unwrap());
        assert_eq!(doc.block(paragraph).unwrap().content, "World");
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let (mut doc, _) = setup();
        let before = doc.clone();
        let mut stack = UndoStack::new();

        assert!(!stack.undo(&mut doc).unwrap());
        assert!(!stack.redo(&mut doc).unwrap());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_batched_commands() {
        let (mut doc, paragraph) = setup();
        let mut stack = UndoStack::new();

        stack.begin_batch().unwrap();
        stack.set_batch_description("Update greeting");
        set_text(&mut stack, &mut doc, paragraph, "World");
        set_text(&mut stack, &mut doc, paragraph, "Everyone!");
        stack.end_batch();

        // Should be one batch with 2 commands
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("Update greeting"));

        // Undo should revert both
        stack.undo(&mut doc).unwrap();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(doc.block(paragraph).unwrap().content, "");
    }

    #[test]
    fn test_nested_batch_rejected() {
        let mut stack = UndoStack::new();
        stack.begin_batch().unwrap();
        assert_eq!(stack.begin_batch(), Err(EditorError::BatchInProgress));
    }

    #[test]
    fn test_execute_batch_rolls_back_on_failure() {
        let (mut doc, paragraph) = setup();
        let mut stack = UndoStack::new();

        let good = Command::content_change(&doc, paragraph, "kept?").unwrap().unwrap();
        let bad = Command::ContentChange {
            block_id: BlockId::new(),
            old_content: String::new(),
            new_content: "x".to_string(),
        };

        let result = stack.execute_batch(vec![good, bad], "broken", &mut doc);
        assert!(result.is_err());
        assert_eq!(doc.block(paragraph).unwrap().content, "");
        assert_eq!(doc.block_count(), 2);
        assert_eq!(stack.undo_levels(), 0);
    }

    #[test]
    fn test_new_command_clears_redo() {
        let (mut doc, paragraph) = setup();
        let mut stack = UndoStack::new();

        set_text(&mut stack, &mut doc, paragraph, "World");
        stack.undo(&mut doc).unwrap();
        assert_eq!(stack.redo_levels(), 1);

        set_text(&mut stack, &mut doc, paragraph, "Everyone");
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let (mut doc, paragraph) = setup();
        let mut stack = UndoStack::with_max_levels(2);

        for i in 0..3 {
            set_text(&mut stack, &mut doc, paragraph, &format!("Text {}", i));
        }

        // Should only keep 2 (max levels)
        assert_eq!(stack.undo_levels(), 2);
        stack.undo(&mut doc).unwrap();
        stack.undo(&mut doc).unwrap();
        assert_eq!(doc.block(paragraph).unwrap().content, "Text 0");
    }

    #[test]
    fn test_type_change_through_stack() {
        let (mut doc, paragraph) = setup();
        let mut stack = UndoStack::new();

        let cmd = Command::type_change(&doc, paragraph, BlockType::Heading)
            .unwrap()
            .unwrap();
        stack.execute(cmd, &mut doc).unwrap();
        stack.undo(&mut doc).unwrap();

        assert_eq!(doc.block(paragraph).unwrap().block_type, BlockType::Paragraph);
    }

    #[test]
    fn test_descriptions_follow_batches() {
        let (mut doc, paragraph) = setup();
        let mut stack = UndoStack::new();

        let cmd = Command::content_change(&doc, paragraph, "one").unwrap().unwrap();
        stack.execute_batch(vec![cmd], "Type one", &mut doc).unwrap();
        set_text(&mut stack, &mut doc, paragraph, "two");
        assert_eq!(stack.undo_description(), None);

        stack.undo(&mut doc).unwrap();
        assert_eq!(stack.undo_description(), Some("Type one"));
        assert_eq!(stack.redo_description(), None);

        stack.undo(&mut doc).unwrap();
        assert_eq!(stack.redo_description(), Some("Type one"));
    }

    #[test]
    fn test_clear_drops_history_and_open_batch() {
        let (mut doc, paragraph) = setup();
        let mut stack = UndoStack::new();

        set_text(&mut stack, &mut doc, paragraph, "a");
        set_text(&mut stack, &mut doc, paragraph, "ab");
        stack.undo(&mut doc).unwrap();
        stack.begin_batch().unwrap();

        stack.clear();
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
        assert!(stack.begin_batch().is_ok());
        assert_eq!(doc.block(paragraph).unwrap().content, "a");
    }

    #[test]
    fn test_eviction_keeps_newest_in_order() {
        let (mut doc, paragraph) = setup();
        let mut stack = UndoStack::with_max_levels(3);

        for i in 0..10 {
            set_text(&mut stack, &mut doc, paragraph, &format!("v{}", i));
        }
        assert_eq!(stack.undo_levels(), 3);

        let mut seen = Vec::new();
        while stack.undo(&mut doc).unwrap() {
            seen.push(doc.block(paragraph).unwrap().content.clone());
        }
        assert_eq!(seen, vec!["v8", "v7", "v6"]);
    }
}
