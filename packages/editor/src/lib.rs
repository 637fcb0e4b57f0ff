//! # Folio Editor
//!
//! Editing engine for Folio documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ UI: per-block text fields, key events       │
//! └─────────────────────────────────────────────┘
//!                     ↓ EditEvent
//! ┌─────────────────────────────────────────────┐
//! │ TextSync: split / merge / plain edit        │
//! │  - "\n\n" at end of field → new paragraph   │
//! │  - backspace to empty → merge with previous │
//! │  - Return routing by block type             │
//! └─────────────────────────────────────────────┘
//!                     ↓ Command
//! ┌─────────────────────────────────────────────┐
//! │ UndoStack: bounded, batched history         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ folio-document: Document primitives         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The document is passed, never shared**: engines take `&mut Document`
//! 2. **Every visible mutation is a command**: no-ops never reach history
//! 3. **One user action, one undo step**: splits and merges are batches
//!
//! ## Usage
//!
//! ```rust
//! use folio_document::Document;
//! use folio_editor::{EditSession, SyncAction};
//!
//! let mut session = EditSession::new(Document::new());
//! let body = session.document().blocks()[1].id();
//!
//! session.text_changed(body, "Hello").unwrap();
//! let outcome = session.text_changed(body, "Hello\n\n").unwrap();
//!
//! assert!(matches!(outcome.action, SyncAction::Split { .. }));
//! assert_eq!(session.document().block_count(), 3);
//!
//! session.undo().unwrap();
//! assert_eq!(session.document().block_count(), 2);
//! ```

mod commands;
mod errors;
mod session;
mod text_sync;
mod undo_stack;

pub use commands::Command;
pub use errors::{EditorError, EditorResult};
pub use session::EditSession;
pub use text_sync::{EditEvent, Focus, SyncAction, SyncOutcome, TextSync};
pub use undo_stack::{CommandBatch, UndoStack, DEFAULT_MAX_UNDO_LEVELS};
