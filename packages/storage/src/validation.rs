//! Structural checks run before every save and after every load.

use std::collections::HashSet;

use folio_document::Document;

use crate::ValidationError;

/// Check the invariants a persisted document must hold.
pub fn validate(doc: &Document) -> Result<(), ValidationError> {
    if doc.id().is_nil() {
        return Err(ValidationError::NilDocumentId);
    }
    if doc.blocks().is_empty() {
        return Err(ValidationError::NoBlocks);
    }

    let mut seen = HashSet::with_capacity(doc.block_count());
    for block in doc.blocks() {
        if !seen.insert(block.id()) {
            return Err(ValidationError::DuplicateBlockId(block.id()));
        }
    }

    if doc.created_at() > doc.last_edited_at() {
        return Err(ValidationError::TimestampOrder {
            created_at: doc.created_at(),
            last_edited_at: doc.last_edited_at(),
        });
    }

    Ok(())
}
