//! # Folio Storage
//!
//! Crash-safe persistence for Folio documents: one sorted-key JSON file per
//! document, validated on the way in and on the way out.
//!
//! ```rust,no_run
//! use folio_storage::{DocumentStore, StorageConfig};
//!
//! # fn main() -> Result<(), folio_storage::StorageError> {
//! let config = StorageConfig::load(std::path::Path::new("."))?;
//! let store = DocumentStore::open(config)?;
//!
//! let doc = store.new_document();
//! store.save(&doc)?;
//!
//! for doc in store.list_active()? {
//!     println!("{}  {}", doc.id().short(), doc.generated_title());
//! }
//! # Ok(())
//! # }
//! ```

mod autosave;
mod config;
mod error;
pub mod record;
mod store;
mod validation;

pub use autosave::Autosave;
pub use config::{StorageConfig, DEFAULT_CONFIG_NAME};
pub use error::{StorageError, StorageResult, ValidationError};
pub use store::{DocumentStore, LoadReport, SkippedFile};
pub use validation::validate;
