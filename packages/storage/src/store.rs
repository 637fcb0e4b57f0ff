//! # Document Store
//!
//! One JSON file per document under a root directory, named by document id.
//!
//! ## Save protocol
//!
//! ```text
//! validate → backup → write <file>.tmp → read back → rename over <file>
//!                                  ↘ on failure: restore <file>.backup
//! ```
//!
//! The target file is only ever replaced by a rename, never written in
//! place, so a crash mid-save leaves the previously committed file intact.
//! Restoring a backup goes through a `<file>.restore` sibling for the same
//! reason. Backup and restore are best-effort: their failures are logged and
//! never escalate.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use folio_document::{Document, DocumentId};
use tracing::{debug, error, info, instrument, warn};

use crate::config::DEFAULT_CONFIG_NAME;
use crate::record::{decode, encode};
use crate::validation::validate;
use crate::{StorageConfig, StorageError, StorageResult};

const BACKUP_SUFFIX: &str = "backup";
const TEMP_SUFFIX: &str = "tmp";
const RESTORE_SUFFIX: &str = "restore";

/// A file that could not be loaded during a bulk load.
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: StorageError,
}

/// Result of loading every document under the root.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Loaded documents, most recently edited first
    pub documents: Vec<Document>,

    /// Files that failed to load
    pub skipped: Vec<SkippedFile>,
}

/// Filesystem-backed persistence for documents
#[derive(Debug, Clone)]
pub struct DocumentStore {
    config: StorageConfig,
}

impl DocumentStore {
    /// Open a store, creating the root directory if needed
    pub fn open(config: StorageConfig) -> StorageResult<Self> {
        fs::create_dir_all(&config.root)?;
        debug!(root = %config.root.display(), "opened document store");
        Ok(Self { config })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Create a new empty document stamped with the configured author.
    pub fn new_document(&self) -> Document {
        Document::new().with_author(self.config.default_author.as_str())
    }

    /// Path of the file holding `id`
    pub fn path_for(&self, id: DocumentId) -> PathBuf {
        self.config
            .root
            .join(format!("{}.{}", id, self.config.extension))
    }

    /// Persist a document atomically.
    ///
    /// Returns the path written. Validation failures abort before anything
    /// touches the disk.
    #[instrument(skip_all, fields(document = %document.id()))]
    pub fn save(&self, document: &Document) -> StorageResult<PathBuf> {
        self.save_with(document, write_atomically)
    }

    /// [`DocumentStore::save`] with the write step supplied by the caller.
    fn save_with<W>(&self, document: &Document, write: W) -> StorageResult<PathBuf>
    where
        W: FnOnce(&Path, &Document) -> StorageResult<()>,
    {
        if let Err(err) = validate(document) {
            warn!(error = %err, "refusing to save invalid document");
            return Err(err.into());
        }

        let target = self.path_for(document.id());
        let backup = sibling(&target, BACKUP_SUFFIX);

        let backed_up = self.config.backups && target.exists() && {
            match fs::copy(&target, &backup) {
                Ok(_) => true,
                Err(err) => {
                    warn!(error = %err, path = %backup.display(), "backup failed, saving anyway");
                    false
                }
            }
        };

        match write(&target, document) {
            Ok(()) => {
                debug!(path = %target.display(), "saved");
                Ok(target)
            }
            Err(err) => {
                error!(error = %err, path = %target.display(), "save failed");
                if backed_up {
                    restore_after_failed_write(&backup, &target);
                }
                Err(err)
            }
        }
    }

    /// Load one document file.
    ///
    /// Malformed JSON is [`StorageError::CorruptFile`]; well-formed records
    /// that break document invariants are [`StorageError::Validation`].
    pub fn load(&self, path: &Path) -> StorageResult<Document> {
        read_document(path)
    }

    pub fn load_by_id(&self, id: DocumentId) -> StorageResult<Document> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(StorageError::DocumentNotFound(id));
        }
        self.load(&path)
    }

    /// Load every document under the root.
    ///
    /// Individual failures are collected in [`LoadReport::skipped`] and do
    /// not abort the rest. Only failing to read the directory itself is an
    /// error.
    #[instrument(skip_all)]
    pub fn load_all(&self) -> StorageResult<LoadReport> {
        let mut report = LoadReport::default();

        for entry in fs::read_dir(&self.config.root)? {
            let path = entry?.path();
            if !self.is_document_file(&path) {
                continue;
            }

            match self.load(&path) {
                Ok(doc) => report.documents.push(doc),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable document");
                    report.skipped.push(SkippedFile { path, error: err });
                }
            }
        }

        report
            .documents
            .sort_by(|a, b| b.last_edited_at().cmp(&a.last_edited_at()));
        info!(
            loaded = report.documents.len(),
            skipped = report.skipped.len(),
            "loaded documents"
        );
        Ok(report)
    }

    /// Documents that have not been soft-deleted, most recent first
    pub fn list_active(&self) -> StorageResult<Vec<Document>> {
        let report = self.load_all()?;
        Ok(report
            .documents
            .into_iter()
            .filter(Document::is_active)
            .collect())
    }

    /// Soft-delete: mark inactive and save. The file stays on disk.
    pub fn delete(&self, document: &mut Document) -> StorageResult<()> {
        document.set_active(false);
        self.save(document)?;
        info!(document = %document.id(), "soft-deleted");
        Ok(())
    }

    /// Undo a soft delete.
    pub fn restore(&self, document: &mut Document) -> StorageResult<()> {
        document.set_active(true);
        self.save(document)?;
        Ok(())
    }

    /// Hard delete: remove the file and its backup. Returns false if there
    /// was no file.
    pub fn purge(&self, id: DocumentId) -> StorageResult<bool> {
        let target = self.path_for(id);
        let backup = sibling(&target, BACKUP_SUFFIX);

        if backup.exists() {
            if let Err(err) = fs::remove_file(&backup) {
                warn!(error = %err, path = %backup.display(), "could not remove backup");
            }
        }

        match fs::remove_file(&target) {
            Ok(()) => {
                info!(document = %id, "purged");
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Merge tags into a stored document (set union) and save if anything
    /// changed.
    pub fn add_tags<I, S>(&self, id: DocumentId, tags: I) -> StorageResult<Document>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut document = self.load_by_id(id)?;
        if document.add_tags(tags) {
            self.save(&document)?;
        }
        Ok(document)
    }

    /// Replace a document's file with its `.backup` sibling.
    ///
    /// The backup is decoded and validated first; the main file is only
    /// touched if that succeeds.
    pub fn recover_from_backup(&self, id: DocumentId) -> StorageResult<Document> {
        let target = self.path_for(id);
        let backup = sibling(&target, BACKUP_SUFFIX);
        if !backup.exists() {
            return Err(StorageError::DocumentNotFound(id));
        }

        let document = read_document(&backup)?;
        let temp = sibling(&target, TEMP_SUFFIX);
        fs::copy(&backup, &temp)?;
        fs::rename(&temp, &target)?;
        info!(document = %id, "recovered from backup");
        Ok(document)
    }

    fn is_document_file(&self, path: &Path) -> bool {
        let is_config = path
            .file_name()
            .map_or(false, |name| name == DEFAULT_CONFIG_NAME);
        path.is_file()
            && !is_config
            && path
                .extension()
                .map_or(false, |ext| ext == self.config.extension.as_str())
    }
}

fn read_document(path: &Path) -> StorageResult<Document> {
    let bytes = fs::read(path)?;
    let record = decode(&bytes).map_err(|source| StorageError::CorruptFile {
        path: path.to_path_buf(),
        source,
    })?;
    let document = record.into_document();
    validate(&document)?;
    Ok(document)
}

/// Write to a temp sibling, verify it reads back, then rename over `target`.
fn write_atomically(target: &Path, document: &Document) -> StorageResult<()> {
    let temp = sibling(target, TEMP_SUFFIX);
    let result = write_and_verify(&temp, document).and_then(|()| {
        fs::rename(&temp, target)?;
        Ok(())
    });

    if result.is_err() && temp.is_file() {
        if let Err(err) = fs::remove_file(&temp) {
            warn!(error = %err, path = %temp.display(), "could not remove temp file");
        }
    }
    if result.is_ok() {
        sync_parent(target);
    }
    result
}

fn write_and_verify(temp: &Path, document: &Document) -> StorageResult<()> {
    let encoded = encode(document).map_err(io::Error::from)?;

    let mut file = File::create(temp)?;
    file.write_all(encoded.as_bytes())?;
    file.sync_all()?;
    drop(file);

    let written = fs::read(temp)?;
    let record = decode(&written).map_err(|source| StorageError::CorruptFile {
        path: temp.to_path_buf(),
        source,
    })?;
    if record.id != document.id() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "temp file read back with a different document id",
        )
        .into());
    }
    Ok(())
}

/// Put the backup back if a failed save left `target` unreadable. An intact
/// target is left alone.
fn restore_after_failed_write(backup: &Path, target: &Path) {
    if read_document(target).is_ok() {
        debug!(path = %target.display(), "target intact after failed save");
        return;
    }

    let staging = sibling(target, RESTORE_SUFFIX);
    let restored = fs::copy(backup, &staging).and_then(|_| fs::rename(&staging, target));
    match restored {
        Ok(()) => warn!(path = %target.display(), "restored previous version from backup"),
        Err(err) => {
            error!(error = %err, path = %target.display(), "backup restore failed");
            if staging.is_file() {
                if let Err(err) = fs::remove_file(&staging) {
                    warn!(error = %err, path = %staging.display(), "could not remove restore file");
                }
            }
        }
    }
}

/// Make the rename durable. Not every platform can open a directory.
fn sync_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(err) = File::open(parent).and_then(|dir| dir.sync_all()) {
            debug!(error = %err, path = %parent.display(), "directory sync skipped");
        }
    }
}

/// `notes/<id>.json` → `notes/<id>.json.<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
