//! Config persistence with a single backup copy.
//!
//! ## `ConfigStore::write`: protocol
//!
//! 1. If `<path>` exists, copy it to `<path><suffix>` (the backup).
//! 2. Write the document to `<path>.nightcam.tmp`.
//! 3. Rename the temp file over `<path>` (atomic on POSIX).
//!
//! The backup always holds the document that was current right before the
//! last successful write. A failed rename removes the temp file and leaves
//! `<path>` untouched.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use nightcam_core::settings::backup_path_for;
use nightcam_renderer::ConfigDocument;

use crate::error::PersistError;

/// Outcome of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub path: PathBuf,
    /// Set when a previous file existed and was copied aside.
    pub backup: Option<PathBuf>,
    /// SHA-256 hex digest of the written content.
    pub sha256: String,
}

/// The on-disk config file plus its sibling backup.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    backup: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>, backup_suffix: &str) -> Self {
        let path = path.into();
        let backup = backup_path_for(&path, backup_suffix);
        Self { path, backup }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup
    }

    /// Back up the current file (if any), then atomically replace it with `document`.
    pub fn write(&self, document: &ConfigDocument) -> Result<WriteReport, PersistError> {
        let backup = match std::fs::copy(&self.path, &self.backup) {
            Ok(_) => {
                tracing::debug!(backup = %self.backup.display(), "backed up previous config");
                Some(self.backup.clone())
            }
            Err(err) if err.kind() == ErrorKind::NotFound && !self.path.exists() => None,
            Err(source) => {
                return Err(PersistError::Backup {
                    path: self.path.clone(),
                    backup: self.backup.clone(),
                    source,
                })
            }
        };

        atomic_write(&self.path, document.as_str())?;

        let report = WriteReport {
            path: self.path.clone(),
            backup,
            sha256: sha256_hex(document.as_str()),
        };
        tracing::info!(
            path = %report.path.display(),
            sha256 = %report.sha256,
            backed_up = report.backup.is_some(),
            "wrote config",
        );
        Ok(report)
    }

    /// Undo `report`: restore the backup it made, or remove the file if it
    /// created one from nothing.
    pub fn roll_back(&self, report: &WriteReport) -> Result<(), PersistError> {
        match &report.backup {
            Some(backup) => {
                let previous =
                    std::fs::read_to_string(backup).map_err(|source| PersistError::Write {
                        path: backup.clone(),
                        source,
                    })?;
                atomic_write(&self.path, &previous)?;
            }
            None => match std::fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(PersistError::Write {
                        path: self.path.clone(),
                        source,
                    })
                }
            },
        }
        tracing::warn!(path = %self.path.display(), "rolled back config");
        Ok(())
    }

    /// Current on-disk content, `None` if the file does not exist.
    pub fn read_current(&self) -> std::io::Result<Option<String>> {
        read_optional_at(&self.path)
    }
}

/// Write `content` to `<path>.nightcam.tmp`, then rename it over `path`.
pub fn atomic_write(path: &Path, content: &str) -> Result<(), PersistError> {
    let tmp = PathBuf::from(format!("{}.nightcam.tmp", path.display()));
    atomic_write_with_tmp(path, content, &tmp)
}

fn atomic_write_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), PersistError> {
    let write_err = |p: &Path, source| PersistError::Write {
        path: p.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| write_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(write_err(path, e));
    }
    Ok(())
}

/// Hex-encoded SHA-256 of `content`.
pub fn sha256_hex(content: &str) -> String {
    let mut h = Sha256::new();
    h.update(content.as_bytes());
    hex::encode(h.finalize())
}

pub(crate) fn read_optional_at(path: &Path) -> std::io::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
