//! Per-run backup session.
//!
//! Layout: `<backup_root>/<%Y%m%d_%H%M%S_%6f>/<path relative to project root>`.
//! A session directory is created once per `fix` run and backups inside it
//! are never overwritten.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::domain::{Backup, LintError, Result};
use crate::obs;

/// Session subdirectory holding copies of files outside the project root.
const EXTERNAL_DIR: &str = "external";

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[derive(Debug, Clone)]
pub struct BackupSession {
    dir: PathBuf,
    project_root: PathBuf,
}

impl BackupSession {
    /// Create and probe this run's backup directory.
    ///
    /// Any failure is [`LintError::BackupUnavailable`]; callers must not
    /// write documents without a session.
    pub fn start(backup_root: impl AsRef<Path>, project_root: impl AsRef<Path>) -> Result<Self> {
        let backup_root = backup_root.as_ref();
        let unavailable = |path: &Path, e: std::io::Error| LintError::BackupUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        fs::create_dir_all(backup_root).map_err(|e| unavailable(backup_root, e))?;

        let stamp = Utc::now().format("%Y%m%d_%H%M%S_%6f").to_string();
        let mut dir = backup_root.join(&stamp);
        let mut suffix = 1;
        loop {
            match fs::create_dir(&dir) {
                Ok(()) => break,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && suffix < 100 => {
                    dir = backup_root.join(format!("{stamp}-{suffix}"));
                    suffix += 1;
                }
                Err(e) => return Err(unavailable(&dir, e)),
            }
        }

        let mut probe = NamedTempFile::new_in(&dir).map_err(|e| unavailable(&dir, e))?;
        probe
            .write_all(b"probe")
            .and_then(|()| probe.flush())
            .map_err(|e| unavailable(&dir, e))?;

        Ok(Self {
            dir,
            project_root: project_root.as_ref().to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn destination(&self, original: &Path) -> PathBuf {
        match original.strip_prefix(&self.project_root) {
            Ok(relative) if !relative.as_os_str().is_empty() => self.dir.join(relative),
            _ => {
                // Files outside the project are grouped by a digest of their
                // parent directory so equal file names stay apart.
                let parent = original.parent().unwrap_or(Path::new(""));
                let digest = sha256_hex(parent.to_string_lossy().as_bytes());
                self.dir
                    .join(EXTERNAL_DIR)
                    .join(&digest[..12])
                    .join(original.file_name().unwrap_or(original.as_os_str()))
            }
        }
    }

    /// Copy `bytes`, the current content of `original`, into the session.
    pub fn snapshot(&self, original: &Path, bytes: &[u8]) -> Result<Backup> {
        let path = self.destination(original);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        file.write_all(bytes)?;
        file.sync_all()?;

        let backup = Backup {
            original: original.to_path_buf(),
            path,
            digest: sha256_hex(bytes),
            bytes: bytes.len() as u64,
        };
        obs::emit_backup_created(&backup);
        Ok(backup)
    }
}

impl Backup {
    /// Re-read the copy and confirm it holds exactly `expected`.
    pub fn verify(&self, expected: &[u8]) -> Result<()> {
        let stored = fs::read(&self.path)?;
        let stored_digest = sha256_hex(&stored);
        if stored_digest != self.digest || stored_digest != sha256_hex(expected) {
            return Err(LintError::BackupMismatch {
                path: self.path.clone(),
            });
        }
        Ok(())
    }
}
