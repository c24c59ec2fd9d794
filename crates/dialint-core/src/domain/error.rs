//! Error taxonomy for dialint.

use std::path::PathBuf;

/// Dialint errors.
///
/// Only [`LintError::BackupUnavailable`] aborts a `fix` run; every other
/// variant is recovered per document and surfaced in the report.
#[derive(Debug, thiserror::Error)]
pub enum LintError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid project config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("backup directory {path} is unusable: {reason}")]
    BackupUnavailable { path: PathBuf, reason: String },

    #[error("backup {path} does not match the original content")]
    BackupMismatch { path: PathBuf },

    #[error("background task failed: {0}")]
    Task(String),
}

/// Result type for dialint operations.
pub type Result<T> = std::result::Result<T, LintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_unavailable_display() {
        let err = LintError::BackupUnavailable {
            path: PathBuf::from("/srv/bot/.dialint/backups"),
            reason: "permission denied".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/srv/bot/.dialint/backups"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn test_config_error_display() {
        let err = LintError::Config {
            path: PathBuf::from("dialint.toml"),
            reason: "unknown field `pipline`".to_string(),
        };
        assert!(err.to_string().contains("invalid project config"));
        assert!(err.to_string().contains("pipline"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: LintError = io.into();
        assert!(matches!(err, LintError::Io(_)));
    }
}
