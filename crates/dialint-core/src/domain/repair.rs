//! Applied repair and backup records.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::finding::{FindingKind, Origin};

/// Immutable copy of a file's content taken before it was rewritten.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Backup {
    /// File that was copied.
    pub original: PathBuf,

    /// Location of the copy.
    pub path: PathBuf,

    /// SHA-256 hex digest of the copied bytes.
    pub digest: String,

    /// Size of the copy in bytes.
    pub bytes: u64,
}

/// One applied mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repair {
    /// Kind of the finding this repair resolves.
    pub finding: FindingKind,

    /// Document (or action code) that was mutated.
    pub target: Origin,

    /// File that was written.
    pub path: PathBuf,

    /// Human-readable description of the insertion.
    pub description: String,

    /// Backup taken before the write; `None` when the file did not exist.
    pub backup: Option<PathBuf>,
}

/// A planned file write that was not performed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepairFailure {
    /// File that could not be written.
    pub path: PathBuf,

    /// Targets whose mutations were dropped.
    pub targets: Vec<Origin>,

    /// Finding kinds left unresolved by the failure.
    pub findings: Vec<FindingKind>,

    pub reason: String,
}
