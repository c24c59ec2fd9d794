//! Structured observability hooks for dialint run lifecycle events.
//!
//! This module provides:
//! - A run-scoped tracing span via [`run_span`]
//! - One emission function per lifecycle event, each a single structured line
//!
//! Events are emitted at `info!` (or `warn!` for degraded outcomes) and are
//! filtered through `RUST_LOG`.

use std::path::Path;

use tracing::{info, warn};

use crate::domain::{Backup, DocumentKind, Finding, Repair, RepairFailure};

/// Span tagged with the run id; async entry points run inside it via
/// `tracing::Instrument`.
///
/// # Example
///
/// ```ignore
/// async { /* ... */ }.instrument(run_span("3f1c..."))
/// // every event inside carries run_id = "3f1c..."
/// ```
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("dialint.run", run_id = %run_id)
}

/// Emit event: a `check` or `fix` run started.
pub fn emit_run_started(run_id: &str, command: &str, root: &Path) {
    info!(event = "run.started", run_id = %run_id, command = %command, root = %root.display());
}

pub fn emit_document_loaded(kind: DocumentKind, path: &Path) {
    info!(event = "document.loaded", kind = %kind, path = %path.display());
}

/// Emit event: document absent; it is analyzed as empty.
pub fn emit_document_missing(kind: DocumentKind, path: &Path) {
    info!(event = "document.missing", kind = %kind, path = %path.display());
}

/// Emit event: document present but unparseable (warning level).
pub fn emit_document_malformed(kind: DocumentKind, path: &Path, reason: &str) {
    warn!(event = "document.malformed", kind = %kind, path = %path.display(), reason = %reason);
}

pub fn emit_action_code_unreadable(path: &Path, reason: &str) {
    warn!(event = "action_code.unreadable", path = %path.display(), reason = %reason);
}

pub fn emit_finding_reported(finding: &Finding) {
    info!(
        event = "finding.reported",
        code = %finding.kind,
        severity = ?finding.severity,
        symbols = %finding.symbols.join(","),
        message = %finding.message,
    );
}

pub fn emit_backup_created(backup: &Backup) {
    info!(
        event = "backup.created",
        original = %backup.original.display(),
        backup = %backup.path.display(),
        sha256 = %backup.digest,
        bytes = backup.bytes,
    );
}

pub fn emit_repair_applied(repair: &Repair) {
    info!(
        event = "repair.applied",
        code = %repair.finding,
        target = %repair.target,
        path = %repair.path.display(),
        description = %repair.description,
    );
}

/// Emit event: a planned file edit was not written (warning level).
pub fn emit_repair_failed(failure: &RepairFailure) {
    warn!(
        event = "repair.failed",
        path = %failure.path.display(),
        findings = failure.findings.len(),
        reason = %failure.reason,
    );
}

/// Emit event: run finished with duration and remaining finding counts.
pub fn emit_run_finished(run_id: &str, duration_ms: u64, issues: usize, warnings: usize, success: bool) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        issues = issues,
        warnings = warnings,
        success = success,
    );
}
