//! Human-readable and machine-readable reports.

use crate::analyze::Analysis;
use crate::domain::{Finding, LoadState, Origin, Result};
use crate::engine::{CheckReport, FixReport};
use crate::planner::RepairMode;

fn render_finding(out: &mut String, finding: &Finding) {
    out.push_str(&format!("  [{}] {}\n", finding.kind, finding.message));
    if !finding.found_in.is_empty() || !finding.missing_from.is_empty() {
        let join = |origins: &[Origin]| {
            origins
                .iter()
                .map(|o| o.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut evidence = Vec::new();
        if !finding.found_in.is_empty() {
            evidence.push(format!("found in {}", join(&finding.found_in)));
        }
        if !finding.missing_from.is_empty() {
            evidence.push(format!("missing from {}", join(&finding.missing_from)));
        }
        out.push_str(&format!("      {}\n", evidence.join("; ")));
    }
}

fn render_findings(out: &mut String, analysis: &Analysis) {
    let issues: Vec<&Finding> = analysis.issues().collect();
    let warnings: Vec<&Finding> = analysis.warnings().collect();

    if issues.is_empty() && warnings.is_empty() {
        out.push_str("No inconsistencies found.\n");
        return;
    }
    if !issues.is_empty() {
        out.push_str(&format!("Issues ({}):\n", issues.len()));
        for finding in issues {
            render_finding(out, finding);
        }
    }
    if !warnings.is_empty() {
        out.push_str(&format!("Warnings ({}):\n", warnings.len()));
        for finding in warnings {
            render_finding(out, finding);
        }
    }
}

/// Text report for `dialint check`.
pub fn render_check_report(report: &CheckReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("dialint check: {}\n\n", report.root.display()));

    let unavailable: Vec<_> = report
        .documents
        .iter()
        .filter(|d| d.state != LoadState::Loaded)
        .collect();
    if !unavailable.is_empty() {
        out.push_str("Documents:\n");
        for doc in unavailable {
            let state = match &doc.state {
                LoadState::Missing => "missing (treated as empty)".to_string(),
                LoadState::Malformed { reason } => format!("unreadable: {reason}"),
                LoadState::Loaded => String::new(),
            };
            out.push_str(&format!("  {} {}: {}\n", doc.origin, doc.path.display(), state));
        }
        out.push('\n');
    }

    render_findings(&mut out, &report.analysis);

    let analysis = &report.analysis;
    out.push_str(&format!(
        "\nSummary: {} issue(s), {} warning(s), {} auto-fixable\n",
        analysis.issue_count(),
        analysis.warning_count(),
        analysis.fixable_count()
    ));

    out.push_str("\nNext steps:\n");
    if analysis.fixable_count() > 0 {
        out.push_str("  - run `dialint fix` to apply mechanical repairs (backups are taken first)\n");
    }
    if analysis.findings.iter().any(|f| !f.kind.is_auto_fixable()) {
        out.push_str("  - review the report-only findings by hand\n");
    }
    if analysis.findings.is_empty() {
        out.push_str("  - retrain the model to pick up the current documents\n");
    } else {
        out.push_str("  - re-run `dialint check`, then retrain the model\n");
    }
    out
}

/// Text report for `dialint fix`.
pub fn render_fix_report(report: &FixReport) -> String {
    let mut out = String::new();
    let mode = match report.options.mode {
        RepairMode::Declare => "declare",
        RepairMode::Rewrite => "rewrite references",
    };
    let header = if report.options.dry_run { "dry run" } else { "applied" };
    out.push_str(&format!(
        "dialint fix ({mode}, {header}): {}\n\n",
        report.root.display()
    ));

    if report.plan.is_empty() && report.failures.is_empty() {
        out.push_str("Nothing to repair.\n");
    }

    if report.options.dry_run {
        for edit in &report.plan.edits {
            out.push_str(&format!("Would edit {}:\n", edit.path.display()));
            for planned in &edit.mutations {
                out.push_str(&format!("  - {}\n", planned.mutation));
            }
        }
    } else if !report.applied.is_empty() {
        out.push_str(&format!("Applied ({}):\n", report.applied.len()));
        for repair in &report.applied {
            out.push_str(&format!(
                "  - {} ({})\n",
                repair.description,
                repair.path.display()
            ));
        }
        if let Some(dir) = &report.backup_dir {
            out.push_str(&format!("Backups: {}\n", dir.display()));
        }
    }

    if !report.failures.is_empty() {
        out.push_str(&format!("\nFailed ({}):\n", report.failures.len()));
        for failure in &report.failures {
            out.push_str(&format!(
                "  - {}: {}\n",
                failure.path.display(),
                failure.reason
            ));
        }
    }

    out.push_str(if report.options.dry_run {
        "\nCurrent findings:\n"
    } else {
        "\nRemaining findings:\n"
    });
    render_findings(&mut out, &report.residual);

    out.push_str("\nNext steps:\n");
    if report.options.dry_run && !report.plan.is_empty() {
        out.push_str("  - run `dialint fix` without --dry-run to apply the plan\n");
    }
    if report
        .applied
        .iter()
        .any(|r| r.description.contains("placeholder") || r.description.contains("stub"))
    {
        out.push_str("  - replace the TODO placeholders with real examples, responses and code\n");
    }
    if !report.failures.is_empty() {
        out.push_str("  - repair the failed documents by hand (originals are in the backup directory)\n");
    }
    out.push_str("  - re-run `dialint check`, then retrain the model\n");
    out
}

pub fn check_report_json(report: &CheckReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn fix_report_json(report: &FixReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
