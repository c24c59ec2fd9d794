//! Check and fix entry points.
//!
//! `check` is load, extract, analyze. `fix` does the same, plans repairs,
//! applies them under one backup session, then re-runs the analysis on the
//! rewritten documents to report what remains.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::analyze::{analyze, Analysis};
use crate::backup::BackupSession;
use crate::config::ProjectConfig;
use crate::domain::{LoadState, Origin, Repair, RepairFailure, Result};
use crate::executor;
use crate::extract::Symbols;
use crate::loader::SpecModel;
use crate::obs;
use crate::planner::{plan_repairs, PlanContext, RepairMode, RepairPlan};
use crate::resolver::{PrefixSimilarity, SimilarityStrategy};

/// Load outcome of one input file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentStatus {
    pub origin: Origin,
    pub path: PathBuf,
    #[serde(flatten)]
    pub state: LoadState,
}

fn document_statuses(model: &SpecModel) -> Vec<DocumentStatus> {
    let mut statuses: Vec<DocumentStatus> = model
        .documents()
        .map(|doc| DocumentStatus {
            origin: doc.kind.into(),
            path: doc.path.clone(),
            state: doc.state.clone(),
        })
        .collect();
    let code = &model.action_code;
    let state = match (&code.text, &code.error) {
        (_, Some(reason)) => LoadState::Malformed {
            reason: reason.clone(),
        },
        (Some(_), None) => LoadState::Loaded,
        (None, None) => LoadState::Missing,
    };
    statuses.push(DocumentStatus {
        origin: Origin::ActionCode,
        path: code.path.clone(),
        state,
    });
    statuses
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub root: PathBuf,
    pub documents: Vec<DocumentStatus>,
    pub analysis: Analysis,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        !self.analysis.has_issues()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixOptions {
    pub mode: RepairMode,
    /// Plan only; no backups, no writes.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FixReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub root: PathBuf,
    pub options: FixOptions,
    /// Findings before any repair.
    pub initial: Analysis,
    pub plan: RepairPlan,
    /// Backup directory of this run; `None` when nothing was written.
    pub backup_dir: Option<PathBuf>,
    pub applied: Vec<Repair>,
    pub failures: Vec<RepairFailure>,
    /// Findings after re-loading the repaired documents.
    pub residual: Analysis,
}

impl FixReport {
    /// No issue-level findings remain and every planned edit succeeded.
    pub fn is_clean(&self) -> bool {
        !self.residual.has_issues() && self.failures.is_empty()
    }
}

/// Consistency engine bound to one project configuration.
#[derive(Clone)]
pub struct Engine {
    config: Arc<ProjectConfig>,
    strategy: Arc<dyn SimilarityStrategy>,
}

impl Engine {
    /// Engine with the default prefix-based resolver.
    pub fn new(config: ProjectConfig) -> Self {
        let strategy = PrefixSimilarity::new([
            config.conventions.response_prefix.clone(),
            config.conventions.custom_action_prefix.clone(),
        ]);
        Self {
            config: Arc::new(config),
            strategy: Arc::new(strategy),
        }
    }

    /// Replace the resolver used by rewrite-mode repairs.
    pub fn with_strategy(mut self, strategy: impl SimilarityStrategy + 'static) -> Self {
        self.strategy = Arc::new(strategy);
        self
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub async fn load(&self) -> SpecModel {
        SpecModel::load(&self.config).await
    }

    pub async fn check(&self) -> CheckReport {
        let run_id = Uuid::new_v4();
        self.run_check(run_id)
            .instrument(obs::run_span(&run_id.to_string()))
            .await
    }

    /// Plan and apply repairs.
    ///
    /// Fails only when the backup directory cannot be prepared, in which case
    /// no document has been touched.
    pub async fn fix(&self, options: FixOptions) -> Result<FixReport> {
        let run_id = Uuid::new_v4();
        self.run_fix(run_id, options)
            .instrument(obs::run_span(&run_id.to_string()))
            .await
    }

    async fn run_check(&self, run_id: Uuid) -> CheckReport {
        let started = Instant::now();
        obs::emit_run_started(&run_id.to_string(), "check", &self.config.root);

        let model = self.load().await;
        let analysis = self.analyze(&model);
        for finding in &analysis.findings {
            obs::emit_finding_reported(finding);
        }

        obs::emit_run_finished(
            &run_id.to_string(),
            started.elapsed().as_millis() as u64,
            analysis.issue_count(),
            analysis.warning_count(),
            !analysis.has_issues(),
        );
        CheckReport {
            run_id,
            generated_at: Utc::now(),
            root: self.config.root.clone(),
            documents: document_statuses(&model),
            analysis,
        }
    }

    async fn run_fix(&self, run_id: Uuid, options: FixOptions) -> Result<FixReport> {
        let started = Instant::now();
        obs::emit_run_started(&run_id.to_string(), "fix", &self.config.root);

        let model = self.load().await;
        let symbols = Symbols::extract(&model);
        let initial = analyze(&model, &symbols, &self.config.conventions);
        for finding in &initial.findings {
            obs::emit_finding_reported(finding);
        }

        let plan = plan_repairs(
            &PlanContext {
                config: &self.config,
                model: &model,
                symbols: &symbols,
                mode: options.mode,
                strategy: self.strategy.as_ref(),
            },
            &initial,
        );

        let mut report = FixReport {
            run_id,
            generated_at: Utc::now(),
            root: self.config.root.clone(),
            options,
            residual: initial.clone(),
            initial,
            failures: plan.skipped.clone(),
            plan,
            backup_dir: None,
            applied: Vec::new(),
        };
        for skipped in &report.failures {
            obs::emit_repair_failed(skipped);
        }

        if !options.dry_run && !report.plan.is_empty() {
            let session = BackupSession::start(&self.config.backup_root, &self.config.root)?;
            let backup_dir = session.dir().to_path_buf();
            let (applied, failures) = executor::execute(
                report.plan.edits.clone(),
                Arc::new(session),
                Arc::new(self.config.conventions.clone()),
            )
            .await;
            report.applied = applied;
            report.failures.extend(failures);
            if report.applied.iter().any(|r| r.backup.is_some()) {
                report.backup_dir = Some(backup_dir);
            }
            report.residual = self.analyze(&self.load().await);
        }

        obs::emit_run_finished(
            &run_id.to_string(),
            started.elapsed().as_millis() as u64,
            report.residual.issue_count(),
            report.residual.warning_count(),
            report.is_clean(),
        );
        Ok(report)
    }

    fn analyze(&self, model: &SpecModel) -> Analysis {
        analyze(model, &Symbols::extract(model), &self.config.conventions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FindingKind;

    fn write(root: &std::path::Path, rel: &str, text: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }

    #[tokio::test]
    async fn test_check_reports_document_states() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "domain.yml", "intents: [greet]\n");
        let engine = Engine::new(ProjectConfig::for_root(dir.path()));
        let report = engine.check().await;

        assert_eq!(report.documents.len(), 6);
        assert_eq!(report.documents[0].state, LoadState::Loaded);
        assert_eq!(report.documents[1].state, LoadState::Missing);
        assert_eq!(
            report.analysis.findings[0].kind,
            FindingKind::IntentWithoutExamples
        );
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "domain.yml", "intents: [greet]\n");
        let engine = Engine::new(ProjectConfig::for_root(dir.path()));
        let report = engine
            .fix(FixOptions {
                dry_run: true,
                ..FixOptions::default()
            })
            .await
            .unwrap();

        assert!(!report.plan.is_empty());
        assert!(report.applied.is_empty());
        assert!(report.backup_dir.is_none());
        assert!(!dir.path().join("data/nlu.yml").exists());
        assert!(!dir.path().join(".dialint/backups").exists());
    }

    #[tokio::test]
    async fn test_unusable_backup_root_is_fatal_and_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let domain = "intents: [greet]\nentities: []\n";
        write(dir.path(), "domain.yml", domain);
        write(
            dir.path(),
            "data/nlu.yml",
            "nlu:\n  - intent: greet\n    examples: |\n      - hi [Paris](city)\n      - hello\n      - hey\n",
        );
        write(dir.path(), "blocked", "a file, not a directory");
        let mut config = ProjectConfig::for_root(dir.path());
        config.backup_root = dir.path().join("blocked");

        let err = Engine::new(config).fix(FixOptions::default()).await.unwrap_err();
        assert!(matches!(err, crate::LintError::BackupUnavailable { .. }));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("domain.yml")).unwrap(),
            domain
        );
    }
}
