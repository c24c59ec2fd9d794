//! Dialint Core Library
//!
//! Cross-document consistency checks and mechanical repairs for declarative
//! dialogue-agent projects: a domain declaration, NLU examples, stories,
//! rules, the pipeline config and the custom action code.

pub mod action_code;
pub mod analyze;
pub mod backup;
pub mod config;
pub mod domain;
pub mod engine;
pub mod executor;
pub mod extract;
pub mod loader;
pub mod obs;
pub mod planner;
pub mod report;
pub mod resolver;
pub mod telemetry;

pub use domain::{
    Backup, Document, DocumentKind, Finding, FindingKind, LintError, LoadState, Node, Origin,
    Repair, RepairFailure, Result, Scalar, Severity, SymbolKind, SymbolSet,
};

pub use action_code::ActionCode;
pub use analyze::{analyze, Analysis};
pub use backup::BackupSession;
pub use config::{Conventions, FeatureComponent, ImbalanceBaseline, ProjectConfig};
pub use engine::{CheckReport, DocumentStatus, Engine, FixOptions, FixReport};
pub use extract::Symbols;
pub use loader::SpecModel;
pub use planner::{plan_repairs, FileEdit, Mutation, PlanContext, RepairMode, RepairPlan};
pub use report::{check_report_json, fix_report_json, render_check_report, render_fix_report};
pub use resolver::{PrefixSimilarity, SimilarityStrategy};
pub use telemetry::init_tracing;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
