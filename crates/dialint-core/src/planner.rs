//! Repair planning.
//!
//! Maps auto-fixable findings to concrete insertions, grouped by the file
//! they touch. Report-only findings produce nothing. Edits aimed at a
//! document that could not be parsed are set aside as failures.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::analyze::Analysis;
use crate::config::ProjectConfig;
use crate::domain::{DocumentKind, Finding, FindingKind, Origin, RepairFailure};
use crate::extract::Symbols;
use crate::loader::SpecModel;
use crate::resolver::SimilarityStrategy;

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// How undeclared script references are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairMode {
    /// Declare the missing symbol (always safe).
    #[default]
    Declare,
    /// Rewrite the reference to the closest declared symbol.
    Rewrite,
}

/// Step field a rewrite applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Intent,
    Action,
}

impl ReferenceKind {
    pub fn step_key(self) -> &'static str {
        match self {
            Self::Intent => "intent",
            Self::Action => "action",
        }
    }
}

/// One insertion or rewrite. Every variant is a no-op when already applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    DeclareIntent { name: String },
    PlaceholderExamples { intent: String },
    DeclareAction { name: String },
    DeclareResponse { name: String },
    DeclareEntity { name: String },
    DeclareSlot { name: String },
    InsertComponent { name: String },
    RewriteReference {
        scope: DocumentKind,
        kind: ReferenceKind,
        from: String,
        to: String,
    },
    AppendActionStub { name: String },
}

impl Mutation {
    pub fn target(&self) -> Origin {
        match self {
            Self::DeclareIntent { .. }
            | Self::DeclareAction { .. }
            | Self::DeclareResponse { .. }
            | Self::DeclareEntity { .. }
            | Self::DeclareSlot { .. } => Origin::Domain,
            Self::PlaceholderExamples { .. } => Origin::Examples,
            Self::InsertComponent { .. } => Origin::Pipeline,
            Self::RewriteReference { scope, .. } => Origin::from(*scope),
            Self::AppendActionStub { .. } => Origin::ActionCode,
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeclareIntent { name } => write!(f, "declare intent `{name}`"),
            Self::PlaceholderExamples { intent } => {
                write!(f, "add placeholder examples for intent `{intent}`")
            }
            Self::DeclareAction { name } => write!(f, "declare action `{name}`"),
            Self::DeclareResponse { name } => write!(f, "add placeholder response `{name}`"),
            Self::DeclareEntity { name } => write!(f, "declare entity `{name}`"),
            Self::DeclareSlot { name } => write!(f, "declare slot `{name}`"),
            Self::InsertComponent { name } => write!(f, "insert pipeline component `{name}`"),
            Self::RewriteReference {
                scope,
                kind,
                from,
                to,
            } => write!(f, "rewrite {} `{from}` to `{to}` in {scope}", kind.step_key()),
            Self::AppendActionStub { name } => write!(f, "append stub for action `{name}`"),
        }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMutation {
    /// Finding kind this mutation resolves.
    pub finding: FindingKind,
    pub mutation: Mutation,
}

/// Every mutation of one file. Applied as a unit, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEdit {
    pub path: PathBuf,
    pub mutations: Vec<PlannedMutation>,
}

impl FileEdit {
    pub fn targets(&self) -> Vec<Origin> {
        let mut targets: Vec<Origin> = self.mutations.iter().map(|m| m.mutation.target()).collect();
        targets.sort();
        targets.dedup();
        targets
    }

    pub fn findings(&self) -> Vec<FindingKind> {
        let mut kinds: Vec<FindingKind> = self.mutations.iter().map(|m| m.finding).collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }

    /// Failure record covering every mutation of this edit.
    pub fn failure(&self, reason: impl Into<String>) -> RepairFailure {
        RepairFailure {
            path: self.path.clone(),
            targets: self.targets(),
            findings: self.findings(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairPlan {
    pub edits: Vec<FileEdit>,
    /// Edits that cannot be attempted (malformed target document).
    pub skipped: Vec<RepairFailure>,
}

impl RepairPlan {
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn mutation_count(&self) -> usize {
        self.edits.iter().map(|e| e.mutations.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

/// Inputs shared by every planning decision.
pub struct PlanContext<'a> {
    pub config: &'a ProjectConfig,
    pub model: &'a SpecModel,
    pub symbols: &'a Symbols,
    pub mode: RepairMode,
    pub strategy: &'a dyn SimilarityStrategy,
}

/// Build the repair plan for `analysis`.
pub fn plan_repairs(ctx: &PlanContext<'_>, analysis: &Analysis) -> RepairPlan {
    let mut builder = PlanBuilder::default();
    for finding in analysis.findings.iter().filter(|f| f.kind.is_auto_fixable()) {
        for mutation in mutations_for(ctx, finding) {
            let path = target_path(ctx.config, mutation.target());
            builder.push(path, finding.kind, mutation);
        }
    }
    builder.finish(ctx.model)
}

#[derive(Default)]
struct PlanBuilder {
    edits: IndexMap<PathBuf, Vec<PlannedMutation>>,
}

impl PlanBuilder {
    fn push(&mut self, path: &Path, finding: FindingKind, mutation: Mutation) {
        let mutations = self.edits.entry(path.to_path_buf()).or_default();
        if mutations.iter().any(|m| m.mutation == mutation) {
            return;
        }
        mutations.push(PlannedMutation { finding, mutation });
    }

    fn finish(self, model: &SpecModel) -> RepairPlan {
        let mut plan = RepairPlan::default();
        for (path, mutations) in self.edits {
            let edit = FileEdit { path, mutations };
            let blocked = edit.targets().into_iter().find(|t| target_unusable(model, *t));
            match blocked {
                Some(target) => plan.skipped.push(
                    edit.failure(format!("{target} document could not be parsed; repair it by hand")),
                ),
                None => plan.edits.push(edit),
            }
        }
        plan
    }
}

fn target_unusable(model: &SpecModel, target: Origin) -> bool {
    match target.document_kind() {
        Some(kind) => model.document(kind).is_malformed(),
        None => model.action_code.is_unreadable(),
    }
}

fn target_path(config: &ProjectConfig, target: Origin) -> &Path {
    match target.document_kind() {
        Some(kind) => config.document_path(kind),
        None => &config.actions_path,
    }
}

fn mutations_for(ctx: &PlanContext<'_>, finding: &Finding) -> Vec<Mutation> {
    let Some(name) = finding.subject().map(str::to_string) else {
        return Vec::new();
    };
    let domain = &ctx.symbols.domain;

    match finding.kind {
        FindingKind::IntentWithoutExamples => vec![Mutation::PlaceholderExamples { intent: name }],
        FindingKind::IntentUndeclared => vec![Mutation::DeclareIntent { name }],
        FindingKind::FlowIntentUndeclared => {
            let candidates: Vec<String> = domain.intents.iter().map(String::from).collect();
            if let Some(rewrites) = rewrites(ctx, finding, ReferenceKind::Intent, &name, &candidates) {
                return rewrites;
            }
            let mut out = vec![Mutation::DeclareIntent { name: name.clone() }];
            if !ctx.symbols.examples.intents.contains(&name) {
                out.push(Mutation::PlaceholderExamples { intent: name });
            }
            out
        }
        FindingKind::ActionUndeclared | FindingKind::ResponseUndeclared => {
            let candidates: Vec<String> = domain
                .actions
                .iter()
                .chain(domain.responses.iter())
                .map(String::from)
                .collect();
            if let Some(rewrites) = rewrites(ctx, finding, ReferenceKind::Action, &name, &candidates) {
                return rewrites;
            }
            declare_action(ctx, name, finding.kind)
        }
        FindingKind::ActionImplementationMissing => vec![Mutation::AppendActionStub { name }],
        FindingKind::EntityUndeclared => vec![Mutation::DeclareEntity { name }],
        FindingKind::SlotUndeclared | FindingKind::ActionCodeSlotUndeclared => {
            vec![Mutation::DeclareSlot { name }]
        }
        FindingKind::PipelineComponentMissing => vec![Mutation::InsertComponent { name }],
        FindingKind::FlowPathCollision
        | FindingKind::ActionPrefixConflict
        | FindingKind::FewExamples
        | FindingKind::ExampleImbalance
        | FindingKind::DocumentUnreadable => Vec::new(),
    }
}

fn declare_action(ctx: &PlanContext<'_>, name: String, kind: FindingKind) -> Vec<Mutation> {
    if kind == FindingKind::ResponseUndeclared {
        return vec![Mutation::DeclareResponse { name }];
    }
    let mut out = vec![Mutation::DeclareAction { name: name.clone() }];
    if ctx.config.conventions.is_custom_action(&name) && !ctx.model.action_code.implements(&name) {
        out.push(Mutation::AppendActionStub { name });
    }
    out
}

/// Rewrites for every script document the reference was found in, or `None`
/// when not in rewrite mode or nothing can stand in for it.
fn rewrites(
    ctx: &PlanContext<'_>,
    finding: &Finding,
    kind: ReferenceKind,
    name: &str,
    candidates: &[String],
) -> Option<Vec<Mutation>> {
    if ctx.mode != RepairMode::Rewrite {
        return None;
    }
    let to = ctx.strategy.resolve(name, candidates)?;
    let out: Vec<Mutation> = finding
        .found_in
        .iter()
        .filter_map(|origin| origin.document_kind())
        .filter(|scope| scope.script_key().is_some())
        .map(|scope| Mutation::RewriteReference {
            scope,
            kind,
            from: name.to_string(),
            to: to.clone(),
        })
        .collect();
    (!out.is_empty()).then_some(out)
}
