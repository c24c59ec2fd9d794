//! Symbol extraction.
//!
//! Pure functions from loaded documents to typed symbol sets. Unrecognized
//! shapes contribute nothing; extraction never fails.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{Document, DocumentKind, Node, SymbolKind, SymbolSet};
use crate::loader::SpecModel;

/// `[text](entity)` annotations inside example lines.
static ENTITY_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*?\]\((\w+)\)").expect("valid regex"));

/// Keys of an examples block that introduce a labelled group.
const EXAMPLE_GROUP_KEYS: [&str; 4] = ["intent", "regex", "synonym", "lookup"];

/// Vocabulary declared in the domain document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSymbols {
    pub intents: SymbolSet,
    pub entities: SymbolSet,
    pub slots: SymbolSet,
    pub actions: SymbolSet,
    pub responses: SymbolSet,
}

impl DomainSymbols {
    pub fn extract(doc: &Document) -> Self {
        let scope = DocumentKind::Domain;
        let tree = &doc.tree;

        let mut intents = SymbolSet::new(SymbolKind::Intent, scope);
        let mut entities = SymbolSet::new(SymbolKind::Entity, scope);
        let mut actions = SymbolSet::new(SymbolKind::Action, scope);
        for (key, set) in [
            ("intents", &mut intents),
            ("entities", &mut entities),
            ("actions", &mut actions),
        ] {
            for item in tree.items_at(key) {
                if let Some(name) = item.entry_name() {
                    set.insert(&name);
                }
            }
        }

        let mut slots = SymbolSet::new(SymbolKind::Slot, scope);
        slots.extend(tree.get("slots").into_iter().flat_map(Node::keys));
        let mut responses = SymbolSet::new(SymbolKind::Response, scope);
        responses.extend(tree.get("responses").into_iter().flat_map(Node::keys));

        Self {
            intents,
            entities,
            slots,
            actions,
            responses,
        }
    }
}

/// Labelled training examples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleSymbols {
    pub intents: SymbolSet,
    pub entities: SymbolSet,
    /// Example lines per intent, summed across blocks.
    pub counts: BTreeMap<String, usize>,
    /// Feature kinds present (`regex`, `synonym`, `lookup`).
    pub features: BTreeSet<String>,
}

impl ExampleSymbols {
    pub fn extract(doc: &Document) -> Self {
        let scope = DocumentKind::Examples;
        let mut intents = SymbolSet::new(SymbolKind::Intent, scope);
        let mut entities = SymbolSet::new(SymbolKind::Entity, scope);
        let mut counts = BTreeMap::new();
        let mut features = BTreeSet::new();

        for block in doc.tree.items_at("nlu") {
            let raw = block.get("examples");
            for text in example_texts(raw) {
                for caps in ENTITY_ANNOTATION.captures_iter(&text) {
                    entities.insert(&caps[1]);
                }
            }
            let lines = example_lines(raw);

            if let Some(intent) = block.get("intent").and_then(Node::text) {
                intents.insert(&intent);
                *counts.entry(intent).or_insert(0) += lines.len();
            }
            for key in EXAMPLE_GROUP_KEYS.iter().skip(1) {
                if block.get(key).is_some() {
                    features.insert(key.to_string());
                }
            }
        }

        Self {
            intents,
            entities,
            counts,
            features,
        }
    }
}

/// Raw text scanned for entity annotations: the whole block string, or each
/// item of an explicit list.
fn example_texts(examples: Option<&Node>) -> Vec<String> {
    match examples {
        Some(Node::Seq(items)) => items.iter().filter_map(Node::text).collect(),
        Some(node) => node.as_str().map(String::from).into_iter().collect(),
        None => Vec::new(),
    }
}

/// Example lines of one block: each `- ` line of a block string, or each
/// item of an explicit list.
fn example_lines(examples: Option<&Node>) -> Vec<String> {
    match examples {
        Some(Node::Seq(items)) => items.iter().filter_map(Node::text).collect(),
        Some(node) => node
            .as_str()
            .map(|block| {
                block
                    .lines()
                    .map(str::trim)
                    .filter(|line| line.starts_with('-'))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
        None => Vec::new(),
    }
}

/// One step of a flow or rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Intent(String),
    Action(String),
    SlotWasSet(Vec<String>),
    /// Any other step shape (checkpoints, loops, branches).
    Other,
}

impl Step {
    fn parse(node: &Node) -> Self {
        if let Some(intent) = node.get("intent").and_then(Node::text) {
            return Step::Intent(intent);
        }
        if let Some(action) = node.get("action").and_then(Node::text) {
            return Step::Action(action);
        }
        if let Some(slots) = node.get("slot_was_set") {
            return Step::SlotWasSet(slot_names(slots));
        }
        Step::Other
    }
}

/// `slot_was_set` accepts a bare name, a map, or a list of either.
fn slot_names(node: &Node) -> Vec<String> {
    match node {
        Node::Seq(items) => items.iter().flat_map(slot_names).collect(),
        Node::Map(map) => map.keys().map(|k| k.trim().to_string()).collect(),
        scalar => scalar.text().into_iter().collect(),
    }
}

/// A named flow or rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub id: String,
    pub steps: Vec<Step>,
}

/// Symbols referenced by a flow-shaped document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSymbols {
    pub intents: SymbolSet,
    pub actions: SymbolSet,
    pub slots: SymbolSet,
    pub scripts: Vec<Script>,
}

impl ScriptSymbols {
    pub fn extract(doc: &Document) -> Self {
        let scope = doc.kind;
        let mut symbols = Self {
            intents: SymbolSet::new(SymbolKind::Intent, scope),
            actions: SymbolSet::new(SymbolKind::Action, scope),
            slots: SymbolSet::new(SymbolKind::Slot, scope),
            scripts: Vec::new(),
        };
        let (Some(list_key), Some(id_key)) = (scope.script_key(), scope.script_id_key()) else {
            return symbols;
        };
        let label = match scope {
            DocumentKind::Rules => "Rule",
            _ => "Story",
        };

        for (index, entry) in doc.tree.items_at(list_key).iter().enumerate() {
            let id = entry
                .get(id_key)
                .and_then(Node::text)
                .unwrap_or_else(|| format!("{label} #{}", index + 1));
            let mut steps = Vec::new();
            for node in entry.items_at("steps") {
                symbols.collect_step(node);
                steps.push(Step::parse(node));
            }
            symbols.scripts.push(Script { id, steps });
        }
        symbols
    }

    fn collect_step(&mut self, node: &Node) {
        match Step::parse(node) {
            Step::Intent(name) => {
                self.intents.insert(&name);
            }
            Step::Action(name) => {
                self.actions.insert(&name);
            }
            Step::SlotWasSet(names) => self.slots.extend(names.iter().map(String::as_str)),
            Step::Other => {
                for branch in node.items_at("or") {
                    self.collect_step(branch);
                }
            }
        }
    }
}

/// Ordered pipeline components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSymbols {
    pub order: Vec<String>,
    pub components: SymbolSet,
}

impl PipelineSymbols {
    pub fn extract(doc: &Document) -> Self {
        let order: Vec<String> = doc
            .tree
            .items_at("pipeline")
            .iter()
            .filter_map(|item| match item {
                Node::Map(_) => item.get("name").and_then(Node::text),
                other => other.text(),
            })
            .collect();
        let mut components = SymbolSet::new(SymbolKind::PipelineComponent, DocumentKind::Pipeline);
        components.extend(order.iter().map(String::as_str));
        Self { order, components }
    }
}

/// Every symbol set of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbols {
    pub domain: DomainSymbols,
    pub examples: ExampleSymbols,
    pub flows: ScriptSymbols,
    pub rules: ScriptSymbols,
    pub pipeline: PipelineSymbols,
    /// Slots referenced from the action code.
    pub code_slots: Vec<String>,
}

impl Symbols {
    pub fn extract(model: &SpecModel) -> Self {
        Self {
            domain: DomainSymbols::extract(&model.domain),
            examples: ExampleSymbols::extract(&model.examples),
            flows: ScriptSymbols::extract(&model.flows),
            rules: ScriptSymbols::extract(&model.rules),
            pipeline: PipelineSymbols::extract(&model.pipeline),
            code_slots: model.action_code.slot_references(),
        }
    }

    pub fn scripts(&self, kind: DocumentKind) -> Option<&ScriptSymbols> {
        match kind {
            DocumentKind::Flows => Some(&self.flows),
            DocumentKind::Rules => Some(&self.rules),
            _ => None,
        }
    }
}
