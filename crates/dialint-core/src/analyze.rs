//! Cross-document consistency checks.
//!
//! Checks run in a fixed order and each one tolerates empty or missing
//! contributing documents. A malformed document contributes no symbols, and
//! a check whose target document is malformed is skipped; the malformed
//! document itself is reported once by the last check.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::{Conventions, ImbalanceBaseline};
use crate::domain::{Finding, FindingKind, LoadState, Origin, Severity, SymbolSet};
use crate::extract::{ScriptSymbols, Step, Symbols};
use crate::loader::SpecModel;

/// Outcome of one analysis pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Analysis {
    pub findings: Vec<Finding>,
}

impl Analysis {
    pub fn issues(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Issue)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Warning)
    }

    pub fn issue_count(&self) -> usize {
        self.issues().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn has_issues(&self) -> bool {
        self.issues().next().is_some()
    }

    pub fn fixable_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.kind.is_auto_fixable())
            .count()
    }

    pub fn of_kind(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }
}

/// Run every check against one model.
pub fn analyze(model: &SpecModel, symbols: &Symbols, conventions: &Conventions) -> Analysis {
    let mut checker = Checker {
        model,
        symbols,
        conventions,
        findings: Vec::new(),
    };
    checker.intent_symmetry();
    checker.action_completeness();
    checker.entity_completeness();
    checker.slot_completeness();
    checker.pipeline_dependencies();
    checker.flow_path_collisions();
    checker.action_prefix_conflicts();
    checker.example_balance();
    checker.flow_intent_completeness();
    checker.action_code_slots();
    checker.unreadable_documents();
    Analysis {
        findings: checker.findings,
    }
}

struct Checker<'a> {
    model: &'a SpecModel,
    symbols: &'a Symbols,
    conventions: &'a Conventions,
    findings: Vec<Finding>,
}

/// Origins of the script documents mentioning `name`.
fn script_origins(
    name: &str,
    flows: &ScriptSymbols,
    rules: &ScriptSymbols,
    select: impl Fn(&ScriptSymbols) -> &SymbolSet,
) -> Vec<Origin> {
    let mut origins = Vec::new();
    if select(flows).contains(name) {
        origins.push(Origin::Flows);
    }
    if select(rules).contains(name) {
        origins.push(Origin::Rules);
    }
    origins
}

/// Sorted union of one symbol set taken from both script documents.
fn script_union(
    flows: &ScriptSymbols,
    rules: &ScriptSymbols,
    select: impl Fn(&ScriptSymbols) -> &SymbolSet,
) -> BTreeSet<String> {
    select(flows)
        .iter()
        .chain(select(rules).iter())
        .map(String::from)
        .collect()
}

impl Checker<'_> {
    fn domain_usable(&self) -> bool {
        !self.model.domain.is_malformed()
    }

    fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Domain intents versus example intents, both directions.
    fn intent_symmetry(&mut self) {
        let symbols = self.symbols;
        let domain = &symbols.domain.intents;
        let examples = &symbols.examples.intents;

        if !self.model.examples.is_malformed() {
            for intent in domain.missing_from(examples) {
                self.push(
                    Finding::new(
                        FindingKind::IntentWithoutExamples,
                        format!("intent `{intent}` is declared in the domain but has no examples"),
                    )
                    .with_symbol(intent)
                    .found_in([Origin::Domain])
                    .missing_from([Origin::Examples]),
                );
            }
        }

        if self.domain_usable() {
            for intent in examples.missing_from(domain) {
                self.push(
                    Finding::new(
                        FindingKind::IntentUndeclared,
                        format!("intent `{intent}` has examples but is not declared in the domain"),
                    )
                    .with_symbol(intent)
                    .found_in([Origin::Examples])
                    .missing_from([Origin::Domain]),
                );
            }
        }
    }

    /// Actions and responses used by scripts, and custom action stubs.
    fn action_completeness(&mut self) {
        let symbols = self.symbols;
        let Symbols {
            domain,
            flows,
            rules,
            ..
        } = symbols;

        if self.domain_usable() {
            for action in script_union(flows, rules, |s| &s.actions) {
                let declared = if self.conventions.is_response(&action) {
                    domain.responses.contains(&action)
                } else {
                    domain.actions.contains(&action) || domain.responses.contains(&action)
                };
                if declared || self.conventions.is_builtin_action(&action) {
                    continue;
                }
                let found_in = script_origins(&action, flows, rules, |s| &s.actions);
                let finding = if self.conventions.is_response(&action) {
                    Finding::new(
                        FindingKind::ResponseUndeclared,
                        format!("response `{action}` is used in a script but has no template in the domain"),
                    )
                } else {
                    Finding::new(
                        FindingKind::ActionUndeclared,
                        format!("action `{action}` is used in a script but is not declared in the domain"),
                    )
                };
                self.push(
                    finding
                        .with_symbol(action)
                        .found_in(found_in)
                        .missing_from([Origin::Domain]),
                );
            }
        }

        if self.model.action_code.is_unreadable() {
            return;
        }
        let mut custom: Vec<&str> = domain
            .actions
            .iter()
            .filter(|a| self.conventions.is_custom_action(a))
            .filter(|a| !self.model.action_code.implements(a))
            .collect();
        custom.sort_unstable();
        for action in custom {
            self.push(
                Finding::new(
                    FindingKind::ActionImplementationMissing,
                    format!("custom action `{action}` has no implementation in the action code"),
                )
                .with_symbol(action)
                .found_in([Origin::Domain])
                .missing_from([Origin::ActionCode]),
            );
        }
    }

    fn entity_completeness(&mut self) {
        if !self.domain_usable() {
            return;
        }
        let symbols = self.symbols;
        for entity in symbols.examples.entities.missing_from(&symbols.domain.entities) {
            self.push(
                Finding::new(
                    FindingKind::EntityUndeclared,
                    format!("entity `{entity}` is annotated in examples but not declared in the domain"),
                )
                .with_symbol(entity)
                .found_in([Origin::Examples])
                .missing_from([Origin::Domain]),
            );
        }
    }

    fn slot_completeness(&mut self) {
        if !self.domain_usable() {
            return;
        }
        let symbols = self.symbols;
        let Symbols {
            domain,
            flows,
            rules,
            ..
        } = symbols;
        for slot in script_union(flows, rules, |s| &s.slots) {
            if domain.slots.contains(&slot) {
                continue;
            }
            let found_in = script_origins(&slot, flows, rules, |s| &s.slots);
            self.push(
                Finding::new(
                    FindingKind::SlotUndeclared,
                    format!("slot `{slot}` is set in a script but not declared in the domain"),
                )
                .with_symbol(slot)
                .found_in(found_in)
                .missing_from([Origin::Domain]),
            );
        }
    }

    /// Example features that need a pipeline component.
    fn pipeline_dependencies(&mut self) {
        if self.model.pipeline.is_malformed() {
            return;
        }
        let (symbols, conventions) = (self.symbols, self.conventions);
        let mut required: BTreeMap<&str, &str> = BTreeMap::new();
        for fc in &conventions.feature_components {
            if symbols.examples.features.contains(&fc.feature)
                && !symbols.pipeline.components.contains(&fc.component)
            {
                required.entry(fc.component.as_str()).or_insert(fc.feature.as_str());
            }
        }
        for (component, feature) in required {
            self.push(
                Finding::new(
                    FindingKind::PipelineComponentMissing,
                    format!("examples declare `{feature}` features but the pipeline has no `{component}`"),
                )
                .with_symbol(component)
                .found_in([Origin::Examples])
                .missing_from([Origin::Pipeline]),
            );
        }
    }

    /// Flows sharing the same two opening steps. Steps that are neither an
    /// intent nor an action are left out of the key.
    fn flow_path_collisions(&mut self) {
        let mut by_path: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let symbols = self.symbols;
        for script in &symbols.flows.scripts {
            if script.steps.len() < 2 {
                continue;
            }
            let parts: Vec<String> = script.steps[..2].iter().filter_map(path_part).collect();
            if parts.is_empty() {
                continue;
            }
            by_path
                .entry(parts.join("->"))
                .or_default()
                .push(script.id.clone());
        }
        for (path, ids) in by_path {
            if ids.len() < 2 {
                continue;
            }
            self.push(
                Finding::new(
                    FindingKind::FlowPathCollision,
                    format!("{} flows start with `{path}`: {}", ids.len(), ids.join(", ")),
                )
                .with_symbols(ids)
                .found_in([Origin::Flows]),
            );
        }
    }

    /// Declared custom actions grouped by the first word after the custom
    /// action prefix; `action_check_order` and `action_check_stock` share `check`.
    fn action_prefix_conflicts(&mut self) {
        if !self.domain_usable() {
            return;
        }
        let conventions = self.conventions;
        let mut by_word: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for action in self.symbols.domain.actions.iter() {
            if !conventions.is_custom_action(action) {
                continue;
            }
            let rest = &action[conventions.custom_action_prefix.len()..];
            let word = rest.split('_').next().unwrap_or(rest);
            if word.is_empty() {
                continue;
            }
            by_word.entry(word).or_default().push(action);
        }
        for (word, mut actions) in by_word {
            if actions.len() < 2 {
                continue;
            }
            actions.sort_unstable();
            self.push(
                Finding::new(
                    FindingKind::ActionPrefixConflict,
                    format!(
                        "{} custom actions share the name prefix `{}{word}`: {}",
                        actions.len(),
                        conventions.custom_action_prefix,
                        actions.join(", ")
                    ),
                )
                .with_symbols(actions)
                .found_in([Origin::Domain]),
            );
        }
    }

    fn example_balance(&mut self) {
        let symbols = self.symbols;
        let counts = &symbols.examples.counts;
        let min_examples = self.conventions.min_examples;
        for (intent, &count) in counts {
            if count < min_examples {
                self.push(
                    Finding::new(
                        FindingKind::FewExamples,
                        format!("intent `{intent}` has {count} examples, fewer than {min_examples}"),
                    )
                    .with_symbol(intent.clone())
                    .found_in([Origin::Examples]),
                );
            }
        }

        let populated: Vec<usize> = counts.values().copied().filter(|&c| c > 0).collect();
        if populated.len() < 2 {
            return;
        }
        let baseline = match self.conventions.imbalance_baseline {
            ImbalanceBaseline::Minimum => populated.iter().copied().min().unwrap_or(0) as f64,
            ImbalanceBaseline::Average => {
                populated.iter().sum::<usize>() as f64 / populated.len() as f64
            }
        };
        let ceiling = self.conventions.imbalance_factor as f64 * baseline;
        for (intent, &count) in counts {
            if count as f64 > ceiling {
                self.push(
                    Finding::new(
                        FindingKind::ExampleImbalance,
                        format!(
                            "intent `{intent}` has {count} examples, more than {}x the baseline of {baseline:.1}",
                            self.conventions.imbalance_factor
                        ),
                    )
                    .with_symbol(intent.clone())
                    .found_in([Origin::Examples]),
                );
            }
        }
    }

    /// Script intents absent from the domain and not already covered by the
    /// example-side symmetry check.
    fn flow_intent_completeness(&mut self) {
        if !self.domain_usable() {
            return;
        }
        let symbols = self.symbols;
        let Symbols {
            domain,
            examples,
            flows,
            rules,
            ..
        } = symbols;
        for intent in script_union(flows, rules, |s| &s.intents) {
            if domain.intents.contains(&intent) || examples.intents.contains(&intent) {
                continue;
            }
            let found_in = script_origins(&intent, flows, rules, |s| &s.intents);
            self.push(
                Finding::new(
                    FindingKind::FlowIntentUndeclared,
                    format!("intent `{intent}` is used in a script but not declared in the domain"),
                )
                .with_symbol(intent)
                .found_in(found_in)
                .missing_from([Origin::Domain]),
            );
        }
    }

    fn action_code_slots(&mut self) {
        if !self.domain_usable() {
            return;
        }
        let symbols = self.symbols;
        let Symbols {
            domain,
            flows,
            rules,
            code_slots,
            ..
        } = symbols;
        for slot in code_slots {
            if domain.slots.contains(slot)
                || flows.slots.contains(slot)
                || rules.slots.contains(slot)
            {
                continue;
            }
            self.push(
                Finding::new(
                    FindingKind::ActionCodeSlotUndeclared,
                    format!("slot `{slot}` is used in the action code but not declared in the domain"),
                )
                .with_symbol(slot.clone())
                .found_in([Origin::ActionCode])
                .missing_from([Origin::Domain]),
            );
        }
    }

    fn unreadable_documents(&mut self) {
        let mut unreadable: Vec<(Origin, String, String)> = Vec::new();
        for doc in self.model.documents() {
            if let LoadState::Malformed { reason } = &doc.state {
                unreadable.push((doc.kind.into(), doc.path.display().to_string(), reason.clone()));
            }
        }
        let code = &self.model.action_code;
        if let Some(reason) = &code.error {
            unreadable.push((Origin::ActionCode, code.path.display().to_string(), reason.clone()));
        }
        for (origin, path, reason) in unreadable {
            self.push(
                Finding::new(
                    FindingKind::DocumentUnreadable,
                    format!("{origin} document {path} could not be read: {reason}"),
                )
                .with_symbol(path)
                .found_in([origin]),
            );
        }
    }
}

fn path_part(step: &Step) -> Option<String> {
    match step {
        Step::Intent(name) => Some(format!("intent:{name}")),
        Step::Action(name) => Some(format!("action:{name}")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_code::ActionCode;
    use crate::domain::DocumentKind;
    use crate::loader::parse_document;

    fn model(docs: &[(DocumentKind, &str)]) -> SpecModel {
        model_with_code(docs, ActionCode::absent("actions.py"))
    }

    fn model_with_code(docs: &[(DocumentKind, &str)], code: ActionCode) -> SpecModel {
        SpecModel::from_documents(
            docs.iter()
                .map(|(kind, text)| parse_document(*kind, format!("{kind}.yml"), text)),
            code,
        )
    }

    fn run(model: &SpecModel) -> Analysis {
        let conventions = Conventions::default();
        analyze(model, &Symbols::extract(model), &conventions)
    }

    fn kinds(analysis: &Analysis) -> Vec<(FindingKind, Vec<String>)> {
        analysis
            .findings
            .iter()
            .map(|f| (f.kind, f.symbols.clone()))
            .collect()
    }

    const EXAMPLES_GREET: &str = "nlu:\n  - intent: greet\n    examples: |\n      - hi\n      - hello\n      - hey\n";

    #[test]
    fn test_intent_symmetry_both_directions() {
        let m = model(&[
            (DocumentKind::Domain, "intents: [greet, goodbye]\n"),
            (
                DocumentKind::Examples,
                "nlu:\n  - intent: greet\n    examples: |\n      - hi\n      - hello\n      - hey\n  - intent: thanks\n    examples: |\n      - thanks\n      - thank you\n      - cheers\n",
            ),
        ]);
        let a = run(&m);
        assert_eq!(
            kinds(&a),
            vec![
                (FindingKind::IntentWithoutExamples, vec!["goodbye".to_string()]),
                (FindingKind::IntentUndeclared, vec!["thanks".to_string()]),
            ]
        );
    }

    #[test]
    fn test_actions_responses_and_builtins() {
        let m = model(&[
            (
                DocumentKind::Domain,
                "intents: [greet]\nactions: [action_check_order]\nresponses:\n  utter_greet:\n    - text: hi\n",
            ),
            (DocumentKind::Examples, EXAMPLES_GREET),
            (
                DocumentKind::Flows,
                "stories:\n  - story: a\n    steps:\n      - intent: greet\n      - action: utter_greet\n      - action: utter_bye\n      - action: action_listen\n      - action: action_default_ask_rephrase\n      - action: validate_form\n",
            ),
        ]);
        let a = run(&m);
        assert_eq!(
            kinds(&a),
            vec![
                (FindingKind::ResponseUndeclared, vec!["utter_bye".to_string()]),
                (FindingKind::ActionUndeclared, vec!["validate_form".to_string()]),
                (
                    FindingKind::ActionImplementationMissing,
                    vec!["action_check_order".to_string()]
                ),
            ]
        );
    }

    #[test]
    fn test_response_listed_as_action_still_needs_a_template() {
        let m = model(&[
            (DocumentKind::Domain, "intents: [greet]\nactions: [utter_bye]\n"),
            (DocumentKind::Examples, EXAMPLES_GREET),
            (
                DocumentKind::Flows,
                "stories:\n  - story: bye\n    steps:\n      - intent: greet\n      - action: utter_bye\n",
            ),
        ]);
        let a = run(&m);
        assert_eq!(
            kinds(&a),
            vec![(FindingKind::ResponseUndeclared, vec!["utter_bye".to_string()])]
        );
    }

    #[test]
    fn test_implemented_action_is_not_reported() {
        let m = model_with_code(
            &[
                (DocumentKind::Domain, "intents: [greet]\nactions: [action_check_order]\n"),
                (DocumentKind::Examples, EXAMPLES_GREET),
            ],
            ActionCode::from_text("actions.py", "class ActionCheckOrder(Action):\n    pass\n"),
        );
        assert!(run(&m).findings.is_empty());
    }

    #[test]
    fn test_entities_and_slots() {
        let m = model(&[
            (DocumentKind::Domain, "intents: [inform]\nentities: [city]\nslots:\n  city: {type: text}\n"),
            (
                DocumentKind::Examples,
                "nlu:\n  - intent: inform\n    examples: |\n      - in [Paris](city)\n      - on [monday](day)\n      - at [noon](time)\n",
            ),
            (
                DocumentKind::Rules,
                "rules:\n  - rule: r\n    steps:\n      - intent: inform\n      - slot_was_set:\n          - city: Paris\n          - day: monday\n",
            ),
        ]);
        let a = run(&m);
        assert_eq!(
            kinds(&a),
            vec![
                (FindingKind::EntityUndeclared, vec!["day".to_string()]),
                (FindingKind::EntityUndeclared, vec!["time".to_string()]),
                (FindingKind::SlotUndeclared, vec!["day".to_string()]),
            ]
        );
        assert_eq!(a.findings[2].found_in, vec![Origin::Rules]);
    }

    #[test]
    fn test_regex_feature_requires_component() {
        let m = model(&[
            (DocumentKind::Domain, "intents: [greet]\n"),
            (
                DocumentKind::Examples,
                "nlu:\n  - intent: greet\n    examples: |\n      - hi\n      - hello\n      - hey\n  - regex: zipcode\n    examples: |\n      - \\d{5}\n  - regex: phone\n    examples: |\n      - \\d{10}\n",
            ),
            (DocumentKind::Pipeline, "pipeline:\n  - name: WhitespaceTokenizer\n"),
        ]);
        let a: Vec<_> = run(&m)
            .of_kind(FindingKind::PipelineComponentMissing)
            .cloned()
            .collect();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].subject(), Some("RegexEntityExtractor"));
    }

    #[test]
    fn test_path_collision_names_all_flows() {
        let m = model(&[(
            DocumentKind::Flows,
            r#"
stories:
  - story: one
    steps:
      - intent: greet
      - action: utter_greet
      - intent: bye
  - story: two
    steps:
      - intent: greet
      - action: utter_greet
  - story: three
    steps:
      - intent: greet
      - action: utter_welcome
  - story: short
    steps:
      - intent: greet
"#,
        )]);
        let a: Vec<_> = run(&m).of_kind(FindingKind::FlowPathCollision).cloned().collect();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].symbols, vec!["one", "two"]);
        assert_eq!(a[0].severity, Severity::Warning);
    }

    #[test]
    fn test_path_key_skips_checkpoint_steps() {
        let m = model(&[(
            DocumentKind::Flows,
            r#"
stories:
  - story: resume_a
    steps:
      - checkpoint: after_greeting
      - intent: greet
      - action: utter_greet
  - story: resume_b
    steps:
      - checkpoint: after_order
      - intent: greet
  - story: direct
    steps:
      - intent: greet
      - action: utter_greet
"#,
        )]);
        let a: Vec<_> = run(&m).of_kind(FindingKind::FlowPathCollision).cloned().collect();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].symbols, vec!["resume_a", "resume_b"]);
        assert!(a[0].message.contains("`intent:greet`"));
    }

    #[test]
    fn test_custom_actions_sharing_a_prefix_word() {
        let m = model_with_code(
            &[
                (
                    DocumentKind::Domain,
                    "intents: [greet]\nactions:\n  - action_check_stock\n  - action_send_invoice\n  - action_check_order\n  - action_listen\n  - utter_check\n",
                ),
                (DocumentKind::Examples, EXAMPLES_GREET),
            ],
            ActionCode::from_text(
                "actions.py",
                "class ActionCheckStock(Action):\n    pass\nclass ActionSendInvoice(Action):\n    pass\nclass ActionCheckOrder(Action):\n    pass\n",
            ),
        );
        let a = run(&m);
        assert_eq!(
            kinds(&a),
            vec![(
                FindingKind::ActionPrefixConflict,
                vec!["action_check_order".to_string(), "action_check_stock".to_string()]
            )]
        );
        assert!(!a.has_issues());
    }

    #[test]
    fn test_low_count_boundary() {
        let m = model(&[
            (DocumentKind::Domain, "intents: [a, b]\n"),
            (
                DocumentKind::Examples,
                "nlu:\n  - intent: a\n    examples: |\n      - x\n      - y\n  - intent: b\n    examples: |\n      - x\n      - y\n      - z\n",
            ),
        ]);
        let few: Vec<_> = run(&m).of_kind(FindingKind::FewExamples).cloned().collect();
        assert_eq!(few.len(), 1);
        assert_eq!(few[0].subject(), Some("a"));
    }

    #[test]
    fn test_imbalance_against_average_baseline() {
        let mut examples = String::from("nlu:\n");
        let counts = [
            ("big", 30usize),
            ("a", 2),
            ("b", 2),
            ("c", 2),
            ("d", 2),
            ("e", 2),
            ("f", 2),
            ("g", 2),
            ("h", 3),
            ("i", 3),
        ];
        for (intent, n) in counts {
            examples.push_str(&format!("  - intent: {intent}\n    examples: |\n"));
            for i in 0..n {
                examples.push_str(&format!("      - line {i}\n"));
            }
        }
        let m = model(&[
            (DocumentKind::Domain, "intents: [big, a, b, c, d, e, f, g, h, i]\n"),
            (DocumentKind::Examples, &examples),
        ]);
        let conventions = Conventions {
            imbalance_baseline: ImbalanceBaseline::Average,
            ..Conventions::default()
        };
        let a = analyze(&m, &Symbols::extract(&m), &conventions);
        let flagged: Vec<_> = a
            .of_kind(FindingKind::ExampleImbalance)
            .filter_map(|f| f.subject())
            .collect();
        assert_eq!(flagged, vec!["big"]);
    }

    #[test]
    fn test_flow_intents_and_code_slots() {
        let m = model_with_code(
            &[
                (DocumentKind::Domain, "intents: [greet]\nslots:\n  name: {type: text}\n"),
                (DocumentKind::Examples, EXAMPLES_GREET),
                (
                    DocumentKind::Flows,
                    "stories:\n  - story: s\n    steps:\n      - intent: greet\n      - intent: order_status\n",
                ),
            ],
            ActionCode::from_text(
                "actions.py",
                "n = tracker.get_slot(\"name\")\no = tracker.get_slot(\"order_number\")\n",
            ),
        );
        assert_eq!(
            kinds(&run(&m)),
            vec![
                (FindingKind::FlowIntentUndeclared, vec!["order_status".to_string()]),
                (
                    FindingKind::ActionCodeSlotUndeclared,
                    vec!["order_number".to_string()]
                ),
            ]
        );
    }

    #[test]
    fn test_malformed_domain_suppresses_dependent_checks() {
        let mut m = model(&[(DocumentKind::Examples, EXAMPLES_GREET)]);
        m.domain = parse_document(DocumentKind::Domain, "domain.yml", "intents: [greet\n");
        let a = run(&m);
        assert_eq!(kinds(&a).len(), 1);
        assert_eq!(a.findings[0].kind, FindingKind::DocumentUnreadable);
        assert_eq!(a.findings[0].found_in, vec![Origin::Domain]);
    }

    #[test]
    fn test_missing_rules_yields_no_rule_findings() {
        let m = model(&[
            (DocumentKind::Domain, "intents: [greet]\n"),
            (DocumentKind::Examples, EXAMPLES_GREET),
        ]);
        let a = run(&m);
        assert!(a
            .findings
            .iter()
            .all(|f| !f.found_in.contains(&Origin::Rules)));
        assert!(a.findings.is_empty());
    }
}
