//! End-to-end `check` runs over projects written to a temp directory.

use std::path::Path;

use dialint_core::{Engine, FindingKind, LoadState, Origin, ProjectConfig, Severity};
use tempfile::TempDir;

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (rel, text) in files {
        let path = dir.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, text).unwrap();
    }
    dir
}

fn engine(root: &Path) -> Engine {
    Engine::new(ProjectConfig::load(root).unwrap())
}

fn symbols_of(report: &dialint_core::CheckReport, kind: FindingKind) -> Vec<Vec<String>> {
    report
        .analysis
        .of_kind(kind)
        .map(|f| f.symbols.clone())
        .collect()
}

const NLU_GREET: &str = "\
nlu:
  - intent: greet
    examples: |
      - hi
      - hello
      - hey
";

#[tokio::test]
async fn test_intent_symmetry_is_reported_both_ways() {
    let dir = project(&[
        ("domain.yml", "intents:\n  - greet\n  - goodbye\n"),
        (
            "data/nlu.yml",
            "nlu:\n  - intent: greet\n    examples: |\n      - hi\n      - hello\n      - hey\n  - intent: thanks\n    examples: |\n      - thanks\n      - thank you\n      - cheers\n",
        ),
    ]);
    let report = engine(dir.path()).check().await;

    let without_examples: Vec<_> = report
        .analysis
        .of_kind(FindingKind::IntentWithoutExamples)
        .collect();
    assert_eq!(without_examples.len(), 1);
    assert_eq!(without_examples[0].symbols, vec!["goodbye"]);
    assert_eq!(without_examples[0].found_in, vec![Origin::Domain]);
    assert_eq!(without_examples[0].missing_from, vec![Origin::Examples]);

    assert_eq!(
        symbols_of(&report, FindingKind::IntentUndeclared),
        vec![vec!["thanks".to_string()]]
    );
    assert!(!report.is_clean());
}

#[tokio::test]
async fn test_consistent_project_is_clean() {
    let dir = project(&[
        (
            "domain.yml",
            "intents: [greet]\nresponses:\n  utter_greet:\n    - text: Hello!\n",
        ),
        ("data/nlu.yml", NLU_GREET),
        (
            "data/stories.yml",
            "stories:\n  - story: hello\n    steps:\n      - intent: greet\n      - action: utter_greet\n",
        ),
        ("config.yml", "pipeline:\n  - name: WhitespaceTokenizer\n  - name: DIETClassifier\n"),
    ]);
    let report = engine(dir.path()).check().await;
    assert!(report.analysis.findings.is_empty(), "{:?}", report.analysis.findings);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_flows_sharing_an_opening_collide() {
    let dir = project(&[
        (
            "domain.yml",
            "intents: [greet, goodbye]\nresponses:\n  utter_greet:\n    - text: Hi\n  utter_goodbye:\n    - text: Bye\n",
        ),
        (
            "data/nlu.yml",
            "nlu:\n  - intent: greet\n    examples: |\n      - hi\n      - hello\n      - hey\n  - intent: goodbye\n    examples: |\n      - bye\n      - see you\n      - later\n",
        ),
        (
            "data/stories.yml",
            "\
stories:
  - story: happy
    steps:
      - intent: greet
      - action: utter_greet
      - intent: goodbye
  - story: sad
    steps:
      - intent: greet
      - action: utter_greet
  - steps:
      - intent: greet
      - action: utter_greet
  - story: short
    steps:
      - intent: goodbye
  - story: farewell
    steps:
      - intent: goodbye
      - action: utter_goodbye
",
        ),
    ]);
    let report = engine(dir.path()).check().await;

    let collisions: Vec<_> = report
        .analysis
        .of_kind(FindingKind::FlowPathCollision)
        .collect();
    assert_eq!(collisions.len(), 1);
    assert_eq!(collisions[0].symbols, vec!["happy", "sad", "Story #3"]);
    assert_eq!(collisions[0].severity, Severity::Warning);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_low_count_threshold() {
    let dir = project(&[
        ("domain.yml", "intents: [two, three]\n"),
        (
            "data/nlu.yml",
            "nlu:\n  - intent: two\n    examples: |\n      - a\n      - b\n  - intent: three\n    examples: |\n      - a\n      - b\n      - c\n",
        ),
    ]);
    let report = engine(dir.path()).check().await;
    assert_eq!(
        symbols_of(&report, FindingKind::FewExamples),
        vec![vec!["two".to_string()]]
    );
    assert!(!report.is_clean());
}

#[tokio::test]
async fn test_counts_are_summed_across_blocks() {
    let dir = project(&[
        ("domain.yml", "intents: [greet]\n"),
        (
            "data/nlu.yml",
            "nlu:\n  - intent: greet\n    examples: |\n      - hi\n      - hello\n  - intent: greet\n    examples: |\n      - hey\n",
        ),
    ]);
    let report = engine(dir.path()).check().await;
    assert!(report.analysis.of_kind(FindingKind::FewExamples).next().is_none());
}

fn examples_with_counts(counts: &[(&str, usize)]) -> String {
    let mut text = String::from("nlu:\n");
    for (intent, count) in counts {
        text.push_str(&format!("  - intent: {intent}\n    examples: |\n"));
        for i in 0..*count {
            text.push_str(&format!("      - {intent} example {i}\n"));
        }
    }
    text
}

fn domain_with_intents(counts: &[(&str, usize)]) -> String {
    let names: Vec<&str> = counts.iter().map(|(name, _)| *name).collect();
    format!("intents: [{}]\n", names.join(", "))
}

#[tokio::test]
async fn test_imbalance_against_minimum() {
    let counts = [("big", 16), ("edge", 15), ("small", 3)];
    let (domain, examples) = (domain_with_intents(&counts), examples_with_counts(&counts));
    let dir = project(&[
        ("domain.yml", domain.as_str()),
        ("data/nlu.yml", examples.as_str()),
    ]);
    let report = engine(dir.path()).check().await;
    assert_eq!(
        symbols_of(&report, FindingKind::ExampleImbalance),
        vec![vec!["big".to_string()]]
    );
}

#[tokio::test]
async fn test_imbalance_against_average() {
    let counts = [
        ("big", 30),
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
    let (domain, examples) = (domain_with_intents(&counts), examples_with_counts(&counts));
    let dir = project(&[
        ("domain.yml", domain.as_str()),
        ("data/nlu.yml", examples.as_str()),
        ("dialint.toml", "[conventions]\nimbalance_baseline = \"average\"\n"),
    ]);
    let report = engine(dir.path()).check().await;
    assert_eq!(
        symbols_of(&report, FindingKind::ExampleImbalance),
        vec![vec!["big".to_string()]]
    );
}

#[tokio::test]
async fn test_regex_examples_need_a_regex_extractor() {
    let dir = project(&[
        ("domain.yml", "intents: [greet]\n"),
        (
            "data/nlu.yml",
            "nlu:\n  - intent: greet\n    examples: |\n      - hi\n      - hello\n      - hey\n  - regex: zipcode\n    examples: |\n      - \\d{5}\n",
        ),
        ("config.yml", "pipeline:\n  - name: WhitespaceTokenizer\n  - name: DIETClassifier\n"),
    ]);
    let report = engine(dir.path()).check().await;
    let missing: Vec<_> = report
        .analysis
        .of_kind(FindingKind::PipelineComponentMissing)
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].symbols, vec!["RegexEntityExtractor"]);
    assert!(missing[0].kind.is_auto_fixable());
}

#[tokio::test]
async fn test_missing_documents_are_not_fatal() {
    let dir = project(&[("domain.yml", "intents: [greet]\n"), ("data/nlu.yml", NLU_GREET)]);
    let report = engine(dir.path()).check().await;

    let rules = report
        .documents
        .iter()
        .find(|d| d.origin == Origin::Rules)
        .unwrap();
    assert_eq!(rules.state, LoadState::Missing);
    assert!(report
        .analysis
        .of_kind(FindingKind::DocumentUnreadable)
        .next()
        .is_none());
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_malformed_document_is_reported_and_isolated() {
    let dir = project(&[
        ("domain.yml", "intents: [greet]\n"),
        ("data/nlu.yml", "nlu:\n  - intent: greet\n   examples: [unclosed\n"),
        (
            "data/stories.yml",
            "stories:\n  - story: s\n    steps:\n      - intent: greet\n      - action: utter_greet\n",
        ),
    ]);
    let report = engine(dir.path()).check().await;

    let examples = report
        .documents
        .iter()
        .find(|d| d.origin == Origin::Examples)
        .unwrap();
    assert!(matches!(examples.state, LoadState::Malformed { .. }));

    let unreadable: Vec<_> = report
        .analysis
        .of_kind(FindingKind::DocumentUnreadable)
        .collect();
    assert_eq!(unreadable.len(), 1);
    assert_eq!(unreadable[0].found_in, vec![Origin::Examples]);

    // The domain is still checked against the readable documents.
    assert_eq!(
        symbols_of(&report, FindingKind::ResponseUndeclared),
        vec![vec!["utter_greet".to_string()]]
    );
    assert!(report
        .analysis
        .of_kind(FindingKind::IntentWithoutExamples)
        .next()
        .is_none());
}

#[tokio::test]
async fn test_custom_actions_and_code_slots() {
    let dir = project(&[
        ("domain.yml", "intents: [greet]\nactions:\n  - action_check_order\n  - action_send_invoice\nslots:\n  order_id:\n    type: text\n"),
        ("data/nlu.yml", NLU_GREET),
        (
            "actions/actions.py",
            "class ActionCheckOrder(Action):\n    def run(self, dispatcher, tracker, domain):\n        order = tracker.get_slot(\"order_id\")\n        return [SlotSet('order_status', 'shipped')]\n",
        ),
    ]);
    let report = engine(dir.path()).check().await;
    assert_eq!(
        symbols_of(&report, FindingKind::ActionImplementationMissing),
        vec![vec!["action_send_invoice".to_string()]]
    );
    assert_eq!(
        symbols_of(&report, FindingKind::ActionCodeSlotUndeclared),
        vec![vec!["order_status".to_string()]]
    );
}

#[tokio::test]
async fn test_invalid_config_file_is_rejected() {
    let dir = project(&[("dialint.toml", "[conventions]\nmin_exampels = 4\n")]);
    let err = ProjectConfig::load(dir.path()).unwrap_err();
    assert!(matches!(err, dialint_core::LintError::Config { .. }));
}
