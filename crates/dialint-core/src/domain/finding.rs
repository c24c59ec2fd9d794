//! Findings produced by the consistency checks.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::document::DocumentKind;

/// Severity level for a finding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Should-consider.
    Warning,
    /// Must-fix.
    Issue,
}

/// Where a symbol was (or was not) found.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Domain,
    Examples,
    Flows,
    Rules,
    Pipeline,
    /// The custom-action implementation source file.
    ActionCode,
}

impl From<DocumentKind> for Origin {
    fn from(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Domain => Origin::Domain,
            DocumentKind::Examples => Origin::Examples,
            DocumentKind::Flows => Origin::Flows,
            DocumentKind::Rules => Origin::Rules,
            DocumentKind::Pipeline => Origin::Pipeline,
        }
    }
}

impl Origin {
    pub fn document_kind(self) -> Option<DocumentKind> {
        match self {
            Origin::Domain => Some(DocumentKind::Domain),
            Origin::Examples => Some(DocumentKind::Examples),
            Origin::Flows => Some(DocumentKind::Flows),
            Origin::Rules => Some(DocumentKind::Rules),
            Origin::Pipeline => Some(DocumentKind::Pipeline),
            Origin::ActionCode => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self.document_kind() {
            Some(kind) => kind.as_str(),
            None => "action code",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The catalogue of detectable inconsistencies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Domain intent with no labelled examples.
    IntentWithoutExamples,
    /// Example intent not declared in the domain.
    IntentUndeclared,
    /// Flow/rule step action not declared as an action or response.
    ActionUndeclared,
    /// Flow/rule step response (reserved prefix) not declared as a response.
    ResponseUndeclared,
    /// Declared custom action with no implementation stub in the action code.
    ActionImplementationMissing,
    /// Annotated example entity not declared in the domain.
    EntityUndeclared,
    /// Slot assigned by a flow/rule step not declared in the domain.
    SlotUndeclared,
    /// Example feature with no pipeline component to consume it.
    PipelineComponentMissing,
    /// Several flows sharing the same two opening steps.
    FlowPathCollision,
    /// Several custom actions sharing the first word after the action prefix.
    ActionPrefixConflict,
    /// Intent with fewer examples than the configured minimum.
    FewExamples,
    /// Intent with disproportionately many examples.
    ExampleImbalance,
    /// Flow/rule step intent not declared in the domain.
    FlowIntentUndeclared,
    /// Slot referenced from the action code not declared in the domain.
    ActionCodeSlotUndeclared,
    /// Document that exists but could not be parsed.
    DocumentUnreadable,
}

impl FindingKind {
    pub fn severity(self) -> Severity {
        match self {
            Self::FlowPathCollision | Self::ActionPrefixConflict | Self::ExampleImbalance => {
                Severity::Warning
            }
            _ => Severity::Issue,
        }
    }

    /// Whether a mechanical repair exists for this kind.
    pub fn is_auto_fixable(self) -> bool {
        !matches!(
            self,
            Self::FlowPathCollision
                | Self::ActionPrefixConflict
                | Self::FewExamples
                | Self::ExampleImbalance
                | Self::DocumentUnreadable
        )
    }

    /// Stable identifier used in logs and machine-readable reports.
    pub fn code(self) -> &'static str {
        match self {
            Self::IntentWithoutExamples => "intent-without-examples",
            Self::IntentUndeclared => "intent-undeclared",
            Self::ActionUndeclared => "action-undeclared",
            Self::ResponseUndeclared => "response-undeclared",
            Self::ActionImplementationMissing => "action-implementation-missing",
            Self::EntityUndeclared => "entity-undeclared",
            Self::SlotUndeclared => "slot-undeclared",
            Self::PipelineComponentMissing => "pipeline-component-missing",
            Self::FlowPathCollision => "flow-path-collision",
            Self::ActionPrefixConflict => "action-prefix-conflict",
            Self::FewExamples => "few-examples",
            Self::ExampleImbalance => "example-imbalance",
            Self::FlowIntentUndeclared => "flow-intent-undeclared",
            Self::ActionCodeSlotUndeclared => "action-code-slot-undeclared",
            Self::DocumentUnreadable => "document-unreadable",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One detected inconsistency. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub message: String,
    /// Symbol names (or script identifiers) involved.
    pub symbols: Vec<String>,
    /// Where the symbol was found.
    pub found_in: Vec<Origin>,
    /// Where the symbol was expected but absent.
    pub missing_from: Vec<Origin>,
}

impl Finding {
    /// Create a finding with the kind's default severity.
    pub fn new(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message: message.into(),
            symbols: Vec::new(),
            found_in: Vec::new(),
            missing_from: Vec::new(),
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbols.push(symbol.into());
        self
    }

    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols.extend(symbols.into_iter().map(Into::into));
        self
    }

    pub fn found_in(mut self, origins: impl IntoIterator<Item = Origin>) -> Self {
        self.found_in.extend(origins);
        self
    }

    pub fn missing_from(mut self, origins: impl IntoIterator<Item = Origin>) -> Self {
        self.missing_from.extend(origins);
        self
    }

    /// First symbol, which is the subject for single-symbol findings.
    pub fn subject(&self) -> Option<&str> {
        self.symbols.first().map(String::as_str)
    }

    pub fn is_issue(&self) -> bool {
        self.severity == Severity::Issue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Warning < Severity::Issue);
    }

    #[test]
    fn test_report_only_kinds() {
        assert!(!FindingKind::FlowPathCollision.is_auto_fixable());
        assert!(!FindingKind::ExampleImbalance.is_auto_fixable());
        assert!(!FindingKind::FewExamples.is_auto_fixable());
        assert!(!FindingKind::ActionPrefixConflict.is_auto_fixable());
        assert!(FindingKind::IntentUndeclared.is_auto_fixable());
        assert!(FindingKind::PipelineComponentMissing.is_auto_fixable());
    }

    #[test]
    fn test_default_severity() {
        let f = Finding::new(FindingKind::ExampleImbalance, "skewed");
        assert_eq!(f.severity, Severity::Warning);
        let f = Finding::new(FindingKind::FewExamples, "thin");
        assert!(f.is_issue());
    }

    #[test]
    fn test_builder_records_evidence() {
        let f = Finding::new(FindingKind::EntityUndeclared, "entity `city` not declared")
            .with_symbol("city")
            .found_in([Origin::Examples])
            .missing_from([Origin::Domain]);
        assert_eq!(f.subject(), Some("city"));
        assert_eq!(f.found_in, vec![Origin::Examples]);
        assert_eq!(f.missing_from, vec![Origin::Domain]);
    }

    #[test]
    fn test_finding_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FindingKind::FlowPathCollision).expect("serialize");
        assert_eq!(json, "\"flow_path_collision\"");
    }
}
