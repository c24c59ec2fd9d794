//! Document loading.
//!
//! Every document is loaded independently. A missing file becomes an empty
//! document; a malformed one becomes an empty document flagged as malformed.
//! Neither aborts the run.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use tracing::Span;

use crate::action_code::ActionCode;
use crate::config::ProjectConfig;
use crate::domain::{Document, DocumentKind, LoadState, Node};
use crate::obs;

/// Parse already-read text into a document of the given kind.
pub fn parse_document(kind: DocumentKind, path: impl AsRef<Path>, text: &str) -> Document {
    let path = path.as_ref();
    match Node::parse(text) {
        Ok(tree @ Node::Map(_)) => Document::new(kind, path, tree),
        Ok(tree) if tree.is_null() => Document::new(kind, path, Node::empty_map()),
        Ok(_) => Document::empty(
            kind,
            path,
            LoadState::Malformed {
                reason: "expected a mapping at the top level".to_string(),
            },
        ),
        Err(e) => Document::empty(
            kind,
            path,
            LoadState::Malformed {
                reason: e.to_string(),
            },
        ),
    }
}

/// Load one document from disk. Never fails; problems are recorded in
/// [`Document::state`] and logged once.
pub fn load_document(kind: DocumentKind, path: impl AsRef<Path>) -> Document {
    let path = path.as_ref();
    let doc = match std::fs::read_to_string(path) {
        Ok(text) => parse_document(kind, path, &text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Document::empty(kind, path, LoadState::Missing)
        }
        Err(e) => Document::empty(
            kind,
            path,
            LoadState::Malformed {
                reason: format!("read failed: {e}"),
            },
        ),
    };

    match &doc.state {
        LoadState::Loaded => obs::emit_document_loaded(kind, path),
        LoadState::Missing => obs::emit_document_missing(kind, path),
        LoadState::Malformed { reason } => obs::emit_document_malformed(kind, path, reason),
    }
    doc
}

/// All documents of one project, owned by a single analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecModel {
    pub domain: Document,
    pub examples: Document,
    pub flows: Document,
    pub rules: Document,
    pub pipeline: Document,
    pub action_code: ActionCode,
}

impl SpecModel {
    /// Assemble a model; kinds not supplied are treated as missing.
    pub fn from_documents(
        documents: impl IntoIterator<Item = Document>,
        action_code: ActionCode,
    ) -> Self {
        let missing = |kind| Document::empty(kind, PathBuf::new(), LoadState::Missing);
        let mut model = Self {
            domain: missing(DocumentKind::Domain),
            examples: missing(DocumentKind::Examples),
            flows: missing(DocumentKind::Flows),
            rules: missing(DocumentKind::Rules),
            pipeline: missing(DocumentKind::Pipeline),
            action_code,
        };
        for doc in documents {
            let kind = doc.kind;
            *model.document_mut(kind) = doc;
        }
        model
    }

    pub fn document(&self, kind: DocumentKind) -> &Document {
        match kind {
            DocumentKind::Domain => &self.domain,
            DocumentKind::Examples => &self.examples,
            DocumentKind::Flows => &self.flows,
            DocumentKind::Rules => &self.rules,
            DocumentKind::Pipeline => &self.pipeline,
        }
    }

    fn document_mut(&mut self, kind: DocumentKind) -> &mut Document {
        match kind {
            DocumentKind::Domain => &mut self.domain,
            DocumentKind::Examples => &mut self.examples,
            DocumentKind::Flows => &mut self.flows,
            DocumentKind::Rules => &mut self.rules,
            DocumentKind::Pipeline => &mut self.pipeline,
        }
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        DocumentKind::ALL.into_iter().map(|kind| self.document(kind))
    }

    /// Load every document of the project concurrently.
    ///
    /// Loads are read-only and independent; all of them complete (or are
    /// recorded as failed) before this returns.
    pub async fn load(config: &ProjectConfig) -> Self {
        let loads = DocumentKind::ALL.map(|kind| {
            let path = config.document_path(kind).to_path_buf();
            let span = Span::current();
            tokio::task::spawn_blocking(move || span.in_scope(|| load_document(kind, path)))
        });
        let actions_path = config.actions_path.clone();
        let span = Span::current();
        let action_load =
            tokio::task::spawn_blocking(move || span.in_scope(|| ActionCode::load(actions_path)));

        let documents: Vec<Document> = DocumentKind::ALL
            .into_iter()
            .zip(join_all(loads).await)
            .map(|(kind, joined)| {
                joined.unwrap_or_else(|e| {
                    let path = config.document_path(kind);
                    let reason = format!("load task failed: {e}");
                    obs::emit_document_malformed(kind, path, &reason);
                    Document::empty(kind, path, LoadState::Malformed { reason })
                })
            })
            .collect();

        let action_code = action_load.await.unwrap_or_else(|e| {
            ActionCode::unreadable(&config.actions_path, format!("load task failed: {e}"))
        });

        Self::from_documents(documents, action_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty_and_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let doc = load_document(DocumentKind::Rules, dir.path().join("rules.yml"));
        assert_eq!(doc.state, LoadState::Missing);
        assert_eq!(doc.tree, Node::empty_map());
    }

    #[test]
    fn test_malformed_file_is_empty_and_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("domain.yml");
        std::fs::write(&path, "intents:\n  - greet\n  bad: [unclosed\n").unwrap();
        let doc = load_document(DocumentKind::Domain, &path);
        assert!(doc.is_malformed());
        assert_eq!(doc.tree, Node::empty_map());
    }

    #[test]
    fn test_top_level_sequence_is_malformed() {
        let doc = parse_document(DocumentKind::Pipeline, "config.yml", "- WhitespaceTokenizer\n");
        assert!(doc.is_malformed());
    }

    #[test]
    fn test_comment_only_file_is_empty_but_loaded() {
        let doc = parse_document(DocumentKind::Rules, "rules.yml", "# nothing yet\n");
        assert_eq!(doc.state, LoadState::Loaded);
        assert_eq!(doc.tree, Node::empty_map());
    }

    #[tokio::test]
    async fn test_load_model_tolerates_partial_project() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("domain.yml"), "intents:\n  - greet\n").unwrap();
        let config = ProjectConfig::for_root(dir.path());
        let model = SpecModel::load(&config).await;
        assert_eq!(model.domain.state, LoadState::Loaded);
        assert!(model.examples.is_missing());
        assert!(model.flows.is_missing());
        assert!(model.rules.is_missing());
        assert!(model.pipeline.is_missing());
        assert!(model.action_code.text.is_none());
    }
}
