//! Typed symbol sets.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::document::DocumentKind;

/// Kind of a named vocabulary unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Intent,
    Entity,
    Slot,
    Action,
    Response,
    PipelineComponent,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Intent => "intent",
            Self::Entity => "entity",
            Self::Slot => "slot",
            Self::Action => "action",
            Self::Response => "response",
            Self::PipelineComponent => "pipeline component",
        };
        f.write_str(s)
    }
}

/// Deduplicated names of one kind, scoped to one document.
///
/// Membership is exact name equality after trimming. Iteration follows first
/// appearance in the document, which is stable for a given file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSet {
    pub kind: SymbolKind,
    pub scope: DocumentKind,
    names: IndexSet<String>,
}

impl SymbolSet {
    pub fn new(kind: SymbolKind, scope: DocumentKind) -> Self {
        Self {
            kind,
            scope,
            names: IndexSet::new(),
        }
    }

    /// Insert a name; blank names are ignored. Returns `true` if newly added.
    pub fn insert(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.names.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name.trim())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Names present here but absent from `other`, in ascending order.
    pub fn missing_from(&self, other: &SymbolSet) -> Vec<String> {
        let mut missing: Vec<String> = self
            .names
            .iter()
            .filter(|name| !other.names.contains(*name))
            .cloned()
            .collect();
        missing.sort();
        missing
    }
}

impl<'a> Extend<&'a str> for SymbolSet {
    fn extend<T: IntoIterator<Item = &'a str>>(&mut self, iter: T) {
        for name in iter {
            self.insert(name);
        }
    }
}
