//! Parsed documents and their tagged tree representation.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// The five document kinds that make up a dialogue project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Domain,
    Examples,
    Flows,
    Rules,
    Pipeline,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 5] = [
        DocumentKind::Domain,
        DocumentKind::Examples,
        DocumentKind::Flows,
        DocumentKind::Rules,
        DocumentKind::Pipeline,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Examples => "examples",
            Self::Flows => "flows",
            Self::Rules => "rules",
            Self::Pipeline => "pipeline",
        }
    }

    /// Top-level key holding the script list for flow-shaped documents.
    pub fn script_key(self) -> Option<&'static str> {
        match self {
            Self::Flows => Some("stories"),
            Self::Rules => Some("rules"),
            _ => None,
        }
    }

    /// Key naming one script inside a flow-shaped document.
    pub fn script_id_key(self) -> Option<&'static str> {
        match self {
            Self::Flows => Some("story"),
            Self::Rules => Some("rule"),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    /// Integer above `i64::MAX`.
    UInt(u64),
    Float(f64),
    Str(String),
}

/// Tagged document tree: every parsed document is one of these three shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Map(IndexMap<String, Node>),
    Seq(Vec<Node>),
    Scalar(Scalar),
}

impl Default for Node {
    fn default() -> Self {
        Node::empty_map()
    }
}

impl Node {
    pub fn empty_map() -> Self {
        Node::Map(IndexMap::new())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Node::Scalar(Scalar::Str(value.into()))
    }

    /// Build a map node from ordered key/value pairs.
    pub fn map<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Node)>,
    {
        Node::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Scalar(Scalar::Null))
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut IndexMap<String, Node>> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Node]> {
        match self {
            Node::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_seq_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Items of a sequence, or nothing for any other shape.
    pub fn items(&self) -> &[Node] {
        self.as_seq().unwrap_or(&[])
    }

    /// Items of the sequence stored under `key`, or nothing.
    pub fn items_at(&self, key: &str) -> &[Node] {
        self.get(key).map(Node::items).unwrap_or(&[])
    }

    /// Keys of a map in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.as_map()
            .into_iter()
            .flat_map(|map| map.keys().map(String::as_str))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Trimmed textual form of a non-null scalar. Empty text yields `None`.
    pub fn text(&self) -> Option<String> {
        let raw = match self {
            Node::Scalar(Scalar::Str(s)) => s.clone(),
            Node::Scalar(Scalar::Int(i)) => i.to_string(),
            Node::Scalar(Scalar::UInt(u)) => u.to_string(),
            Node::Scalar(Scalar::Float(f)) => f.to_string(),
            Node::Scalar(Scalar::Bool(b)) => b.to_string(),
            _ => return None,
        };
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Name of a vocabulary list entry: either a bare scalar (`- greet`) or a
    /// single-key map carrying options (`- greet: {use_entities: true}`).
    pub fn entry_name(&self) -> Option<String> {
        match self {
            Node::Scalar(_) => self.text(),
            Node::Map(map) if map.len() == 1 => map
                .keys()
                .next()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            _ => None,
        }
    }

    /// Parse YAML text into a tree. Blank input yields an empty map.
    pub fn parse(text: &str) -> Result<Node, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Node::empty_map());
        }
        let value: Value = serde_yaml::from_str(text)?;
        Ok(Node::from(value))
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&Value::from(self))
    }
}

fn key_text(key: Value) -> String {
    match key {
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Scalar(Scalar::Null),
            Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Node::Scalar(Scalar::Int(i)),
                (None, Some(u)) => Node::Scalar(Scalar::UInt(u)),
                (None, None) => Node::Scalar(Scalar::Float(n.as_f64().unwrap_or_default())),
            },
            Value::String(s) => Node::Scalar(Scalar::Str(s)),
            Value::Sequence(items) => Node::Seq(items.into_iter().map(Node::from).collect()),
            Value::Mapping(mapping) => Node::Map(
                mapping
                    .into_iter()
                    .map(|(k, v)| (key_text(k), Node::from(v)))
                    .collect(),
            ),
            Value::Tagged(tagged) => Node::from(tagged.value),
        }
    }
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        match node {
            Node::Scalar(Scalar::Null) => Value::Null,
            Node::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            Node::Scalar(Scalar::Int(i)) => Value::Number((*i).into()),
            Node::Scalar(Scalar::UInt(u)) => Value::Number((*u).into()),
            Node::Scalar(Scalar::Float(f)) => Value::Number((*f).into()),
            Node::Scalar(Scalar::Str(s)) => Value::String(s.clone()),
            Node::Seq(items) => Value::Sequence(items.iter().map(Value::from).collect()),
            Node::Map(map) => {
                let mut mapping = serde_yaml::Mapping::new();
                for (k, v) in map {
                    mapping.insert(Value::String(k.clone()), Value::from(v));
                }
                Value::Mapping(mapping)
            }
        }
    }
}

/// Outcome of loading one document from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadState {
    Loaded,
    Missing,
    Malformed { reason: String },
}

/// One loaded document. Read-only during analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub kind: DocumentKind,
    pub path: PathBuf,
    pub tree: Node,
    pub state: LoadState,
}

impl Document {
    pub fn new(kind: DocumentKind, path: impl AsRef<Path>, tree: Node) -> Self {
        Self {
            kind,
            path: path.as_ref().to_path_buf(),
            tree,
            state: LoadState::Loaded,
        }
    }

    /// An empty document with the given load state.
    pub fn empty(kind: DocumentKind, path: impl AsRef<Path>, state: LoadState) -> Self {
        Self {
            kind,
            path: path.as_ref().to_path_buf(),
            tree: Node::empty_map(),
            state,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self.state, LoadState::Malformed { .. })
    }

    pub fn is_missing(&self) -> bool {
        self.state == LoadState::Missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blank_is_empty_map() {
        assert_eq!(Node::parse("").unwrap(), Node::empty_map());
        assert_eq!(Node::parse("  \n").unwrap(), Node::empty_map());
    }

    #[test]
    fn test_parse_preserves_key_order() {
        let node = Node::parse("version: \"3.1\"\nintents:\n  - greet\nentities: []\n").unwrap();
        let keys: Vec<&str> = node.keys().collect();
        assert_eq!(keys, vec!["version", "intents", "entities"]);
        assert_eq!(node.get("version").and_then(Node::as_str), Some("3.1"));
    }

    #[test]
    fn test_entry_name_accepts_bare_and_keyed_forms() {
        let node = Node::parse("- greet\n- inform:\n    use_entities: true\n- {a: 1, b: 2}\n").unwrap();
        let names: Vec<Option<String>> = node.items().iter().map(Node::entry_name).collect();
        assert_eq!(
            names,
            vec![Some("greet".to_string()), Some("inform".to_string()), None]
        );
    }

    #[test]
    fn test_text_trims_and_rejects_null() {
        assert_eq!(Node::string("  greet ").text().as_deref(), Some("greet"));
        assert_eq!(Node::Scalar(Scalar::Null).text(), None);
        assert_eq!(Node::string("   ").text(), None);
        assert_eq!(Node::Scalar(Scalar::Int(42)).text().as_deref(), Some("42"));
    }

    #[test]
    fn test_yaml_write_keeps_multiline_content() {
        let node = Node::map([
            ("intent", Node::string("greet")),
            ("examples", Node::string("- hi\n- hello\n")),
        ]);
        let text = node.to_yaml().unwrap();
        let reparsed = Node::parse(&text).unwrap();
        assert_eq!(reparsed, node);
    }

    #[test]
    fn test_large_unsigned_integer_is_written_back_exactly() {
        let node = Node::parse("seed: 18446744073709551615\n").unwrap();
        assert_eq!(node.get("seed"), Some(&Node::Scalar(Scalar::UInt(u64::MAX))));
        let text = node.to_yaml().unwrap();
        assert!(text.contains("18446744073709551615"), "{text}");
    }

    #[test]
    fn test_items_on_non_sequence_is_empty() {
        let node = Node::parse("intents: greet\n").unwrap();
        assert!(node.items_at("intents").is_empty());
        assert!(node.items_at("missing").is_empty());
    }
}
