//! Custom-action implementation source.
//!
//! The action code is scanned textually: an action counts as implemented when
//! the file contains its PascalCase class definition or returns its name as a
//! string literal.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::obs;

static SLOT_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:get_slot|SlotSet)\(\s*["']([A-Za-z0-9_\-]+)["']"#).expect("valid regex")
});

/// Header written when the action code file is created from scratch.
pub const STUB_FILE_HEADER: &str = "\
# Custom actions for this assistant.
#
# Each class below backs one custom action declared in the domain.

from typing import Any, Text, Dict, List

from rasa_sdk import Action, Tracker
from rasa_sdk.executor import CollectingDispatcher
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCode {
    pub path: PathBuf,
    /// File content; `None` when the file is absent or unreadable.
    pub text: Option<String>,
    /// Read failure other than absence.
    pub error: Option<String>,
}

impl ActionCode {
    /// Read the action code file. Absence is not an error.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_text(path, text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "action code file absent");
                Self::absent(path)
            }
            Err(e) => Self::unreadable(path, e.to_string()),
        }
    }

    pub fn from_text(path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            text: Some(text.into()),
            error: None,
        }
    }

    pub fn absent(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            text: None,
            error: None,
        }
    }

    pub fn unreadable(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        let path = path.as_ref();
        let reason = reason.into();
        obs::emit_action_code_unreadable(path, &reason);
        Self {
            path: path.to_path_buf(),
            text: None,
            error: Some(reason),
        }
    }

    pub fn is_unreadable(&self) -> bool {
        self.error.is_some()
    }

    pub fn implements(&self, action: &str) -> bool {
        self.text
            .as_deref()
            .is_some_and(|text| source_implements(text, action))
    }

    /// Slot names referenced through `tracker.get_slot(..)` or `SlotSet(..)`.
    pub fn slot_references(&self) -> Vec<String> {
        let Some(text) = self.text.as_deref() else {
            return Vec::new();
        };
        let mut names: Vec<String> = SLOT_REFERENCE
            .captures_iter(text)
            .map(|c| c[1].to_string())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

pub fn source_implements(text: &str, action: &str) -> bool {
    let class = format!("class {}(", class_name(action));
    text.contains(&class)
        || text.contains(&format!("return \"{action}\""))
        || text.contains(&format!("return '{action}'"))
}

/// `action_check_order` becomes `ActionCheckOrder`.
pub fn class_name(action: &str) -> String {
    action
        .split(['_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// Placeholder implementation for one custom action.
pub fn render_stub(action: &str) -> String {
    format!(
        r#"

class {class}(Action):
    def name(self) -> Text:
        return "{action}"

    def run(self, dispatcher: CollectingDispatcher,
            tracker: Tracker,
            domain: Dict[Text, Any]) -> List[Dict[Text, Any]]:
        # TODO: implement {action}
        dispatcher.utter_message(text="Action {action} executed")
        return []
"#,
        class = class_name(action),
    )
}

/// Append stubs for `actions` not yet implemented in `existing`.
///
/// Returns the new content and the actions that were stubbed, or `None`
/// when nothing needed adding.
pub fn append_stubs(existing: Option<&str>, actions: &[String]) -> Option<(String, Vec<String>)> {
    let mut text = existing.unwrap_or(STUB_FILE_HEADER).to_string();
    let mut added = Vec::new();
    for action in actions {
        if source_implements(&text, action) {
            continue;
        }
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&render_stub(action));
        added.push(action.clone());
    }
    (!added.is_empty()).then_some((text, added))
}
