//! Project configuration.
//!
//! A [`ProjectConfig`] is an explicit value passed into the engine. It is built
//! from documented per-root defaults and optionally refined by a
//! `dialint.toml` file at the project root:
//!
//! ```toml
//! [paths]
//! examples = "data/nlu/examples.yml"
//! backups = "/var/backups/bot"
//!
//! [conventions]
//! min_examples = 5
//! imbalance_baseline = "average"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{DocumentKind, LintError, Result};

/// Which intent count the imbalance warning is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImbalanceBaseline {
    Minimum,
    Average,
}

/// An example feature that requires a pipeline component to take effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureComponent {
    /// Key of the example block declaring the feature (e.g. `regex`).
    pub feature: String,
    /// Pipeline component consuming it (e.g. `RegexEntityExtractor`).
    pub component: String,
}

/// Naming conventions and thresholds used by the checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Conventions {
    /// Reserved prefix for response templates.
    pub response_prefix: String,

    /// Prefix of actions that need an implementation in the action code.
    pub custom_action_prefix: String,

    /// Prefix of framework-provided default actions.
    pub default_action_prefix: String,

    /// Framework-provided actions that never need a declaration.
    pub builtin_actions: Vec<String>,

    /// Fewer example lines than this is an issue.
    pub min_examples: usize,

    /// An intent with more than `imbalance_factor * baseline` lines is a warning.
    pub imbalance_factor: usize,

    pub imbalance_baseline: ImbalanceBaseline,

    /// Substrings identifying entity-extraction pipeline components.
    pub entity_extractor_markers: Vec<String>,

    pub feature_components: Vec<FeatureComponent>,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            response_prefix: "utter_".to_string(),
            custom_action_prefix: "action_".to_string(),
            default_action_prefix: "action_default_".to_string(),
            builtin_actions: [
                "action_listen",
                "action_restart",
                "action_session_start",
                "action_default_fallback",
                "action_back",
                "action_deactivate_loop",
                "action_two_stage_fallback",
                "action_unlikely_intent",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            min_examples: 3,
            imbalance_factor: 5,
            imbalance_baseline: ImbalanceBaseline::Minimum,
            entity_extractor_markers: vec![
                "EntityExtractor".to_string(),
                "DIETClassifier".to_string(),
            ],
            feature_components: vec![
                FeatureComponent {
                    feature: "regex".to_string(),
                    component: "RegexEntityExtractor".to_string(),
                },
                FeatureComponent {
                    feature: "synonym".to_string(),
                    component: "EntitySynonymMapper".to_string(),
                },
            ],
        }
    }
}

impl Conventions {
    pub fn is_response(&self, name: &str) -> bool {
        name.starts_with(&self.response_prefix)
    }

    pub fn is_builtin_action(&self, name: &str) -> bool {
        name.starts_with(&self.default_action_prefix)
            || self.builtin_actions.iter().any(|a| a == name)
    }

    /// A declared action that must be backed by an implementation.
    pub fn is_custom_action(&self, name: &str) -> bool {
        name.starts_with(&self.custom_action_prefix) && !self.is_builtin_action(name)
    }

    pub fn is_entity_extractor(&self, component: &str) -> bool {
        self.entity_extractor_markers
            .iter()
            .any(|marker| component.contains(marker.as_str()))
    }
}

/// Explicit locations and conventions for one project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfig {
    pub root: PathBuf,
    pub domain_path: PathBuf,
    pub examples_path: PathBuf,
    pub flows_path: PathBuf,
    pub rules_path: PathBuf,
    pub pipeline_path: PathBuf,
    pub actions_path: PathBuf,
    pub backup_root: PathBuf,
    pub log_dir: PathBuf,
    pub conventions: Conventions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PathOverrides {
    domain: Option<PathBuf>,
    examples: Option<PathBuf>,
    flows: Option<PathBuf>,
    rules: Option<PathBuf>,
    pipeline: Option<PathBuf>,
    actions: Option<PathBuf>,
    backups: Option<PathBuf>,
    logs: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    paths: PathOverrides,
    conventions: Conventions,
}

/// `primary`, unless only `fallback` exists on disk.
fn prefer_existing(primary: PathBuf, fallback: PathBuf) -> PathBuf {
    if !primary.exists() && fallback.exists() {
        fallback
    } else {
        primary
    }
}

impl ProjectConfig {
    /// Name of the optional override file at the project root.
    pub const FILE_NAME: &'static str = "dialint.toml";

    /// Default layout rooted at `root`.
    pub fn for_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let data = root.join("data");
        Self {
            domain_path: root.join("domain.yml"),
            examples_path: data.join("nlu.yml"),
            flows_path: prefer_existing(data.join("stories.yml"), root.join("stories.yml")),
            rules_path: prefer_existing(data.join("rules.yml"), root.join("rules.yml")),
            pipeline_path: root.join("config.yml"),
            actions_path: prefer_existing(
                root.join("actions").join("actions.py"),
                root.join("actions.py"),
            ),
            backup_root: root.join(".dialint").join("backups"),
            log_dir: root.join(".dialint").join("logs"),
            conventions: Conventions::default(),
            root,
        }
    }

    /// Defaults for `root`, refined by `<root>/dialint.toml` when present.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let file = root.join(Self::FILE_NAME);
        match std::fs::read_to_string(&file) {
            Ok(text) => Self::from_toml_str(root, &text).map_err(|e| match e {
                LintError::Config { reason, .. } => LintError::Config { path: file, reason },
                other => other,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::for_root(root)),
            Err(e) => Err(LintError::Config {
                path: file,
                reason: e.to_string(),
            }),
        }
    }

    /// Defaults for `root` refined by the given override text.
    pub fn from_toml_str(root: impl AsRef<Path>, text: &str) -> Result<Self> {
        let mut config = Self::for_root(root.as_ref());
        let file: ConfigFile = toml::from_str(text).map_err(|e| LintError::Config {
            path: PathBuf::from(Self::FILE_NAME),
            reason: e.to_string(),
        })?;

        let resolve = |p: PathBuf| {
            if p.is_absolute() {
                p
            } else {
                config.root.join(p)
            }
        };
        let paths = file.paths;
        let domain = paths.domain.map(&resolve);
        let examples = paths.examples.map(&resolve);
        let flows = paths.flows.map(&resolve);
        let rules = paths.rules.map(&resolve);
        let pipeline = paths.pipeline.map(&resolve);
        let actions = paths.actions.map(&resolve);
        let backups = paths.backups.map(&resolve);
        let logs = paths.logs.map(&resolve);

        if let Some(p) = domain {
            config.domain_path = p;
        }
        if let Some(p) = examples {
            config.examples_path = p;
        }
        if let Some(p) = flows {
            config.flows_path = p;
        }
        if let Some(p) = rules {
            config.rules_path = p;
        }
        if let Some(p) = pipeline {
            config.pipeline_path = p;
        }
        if let Some(p) = actions {
            config.actions_path = p;
        }
        if let Some(p) = backups {
            config.backup_root = p;
        }
        if let Some(p) = logs {
            config.log_dir = p;
        }
        config.conventions = file.conventions;
        Ok(config)
    }

    pub fn document_path(&self, kind: DocumentKind) -> &Path {
        match kind {
            DocumentKind::Domain => &self.domain_path,
            DocumentKind::Examples => &self.examples_path,
            DocumentKind::Flows => &self.flows_path,
            DocumentKind::Rules => &self.rules_path,
            DocumentKind::Pipeline => &self.pipeline_path,
        }
    }
}
