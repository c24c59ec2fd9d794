//! Repair execution.
//!
//! Each [`FileEdit`] is applied by one blocking task: read the current
//! content, apply every mutation, back up the original, verify the backup,
//! then atomically replace the file. Distinct files run concurrently.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use indexmap::IndexMap;
use tempfile::NamedTempFile;
use tracing::Span;

use crate::action_code;
use crate::backup::BackupSession;
use crate::config::Conventions;
use crate::domain::{Node, Origin, Repair, RepairFailure, Scalar};
use crate::obs;
use crate::planner::{FileEdit, Mutation, PlannedMutation, ReferenceKind};

/// Result of applying one file edit.
pub type EditOutcome = std::result::Result<Vec<Repair>, RepairFailure>;

/// Apply every edit. Returns the applied repairs and the edits that failed.
pub async fn execute(
    edits: Vec<FileEdit>,
    session: Arc<BackupSession>,
    conventions: Arc<Conventions>,
) -> (Vec<Repair>, Vec<RepairFailure>) {
    let tasks = edits.into_iter().map(|edit| {
        let session = Arc::clone(&session);
        let conventions = Arc::clone(&conventions);
        let fallback = edit.failure("repair task did not complete");
        let span = Span::current();
        async move {
            tokio::task::spawn_blocking(move || {
                span.in_scope(|| apply_edit(&edit, &session, &conventions))
            })
            .await
            .unwrap_or_else(|e| {
                Err(RepairFailure {
                    reason: format!("{}: {e}", fallback.reason),
                    ..fallback
                })
            })
        }
    });

    let mut applied = Vec::new();
    let mut failures = Vec::new();
    for outcome in join_all(tasks).await {
        match outcome {
            Ok(repairs) => applied.extend(repairs),
            Err(failure) => {
                obs::emit_repair_failed(&failure);
                failures.push(failure);
            }
        }
    }
    (applied, failures)
}

/// Apply one file edit synchronously.
pub fn apply_edit(edit: &FileEdit, session: &BackupSession, conventions: &Conventions) -> EditOutcome {
    let path = edit.path.as_path();
    let original = match fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(edit.failure(format!("read failed: {e}"))),
    };

    let (content, changed) = if edit.targets() == [Origin::ActionCode] {
        render_action_code(edit, original.as_deref())?
    } else if edit.targets().contains(&Origin::ActionCode) {
        return Err(edit.failure("action code shares a path with a document"));
    } else {
        render_document(edit, original.as_deref(), conventions)?
    };
    if changed.is_empty() {
        return Ok(Vec::new());
    }

    let backup = match &original {
        Some(bytes) => {
            let backup = session
                .snapshot(path, bytes)
                .map_err(|e| edit.failure(format!("backup failed: {e}")))?;
            backup
                .verify(bytes)
                .map_err(|e| edit.failure(e.to_string()))?;
            Some(backup.path)
        }
        None => None,
    };

    write_atomic(path, content.as_bytes()).map_err(|e| edit.failure(format!("write failed: {e}")))?;

    let repairs: Vec<Repair> = changed
        .into_iter()
        .map(|planned| Repair {
            finding: planned.finding,
            target: planned.mutation.target(),
            path: path.to_path_buf(),
            description: planned.mutation.to_string(),
            backup: backup.clone(),
        })
        .collect();
    for repair in &repairs {
        obs::emit_repair_applied(repair);
    }
    Ok(repairs)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    match fs::metadata(path) {
        Ok(meta) => tmp.as_file().set_permissions(meta.permissions())?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => set_new_file_mode(tmp.as_file())?,
        Err(e) => return Err(e),
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Temp files are created owner-only; a file created by a repair gets the
/// usual `0644` instead.
#[cfg(unix)]
fn set_new_file_mode(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_new_file_mode(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}

fn render_action_code(
    edit: &FileEdit,
    original: Option<&[u8]>,
) -> std::result::Result<(String, Vec<PlannedMutation>), RepairFailure> {
    let existing = original
        .map(|bytes| String::from_utf8(bytes.to_vec()))
        .transpose()
        .map_err(|e| edit.failure(format!("action code is not UTF-8: {e}")))?;

    let names: Vec<String> = edit
        .mutations
        .iter()
        .filter_map(|m| match &m.mutation {
            Mutation::AppendActionStub { name } => Some(name.clone()),
            _ => None,
        })
        .collect();

    match action_code::append_stubs(existing.as_deref(), &names) {
        Some((text, added)) => {
            let changed = edit
                .mutations
                .iter()
                .filter(|m| matches!(&m.mutation, Mutation::AppendActionStub { name } if added.contains(name)))
                .cloned()
                .collect();
            Ok((text, changed))
        }
        None => Ok((existing.unwrap_or_default(), Vec::new())),
    }
}

fn render_document(
    edit: &FileEdit,
    original: Option<&[u8]>,
    conventions: &Conventions,
) -> std::result::Result<(String, Vec<PlannedMutation>), RepairFailure> {
    let mut tree = match original {
        Some(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| edit.failure(format!("document is not UTF-8: {e}")))?;
            let tree = Node::parse(text).map_err(|e| edit.failure(format!("parse failed: {e}")))?;
            if tree.is_null() {
                Node::empty_map()
            } else if tree.as_map().is_some() {
                tree
            } else {
                return Err(edit.failure("document is not a mapping"));
            }
        }
        None => Node::empty_map(),
    };

    let mut changed = Vec::new();
    for planned in &edit.mutations {
        let applied = apply_mutation(&mut tree, &planned.mutation, conventions)
            .map_err(|reason| edit.failure(format!("cannot {}: {reason}", planned.mutation)))?;
        if applied {
            changed.push(planned.clone());
        }
    }
    if changed.is_empty() {
        return Ok((String::new(), changed));
    }
    let text = tree
        .to_yaml()
        .map_err(|e| edit.failure(format!("serialization failed: {e}")))?;
    Ok((text, changed))
}

// ---------------------------------------------------------------------------
// Tree mutations
// ---------------------------------------------------------------------------

type Applied = std::result::Result<bool, String>;

/// The sequence under `key`, created when absent or null.
fn seq_at<'a>(tree: &'a mut Node, key: &str) -> std::result::Result<&'a mut Vec<Node>, String> {
    let map = tree.as_map_mut().ok_or("document is not a mapping")?;
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Node::Seq(Vec::new()));
    if slot.is_null() {
        *slot = Node::Seq(Vec::new());
    }
    slot.as_seq_mut().ok_or_else(|| format!("`{key}` is not a list"))
}

/// The mapping under `key`, created when absent or null.
fn map_at<'a>(
    tree: &'a mut Node,
    key: &str,
) -> std::result::Result<&'a mut IndexMap<String, Node>, String> {
    let map = tree.as_map_mut().ok_or("document is not a mapping")?;
    let slot = map.entry(key.to_string()).or_insert_with(Node::empty_map);
    if slot.is_null() {
        *slot = Node::empty_map();
    }
    slot.as_map_mut().ok_or_else(|| format!("`{key}` is not a mapping"))
}

fn declare_in_list(tree: &mut Node, key: &str, name: &str) -> Applied {
    let items = seq_at(tree, key)?;
    if items.iter().any(|item| item.entry_name().as_deref() == Some(name)) {
        return Ok(false);
    }
    items.push(Node::string(name));
    Ok(true)
}

fn declare_in_map(tree: &mut Node, key: &str, name: &str, value: impl FnOnce() -> Node) -> Applied {
    let map = map_at(tree, key)?;
    if map.contains_key(name) {
        return Ok(false);
    }
    map.insert(name.to_string(), value());
    Ok(true)
}

fn placeholder_response(name: &str) -> Node {
    Node::Seq(vec![Node::map([(
        "text",
        Node::string(format!("TODO: add response for {name}")),
    )])])
}

fn placeholder_slot() -> Node {
    Node::map([
        ("type", Node::string("text")),
        ("influence_conversation", Node::Scalar(Scalar::Bool(true))),
        (
            "mappings",
            Node::Seq(vec![Node::map([("type", Node::string("from_text"))])]),
        ),
    ])
}

fn placeholder_examples(tree: &mut Node, intent: &str) -> Applied {
    let blocks = seq_at(tree, "nlu")?;
    if blocks
        .iter()
        .any(|block| block.get("intent").and_then(Node::text).as_deref() == Some(intent))
    {
        return Ok(false);
    }
    blocks.push(Node::map([
        ("intent", Node::string(intent)),
        (
            "examples",
            Node::string(format!("- TODO: add examples for {intent}\n")),
        ),
    ]));
    Ok(true)
}

fn component_name(item: &Node) -> Option<String> {
    match item {
        Node::Map(_) => item.get("name").and_then(Node::text),
        other => other.text(),
    }
}

/// Insert after the last entity extractor, else at the end.
fn insert_component(tree: &mut Node, name: &str, conventions: &Conventions) -> Applied {
    let pipeline = seq_at(tree, "pipeline")?;
    if pipeline
        .iter()
        .any(|item| component_name(item).as_deref() == Some(name))
    {
        return Ok(false);
    }
    let position = pipeline
        .iter()
        .rposition(|item| {
            component_name(item).is_some_and(|c| conventions.is_entity_extractor(&c))
        })
        .map_or(pipeline.len(), |i| i + 1);
    pipeline.insert(position, Node::map([("name", Node::string(name))]));
    Ok(true)
}

fn rewrite_steps(steps: &mut [Node], key: &str, from: &str, to: &str) -> usize {
    let mut rewritten = 0;
    for step in steps {
        let Some(map) = step.as_map_mut() else { continue };
        if let Some(value) = map.get_mut(key) {
            if value.text().as_deref() == Some(from) {
                *value = Node::string(to);
                rewritten += 1;
            }
        }
        if let Some(branches) = map.get_mut("or").and_then(Node::as_seq_mut) {
            rewritten += rewrite_steps(branches, key, from, to);
        }
    }
    rewritten
}

fn rewrite_reference(tree: &mut Node, list_key: &str, kind: ReferenceKind, from: &str, to: &str) -> Applied {
    let Some(scripts) = tree
        .as_map_mut()
        .and_then(|map| map.get_mut(list_key))
        .and_then(Node::as_seq_mut)
    else {
        return Ok(false);
    };
    let mut rewritten = 0;
    for script in scripts {
        if let Some(steps) = script
            .as_map_mut()
            .and_then(|map| map.get_mut("steps"))
            .and_then(Node::as_seq_mut)
        {
            rewritten += rewrite_steps(steps, kind.step_key(), from, to);
        }
    }
    Ok(rewritten > 0)
}

fn apply_mutation(tree: &mut Node, mutation: &Mutation, conventions: &Conventions) -> Applied {
    match mutation {
        Mutation::DeclareIntent { name } => declare_in_list(tree, "intents", name),
        Mutation::DeclareAction { name } => declare_in_list(tree, "actions", name),
        Mutation::DeclareEntity { name } => declare_in_list(tree, "entities", name),
        Mutation::DeclareResponse { name } => {
            declare_in_map(tree, "responses", name, || placeholder_response(name))
        }
        Mutation::DeclareSlot { name } => declare_in_map(tree, "slots", name, placeholder_slot),
        Mutation::PlaceholderExamples { intent } => placeholder_examples(tree, intent),
        Mutation::InsertComponent { name } => insert_component(tree, name, conventions),
        Mutation::RewriteReference {
            scope,
            kind,
            from,
            to,
        } => match scope.script_key() {
            Some(list_key) => rewrite_reference(tree, list_key, *kind, from, to),
            None => Err(format!("{scope} has no scripts")),
        },
        Mutation::AppendActionStub { .. } => Err("stubs belong in the action code".to_string()),
    }
}
