//! Domain models for dialint.
//!
//! Canonical definitions for the entities of one analysis run:
//! - `Document` / `Node`: a parsed document and its tagged tree
//! - `SymbolSet`: deduplicated names of one kind scoped to one document
//! - `Finding`: one detected cross-document inconsistency
//! - `Repair` / `Backup`: applied mutations and the copies taken before them

pub mod document;
pub mod error;
pub mod finding;
pub mod repair;
pub mod symbol;

pub use document::{Document, DocumentKind, LoadState, Node, Scalar};
pub use error::{LintError, Result};
pub use finding::{Finding, FindingKind, Origin, Severity};
pub use repair::{Backup, Repair, RepairFailure};
pub use symbol::{SymbolKind, SymbolSet};
