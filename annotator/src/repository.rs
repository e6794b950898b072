//! Loads schemas and contexts from disk and indexes which contexts define
//! which terms.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{AnnotateError, Result};
use crate::model::{Context, Schema, CONTEXT_KEY, PROPERTIES_KEY};
use crate::naming::{CONTEXT_EXTENSION, SCHEMA_EXTENSION};

/// Reverse index from term to the contexts that map it, in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermIndex {
    terms: HashMap<String, Vec<String>>,
}

impl TermIndex {
    /// Indexes every key of every context's `@context` table.
    ///
    /// Contexts are visited in iteration order; a term defined by several
    /// contexts lists them in that order.
    pub fn build<'a>(contexts: impl IntoIterator<Item = &'a Context>) -> Self {
        let mut terms: HashMap<String, Vec<String>> = HashMap::new();
        for context in contexts {
            for key in context.mappings().keys() {
                terms
                    .entry(key.clone())
                    .or_default()
                    .push(context.name.clone());
            }
        }
        Self { terms }
    }

    /// Contexts defining `term`, in load order.
    #[must_use]
    pub fn contexts_for(&self, term: &str) -> &[String] {
        self.terms.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first context defining `term`.
    #[must_use]
    pub fn first(&self, term: &str) -> Option<&str> {
        self.contexts_for(term).first().map(String::as_str)
    }

    /// Whether any context defines `term`.
    #[must_use]
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    /// Number of distinct terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether no context defines any term.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Everything a run works on: schemas, contexts and the derived term index.
///
/// Schemas and contexts are keyed by file name; iteration (and therefore
/// load) order is the lexicographic order of those names.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    /// Schemas by file name.
    pub schemas: BTreeMap<String, Schema>,
    /// Contexts by file name.
    pub contexts: BTreeMap<String, Context>,
    /// Term → defining contexts.
    pub term_index: TermIndex,
}

impl Repository {
    /// Assembles a repository from already-parsed parts and indexes it.
    #[must_use]
    pub fn new(schemas: Vec<Schema>, contexts: Vec<Context>) -> Self {
        let schemas: BTreeMap<_, _> = schemas.into_iter().map(|s| (s.name.clone(), s)).collect();
        let contexts: BTreeMap<_, _> = contexts.into_iter().map(|c| (c.name.clone(), c)).collect();
        let term_index = TermIndex::build(contexts.values());
        Self {
            schemas,
            contexts,
            term_index,
        }
    }

    /// Reads every `*.json` under `schema_dir` and every `*.jsonld` under
    /// `context_dir` (top level only).
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::Io`] if a file cannot be read, and
    /// [`AnnotateError::Parse`] if it is not JSON or lacks its top-level
    /// `properties` / `@context` table.
    pub fn load(schema_dir: &Path, context_dir: &Path) -> Result<Self> {
        let mut schemas = Vec::new();
        for path in list_files(schema_dir, SCHEMA_EXTENSION) {
            let (name, document) = read_json(&path)?;
            let schema = Schema::from_value(name, &document).ok_or_else(|| {
                AnnotateError::parse(&path, format!("missing top-level `{PROPERTIES_KEY}` object"))
            })?;
            schemas.push(schema);
        }

        let mut contexts = Vec::new();
        for path in list_files(context_dir, CONTEXT_EXTENSION) {
            let (name, document) = read_json(&path)?;
            let context = Context::from_value(name, document).ok_or_else(|| {
                AnnotateError::parse(&path, format!("missing top-level `{CONTEXT_KEY}` object"))
            })?;
            contexts.push(context);
        }

        let repo = Self::new(schemas, contexts);
        debug!(
            schemas = repo.schemas.len(),
            contexts = repo.contexts.len(),
            terms = repo.term_index.len(),
            "loaded schemas and contexts"
        );
        Ok(repo)
    }
}

/// Files directly under `dir` with the given extension, sorted by name.
fn list_files(dir: &Path, extension: &str) -> Vec<std::path::PathBuf> {
    if !dir.is_dir() {
        warn!("{} is not a directory; nothing loaded from it", dir.display());
        return Vec::new();
    }
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map(|x| x == extension).unwrap_or(false))
        .map(|e| e.into_path())
        .collect()
}

fn read_json(path: &Path) -> Result<(String, Value)> {
    let content = std::fs::read_to_string(path).map_err(|e| AnnotateError::io(path, e))?;
    let document: Value =
        serde_json::from_str(&content).map_err(|e| AnnotateError::parse(path, e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok((name, document))
}
