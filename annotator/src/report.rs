//! Result types for the review and update passes.

use std::collections::BTreeMap;
use std::fmt;

use crate::model::{Annotation, Context, MappingValue, Status};

/// Number of reviewed terms per status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    counts: BTreeMap<Status, usize>,
}

impl StatusSummary {
    /// Creates an empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one term.
    pub fn record(&mut self, status: Status) {
        *self.counts.entry(status).or_insert(0) += 1;
    }

    /// Terms with the given status.
    #[must_use]
    pub fn count(&self, status: Status) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    /// All counted terms.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Status::ALL
            .iter()
            .map(|s| format!("{} {}", self.count(*s), s))
            .collect();
        write!(f, "{} ({} terms)", parts.join(", "), self.total())
    }
}

/// Output of [`crate::classify`].
#[derive(Debug, Clone, Default)]
pub struct Review {
    /// Annotations whose status was requested, in schema then term order.
    pub annotations: Vec<Annotation>,
    /// Counts over every term, before filtering.
    pub summary: StatusSummary,
}

/// An annotated mapping that was not applied because the term is already
/// mapped differently.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingConflict {
    /// Schema file name.
    pub schema: String,
    /// Property term.
    pub term: String,
    /// Mapping proposed by the annotation.
    pub proposed: MappingValue,
    /// Mapping kept in the context.
    pub existing: serde_json::Value,
}

impl fmt::Display for MappingConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} has new mapping {} but keeps existing mapping {}",
            self.schema, self.term, self.proposed, self.existing
        )
    }
}

/// Output of [`crate::update`].
#[derive(Debug, Clone, Default)]
pub struct UpdateReport {
    /// One context per schema, keyed by context file name.
    pub contexts: BTreeMap<String, Context>,
    /// Annotations skipped because overwriting was not allowed.
    pub conflicts: Vec<MappingConflict>,
    /// Number of mappings added or changed; identical ones are not counted.
    pub applied: usize,
}

impl UpdateReport {
    /// Returns true if no annotation was skipped.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}
