//! Term classification: is each schema term mapped in its own context
//! (`available`), only in another context (`reusable`), or nowhere
//! (`missing`)?

use tracing::{info, warn};

use crate::error::{AnnotateError, Result};
use crate::model::{Annotation, Context, MappingValue, Schema, Status};
use crate::naming::context_name_of;
use crate::report::{Review, StatusSummary};
use crate::repository::Repository;
use crate::vocabulary::{SdoInfo, Vocabulary};

/// Which statuses to keep and which to enrich with schema.org details.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewOptions {
    /// Keep `available` terms.
    pub with_available: bool,
    /// Keep `reusable` terms.
    pub with_reusable: bool,
    /// Keep `missing` terms.
    pub with_missing: bool,
    /// Look up schema.org details for kept `available` terms.
    pub available_details: bool,
    /// Look up schema.org details for kept `reusable` terms.
    pub reusable_details: bool,
}

impl ReviewOptions {
    /// Keep only missing terms, no lookups.
    #[must_use]
    pub fn missing_only() -> Self {
        Self {
            with_missing: true,
            ..Self::default()
        }
    }

    /// Whether annotations with `status` are kept.
    #[must_use]
    pub fn retains(&self, status: Status) -> bool {
        match status {
            Status::Available => self.with_available,
            Status::Reusable => self.with_reusable,
            Status::Missing => self.with_missing,
        }
    }

    /// Whether kept annotations with `status` get schema.org details.
    #[must_use]
    pub fn enriches(&self, status: Status) -> bool {
        self.retains(status)
            && match status {
                Status::Available => self.available_details,
                Status::Reusable => self.reusable_details,
                Status::Missing => false,
            }
    }

    /// Kept statuses, in reporting order.
    #[must_use]
    pub fn retained(&self) -> Vec<Status> {
        Status::ALL.into_iter().filter(|s| self.retains(*s)).collect()
    }

    fn needs_vocabulary(&self) -> bool {
        Status::ALL.into_iter().any(|s| self.enriches(s))
    }
}

/// Classifies every reviewable term of every schema.
///
/// Reusable terms take their mapping from the first context, in load order,
/// that defines them.
///
/// # Errors
///
/// Returns [`AnnotateError::VocabularyUnavailable`] before any term is
/// processed if details are requested without a vocabulary, and
/// [`AnnotateError::Naming`] if a schema name has no derivable context name.
pub fn classify(
    repo: &Repository,
    vocabulary: Option<&Vocabulary>,
    options: &ReviewOptions,
) -> Result<Review> {
    if options.needs_vocabulary() && vocabulary.is_none() {
        return Err(AnnotateError::VocabularyUnavailable {
            operation: "reviewing with schema.org details",
        });
    }

    let mut review = Review::default();
    for schema in repo.schemas.values() {
        let own_context = repo.contexts.get(&context_name_of(&schema.name)?);
        for annotation in classify_schema(repo, schema, own_context) {
            let status = annotation.status.unwrap_or(Status::Missing);
            review.summary.record(status);
            if !options.retains(status) {
                continue;
            }
            let annotation = match vocabulary {
                Some(vocabulary) if options.enriches(status) => enrich(annotation, vocabulary),
                _ => annotation,
            };
            review.annotations.push(annotation);
        }
    }

    log_summary(&review.summary, options);
    Ok(review)
}

/// One annotation per reviewable term of `schema`, unfiltered.
fn classify_schema(repo: &Repository, schema: &Schema, own_context: Option<&Context>) -> Vec<Annotation> {
    schema
        .terms()
        .map(|property| {
            let mut annotation = Annotation {
                schema: schema.name.clone(),
                term: property.term.clone(),
                description: property.description.clone(),
                ..Annotation::default()
            };
            let local = own_context.and_then(|c| c.mapping(&property.term));
            let (status, mapping) = match local {
                Some(value) => (Status::Available, Some(value)),
                None => match repo.term_index.first(&property.term) {
                    None => (Status::Missing, None),
                    Some(source) => (
                        Status::Reusable,
                        repo.contexts
                            .get(source)
                            .and_then(|c| c.mapping(&property.term)),
                    ),
                },
            };
            annotation.status = Some(status);
            if let Some(value) = mapping {
                match MappingValue::from_json(value) {
                    Some(mapping) => {
                        annotation.sdo_id = Some(mapping.id().to_owned());
                        annotation.sdo_type = mapping.type_().map(str::to_owned);
                    }
                    None => warn!(
                        "{}:{} has an unrecognised mapping {value}; leaving sdo_id empty",
                        schema.name, property.term
                    ),
                }
            }
            annotation
        })
        .collect()
}

fn enrich(mut annotation: Annotation, vocabulary: &Vocabulary) -> Annotation {
    let SdoInfo {
        description,
        domain,
        range,
    } = annotation
        .sdo_id
        .as_deref()
        .map(|id| vocabulary.resolve(id))
        .unwrap_or_default();
    annotation.sdo_description = description;
    annotation.sdo_domain = domain;
    annotation.sdo_range = range;
    annotation
}

fn log_summary(summary: &StatusSummary, options: &ReviewOptions) {
    info!("Status of terms in the contexts: {summary}");
    let kept: Vec<&str> = options.retained().into_iter().map(Status::as_str).collect();
    if kept.is_empty() {
        warn!("No status selected; the review table will be empty");
    } else {
        info!("The output will include {} terms", kept.join(","));
    }
}
