//! Merges reviewed annotations into the contexts.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::{Annotation, Context, MappingValue, Schema};
use crate::naming::context_name_of;
use crate::report::{MappingConflict, UpdateReport};

/// Applies every annotation that has an `sdo_id` to the context of its
/// schema.
///
/// A term that is already mapped to something else keeps its mapping unless
/// `overwrite` is set; the skipped annotation is logged and listed in
/// [`UpdateReport::conflicts`]. Schemas without a context get a fresh one
/// seeded with the `sdo` prefix. The input contexts are not modified.
///
/// # Errors
///
/// Returns [`crate::AnnotateError::Naming`] if a schema name has no derivable
/// context name.
pub fn update(
    schemas: &BTreeMap<String, Schema>,
    contexts: &BTreeMap<String, Context>,
    annotations: &[Annotation],
    overwrite: bool,
) -> Result<UpdateReport> {
    let proposals = index_annotations(annotations);
    let mut report = UpdateReport::default();

    for schema in schemas.values() {
        let context_name = context_name_of(&schema.name)?;
        let mut context = match contexts.get(&context_name) {
            Some(existing) => existing.clone(),
            None => {
                debug!("Creating new context {context_name} for {}", schema.name);
                Context::seeded(context_name.clone())
            }
        };

        for property in schema.terms() {
            let Some(annotation) = proposals.get(&(schema.name.as_str(), property.term.as_str()))
            else {
                continue;
            };
            let Some(sdo_id) = annotation.sdo_id.as_deref() else {
                continue;
            };
            let proposed = MappingValue::from_annotation(sdo_id, annotation.sdo_type.as_deref());

            if let Some(existing) = context.mapping(&property.term) {
                if *existing == proposed.to_json() {
                    continue;
                }
                if !overwrite {
                    let conflict = MappingConflict {
                        schema: schema.name.clone(),
                        term: property.term.clone(),
                        proposed,
                        existing: existing.clone(),
                    };
                    warn!("{conflict}; pass --overwrite to replace it");
                    report.conflicts.push(conflict);
                    continue;
                }
            }

            context.set_mapping(&property.term, &proposed);
            report.applied += 1;
        }

        report.contexts.insert(context_name, context);
    }

    info!(
        "Applied {} mappings to {} contexts, skipped {} conflicting",
        report.applied,
        report.contexts.len(),
        report.conflicts.len()
    );
    Ok(report)
}

/// First annotation with a non-empty `sdo_id` per (schema, term).
fn index_annotations(annotations: &[Annotation]) -> HashMap<(&str, &str), &Annotation> {
    let mut index = HashMap::new();
    for annotation in annotations {
        if annotation.sdo_id.as_deref().map(str::trim).unwrap_or("").is_empty() {
            continue;
        }
        index
            .entry((annotation.schema.as_str(), annotation.term.as_str()))
            .or_insert(annotation);
    }
    index
}
