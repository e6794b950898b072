//! Schema ↔ context file naming convention.
//!
//! `X_schema.json` is described by `X_sdo_context.jsonld` and vice versa.

use std::path::Path;

use crate::error::{AnnotateError, Result};

const SCHEMA_INFIX: &str = "_schema";
const CONTEXT_INFIX: &str = "_sdo_context";

/// Extension of schema files.
pub const SCHEMA_EXTENSION: &str = "json";
/// Extension of context files.
pub const CONTEXT_EXTENSION: &str = "jsonld";

/// Returns the context file name for a schema file name.
///
/// # Errors
///
/// Returns [`AnnotateError::Naming`] unless `_schema` occurs exactly once
/// and `_sdo_context` does not occur at all.
pub fn context_name_of(schema_name: &str) -> Result<String> {
    substitute(schema_name, SCHEMA_INFIX, CONTEXT_INFIX, CONTEXT_EXTENSION, "context")
}

/// Returns the schema file name for a context file name.
///
/// # Errors
///
/// Returns [`AnnotateError::Naming`] unless `_sdo_context` occurs exactly
/// once and `_schema` does not occur at all.
pub fn schema_name_of(context_name: &str) -> Result<String> {
    substitute(context_name, CONTEXT_INFIX, SCHEMA_INFIX, SCHEMA_EXTENSION, "schema")
}

/// Replaces the single `from` with `to`. A name already holding `to` would
/// map to one the reverse direction rejects, so it is refused here.
fn substitute(
    name: &str,
    from: &'static str,
    to: &'static str,
    extension: &str,
    target: &'static str,
) -> Result<String> {
    expect_count(name, from, 1, target)?;
    expect_count(name, to, 0, target)?;
    let replaced = name.replacen(from, to, 1);
    Ok(Path::new(&replaced)
        .with_extension(extension)
        .to_string_lossy()
        .into_owned())
}

fn expect_count(name: &str, pattern: &'static str, expected: usize, target: &'static str) -> Result<()> {
    let found = name.matches(pattern).count();
    if found == expected {
        return Ok(());
    }
    Err(AnnotateError::Naming {
        name: name.to_owned(),
        target,
        pattern,
        expected,
        found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn schema_to_context() {
        assert_eq!(
            context_name_of("Person_schema.json").ok().as_deref(),
            Some("Person_sdo_context.jsonld")
        );
        assert_eq!(
            context_name_of("data_repository_schema.json").ok().as_deref(),
            Some("data_repository_sdo_context.jsonld")
        );
    }

    #[test]
    fn context_to_schema() {
        assert_eq!(
            schema_name_of("Person_sdo_context.jsonld").ok().as_deref(),
            Some("Person_schema.json")
        );
    }

    #[test]
    fn missing_infix_is_rejected() {
        let err = context_name_of("Person.json").expect_err("no _schema infix");
        assert!(matches!(err, AnnotateError::Naming { found: 0, .. }));
    }

    #[test]
    fn repeated_infix_is_rejected() {
        let err = context_name_of("a_schema_schema.json").expect_err("two infixes");
        assert!(matches!(err, AnnotateError::Naming { found: 2, .. }));
        let err = schema_name_of("a_sdo_context_sdo_context.jsonld").expect_err("two infixes");
        assert!(matches!(err, AnnotateError::Naming { found: 2, .. }));
    }

    #[test]
    fn opposite_infix_is_rejected() {
        let err = context_name_of("a_sdo_context_schema.json").expect_err("holds _sdo_context");
        assert!(matches!(
            err,
            AnnotateError::Naming { pattern: "_sdo_context", expected: 0, found: 1, .. }
        ));
        let err = schema_name_of("a_schema_sdo_context.jsonld").expect_err("holds _schema");
        assert!(matches!(
            err,
            AnnotateError::Naming { pattern: "_schema", expected: 0, found: 1, .. }
        ));
    }

    proptest! {
        #[test]
        fn schema_name_round_trips(stem in "[A-Za-z][A-Za-z0-9]{0,15}") {
            let schema = format!("{stem}_schema.json");
            let context = context_name_of(&schema).map_err(|e| TestCaseError::fail(e.to_string()))?;
            let back = schema_name_of(&context).map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(back, schema);
        }
    }
}
