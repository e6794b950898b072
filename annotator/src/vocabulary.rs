//! schema.org property table: label → comment / domain / range.
//!
//! The table is built once, either from the published CSV release or from a
//! local copy, and passed explicitly to the operations that consult it.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{AnnotateError, Result};

/// Published schema.org 12.0 property table.
pub const SCHEMA_PROPERTIES_URL: &str = "https://raw.githubusercontent.com/schemaorg/schemaorg/main/data/releases/12.0/schemaorg-all-http-properties.csv";

/// Columns the property table must provide.
pub const REQUIRED_VOCABULARY_COLUMNS: &[&str] =
    &["label", "comment", "domainIncludes", "rangeIncludes"];

/// Namespace prefix stripped from identifiers before lookup.
const SDO_CURIE_PREFIX: &str = "sdo:";

/// One row of the property table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VocabularyEntry {
    /// Property label, e.g. `"name"`.
    pub label: String,
    /// Human-readable description.
    #[serde(deserialize_with = "empty_as_none")]
    pub comment: Option<String>,
    /// Types the property may be used on.
    #[serde(rename = "domainIncludes", deserialize_with = "empty_as_none")]
    pub domain_includes: Option<String>,
    /// Types the property's values may have.
    #[serde(rename = "rangeIncludes", deserialize_with = "empty_as_none")]
    pub range_includes: Option<String>,
}

/// Result of a lookup. All fields are `None` when the label is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdoInfo {
    /// `comment`
    pub description: Option<String>,
    /// `domainIncludes`
    pub domain: Option<String>,
    /// `rangeIncludes`
    pub range: Option<String>,
}

/// The loaded property table.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entries: HashMap<String, VocabularyEntry>,
}

impl Vocabulary {
    /// Builds a table from entries. The first entry for a label wins.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = VocabularyEntry>) -> Self {
        let mut map = HashMap::new();
        for entry in entries {
            map.entry(entry.label.clone()).or_insert(entry);
        }
        Self { entries: map }
    }

    /// Parses a comma-separated property table.
    ///
    /// `origin` names the source in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::SchemaValidation`] if a required column is
    /// missing and [`AnnotateError::Parse`] if a row is malformed.
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = csv
            .headers()
            .map_err(|e| AnnotateError::parse(origin, e))?
            .clone();
        if !REQUIRED_VOCABULARY_COLUMNS
            .iter()
            .all(|c| headers.iter().any(|h| h == *c))
        {
            return Err(AnnotateError::SchemaValidation {
                table: "schema.org property table".to_owned(),
                required: REQUIRED_VOCABULARY_COLUMNS.iter().map(|c| (*c).to_owned()).collect(),
            });
        }
        let entries = csv
            .deserialize::<VocabularyEntry>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AnnotateError::parse(origin, e))?;
        Ok(Self::from_entries(entries))
    }

    /// Reads a local copy of the property table.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::Io`] if the file cannot be opened, otherwise
    /// the errors of [`Vocabulary::from_reader`].
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| AnnotateError::io(path, e))?;
        let vocabulary = Self::from_reader(file, path)?;
        info!(
            "Loaded {} schema.org properties from {}",
            vocabulary.len(),
            path.display()
        );
        Ok(vocabulary)
    }

    /// Downloads the property table.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::ResourceFetch`] if the request fails or the
    /// server does not answer with success, otherwise the errors of
    /// [`Vocabulary::from_reader`].
    pub fn fetch(url: &str) -> Result<Self> {
        let fetch_error = |e: reqwest::Error| AnnotateError::ResourceFetch {
            url: url.to_owned(),
            reason: e.to_string(),
        };
        let body = reqwest::blocking::get(url)
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(fetch_error)?;
        let vocabulary = Self::from_reader(body.as_bytes(), Path::new(url))?;
        info!("Loaded {} schema.org properties from {url}", vocabulary.len());
        Ok(vocabulary)
    }

    /// Looks up a property by label, ignoring a leading `sdo:` prefix.
    #[must_use]
    pub fn resolve(&self, term: &str) -> SdoInfo {
        let label = term.strip_prefix(SDO_CURIE_PREFIX).unwrap_or(term);
        match self.entries.get(label) {
            Some(entry) => SdoInfo {
                description: entry.comment.clone(),
                domain: entry.domain_includes.clone(),
                range: entry.range_includes.clone(),
            },
            None => SdoInfo::default(),
        }
    }

    /// Number of distinct labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const FIXTURE: &str = "\
id,label,comment,subPropertyOf,domainIncludes,rangeIncludes
https://schema.org/name,name,The name of the item.,,https://schema.org/Thing,https://schema.org/Text
https://schema.org/givenName,givenName,\"Given name, in the U.S. the first name.\",,https://schema.org/Person,https://schema.org/Text
https://schema.org/name,name,Duplicate row that must not win.,,,
https://schema.org/identifier,identifier,,,https://schema.org/Thing,
";

    pub(crate) fn fixture() -> Vocabulary {
        Vocabulary::from_reader(FIXTURE.as_bytes(), Path::new("fixture.csv")).expect("fixture")
    }

    #[test]
    fn resolves_label_with_and_without_prefix() {
        let vocabulary = fixture();
        let plain = vocabulary.resolve("givenName");
        assert_eq!(
            plain.description.as_deref(),
            Some("Given name, in the U.S. the first name.")
        );
        assert_eq!(plain.domain.as_deref(), Some("https://schema.org/Person"));
        assert_eq!(vocabulary.resolve("sdo:givenName"), plain);
    }

    #[test]
    fn first_row_wins() {
        let info = fixture().resolve("name");
        assert_eq!(info.description.as_deref(), Some("The name of the item."));
    }

    #[test]
    fn unknown_label_resolves_to_nothing() {
        assert_eq!(fixture().resolve("sdo:localOnlyTerm"), SdoInfo::default());
    }

    #[test]
    fn empty_cells_are_none() {
        let info = fixture().resolve("identifier");
        assert_eq!(info.description, None);
        assert_eq!(info.range, None);
        assert_eq!(info.domain.as_deref(), Some("https://schema.org/Thing"));
    }

    #[test]
    fn prefix_is_stripped_only_at_the_start() {
        let vocabulary = Vocabulary::from_entries([VocabularyEntry {
            label: "sodium".to_owned(),
            comment: Some("not a real property".to_owned()),
            domain_includes: None,
            range_includes: None,
        }]);
        assert!(vocabulary.resolve("sdo:sodium").description.is_some());
        assert!(vocabulary.resolve("dium").description.is_none());
    }

    #[test]
    fn missing_columns_are_rejected() {
        let err = Vocabulary::from_reader("label,comment\nname,x\n".as_bytes(), Path::new("v.csv"))
            .expect_err("missing columns");
        assert!(matches!(err, AnnotateError::SchemaValidation { .. }));
    }
}
