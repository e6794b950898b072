//! Core data types: schemas, contexts, mapping values and annotation records.
//!
//! Schemas and contexts keep the JSON documents they were read from so that
//! a context can be written back with every key it was loaded with, in the
//! same order.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Map, Value};

/// Key of the term table in a JSON-LD context document.
pub const CONTEXT_KEY: &str = "@context";

/// Key of the property table in a schema document.
pub const PROPERTIES_KEY: &str = "properties";

/// Prefix shared by JSON-LD keywords (`@id`, `@type`, ...). Terms starting
/// with it are never reviewed.
pub const RESERVED_PREFIX: char = '@';

/// Namespace prefix entry seeded into every freshly created context.
pub const SDO_PREFIX: (&str, &str) = ("sdo", "https://schema.org/");

/// A single property declared by a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTerm {
    /// Property key, e.g. `"givenName"`.
    pub term: String,
    /// The property's `description`, if it has one.
    pub description: Option<String>,
}

/// A DATS JSON schema, reduced to its property table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// File name, e.g. `"Person_schema.json"`.
    pub name: String,
    /// Properties in document order, including reserved `@` keys.
    pub properties: Vec<PropertyTerm>,
}

impl Schema {
    /// Builds a schema from a parsed document.
    ///
    /// Returns `None` if the document has no top-level `properties` object.
    #[must_use]
    pub fn from_value(name: impl Into<String>, document: &Value) -> Option<Self> {
        let properties = document
            .get(PROPERTIES_KEY)?
            .as_object()?
            .iter()
            .map(|(term, descriptor)| PropertyTerm {
                term: term.clone(),
                description: descriptor
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
            })
            .collect();
        Some(Self {
            name: name.into(),
            properties,
        })
    }

    /// Properties subject to review (those not starting with `@`).
    pub fn terms(&self) -> impl Iterator<Item = &PropertyTerm> {
        self.properties
            .iter()
            .filter(|p| !p.term.starts_with(RESERVED_PREFIX))
    }
}

/// A JSON-LD context document associated with one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    /// File name, e.g. `"Person_sdo_context.jsonld"`.
    pub name: String,
    document: Map<String, Value>,
}

impl Context {
    /// Wraps a parsed document.
    ///
    /// Returns `None` unless the document is an object with an `@context`
    /// object.
    #[must_use]
    pub fn from_value(name: impl Into<String>, document: Value) -> Option<Self> {
        match document {
            Value::Object(document) if document.get(CONTEXT_KEY).is_some_and(Value::is_object) => {
                Some(Self {
                    name: name.into(),
                    document,
                })
            }
            _ => None,
        }
    }

    /// Creates an empty context seeded with the `sdo` namespace prefix.
    #[must_use]
    pub fn seeded(name: impl Into<String>) -> Self {
        let (prefix, iri) = SDO_PREFIX;
        let mut table = Map::new();
        table.insert(prefix.to_owned(), Value::String(iri.to_owned()));
        let mut document = Map::new();
        document.insert(CONTEXT_KEY.to_owned(), Value::Object(table));
        Self {
            name: name.into(),
            document,
        }
    }

    /// The term → mapping table.
    #[must_use]
    pub fn mappings(&self) -> &Map<String, Value> {
        match self.document.get(CONTEXT_KEY) {
            Some(Value::Object(map)) => map,
            // from_value and seeded both guarantee an object
            _ => empty_map(),
        }
    }

    /// The raw mapping for `term`, if any.
    #[must_use]
    pub fn mapping(&self, term: &str) -> Option<&Value> {
        self.mappings().get(term)
    }

    /// Whether `term` has a mapping.
    #[must_use]
    pub fn defines(&self, term: &str) -> bool {
        self.mappings().contains_key(term)
    }

    /// Sets or replaces the mapping for `term`.
    pub fn set_mapping(&mut self, term: &str, mapping: &MappingValue) {
        let table = self
            .document
            .entry(CONTEXT_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(table) = table {
            table.insert(term.to_owned(), mapping.to_json());
        }
    }

    /// The full document, ready for serialization.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.document.clone())
    }
}

fn empty_map() -> &'static Map<String, Value> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    EMPTY.get_or_init(Map::new)
}

/// A term mapping: either a bare IRI / CURIE or an `@id` with optional `@type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingValue {
    /// `"sdo:name"`
    Iri(String),
    /// `{"@id": "sdo:name", "@type": "Text"}`
    Typed {
        /// The `@id` value.
        id: String,
        /// The `@type` value, if present.
        type_: Option<String>,
    },
}

impl MappingValue {
    /// Decomposes a raw context value.
    ///
    /// Returns `None` for anything that is neither a string nor an object
    /// with a string `@id`.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(iri) => Some(Self::Iri(iri.clone())),
            Value::Object(map) => {
                let id = map.get("@id")?.as_str()?.to_owned();
                let type_ = map.get("@type").and_then(Value::as_str).map(str::to_owned);
                Some(Self::Typed { id, type_ })
            }
            _ => None,
        }
    }

    /// Builds the mapping proposed by an annotation. An empty or absent type
    /// yields a bare IRI.
    #[must_use]
    pub fn from_annotation(id: &str, type_: Option<&str>) -> Self {
        match type_.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => Self::Typed {
                id: id.to_owned(),
                type_: Some(t.to_owned()),
            },
            None => Self::Iri(id.to_owned()),
        }
    }

    /// The identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Iri(iri) => iri,
            Self::Typed { id, .. } => id,
        }
    }

    /// The type, if any.
    #[must_use]
    pub fn type_(&self) -> Option<&str> {
        match self {
            Self::Iri(_) => None,
            Self::Typed { type_, .. } => type_.as_deref(),
        }
    }

    /// The JSON-LD representation.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Iri(iri) => Value::String(iri.clone()),
            Self::Typed { id, type_: None } => json!({ "@id": id }),
            Self::Typed {
                id,
                type_: Some(t),
            } => json!({ "@id": id, "@type": t }),
        }
    }
}

impl fmt::Display for MappingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// Where a schema term is currently mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    /// Mapped in the schema's own context.
    Available,
    /// Not mapped locally but mapped in another context.
    Reusable,
    /// Mapped nowhere.
    Missing,
}

impl Status {
    /// All statuses, in reporting order.
    pub const ALL: [Status; 3] = [Status::Available, Status::Reusable, Status::Missing];

    /// The value written to the `status` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Available => "available",
            Status::Reusable => "reusable",
            Status::Missing => "missing",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "available" => Ok(Status::Available),
            "reusable" => Ok(Status::Reusable),
            "missing" => Ok(Status::Missing),
            other => Err(format!("unknown status `{other}`")),
        }
    }
}

/// One row of the review table: a (schema, term) pair and its mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    /// Schema file name.
    pub schema: String,
    /// Property term.
    pub term: String,
    /// The property's description from the schema.
    pub description: Option<String>,
    /// Classification; absent on rows imported from a table without it.
    pub status: Option<Status>,
    /// Mapped identifier, e.g. `"sdo:name"`.
    pub sdo_id: Option<String>,
    /// Mapped type, e.g. `"Text"`.
    pub sdo_type: Option<String>,
    /// schema.org `comment` for `sdo_id`.
    pub sdo_description: Option<String>,
    /// schema.org `domainIncludes` for `sdo_id`.
    pub sdo_domain: Option<String>,
    /// schema.org `rangeIncludes` for `sdo_id`.
    pub sdo_range: Option<String>,
}

impl Annotation {
    /// The status as written to the table, empty if unknown.
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        self.status.map(Status::as_str).unwrap_or("")
    }

    /// Whether any schema.org enrichment field is set.
    #[must_use]
    pub fn has_sdo_info(&self) -> bool {
        self.sdo_description.is_some() || self.sdo_domain.is_some() || self.sdo_range.is_some()
    }
}
