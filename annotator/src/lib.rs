//! DATS schema.org context annotator.
//!
//! Reconciles the properties declared by DATS JSON schemas against the
//! JSON-LD contexts that map them to schema.org, in three steps:
//!
//! 1. [`Repository::load`] reads every `*_schema.json` and every
//!    `*_sdo_context.jsonld` and indexes which contexts define which terms.
//! 2. [`classify`] marks every schema term as `available`, `reusable` or
//!    `missing` and produces an annotation table for human review.
//! 3. [`update`] merges the reviewed annotations back into the contexts.
//!
//! # Entry Point
//!
//! ```no_run
//! use std::path::Path;
//! use dats_annotator::{classify, Repository, ReviewOptions};
//!
//! let repo = Repository::load(Path::new("schema"), Path::new("dats_context/sdo"))
//!     .expect("Failed to load schemas and contexts");
//! let review = classify(&repo, None, &ReviewOptions::missing_only())
//!     .expect("Failed to classify terms");
//! for annotation in &review.annotations {
//!     println!("{}:{} is {}", annotation.schema, annotation.term, annotation.status_label());
//! }
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod classifier;
pub mod error;
pub mod model;
pub mod naming;
pub mod report;
pub mod repository;
pub mod table;
pub mod updater;
pub mod vocabulary;
pub mod writer;

pub use classifier::{classify, ReviewOptions};
pub use error::{AnnotateError, Result};
pub use model::{Annotation, Context, MappingValue, PropertyTerm, Schema, Status};
pub use naming::{context_name_of, schema_name_of};
pub use report::{MappingConflict, Review, StatusSummary, UpdateReport};
pub use repository::{Repository, TermIndex};
pub use table::AnnotationTable;
pub use updater::update;
pub use vocabulary::{SdoInfo, Vocabulary, VocabularyEntry, SCHEMA_PROPERTIES_URL};
