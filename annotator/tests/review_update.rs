use std::path::PathBuf;

use dats_annotator::writer::write_contexts;
use dats_annotator::{
    classify, update, Annotation, AnnotationTable, Repository, ReviewOptions, Status, Vocabulary,
};
use serde_json::json;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixtures() -> Repository {
    let dir = fixtures_dir();
    Repository::load(&dir.join("schema"), &dir.join("context")).expect("fixtures load")
}

fn vocabulary() -> Vocabulary {
    Vocabulary::from_path(&fixtures_dir().join("schemaorg-properties.csv")).expect("vocabulary")
}

fn every_status() -> ReviewOptions {
    ReviewOptions {
        with_available: true,
        with_reusable: true,
        with_missing: true,
        ..ReviewOptions::default()
    }
}

fn set_mapping(annotations: &mut [Annotation], schema: &str, term: &str, id: &str, type_: Option<&str>) {
    let annotation = annotations
        .iter_mut()
        .find(|a| a.schema == schema && a.term == term)
        .unwrap_or_else(|| panic!("no annotation for {schema}:{term}"));
    annotation.sdo_id = Some(id.to_owned());
    annotation.sdo_type = type_.map(str::to_owned);
}

// -------------------------------------------------------------------------
// review
// -------------------------------------------------------------------------

#[test]
fn fixtures_are_partitioned_by_status() {
    let repo = load_fixtures();
    let review = classify(&repo, None, &every_status()).expect("classify");

    assert_eq!(review.summary.count(Status::Available), 5);
    assert_eq!(review.summary.count(Status::Reusable), 2);
    assert_eq!(review.summary.count(Status::Missing), 4);
    assert_eq!(review.annotations.len(), 11);
    assert!(review.annotations.iter().all(|a| !a.term.starts_with('@')));
}

#[test]
fn reusable_grant_identifier_comes_from_dataset_context() {
    let repo = load_fixtures();
    let options = ReviewOptions {
        with_reusable: true,
        reusable_details: true,
        ..ReviewOptions::default()
    };
    let vocabulary = vocabulary();
    let review = classify(&repo, Some(&vocabulary), &options).expect("classify");

    let terms: Vec<(&str, &str)> = review
        .annotations
        .iter()
        .map(|a| (a.schema.as_str(), a.term.as_str()))
        .collect();
    assert_eq!(
        terms,
        [("Grant_schema.json", "identifier"), ("Person_schema.json", "email")]
    );
    let identifier = &review.annotations[0];
    assert_eq!(identifier.sdo_id.as_deref(), Some("sdo:identifier"));
    assert_eq!(identifier.sdo_domain.as_deref(), Some("https://schema.org/Thing"));
    assert_eq!(
        repo.term_index.contexts_for("identifier"),
        ["Dataset_sdo_context.jsonld", "Person_sdo_context.jsonld"]
    );
}

// -------------------------------------------------------------------------
// add_sdo
// -------------------------------------------------------------------------

#[test]
fn review_table_is_enriched_from_vocabulary() {
    let repo = load_fixtures();
    let review = classify(&repo, None, &every_status()).expect("classify");
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("review.csv");
    AnnotationTable::from_annotations(&review.annotations)
        .write(&path)
        .expect("write review");

    let mut table = AnnotationTable::read(&path).expect("read review");
    table.enrich(&vocabulary()).expect("enrich");
    let enriched = dir.path().join("review_sdo.csv");
    table.write(&enriched).expect("write enriched");

    let annotations = AnnotationTable::read(&enriched)
        .expect("read enriched")
        .annotations()
        .expect("columns");
    let family = annotations
        .iter()
        .find(|a| a.term == "familyName")
        .expect("familyName row");
    assert_eq!(family.sdo_type.as_deref(), Some("sdo:Text"));
    assert_eq!(family.sdo_range.as_deref(), Some("https://schema.org/Text"));
    let funders = annotations
        .iter()
        .find(|a| a.term == "funders")
        .expect("funders row");
    assert!(!funders.has_sdo_info());
}

// -------------------------------------------------------------------------
// update
// -------------------------------------------------------------------------

#[test]
fn reviewed_annotations_update_contexts() {
    let repo = load_fixtures();
    let review = classify(&repo, None, &every_status()).expect("classify");
    let mut annotations = review.annotations;
    set_mapping(&mut annotations, "Person_schema.json", "alternateName", "sdo:alternateName", None);
    set_mapping(&mut annotations, "Grant_schema.json", "name", "sdo:name", Some("sdo:Text"));
    set_mapping(&mut annotations, "Person_schema.json", "givenName", "sdo:name", None);

    let report = update(&repo.schemas, &repo.contexts, &annotations, false).expect("update");
    assert_eq!(report.contexts.len(), 3);
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].term, "givenName");

    let person = &report.contexts["Person_sdo_context.jsonld"];
    assert_eq!(person.mapping("givenName"), Some(&json!("sdo:givenName")));
    assert_eq!(person.mapping("alternateName"), Some(&json!("sdo:alternateName")));
    assert_eq!(person.mapping("email"), Some(&json!("sdo:email")));
    assert_eq!(person.mapping("Person"), Some(&json!("sdo:Person")));

    let grant = &report.contexts["Grant_sdo_context.jsonld"];
    assert_eq!(
        grant.to_value(),
        json!({ "@context": {
            "sdo": "https://schema.org/",
            "identifier": "sdo:identifier",
            "name": { "@id": "sdo:name", "@type": "sdo:Text" }
        }})
    );
}

#[test]
fn written_contexts_reload_and_second_update_is_a_no_op() {
    let repo = load_fixtures();
    let review = classify(&repo, None, &every_status()).expect("classify");
    let mut annotations = review.annotations;
    set_mapping(&mut annotations, "Grant_schema.json", "funders", "sdo:funder", None);

    let first = update(&repo.schemas, &repo.contexts, &annotations, false).expect("update");
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("sdo");
    let written = write_contexts(&out, &first.contexts).expect("write contexts");
    assert_eq!(written.len(), 3);

    let reloaded = Repository::load(&fixtures_dir().join("schema"), &out).expect("reload");
    assert_eq!(reloaded.contexts, first.contexts);

    let second = update(&reloaded.schemas, &reloaded.contexts, &annotations, false).expect("update");
    assert_eq!(second.contexts, first.contexts);
    assert!(second.is_clean());
    // Grant gets identifier and funders, Person gets email.
    assert_eq!(first.applied, 3);
    assert_eq!(second.applied, 0);

    let after = classify(&reloaded, None, &every_status()).expect("classify");
    let funders = after
        .annotations
        .iter()
        .find(|a| a.term == "funders")
        .expect("funders row");
    assert_eq!(funders.status, Some(Status::Available));
}
