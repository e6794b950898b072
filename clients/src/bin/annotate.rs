//! `dats-annotate`: reviews and extends the schema.org contexts of the DATS schemas.
//!
//! **Modes:**
//! - `review`: writes the status of every schema term to a table for review
//! - `add_sdo`: adds schema.org description, domain and range to a reviewed table
//! - `update`: merges a reviewed table into the contexts and writes them to a directory
//!
//! **Usage:**
//! ```
//! dats-annotate review review.csv --with-missing --with-reusable
//! dats-annotate add_sdo review_sdo.csv --annotation review.csv
//! dats-annotate update updated_context/ --annotation review_sdo.csv [--overwrite]
//! ```
//!
//! Exits non-zero on any fatal error; nothing is written in that case.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use dats_annotator::writer::write_contexts;
use dats_annotator::{
    classify, update, AnnotationTable, Repository, ReviewOptions, Status, Vocabulary,
    SCHEMA_PROPERTIES_URL,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Operation mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Write the current context coverage to a table for review.
    Review,
    /// Add schema.org description, domain and range to an annotated table.
    #[value(name = "add_sdo")]
    AddSdo,
    /// Create extended contexts from an annotated table.
    Update,
}

/// Review and extend the schema.org contexts of the DATS schemas.
#[derive(Parser)]
#[command(
    name = "dats-annotate",
    about = "Review and extend the schema.org JSON-LD contexts of the DATS schemas"
)]
struct Args {
    /// What to do.
    #[arg(value_enum)]
    mode: Mode,

    /// Output table (review, add_sdo) or output directory (update).
    out: PathBuf,

    /// Annotation table to enrich or apply.
    #[arg(short = 'a', long)]
    annotation: Option<PathBuf>,

    /// Directory with the DATS schemas.
    #[arg(short = 's', long, default_value = "schema")]
    schema_dir: PathBuf,

    /// Directory with the DATS schema.org contexts.
    #[arg(short = 'c', long, default_value = "dats_context/sdo")]
    context_dir: PathBuf,

    /// Include terms already mapped in their own context.
    #[arg(short = 'A', long)]
    with_available: bool,

    /// Include terms mapped only in another context.
    #[arg(short = 'R', long)]
    with_reusable: bool,

    /// Include terms mapped nowhere (the default if no status is selected).
    #[arg(short = 'M', long)]
    with_missing: bool,

    /// Do not look up schema.org details for available and reusable terms.
    #[arg(long)]
    no_sdo_details: bool,

    /// Replace existing mappings that differ from the annotation.
    #[arg(long)]
    overwrite: bool,

    /// Where to download the schema.org property table from.
    #[arg(long, env = "DATS_SDO_PROPERTIES_URL", default_value = SCHEMA_PROPERTIES_URL)]
    vocabulary_url: String,

    /// Read the schema.org property table from a local file instead.
    #[arg(long)]
    vocabulary_file: Option<PathBuf>,
}

impl Args {
    fn review_options(&self) -> ReviewOptions {
        let none_selected = !(self.with_available || self.with_reusable || self.with_missing);
        ReviewOptions {
            with_available: self.with_available,
            with_reusable: self.with_reusable,
            with_missing: self.with_missing || none_selected,
            available_details: !self.no_sdo_details,
            reusable_details: !self.no_sdo_details,
        }
    }

    fn needs_vocabulary(&self) -> bool {
        match self.mode {
            Mode::Review => {
                let options = self.review_options();
                options.enriches(Status::Available) || options.enriches(Status::Reusable)
            }
            Mode::AddSdo => true,
            Mode::Update => false,
        }
    }

    /// Where the property table was loaded from, for error messages.
    fn vocabulary_source(&self) -> String {
        match &self.vocabulary_file {
            Some(path) => path.display().to_string(),
            None => format!("{}, check your network access", self.vocabulary_url),
        }
    }

    fn annotation_path(&self) -> Result<&Path> {
        match &self.annotation {
            Some(path) => Ok(path.as_path()),
            None => bail!("{:?} mode needs an annotation table; pass --annotation <path>", self.mode),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let vocabulary = if args.needs_vocabulary() {
        load_vocabulary(&args)
    } else {
        None
    };

    match args.mode {
        Mode::Review => run_review(&args, vocabulary.as_ref()),
        Mode::AddSdo => run_add_sdo(&args, vocabulary.as_ref()),
        Mode::Update => run_update(&args),
    }
}

/// Loads the property table; a failure only disables enrichment here and
/// becomes fatal where enrichment is actually needed.
fn load_vocabulary(args: &Args) -> Option<Vocabulary> {
    let loaded = match &args.vocabulary_file {
        Some(path) => Vocabulary::from_path(path),
        None => Vocabulary::fetch(&args.vocabulary_url),
    };
    match loaded {
        Ok(vocabulary) => Some(vocabulary),
        Err(e) => {
            warn!("{e}");
            None
        }
    }
}

fn run_review(args: &Args, vocabulary: Option<&Vocabulary>) -> Result<()> {
    let repo = Repository::load(&args.schema_dir, &args.context_dir)
        .context("Failed to load schemas and contexts")?;
    let review = classify(&repo, vocabulary, &args.review_options())
        .context("Failed to review the contexts")?;
    AnnotationTable::from_annotations(&review.annotations)
        .write(&args.out)
        .context("Failed to write the review table")?;
    println!("  Written: {}", args.out.display());
    Ok(())
}

fn run_add_sdo(args: &Args, vocabulary: Option<&Vocabulary>) -> Result<()> {
    let Some(vocabulary) = vocabulary else {
        bail!(
            "Could not load the schema.org property table from {}",
            args.vocabulary_source()
        );
    };
    let path = args.annotation_path()?;
    let mut table = AnnotationTable::read(path)
        .with_context(|| format!("Could not load the table at {}", path.display()))?;
    table.enrich(vocabulary)?;
    table
        .write(&args.out)
        .context("Failed to write the enriched table")?;
    println!("  Written: {}", args.out.display());
    Ok(())
}

fn run_update(args: &Args) -> Result<()> {
    let repo = Repository::load(&args.schema_dir, &args.context_dir)
        .context("Failed to load schemas and contexts")?;
    let path = args.annotation_path()?;
    let annotations = AnnotationTable::read(path)
        .and_then(|table| table.annotations())
        .with_context(|| format!("Could not load the annotations at {}", path.display()))?;
    let report = update(&repo.schemas, &repo.contexts, &annotations, args.overwrite)
        .context("Failed to update the contexts")?;
    if !report.is_clean() {
        info!(
            "{} annotated mappings were kept out because the terms are already mapped",
            report.conflicts.len()
        );
    }
    for written in write_contexts(&args.out, &report.contexts)? {
        println!("  Written: {}", written.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["dats-annotate"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).expect("arguments parse")
    }

    #[test]
    fn review_keeps_missing_terms_when_no_status_is_selected() {
        let args = args(&["review", "out.csv"]);
        assert_eq!(args.review_options().retained(), vec![Status::Missing]);
    }

    #[test]
    fn selecting_a_status_drops_the_missing_default() {
        let args = args(&["review", "out.csv", "-A"]);
        let options = args.review_options();
        assert!(options.retains(Status::Available));
        assert!(!options.retains(Status::Missing));
        assert!(args.needs_vocabulary());
    }

    #[test]
    fn review_without_details_needs_no_vocabulary() {
        assert!(!args(&["review", "out.csv", "-A", "--no-sdo-details"]).needs_vocabulary());
        assert!(!args(&["review", "out.csv"]).needs_vocabulary());
        assert!(args(&["review", "out.csv", "-R"]).needs_vocabulary());
    }

    #[test]
    fn only_add_sdo_always_needs_vocabulary() {
        assert!(args(&["add_sdo", "out.csv", "-a", "in.csv"]).needs_vocabulary());
        assert!(!args(&["update", "out", "-a", "in.csv"]).needs_vocabulary());
    }

    #[test]
    fn add_sdo_without_vocabulary_fails_before_reading_the_table() {
        let args = args(&["add_sdo", "out.csv", "-a", "does-not-exist.csv"]);
        let message = run_add_sdo(&args, None).expect_err("no vocabulary").to_string();
        assert!(message.contains("property table"), "{message}");
        assert!(!message.contains("does-not-exist.csv"), "{message}");
    }

    #[test]
    fn add_sdo_error_names_the_vocabulary_file() {
        let args = args(&[
            "add_sdo",
            "out.csv",
            "-a",
            "in.csv",
            "--vocabulary-file",
            "local-properties.csv",
        ]);
        let message = run_add_sdo(&args, None).expect_err("no vocabulary").to_string();
        assert!(message.contains("local-properties.csv"), "{message}");
        assert!(!message.contains("network"), "{message}");
    }

    #[test]
    fn annotation_table_is_required_for_update() {
        let args = args(&["update", "out"]);
        assert!(args.annotation_path().is_err());
    }
}
