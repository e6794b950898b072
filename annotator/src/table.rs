//! The review table exchanged with human annotators.
//!
//! Tables are written comma-separated. On import, comma separation is tried
//! first and tab separation second, so sheets saved from a spreadsheet in
//! either format load unchanged. Columns other than the ones this crate knows
//! about are carried through untouched.

use std::io::Write;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use tracing::{debug, info};

use crate::error::{AnnotateError, Result};
use crate::model::Annotation;
use crate::vocabulary::{SdoInfo, Vocabulary};
use crate::writer::replace_files;

/// Columns an imported annotation table must have.
pub const REQUIRED_COLUMNS: &[&str] = &["schema", "term", "sdo_id", "sdo_type"];

/// Columns filled from the schema.org vocabulary.
pub const SDO_INFO_COLUMNS: &[&str] = &["sdo_description", "sdo_domain", "sdo_range"];

/// Columns written for every review table, in order.
const REVIEW_COLUMNS: &[&str] = &["schema", "term", "description", "sdo_id", "sdo_type", "status"];

/// A rectangular table of strings with a header row.
#[derive(Debug, Clone)]
pub struct AnnotationTable {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl AnnotationTable {
    /// Reads a comma- or tab-separated table.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::Io`] if the file cannot be read and
    /// [`AnnotateError::Parse`] if it is neither valid CSV nor valid TSV.
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AnnotateError::io(path, e))?;
        let table = Self::parse(&content, path)?;
        debug!("Read {} annotation rows from {}", table.len(), path.display());
        Ok(table)
    }

    /// Parses table content; `origin` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::Parse`] if the content is neither valid CSV
    /// nor valid TSV.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let header_line = content.lines().next().unwrap_or("");
        if let Ok(table) = Self::parse_with(content, b',') {
            // a TSV file parses as single-column CSV
            if table.headers.len() > 1 || !header_line.contains('\t') {
                return Ok(table);
            }
        }
        Self::parse_with(content, b'\t').map_err(|e| {
            AnnotateError::parse(
                origin,
                format!("make sure the table is either comma or tab separated ({e})"),
            )
        })
    }

    /// Quotes are only honoured in comma-separated content; in a TSV a
    /// stray `"` at the start of a cell is kept as text.
    fn parse_with(content: &str, delimiter: u8) -> std::result::Result<Self, csv::Error> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .quoting(delimiter == b',')
            .trim(Trim::All)
            .from_reader(content.as_bytes());
        let headers = reader.headers()?.clone();
        let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    /// Builds a review table from classifier output. The schema.org detail
    /// columns are added only if some annotation carries details.
    #[must_use]
    pub fn from_annotations(annotations: &[Annotation]) -> Self {
        let with_info = annotations.iter().any(Annotation::has_sdo_info);
        let mut headers: StringRecord = REVIEW_COLUMNS.iter().collect();
        if with_info {
            headers.extend(SDO_INFO_COLUMNS.iter());
        }
        let rows = annotations
            .iter()
            .map(|a| {
                let mut row: StringRecord = [
                    a.schema.as_str(),
                    a.term.as_str(),
                    a.description.as_deref().unwrap_or(""),
                    a.sdo_id.as_deref().unwrap_or(""),
                    a.sdo_type.as_deref().unwrap_or(""),
                    a.status_label(),
                ]
                .iter()
                .collect();
                if with_info {
                    row.push_field(a.sdo_description.as_deref().unwrap_or(""));
                    row.push_field(a.sdo_domain.as_deref().unwrap_or(""));
                    row.push_field(a.sdo_range.as_deref().unwrap_or(""));
                }
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Column names.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter()
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// The value at `row` / `column`; empty cells read as `None`.
    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column(column)?;
        self.rows
            .get(row)?
            .get(index)
            .filter(|value| !value.is_empty())
    }

    /// Checks that every required annotation column is present.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::SchemaValidation`] listing the required
    /// columns if any is missing.
    pub fn validate_columns(&self) -> Result<()> {
        if REQUIRED_COLUMNS.iter().all(|c| self.column(c).is_some()) {
            Ok(())
        } else {
            Err(AnnotateError::SchemaValidation {
                table: "the annotation table".to_owned(),
                required: REQUIRED_COLUMNS.iter().map(|c| (*c).to_owned()).collect(),
            })
        }
    }

    /// Converts the rows to annotations.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::SchemaValidation`] if a required column is
    /// missing. An unrecognised `status` cell is read as no status.
    pub fn annotations(&self) -> Result<Vec<Annotation>> {
        self.validate_columns()?;
        let owned = |row: usize, column: &str| self.cell(row, column).map(str::to_owned);
        Ok((0..self.rows.len())
            .map(|row| Annotation {
                schema: owned(row, "schema").unwrap_or_default(),
                term: owned(row, "term").unwrap_or_default(),
                description: owned(row, "description"),
                status: self.cell(row, "status").and_then(|s| s.parse().ok()),
                sdo_id: owned(row, "sdo_id"),
                sdo_type: owned(row, "sdo_type"),
                sdo_description: owned(row, "sdo_description"),
                sdo_domain: owned(row, "sdo_domain"),
                sdo_range: owned(row, "sdo_range"),
            })
            .collect())
    }

    /// Fills `sdo_description`, `sdo_domain` and `sdo_range` for every row
    /// from its `sdo_id`, adding the columns if needed. Rows without an
    /// `sdo_id` get empty details.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::SchemaValidation`] if a required column is
    /// missing.
    pub fn enrich(&mut self, vocabulary: &Vocabulary) -> Result<()> {
        self.validate_columns()?;
        let id_column = self.column("sdo_id");
        let targets: Vec<usize> = SDO_INFO_COLUMNS
            .iter()
            .map(|name| self.ensure_column(name))
            .collect();

        let mut resolved = 0usize;
        for row in &mut self.rows {
            let sdo_id = id_column
                .and_then(|i| row.get(i))
                .filter(|id| !id.is_empty());
            let info = match sdo_id {
                Some(id) => vocabulary.resolve(id),
                None => SdoInfo::default(),
            };
            if info != SdoInfo::default() {
                resolved += 1;
            }
            let values = [info.description, info.domain, info.range];
            let mut fields: Vec<String> = row.iter().map(str::to_owned).collect();
            for (&column, value) in targets.iter().zip(values) {
                fields[column] = value.unwrap_or_default();
            }
            *row = fields.iter().collect();
        }
        info!(
            "Added schema.org details to {resolved} of {} annotations",
            self.rows.len()
        );
        Ok(())
    }

    /// Index of `name`, appending an empty column if it does not exist.
    /// Short rows are padded to the header width.
    fn ensure_column(&mut self, name: &str) -> usize {
        let index = match self.column(name) {
            Some(index) => index,
            None => {
                self.headers.push_field(name);
                self.headers.len() - 1
            }
        };
        let width = self.headers.len();
        for row in &mut self.rows {
            while row.len() < width {
                row.push_field("");
            }
        }
        index
    }

    /// Writes the table comma-separated. The file is staged next to `path`
    /// and renamed over it, so an existing table is never left truncated.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::Io`] if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| AnnotateError::io(parent, e))?;
        }
        let mut content = Vec::new();
        self.to_writer(&mut content)
            .map_err(|e| AnnotateError::io(path, e))?;
        replace_files(&[(path.to_path_buf(), content)])?;
        info!("Wrote {} annotations to {}", self.rows.len(), path.display());
        Ok(())
    }

    /// Writes the table comma-separated to any writer.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing fails.
    pub fn to_writer<W: Write>(&self, writer: W) -> std::io::Result<()> {
        let mut csv = WriterBuilder::new().flexible(true).from_writer(writer);
        csv.write_record(&self.headers)?;
        for row in &self.rows {
            csv.write_record(row)?;
        }
        csv.flush()
    }
}
