//! CSV output for flagged records.

use crate::error::Result;
use crate::extract::Record;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Separator for multi-valued columns
pub const LIST_SEPARATOR: &str = "; ";

/// CSV header, written before the first row. Must list the fields of
/// [`OutputRow`] in declaration order.
pub const OUTPUT_COLUMNS: &[&str] = &[
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Author(s)",
    "Company Affiliation(s)",
    "Corresponding Author Email",
];

/// One CSV row; fields are serialized positionally under [`OUTPUT_COLUMNS`].
#[derive(Debug, Serialize)]
pub struct OutputRow<'a> {
    pub pmid: &'a str,
    pub title: &'a str,
    pub publication_date: &'a str,
    pub non_academic_authors: String,
    pub company_affiliations: String,
    pub corresponding_email: &'a str,
}

impl<'a> From<&'a Record> for OutputRow<'a> {
    fn from(record: &'a Record) -> Self {
        Self {
            pmid: &record.pmid,
            title: &record.title,
            publication_date: &record.publication_date,
            non_academic_authors: record.non_academic_authors.join(LIST_SEPARATOR),
            company_affiliations: record.company_affiliations.join(LIST_SEPARATOR),
            corresponding_email: &record.corresponding_email,
        }
    }
}

/// What [`write_csv`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Nothing to write; no file was created
    Empty,
    Written { rows: usize, path: PathBuf },
}

/// Records with at least one company affiliation or non-academic author.
pub fn filter_flagged(records: &[Record]) -> Vec<&Record> {
    records.iter().filter(|r| r.is_flagged()).collect()
}

/// Write `records` as CSV. An empty slice writes nothing.
pub fn write_csv(path: &Path, records: &[&Record]) -> Result<WriteOutcome> {
    if records.is_empty() {
        info!("No papers to write to CSV");
        return Ok(WriteOutcome::Empty);
    }

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    wtr.write_record(OUTPUT_COLUMNS)?;

    for record in records {
        wtr.serialize(OutputRow::from(*record))?;
    }

    wtr.flush()?;
    debug!(path = %path.display(), rows = records.len(), "Saved CSV");
    Ok(WriteOutcome::Written {
        rows: records.len(),
        path: path.to_path_buf(),
    })
}
