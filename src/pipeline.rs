//! Search, fetch, filter and write, as one run.
//!
//! [`run`] never fails: every stage's error is logged and folded into the
//! returned [`PipelineOutcome`], which also decides the process exit status.

use crate::output::{self, WriteOutcome};
use crate::pubmed::PubmedClient;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// What happened to the CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteStatus {
    Written(PathBuf),
    /// No flagged records; no file was created
    Empty,
    Failed(String),
}

/// Counts for a run that got as far as filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    pub total: usize,
    pub flagged: usize,
    pub write: WriteStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The search failed or matched nothing
    NoIdentifiers,
    /// Every fetch batch failed or yielded no records
    NoRecords { identifiers: usize },
    Completed(PipelineSummary),
}

impl PipelineOutcome {
    /// Process exit status: 1 when nothing could be retrieved, 0 otherwise.
    ///
    /// A failed CSV write still exits 0.
    pub fn exit_status(&self) -> u8 {
        match self {
            PipelineOutcome::NoIdentifiers | PipelineOutcome::NoRecords { .. } => 1,
            PipelineOutcome::Completed(_) => 0,
        }
    }
}

pub async fn run(client: &PubmedClient, query: &str, path: &Path) -> PipelineOutcome {
    let pmids = match client.search(query).await {
        Ok(pmids) => pmids,
        Err(e) => {
            error!(error = %e, "Error searching PubMed");
            Vec::new()
        }
    };
    if pmids.is_empty() {
        return PipelineOutcome::NoIdentifiers;
    }

    let report = client.fetch_details(&pmids).await;
    if report.records.is_empty() {
        return PipelineOutcome::NoRecords {
            identifiers: pmids.len(),
        };
    }

    let flagged = output::filter_flagged(&report.records);
    info!(
        total = report.records.len(),
        flagged = flagged.len(),
        "Filtered records"
    );

    let write = match output::write_csv(path, &flagged) {
        Ok(WriteOutcome::Written { path, .. }) => WriteStatus::Written(path),
        Ok(WriteOutcome::Empty) => WriteStatus::Empty,
        Err(e) => {
            error!(error = %e, path = %path.display(), "Error writing CSV file");
            WriteStatus::Failed(e.to_string())
        }
    };

    PipelineOutcome::Completed(PipelineSummary {
        total: report.records.len(),
        flagged: flagged.len(),
        write,
    })
}
