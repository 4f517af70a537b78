//! # pubmed-pharma
//!
//! Fetch papers from PubMed and flag the ones with pharmaceutical/biotech
//! author affiliations.
//!
//! ## Modules
//!
//! - [`classifier`] - Affiliation keyword matching and the academic exclusion rule
//! - [`config`] - TOML reference-set file
//! - [`extract`] - `<PubmedArticle>` to [`extract::Record`]
//! - [`pubmed`] - E-utilities client (search + batched fetch)
//! - [`output`] - Filtering and CSV output
//! - [`pipeline`] - One search-to-CSV run and its exit status
//! - [`xml`] - Owned XML tree and text flattening
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pubmed_pharma::classifier::AffiliationClassifier;
//! use pubmed_pharma::pubmed::{ClientConfig, PubmedClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PubmedClient::new(ClientConfig::default(), AffiliationClassifier::default())?;
//!     let ids = client.search("cancer immunotherapy").await?;
//!     let report = client.fetch_details(&ids).await;
//!     println!("Extracted {} records", report.records.len());
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod pubmed;
pub mod xml;

pub use error::{ExtractionError, PubmedError, Result};
