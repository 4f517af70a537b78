//! PubMed E-utilities client.
//!
//! Two endpoints are used:
//! - `esearch.fcgi` turns a query into an ordered list of PMIDs
//! - `efetch.fcgi` returns full `<PubmedArticle>` records for a batch of PMIDs
//!
//! Batches are fetched one after another with a fixed pause in between, as
//! NCBI asks of unauthenticated clients (3 requests/s). A failed batch is
//! logged and yields no records; it never stops the remaining batches.

use crate::classifier::AffiliationClassifier;
use crate::error::{PubmedError, Result};
use crate::extract::{extract_articles, ExtractReport};
use crate::xml::XmlElement;
use reqwest::Client;
use std::future::Future;
use std::ops::Range;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// E-utilities base URL
pub const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/";

/// Default cap on search results
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// PMIDs per efetch request
pub const DEFAULT_BATCH_SIZE: usize = 200;

/// Pause between efetch requests
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(500);

/// Tool name reported to NCBI
const TOOL_NAME: &str = "pubmed-pharma";

/// Client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub max_results: usize,
    pub batch_size: usize,
    pub batch_delay: Duration,
    /// NCBI API key (raises the rate limit to 10 requests/s)
    pub api_key: Option<String>,
    /// Contact address reported to NCBI
    pub email: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: EUTILS_BASE_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
            api_key: None,
            email: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(PubmedError::Validation(
                "batch size must be at least 1".to_string(),
            ));
        }
        if self.max_results == 0 {
            return Err(PubmedError::Validation(
                "max results must be at least 1".to_string(),
            ));
        }
        Url::parse(&self.base_url)
            .map_err(|e| PubmedError::Config(format!("Invalid base URL {}: {}", self.base_url, e)))?;
        Ok(())
    }
}

/// One efetch request: which slice of the PMID list, and whether to pause
/// after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    pub range: Range<usize>,
    pub pause_after: bool,
}

/// Split `total` identifiers into consecutive batches of at most `size`.
///
/// Every batch except the last is followed by a pause.
pub fn batch_schedule(total: usize, size: usize) -> Vec<BatchPlan> {
    if size == 0 {
        return Vec::new();
    }
    (0..total)
        .step_by(size)
        .map(|start| {
            let end = (start + size).min(total);
            BatchPlan {
                range: start..end,
                pause_after: end < total,
            }
        })
        .collect()
}

/// Run `fetch` over `ids` following [`batch_schedule`], sleeping `delay`
/// between consecutive batches and merging whatever succeeds.
pub async fn fetch_in_batches<F, Fut>(
    ids: &[String],
    batch_size: usize,
    delay: Duration,
    mut fetch: F,
) -> ExtractReport
where
    F: FnMut(Vec<String>) -> Fut,
    Fut: Future<Output = Result<ExtractReport>>,
{
    let mut report = ExtractReport::default();
    if ids.is_empty() {
        return report;
    }

    let schedule = batch_schedule(ids.len(), batch_size);
    let total_batches = schedule.len();
    info!(
        papers = ids.len(),
        batches = total_batches,
        "Fetching paper details"
    );

    for (batch_idx, plan) in schedule.into_iter().enumerate() {
        let chunk = ids[plan.range.clone()].to_vec();
        debug!(
            batch = batch_idx + 1,
            total_batches = total_batches,
            papers = chunk.len(),
            "Processing batch"
        );

        match fetch(chunk).await {
            Ok(batch) => {
                debug!(
                    batch = batch_idx + 1,
                    records = batch.records.len(),
                    skipped = batch.skipped.len(),
                    "Batch completed"
                );
                report.merge(batch);
            }
            Err(e) => {
                warn!(batch = batch_idx + 1, error = %e, "Batch failed");
            }
        }

        if plan.pause_after && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    if !report.skipped.is_empty() {
        warn!(skipped = report.skipped.len(), "Some records could not be extracted");
    }
    info!(records = report.records.len(), "Fetch complete");
    report
}

/// E-utilities client with an injected classifier
pub struct PubmedClient {
    client: Client,
    config: ClientConfig,
    base: Url,
    classifier: AffiliationClassifier,
}

impl PubmedClient {
    pub fn new(config: ClientConfig, classifier: AffiliationClassifier) -> Result<Self> {
        config.validate()?;

        // `Url::join` drops the last path segment unless it ends with '/'.
        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base = Url::parse(&base_url)
            .map_err(|e| PubmedError::Config(format!("Invalid base URL {}: {}", base_url, e)))?;

        let client = Client::builder()
            .user_agent(format!("{}/{}", TOOL_NAME, env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| PubmedError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            base,
            classifier,
        })
    }

    /// Search PubMed and return the matching PMIDs in ranking order.
    pub async fn search(&self, query: &str) -> Result<Vec<String>> {
        info!(query = query, max_results = self.config.max_results, "Searching PubMed");

        let retmax = self.config.max_results.to_string();
        let mut params = vec![
            ("db", "pubmed"),
            ("term", query),
            ("retmax", retmax.as_str()),
            ("retmode", "xml"),
        ];
        self.push_etiquette(&mut params);

        let body = self.get("esearch.fcgi", &params).await?;
        let root = XmlElement::parse(&body)?;
        let ids = parse_search_ids(&root);

        info!(count = ids.len(), "Found papers");
        Ok(ids)
    }

    /// Fetch and extract one batch of PMIDs.
    pub async fn fetch_batch(&self, ids: &[String]) -> Result<ExtractReport> {
        let joined = ids.join(",");
        let mut params = vec![("db", "pubmed"), ("id", joined.as_str()), ("retmode", "xml")];
        self.push_etiquette(&mut params);

        let body = self.get("efetch.fcgi", &params).await?;
        let root = XmlElement::parse(&body)?;
        Ok(extract_articles(&root, &self.classifier))
    }

    /// Fetch every PMID in batches, pausing between requests.
    ///
    /// Failed batches are logged and skipped.
    pub async fn fetch_details(&self, ids: &[String]) -> ExtractReport {
        fetch_in_batches(
            ids,
            self.config.batch_size,
            self.config.batch_delay,
            |chunk| async move { self.fetch_batch(&chunk).await },
        )
        .await
    }

    fn push_etiquette<'a>(&'a self, params: &mut Vec<(&'a str, &'a str)>) {
        params.push(("tool", TOOL_NAME));
        if let Some(email) = &self.config.email {
            params.push(("email", email.as_str()));
        }
        if let Some(key) = &self.config.api_key {
            params.push(("api_key", key.as_str()));
        }
    }

    async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String> {
        let url = self
            .base
            .join(endpoint)
            .map_err(|e| PubmedError::Config(format!("Invalid endpoint {}: {}", endpoint, e)))?;

        debug!(url = %url, "GET");
        let response = self.client.get(url).query(params).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(PubmedError::Api {
                code: status.as_u16(),
                message: format!("E-utilities {} returned {}", endpoint, status),
            });
        }

        Ok(response.text().await?)
    }
}

/// PMIDs listed in an esearch response, in order.
pub fn parse_search_ids(root: &XmlElement) -> Vec<String> {
    let list = root.find("IdList").unwrap_or(root);
    list.descendants("Id")
        .into_iter()
        .map(|id| id.text().trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}
