//! Record extraction from PubMed efetch XML.
//!
//! Each `<PubmedArticle>` becomes a [`Record`]: identifier, title, date,
//! authors with their affiliations, a best-effort corresponding email, and the
//! classifier's verdicts. A record that cannot be extracted is reported in
//! [`ExtractReport::skipped`] and never aborts the rest of the batch.

use crate::classifier::AffiliationClassifier;
use crate::error::ExtractionError;
use crate::xml::{collect_text, XmlElement};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Date-bearing elements, tried in order.
const DATE_FIELDS: &[&str] = &["PubDate", "ArticleDate", "DateCompleted", "DateRevised"];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .unwrap_or_else(|_| Regex::new(r"[^\s\S]").expect("Empty regex"))
});

/// One author and the affiliations listed for them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Author {
    /// "Forename Lastname", or "Lastname" when no forename is given
    pub name: String,
    pub affiliations: Vec<String>,
}

/// A classified bibliographic record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    pub pmid: String,
    pub title: String,
    /// `Y[-M[-D]]`, or empty when no date was found
    pub publication_date: String,
    pub authors: Vec<Author>,
    /// Every affiliation across all authors, in document order
    pub all_affiliations: Vec<String>,
    pub company_affiliations: Vec<String>,
    pub non_academic_authors: Vec<String>,
    pub corresponding_email: String,
}

impl Record {
    /// Whether the record is worth reporting.
    pub fn is_flagged(&self) -> bool {
        !self.company_affiliations.is_empty() || !self.non_academic_authors.is_empty()
    }
}

/// A record that was dropped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Position of the `<PubmedArticle>` within its batch
    pub index: usize,
    pub reason: ExtractionError,
}

/// Outcome of extracting every article in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub records: Vec<Record>,
    pub skipped: Vec<SkippedRecord>,
}

impl ExtractReport {
    /// Append another report; indices of `other` are kept as-is.
    pub fn merge(&mut self, other: ExtractReport) {
        self.records.extend(other.records);
        self.skipped.extend(other.skipped);
    }
}

/// Extract every `<PubmedArticle>` under `root`.
pub fn extract_articles(root: &XmlElement, classifier: &AffiliationClassifier) -> ExtractReport {
    let mut report = ExtractReport::default();

    for (index, article) in root.descendants("PubmedArticle").into_iter().enumerate() {
        match extract_record(article, classifier) {
            Ok(record) => report.records.push(record),
            Err(reason) => {
                debug!(index = index, error = %reason, "Skipping article");
                report.skipped.push(SkippedRecord { index, reason });
            }
        }
    }

    report
}

/// Extract and classify a single `<PubmedArticle>`.
pub fn extract_record(
    article: &XmlElement,
    classifier: &AffiliationClassifier,
) -> Result<Record, ExtractionError> {
    if article.elements().next().is_none() {
        return Err(ExtractionError::EmptyArticle);
    }

    // An absent PMID is reported as an empty identifier, not dropped.
    let pmid = article
        .find("PMID")
        .map(|p| p.text().trim().to_string())
        .unwrap_or_default();

    let title = article
        .find("ArticleTitle")
        .map(collect_text)
        .unwrap_or_default();

    let publication_date = extract_publication_date(article);
    let (authors, all_affiliations) = extract_authors(article);

    let company_affiliations = classifier.company_affiliations(&all_affiliations);
    let non_academic_authors = classifier.non_academic_authors(&authors);
    let corresponding_email = extract_corresponding_email(article);

    Ok(Record {
        pmid,
        title,
        publication_date,
        authors,
        all_affiliations,
        company_affiliations,
        non_academic_authors,
        corresponding_email,
    })
}

/// First date field that has at least one component, as `Y[-M[-D]]`.
pub fn extract_publication_date(article: &XmlElement) -> String {
    DATE_FIELDS
        .iter()
        .filter_map(|field| article.find(field))
        .map(|date| {
            let component = |name: &str| date.child(name).map(|e| e.text().trim().to_string());
            join_date_parts(
                component("Year").as_deref(),
                component("Month").as_deref(),
                component("Day").as_deref(),
            )
        })
        .find(|joined| !joined.is_empty())
        .unwrap_or_default()
}

/// Join the present date components with `-`, in year, month, day order.
pub fn join_date_parts(year: Option<&str>, month: Option<&str>, day: Option<&str>) -> String {
    [year, month, day]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Authors with a last name, plus the flattened affiliation list.
fn extract_authors(article: &XmlElement) -> (Vec<Author>, Vec<String>) {
    let mut authors = Vec::new();
    let mut all_affiliations = Vec::new();

    let Some(author_list) = article.find("AuthorList") else {
        return (authors, all_affiliations);
    };

    for element in author_list.children_named("Author") {
        let last_name = element
            .child("LastName")
            .map(|e| e.text())
            .filter(|s| !s.is_empty());
        let Some(last_name) = last_name else {
            continue;
        };

        let name = match element.child("ForeName").map(|e| e.text()) {
            Some(fore_name) if !fore_name.is_empty() => format!("{} {}", fore_name, last_name),
            _ => last_name,
        };

        let affiliations: Vec<String> = element
            .descendants("Affiliation")
            .into_iter()
            .map(|a| a.text().trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();

        all_affiliations.extend(affiliations.iter().cloned());
        authors.push(Author { name, affiliations });
    }

    (authors, all_affiliations)
}

/// First email-shaped substring, looking at affiliation text before the
/// serialized author elements.
pub fn extract_corresponding_email(article: &XmlElement) -> String {
    let from_affiliations = article
        .descendants("Affiliation")
        .into_iter()
        .find_map(|a| first_email(&a.text()));

    from_affiliations
        .or_else(|| {
            article
                .descendants("Author")
                .into_iter()
                .find_map(|a| first_email(&a.to_xml_string()))
        })
        .unwrap_or_default()
}

fn first_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}
