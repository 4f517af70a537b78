//! Affiliation classification.
//!
//! Decides whether a free-text affiliation names a pharmaceutical/biotech
//! organization, and whether an author should count as non-academic.
//! Matching is plain case-insensitive substring containment against a
//! [`ReferenceSet`]; there is no scoring and no fuzzy matching.

use crate::extract::Author;
use std::collections::HashSet;

/// Company names and generic industry terms matched against affiliations.
///
/// Generic entries such as "ltd." or "sa" produce false positives; that is an
/// accepted tradeoff of the heuristic.
pub const DEFAULT_COMPANY_KEYWORDS: &[&str] = &[
    "pfizer", "moderna", "johnson & johnson", "merck", "abbott", "roche",
    "novartis", "gsk", "glaxosmithkline", "sanofi", "bristol myers squibb",
    "astrazeneca", "eli lilly", "gilead", "amgen", "biogen", "regeneron",
    "vertex", "genentech", "takeda", "bayer", "boehringer ingelheim",
    "celgene", "abbvie", "illumina", "thermo fisher", "danaher",
    "agilent", "waters", "applied biosystems", "life technologies",
    "bio-rad", "qiagen", "promega", "new england biolabs", "neb",
    "invitrogen", "sigma-aldrich", "merck kgaa", "eppendorf",
    "beckman coulter", "bd", "becton dickinson", "medtronic",
    "stryker", "boston scientific", "edwards lifesciences",
    "intuitive surgical", "zimmer biomet", "smith & nephew",
    "pharmaceutical", "pharmaceuticals", "biotech", "biotechnology",
    "biopharmaceutical", "biopharmaceuticals", "drug development",
    "therapeutics", "pharma", "inc.", "corp.", "corporation",
    "company", "ltd.", "limited", "sa", "ag", "gmbh",
];

/// Terms that mark an affiliation string as academic.
pub const DEFAULT_ACADEMIC_TERMS: &[&str] = &[
    "university", "college", "school", "institute", "department", "center", "centre",
];

/// The keyword dataset a classifier matches against.
///
/// All terms are stored lowercased and trimmed; empty terms and duplicates are
/// dropped on insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSet {
    keywords: Vec<String>,
    academic_terms: Vec<String>,
}

impl ReferenceSet {
    pub fn new<K, A>(keywords: K, academic_terms: A) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        Self {
            keywords: normalize_terms(keywords),
            academic_terms: normalize_terms(academic_terms),
        }
    }

    /// Add keywords on top of the current set.
    pub fn extend_keywords<K>(&mut self, keywords: K)
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        let merged = self
            .keywords
            .drain(..)
            .chain(keywords.into_iter().map(|k| k.as_ref().to_string()))
            .collect::<Vec<_>>();
        self.keywords = normalize_terms(merged);
    }

    pub fn set_academic_terms<A>(&mut self, terms: A)
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        self.academic_terms = normalize_terms(terms);
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn academic_terms(&self) -> &[String] {
        &self.academic_terms
    }
}

impl Default for ReferenceSet {
    fn default() -> Self {
        Self::new(DEFAULT_COMPANY_KEYWORDS, DEFAULT_ACADEMIC_TERMS)
    }
}

fn normalize_terms<I>(terms: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut seen = HashSet::new();
    terms
        .into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

/// Classifies affiliation strings against an injected [`ReferenceSet`].
#[derive(Debug, Clone, Default)]
pub struct AffiliationClassifier {
    reference: ReferenceSet,
}

impl AffiliationClassifier {
    pub fn new(reference: ReferenceSet) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> &ReferenceSet {
        &self.reference
    }

    /// True if the affiliation contains any reference keyword.
    pub fn is_company_affiliation(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.contains_keyword(&lower)
    }

    /// True if at least one affiliation contains a keyword and, in that same
    /// string, none of the academic terms.
    ///
    /// The academic check is scoped to the individual affiliation string: a
    /// "Pfizer ... University" affiliation does not qualify, but a sibling
    /// "Pfizer Inc." affiliation of the same author still does.
    pub fn is_non_academic<S: AsRef<str>>(&self, affiliations: &[S]) -> bool {
        affiliations.iter().any(|affiliation| {
            let lower = affiliation.as_ref().to_lowercase();
            self.contains_keyword(&lower) && !self.contains_academic_term(&lower)
        })
    }

    /// Matching affiliations, trimmed and deduplicated by exact string,
    /// in first-seen order.
    pub fn company_affiliations<S: AsRef<str>>(&self, affiliations: &[S]) -> Vec<String> {
        let mut seen = HashSet::new();
        affiliations
            .iter()
            .map(|a| a.as_ref().trim())
            .filter(|a| self.is_company_affiliation(a))
            .filter(|a| seen.insert(a.to_string()))
            .map(str::to_string)
            .collect()
    }

    /// Names of authors with a qualifying non-academic affiliation, in
    /// author-list order.
    pub fn non_academic_authors(&self, authors: &[Author]) -> Vec<String> {
        authors
            .iter()
            .filter(|a| self.is_non_academic(&a.affiliations))
            .map(|a| a.name.clone())
            .collect()
    }

    fn contains_keyword(&self, lower: &str) -> bool {
        self.reference.keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    fn contains_academic_term(&self, lower: &str) -> bool {
        self.reference
            .academic_terms
            .iter()
            .any(|t| lower.contains(t.as_str()))
    }
}
