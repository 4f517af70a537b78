//! Reference-set configuration file.
//!
//! A TOML file can extend (or replace) the built-in company keywords and
//! override the academic exclusion terms:
//!
//! ```toml
//! replace_defaults = false
//! keywords = ["acme biologics", "contoso pharma"]
//! academic_terms = ["university", "hospital"]
//! ```

use crate::classifier::{ReferenceSet, DEFAULT_ACADEMIC_TERMS, DEFAULT_COMPANY_KEYWORDS};
use crate::error::{PubmedError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeywordFile {
    /// Use only `keywords` instead of adding them to the defaults
    #[serde(default)]
    pub replace_defaults: bool,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Replaces the default academic terms when present
    #[serde(default)]
    pub academic_terms: Option<Vec<String>>,
}

impl KeywordFile {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PubmedError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    /// Build the reference set this file describes.
    pub fn into_reference_set(self) -> Result<ReferenceSet> {
        let mut reference = if self.replace_defaults {
            ReferenceSet::new(self.keywords, DEFAULT_ACADEMIC_TERMS)
        } else {
            let mut reference = ReferenceSet::default();
            reference.extend_keywords(self.keywords);
            reference
        };

        if let Some(terms) = self.academic_terms {
            reference.set_academic_terms(terms);
        }

        if reference.keywords().is_empty() {
            return Err(PubmedError::Validation(
                "keyword file leaves the reference set empty".to_string(),
            ));
        }

        debug!(
            keywords = reference.keywords().len(),
            academic_terms = reference.academic_terms().len(),
            "Loaded reference set"
        );
        Ok(reference)
    }
}

/// The default reference set, or the one described by `path`.
pub fn load_reference_set(path: Option<&Path>) -> Result<ReferenceSet> {
    match path {
        Some(path) => KeywordFile::load(path)?.into_reference_set(),
        None => Ok(ReferenceSet::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_extend_defaults() {
        let file = KeywordFile::from_toml(r#"keywords = ["Acme Biologics"]"#).expect("toml");
        let reference = file.into_reference_set().expect("reference");

        assert_eq!(
            reference.keywords().len(),
            DEFAULT_COMPANY_KEYWORDS.len() + 1
        );
        assert!(reference.keywords().contains(&"acme biologics".to_string()));
        assert_eq!(reference.academic_terms().len(), DEFAULT_ACADEMIC_TERMS.len());
    }

    #[test]
    fn test_replace_defaults_and_academic_terms() {
        let file = KeywordFile::from_toml(
            r#"
replace_defaults = true
keywords = ["contoso"]
academic_terms = ["Hospital"]
"#,
        )
        .expect("toml");
        let reference = file.into_reference_set().expect("reference");

        assert_eq!(reference.keywords(), ["contoso"]);
        assert_eq!(reference.academic_terms(), ["hospital"]);
    }

    #[test]
    fn test_empty_replacement_is_rejected() {
        let file = KeywordFile::from_toml("replace_defaults = true").expect("toml");
        assert!(matches!(
            file.into_reference_set(),
            Err(PubmedError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(matches!(
            KeywordFile::from_toml("keywrods = []"),
            Err(PubmedError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, r#"keywords = ["initech"]"#).expect("write");

        let reference = load_reference_set(Some(file.path())).expect("reference");
        assert!(reference.keywords().contains(&"initech".to_string()));

        assert_eq!(load_reference_set(None).expect("default"), ReferenceSet::default());
    }
}
