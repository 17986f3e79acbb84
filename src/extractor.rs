use scraper::{Html, Selector};

use crate::error::{LookupError, Result};

/// Fields read off one lookup page. Missing elements come back as empty
/// strings rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub expiry_date: String,
    pub insurance_company: String,
}

/// Positional extractor: the first element matching the selector holds the
/// policy expiry date, the second holds the insurer name.
pub struct Extractor {
    field_selector: Selector,
}

impl Extractor {
    pub fn new(selector: &str) -> Result<Self> {
        let field_selector = Selector::parse(selector)
            .map_err(|e| LookupError::Config(format!("field selector '{}': {}", selector, e)))?;
        Ok(Extractor { field_selector })
    }

    pub fn extract(&self, markup: &str) -> ExtractedFields {
        let document = Html::parse_document(markup);
        let mut matches = document
            .select(&self.field_selector)
            .map(|element| element.text().collect::<String>());

        ExtractedFields {
            expiry_date: matches.next().unwrap_or_default(),
            insurance_company: matches.next().unwrap_or_default(),
        }
    }
}
