//! HTML extraction collaborator.
//!
//! Turns a page body into the structured fields the probes record. Parsing
//! happens synchronously and the parsed document never outlives the call.

use crate::error::ExtractError;
use scraper::{ElementRef, Html, Selector};

/// On-page fields pulled from a landing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageAttributes {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub h1_count: usize,
    pub h2_count: usize,
    pub image_count: usize,
    pub missing_alt_count: usize,
}

/// Extracts page attributes and search-result entries from HTML.
pub trait Extractor: Send + Sync {
    /// Missing elements come back as `None` / zero, never as an error.
    fn page_attributes(&self, html: &str) -> Result<PageAttributes, ExtractError>;

    /// Result-listing entries in rendered order, as opaque text blocks.
    /// A page without entries yields an empty list.
    fn result_entries(&self, html: &str) -> Result<Vec<String>, ExtractError>;
}

/// `scraper`-based extractor. Result entries are located with a
/// configurable CSS selector since search markup changes over time.
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    result_selector: String,
}

impl HtmlExtractor {
    pub fn new(result_selector: &str) -> Result<Self, ExtractError> {
        parse_selector(result_selector)?;
        Ok(Self {
            result_selector: result_selector.to_string(),
        })
    }
}

impl Extractor for HtmlExtractor {
    fn page_attributes(&self, html: &str) -> Result<PageAttributes, ExtractError> {
        let document = Html::parse_document(html);

        let title = document
            .select(&parse_selector("title")?)
            .next()
            .and_then(|el| non_empty(el.text().collect::<String>()));

        let meta_description = document
            .select(&parse_selector(r#"meta[name="description"]"#)?)
            .next()
            .and_then(|el| el.value().attr("content"))
            .and_then(|content| non_empty(content.to_string()));

        let images: Vec<ElementRef<'_>> = document.select(&parse_selector("img")?).collect();
        let missing_alt_count = images
            .iter()
            .filter(|img| img.value().attr("alt").map_or(true, str::is_empty))
            .count();

        Ok(PageAttributes {
            title,
            meta_description,
            h1_count: document.select(&parse_selector("h1")?).count(),
            h2_count: document.select(&parse_selector("h2")?).count(),
            image_count: images.len(),
            missing_alt_count,
        })
    }

    fn result_entries(&self, html: &str) -> Result<Vec<String>, ExtractError> {
        let selector = parse_selector(&self.result_selector)?;
        let document = Html::parse_document(html);

        Ok(document.select(&selector).map(|el| el.html()).collect())
    }
}

fn parse_selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
