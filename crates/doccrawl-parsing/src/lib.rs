use thiserror::Error;

pub mod authors;
pub mod catalog;
pub mod extractor;
pub mod segment;
pub mod text;

pub use catalog::{
    CatalogEntry, Fallback, FallbackTrigger, Field, PatternCatalog, PatternCatalogBuilder,
};
pub use extractor::{Extraction, FieldExtractor, PageRange};
pub use segment::{IssueSegmenter, Span};
// Re-export domain types from core (canonical definitions live there)
pub use doccrawl_core::{Article, Author, Citation, Issue, Locale, number_citations};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("invalid {name} pattern: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// Extract an issue from document text with the built-in catalog.
///
/// Pipeline:
/// 1. Locate article markers and split the document into spans
/// 2. Read volume, number and year from the preamble (whole text as fallback)
/// 3. Extract titles, abstracts, keywords, authors, pages and citations per span
///
/// Returns `None` when the document contains no article markers.
pub fn extract_issue(document: &str) -> Option<Issue> {
    FieldExtractor::new().extract_issue(document)
}
