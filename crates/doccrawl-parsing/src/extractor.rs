use regex::Regex;

use crate::authors::split_authors;
use crate::catalog::{Field, PatternCatalog};
use crate::segment::IssueSegmenter;
use crate::text::clean_markup;
use crate::{Article, Author, Citation, Issue, Locale, number_citations};

/// Outcome of extracting one field from a span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Found(String),
    NotFound,
}

impl Extraction {
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Found(v) => Some(v),
            Self::NotFound => None,
        }
    }

    pub fn into_option(self) -> Option<String> {
        match self {
            Self::Found(v) => Some(v),
            Self::NotFound => None,
        }
    }
}

/// First and last page of an article. Always both or neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRange {
    pub first: String,
    pub last: String,
}

/// Applies a [`PatternCatalog`] to issue documents and article spans.
///
/// The default constructor builds the built-in catalog; use
/// [`FieldExtractor::with_catalog`] to inject a custom one.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    catalog: PatternCatalog,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self {
            catalog: PatternCatalog::default(),
        }
    }

    pub fn with_catalog(catalog: PatternCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    pub fn segmenter(&self) -> IssueSegmenter<'_> {
        IssueSegmenter::new(self.catalog.article_marker())
    }

    /// Extract a single text field.
    ///
    /// The primary pattern decides whether the field exists at all. When it
    /// matches and the entry has a fallback whose trigger fires on the cleaned
    /// match, the fallback is tried and its result preferred if non-empty.
    /// A match that cleans down to nothing is reported as `NotFound`.
    pub fn extract(&self, field: Field, locale: Locale, text: &str) -> Extraction {
        let Some(entry) = self.catalog.entry(field, locale) else {
            return Extraction::NotFound;
        };
        let Some(primary) = capture_value(&entry.primary, text) else {
            return Extraction::NotFound;
        };

        if let Some(fallback) = &entry.fallback {
            if fallback.trigger.fires(&primary) {
                tracing::trace!(?field, locale = locale.as_str(), primary = %primary, "primary match too thin, trying fallback");
                if let Some(value) =
                    capture_value(&fallback.pattern, text).filter(|v| !v.is_empty())
                {
                    return Extraction::Found(value);
                }
            }
        }

        if primary.is_empty() {
            Extraction::NotFound
        } else {
            Extraction::Found(primary)
        }
    }

    pub fn extract_pages(&self, text: &str) -> Option<PageRange> {
        let entry = self.catalog.entry(Field::Pages, Locale::None)?;
        let caps = entry.primary.captures(text)?;
        Some(PageRange {
            first: caps.name("first")?.as_str().to_string(),
            last: caps.name("last")?.as_str().to_string(),
        })
    }

    pub fn extract_authors(&self, text: &str) -> Vec<Author> {
        self.extract(Field::Authors, Locale::None, text)
            .as_deref()
            .map(split_authors)
            .unwrap_or_default()
    }

    /// Two-stage citation extraction.
    ///
    /// The catalog's citations pattern locates the region; the fragment
    /// pattern then pulls every inline text run out of it. The first fragment
    /// is the heading and is dropped. Regions without inline runs (plain text)
    /// are split into lines instead.
    pub fn extract_citations(&self, text: &str) -> Vec<Citation> {
        let Some(entry) = self.catalog.entry(Field::Citations, Locale::None) else {
            return Vec::new();
        };
        let Some(region) = entry.primary.find(text) else {
            return Vec::new();
        };
        let region = region.as_str();

        let fragments: Vec<String> = self
            .catalog
            .citation_fragment()
            .captures_iter(region)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
            .map(|m| clean_markup(m.as_str()))
            .collect();

        if fragments.is_empty() {
            number_citations(region.lines().skip(1).map(clean_markup))
        } else {
            number_citations(fragments.into_iter().skip(1))
        }
    }

    /// Extract every article field from one span. An empty span yields an
    /// article with all fields absent.
    pub fn extract_article(&self, span: &str) -> Article {
        let text = |field, locale| self.extract(field, locale, span).into_option();
        let pages = self.extract_pages(span);

        Article {
            title_tr: text(Field::Title, Locale::Tr),
            title_en: text(Field::Title, Locale::En),
            abstract_tr: text(Field::Abstract, Locale::Tr),
            abstract_en: text(Field::Abstract, Locale::En),
            keywords_tr: text(Field::Keywords, Locale::Tr),
            keywords_en: text(Field::Keywords, Locale::En),
            first_page: pages.as_ref().map(|p| p.first.clone()),
            last_page: pages.map(|p| p.last),
            pdf_url: None,
            authors: self.extract_authors(span),
            citations: self.extract_citations(span),
        }
    }

    /// Volume, number and year of the issue, searched in the preamble first
    /// and then in the whole document. Outside the preamble only the tag form
    /// (`<number>3</number>`) counts, so article text such as `Sayfa No: 12`
    /// never sets an issue field. The returned issue has no articles.
    pub fn extract_issue_header(&self, document: &str) -> Issue {
        let preamble = self.segmenter().preamble(document);
        let lookup = |field| {
            self.extract(field, Locale::None, preamble)
                .into_option()
                .or_else(|| {
                    let tag = self.catalog.header_tag(field)?;
                    capture_value(tag, document).filter(|v| !v.is_empty())
                })
        };

        Issue {
            volume: lookup(Field::Volume),
            number: lookup(Field::Number),
            year: lookup(Field::Year),
            articles: Vec::new(),
        }
    }

    /// Segment a document and extract its issue header and every article.
    ///
    /// Returns `None` when the document has no article markers.
    pub fn extract_issue(&self, document: &str) -> Option<Issue> {
        let spans = self.segmenter().spans(document);
        if spans.is_empty() {
            return None;
        }
        tracing::debug!(spans = spans.len(), "segmented document");

        let mut issue = self.extract_issue_header(document);
        issue.articles = spans
            .iter()
            .map(|span| self.extract_article(span.text(document)))
            .collect();
        Some(issue)
    }
}

/// Cleaned `value` capture (or group 1, or the whole match).
fn capture_value(re: &Regex, text: &str) -> Option<String> {
    let caps = re.captures(text)?;
    let m = caps
        .name("value")
        .or_else(|| caps.get(1))
        .or_else(|| caps.get(0))?;
    Some(clean_markup(m.as_str()))
}
