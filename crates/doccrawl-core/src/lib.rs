use std::path::PathBuf;

pub mod config_file;

/// Locale tag attached to bilingual fields and catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    Tr,
    En,
    /// Field is language-independent (volume, page range, citations, ...).
    None,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tr => "tr",
            Self::En => "en",
            Self::None => "",
        }
    }
}

/// An author as written in the article header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// One entry of an article's citation list. `row` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub row: usize,
    pub value: String,
}

/// Number citation fragments in encounter order.
///
/// Fragments are trimmed and empty ones dropped before numbering, so the
/// resulting rows are always `1..=N` with no gaps.
pub fn number_citations<I, S>(fragments: I) -> Vec<Citation>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fragments
        .into_iter()
        .filter_map(|f| {
            let trimmed = f.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .enumerate()
        .map(|(i, value)| Citation { row: i + 1, value })
        .collect()
}

/// Bibliographic record for one article of an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Article {
    pub title_tr: Option<String>,
    pub title_en: Option<String>,
    pub abstract_tr: Option<String>,
    pub abstract_en: Option<String>,
    pub keywords_tr: Option<String>,
    pub keywords_en: Option<String>,
    pub first_page: Option<String>,
    pub last_page: Option<String>,
    /// Assigned by the PDF resolver after extraction.
    pub pdf_url: Option<String>,
    pub authors: Vec<Author>,
    pub citations: Vec<Citation>,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|v| !v.is_empty())
}

impl Article {
    /// Locale whose title is authoritative for this article.
    ///
    /// A Turkish title always wins, even when an English one exists too.
    /// Returns `""` when neither title is present.
    pub fn primary_language(&self) -> &'static str {
        if non_empty(&self.title_tr).is_some() {
            Locale::Tr.as_str()
        } else if non_empty(&self.title_en).is_some() {
            Locale::En.as_str()
        } else {
            ""
        }
    }

    /// Non-empty title for `locale`, if any.
    pub fn title(&self, locale: Locale) -> Option<&str> {
        match locale {
            Locale::Tr => non_empty(&self.title_tr),
            Locale::En => non_empty(&self.title_en),
            Locale::None => None,
        }
    }

    pub fn abstract_text(&self, locale: Locale) -> Option<&str> {
        match locale {
            Locale::Tr => self.abstract_tr.as_deref(),
            Locale::En => self.abstract_en.as_deref(),
            Locale::None => None,
        }
    }

    pub fn keywords(&self, locale: Locale) -> Option<&str> {
        match locale {
            Locale::Tr => self.keywords_tr.as_deref(),
            Locale::En => self.keywords_en.as_deref(),
            Locale::None => None,
        }
    }

    /// Title used in progress output: English first, then Turkish.
    pub fn display_title(&self) -> &str {
        self.title(Locale::En)
            .or_else(|| self.title(Locale::Tr))
            .unwrap_or("(untitled)")
    }
}

/// One journal issue, sourced from a single markup document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Issue {
    pub volume: Option<String>,
    pub number: Option<String>,
    pub year: Option<String>,
    /// Document order.
    pub articles: Vec<Article>,
}

/// Runtime configuration for a crawl run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root holding one subdirectory of markup documents per category.
    pub documents_dir: PathBuf,
    /// Root holding one subdirectory of volume/number folders per category.
    pub pdfs_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Append-only log of PDF directories that could not be found.
    pub missing_pdf_log: PathBuf,
    pub category_workers: usize,
    pub document_workers: usize,
    /// Restrict the run to these category names. Empty means all.
    pub categories: Vec<String>,
    /// Word count at or below which an abstract match is considered too thin.
    pub fallback_max_words: usize,
}

pub const DEFAULT_FALLBACK_MAX_WORDS: usize = 5;

impl Default for Config {
    fn default() -> Self {
        let document_workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            documents_dir: PathBuf::from("Resources/Documents"),
            pdfs_dir: PathBuf::from("Resources/PDFS"),
            output_dir: PathBuf::from("output"),
            missing_pdf_log: PathBuf::from("output/missing_pdfs.log"),
            category_workers: 2,
            document_workers,
            categories: Vec::new(),
            fallback_max_words: DEFAULT_FALLBACK_MAX_WORDS,
        }
    }
}

impl Config {
    /// Output path for a category: `{output_dir}/{category}_output.xml`.
    pub fn output_path(&self, category: &str) -> PathBuf {
        self.output_dir.join(format!("{category}_output.xml"))
    }

    /// Whether `category` is selected by the category filter.
    pub fn includes_category(&self, category: &str) -> bool {
        self.categories.is_empty() || self.categories.iter().any(|c| c == category)
    }
}

/// Progress events emitted during a crawl.
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    CategoryStarted {
        category: String,
        documents: usize,
    },
    DocumentProcessed {
        category: String,
        document: PathBuf,
        articles: usize,
        pdfs: usize,
    },
    DocumentSkipped {
        category: String,
        document: PathBuf,
        reason: String,
    },
    CategoryFinished {
        report: CategoryReport,
    },
}

/// Outcome of processing one category.
#[derive(Debug, Clone, Default)]
pub struct CategoryReport {
    pub category: String,
    pub documents: usize,
    pub issues: usize,
    pub articles: usize,
    /// Articles left without a PDF after positional mapping.
    pub articles_without_pdf: usize,
    /// Issues whose PDF directory (or category PDF root) was missing.
    pub missing_pdf_dirs: usize,
    pub skipped_documents: Vec<SkippedDocument>,
    /// Written output file, `None` when nothing was produced or writing failed.
    pub output: Option<PathBuf>,
    /// Category-level failure (output could not be written, listing failed, ...).
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

/// Summary of a complete crawl run, categories in name order.
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    pub categories: Vec<CategoryReport>,
}

impl CrawlSummary {
    pub fn outputs(&self) -> impl Iterator<Item = &PathBuf> {
        self.categories.iter().filter_map(|c| c.output.as_ref())
    }

    pub fn failed(&self) -> impl Iterator<Item = &CategoryReport> {
        self.categories.iter().filter(|c| c.error.is_some())
    }

    pub fn total_articles(&self) -> usize {
        self.categories.iter().map(|c| c.articles).sum()
    }
}
