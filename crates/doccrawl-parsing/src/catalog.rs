use regex::Regex;

use doccrawl_core::{DEFAULT_FALLBACK_MAX_WORDS, Locale};

use crate::CatalogError;
use crate::text::word_count;

/// Logical field a catalog entry extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Volume,
    Number,
    Year,
    Title,
    Abstract,
    Keywords,
    Authors,
    Pages,
    Citations,
}

/// Condition under which a primary match is re-tried with the fallback pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackTrigger {
    /// Fire when the cleaned primary match has at most this many words.
    MaxWords(usize),
}

impl FallbackTrigger {
    pub fn fires(&self, matched: &str) -> bool {
        match self {
            Self::MaxWords(max) => word_count(matched) <= *max,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Fallback {
    pub pattern: Regex,
    pub trigger: FallbackTrigger,
}

/// One field's primary pattern, optional fallback, and locale.
///
/// Patterns capture the field content in a group named `value` (or group 1).
/// The page-range entry uses `first` and `last` instead.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub field: Field,
    pub locale: Locale,
    pub primary: Regex,
    pub fallback: Option<Fallback>,
}

/// Immutable set of extraction patterns, built once and handed to the extractor.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    entries: Vec<CatalogEntry>,
    article_marker: Regex,
    citation_fragment: Regex,
    header_tags: Vec<(Field, Regex)>,
}

impl Default for PatternCatalog {
    fn default() -> Self {
        PatternCatalogBuilder::new()
            .build()
            .expect("built-in catalog patterns compile")
    }
}

impl PatternCatalog {
    pub fn entry(&self, field: Field, locale: Locale) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.field == field && e.locale == locale)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Article boundary marker (`Makale 3`, `Article 3`).
    pub fn article_marker(&self) -> &Regex {
        &self.article_marker
    }

    /// Inline text fragment inside a citations region.
    pub fn citation_fragment(&self) -> &Regex {
        &self.citation_fragment
    }

    /// Tag-only form of an issue-level field (`<volume>5</volume>`), the
    /// only form accepted outside the preamble.
    pub fn header_tag(&self, field: Field) -> Option<&Regex> {
        self.header_tags
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, re)| re)
    }
}

// ── Built-in patterns ──────────────────────────────────────────────────

/// Markup tags and whitespace that may sit between a heading and its content.
const FILLER: &str = r"(?:<[^>]*>|\s)*";

const SUBLABEL_TR: &str = r"[(\[]\s*(?:TR|T[üu]rk[çc]e|Turkish)\s*[)\]]";
const SUBLABEL_EN: &str = r"[(\[]\s*(?:EN|[İI]ngilizce|English)\s*[)\]]";
const SUBLABEL_ANY: &str = r"[(\[][^)\]<]{1,20}[)\]]";

const TITLE_HEADINGS: &str = r"Makale\s+Ba[şs]l[ıi][ğg][ıi]|Ba[şs]l[ıi]k|Title";
const ABSTRACT_HEADINGS: &str = r"[ÖO]zet|[ÖO]z|Abstract";
const KEYWORDS_HEADINGS: &str =
    r"Anahtar\s+Kelimeler|Anahtar\s+S[öo]zc[üu]kler|Keywords|Key\s+Words";
const AUTHORS_HEADINGS: &str = r"Yazarlar|Yazar\(lar\)|Yazar|Authors|Author";
const PAGES_HEADINGS: &str = r"Sayfa\s+Numaralar[ıi]|Sayfa\s+Numaras[ıi]|Sayfa\s+No|Sayfalar|Page\s+Numbers?|Pages?";
const CITATION_HEADINGS: &str = r"Kaynak[çc]a|Kaynaklar|References|Bibliography";

const ABSTRACT_TR_HEADINGS: &str = r"[ÖO]zet|[ÖO]z";
const ABSTRACT_EN_HEADINGS: &str = r"Abstract";

/// Capitalised label at the start of a line or text run. Lower-case prose
/// (`bu makale 3 bölümden`) is not a boundary.
const DEFAULT_ARTICLE_MARKER: &str =
    r"(?m)(?:^|>)[ \t]*(?P<marker>(?:Makale|Article)[ \t]+(?P<number>[0-9]+))\b";
const DEFAULT_CITATION_FRAGMENT: &str = r"(?s)<(?:w:)?t(?:\s[^>]*)?>(.*?)</(?:w:)?t>";

/// End of a free-text field: the next labelled heading, an article marker,
/// a citations heading on its own run/line, or end of span.
fn terminator() -> String {
    let headings = [
        TITLE_HEADINGS,
        ABSTRACT_HEADINGS,
        KEYWORDS_HEADINGS,
        AUTHORS_HEADINGS,
        PAGES_HEADINGS,
    ]
    .join("|");
    format!(
        r"(?:{FILLER}\b(?:{headings}){FILLER}(?:{SUBLABEL_ANY}{FILLER})?:|{FILLER}(?:(?m:^)|<[^>]*>)[ \t]*(?-i:(?:Makale|Article)[ \t]+[0-9]+\b)|{FILLER}\b(?:{CITATION_HEADINGS})[ \t]*:?[ \t]*(?:<|\r?\n)|\z)"
    )
}

/// Heading + locale sub-label + content, e.g. `Öz (TR): ...`.
fn labelled(headings: &str, sublabel: &str) -> String {
    format!(
        r"(?is)\b(?:{headings}){FILLER}{sublabel}{FILLER}:?{FILLER}(?P<value>.*?){}",
        terminator()
    )
}

/// Heading directly followed by content, e.g. `Özet: ...`.
fn direct(headings: &str) -> String {
    format!(
        r"(?is)\b(?:{headings}){FILLER}:{FILLER}(?P<value>.*?){}",
        terminator()
    )
}

fn issue_number(tag: &str, labels: &str, digits: &str) -> String {
    format!(r"(?i)(?:<{tag}>{FILLER}|\b(?:{labels})[ \t]*:?[ \t]*)(?P<value>{digits})")
}

fn issue_tag(tag: &str, digits: &str) -> String {
    format!(r"(?i)<{tag}>{FILLER}(?P<value>{digits})")
}

const VOLUME_DIGITS: &str = "[0-9]+";
const NUMBER_DIGITS: &str = "[0-9]+";
const YEAR_DIGITS: &str = "(?:19|20)[0-9]{2}";

/// Pattern strings for one entry, compiled in [`PatternCatalogBuilder::build`].
#[derive(Debug, Clone)]
struct EntryDef {
    field: Field,
    locale: Locale,
    primary: String,
    fallback: Option<String>,
}

fn def(field: Field, locale: Locale, primary: String, fallback: Option<String>) -> EntryDef {
    EntryDef {
        field,
        locale,
        primary,
        fallback,
    }
}

fn default_defs() -> Vec<EntryDef> {
    let authors = format!(
        r"(?is)\b(?:{AUTHORS_HEADINGS}){FILLER}(?:{SUBLABEL_ANY}{FILLER})?:{FILLER}(?P<value>.*?){}",
        terminator()
    );
    let pages = format!(
        r"(?is)\b(?:{PAGES_HEADINGS}){FILLER}(?:{SUBLABEL_ANY}{FILLER})?:?{FILLER}(?P<first>[0-9]+){FILLER}[-–—]{FILLER}(?P<last>[0-9]+)"
    );
    // Markup form: heading run followed by paragraph blocks. Plain-text form:
    // heading alone on a line followed by the rest of the span.
    let citations = format!(
        r"(?is)<(?:w:)?t(?:\s[^>]*)?>\s*(?:{CITATION_HEADINGS})[^<]*</(?:w:)?t>(?:.*?</(?:w:)?p>)+|(?m:^)[ \t]*(?:{CITATION_HEADINGS})[ \t]*:?[ \t]*\r?\n.*"
    );

    vec![
        def(
            Field::Volume,
            Locale::None,
            issue_number("volume", r"Cilt|Volume|Vol\.?", VOLUME_DIGITS),
            None,
        ),
        def(
            Field::Number,
            Locale::None,
            issue_number("number", r"Say[ıi]|Number|Issue|No\.?", NUMBER_DIGITS),
            None,
        ),
        def(
            Field::Year,
            Locale::None,
            issue_number("year", r"Y[ıi]l|Year", YEAR_DIGITS),
            None,
        ),
        def(
            Field::Title,
            Locale::Tr,
            labelled(TITLE_HEADINGS, SUBLABEL_TR),
            None,
        ),
        def(
            Field::Title,
            Locale::En,
            labelled(TITLE_HEADINGS, SUBLABEL_EN),
            None,
        ),
        def(
            Field::Abstract,
            Locale::Tr,
            labelled(ABSTRACT_HEADINGS, SUBLABEL_TR),
            Some(direct(ABSTRACT_TR_HEADINGS)),
        ),
        def(
            Field::Abstract,
            Locale::En,
            labelled(ABSTRACT_HEADINGS, SUBLABEL_EN),
            Some(direct(ABSTRACT_EN_HEADINGS)),
        ),
        def(
            Field::Keywords,
            Locale::Tr,
            labelled(KEYWORDS_HEADINGS, SUBLABEL_TR),
            None,
        ),
        def(
            Field::Keywords,
            Locale::En,
            labelled(KEYWORDS_HEADINGS, SUBLABEL_EN),
            None,
        ),
        def(Field::Authors, Locale::None, authors, None),
        def(Field::Pages, Locale::None, pages, None),
        def(Field::Citations, Locale::None, citations, None),
    ]
}

// ── Builder ────────────────────────────────────────────────────────────

/// Builder for [`PatternCatalog`].
///
/// Starts from the built-in entries; overrides replace an entry's primary or
/// fallback pattern (or add a new entry). Patterns are compiled in
/// [`build()`](Self::build), which fails on the first pattern that does not compile.
#[derive(Debug, Clone, Default)]
pub struct PatternCatalogBuilder {
    primary_overrides: Vec<(Field, Locale, String)>,
    fallback_overrides: Vec<(Field, Locale, Option<String>)>,
    article_marker: Option<String>,
    fallback_max_words: Option<usize>,
}

impl PatternCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary_regex(mut self, field: Field, locale: Locale, pattern: &str) -> Self {
        self.primary_overrides
            .push((field, locale, pattern.to_string()));
        self
    }

    pub fn fallback_regex(mut self, field: Field, locale: Locale, pattern: &str) -> Self {
        self.fallback_overrides
            .push((field, locale, Some(pattern.to_string())));
        self
    }

    pub fn without_fallback(mut self, field: Field, locale: Locale) -> Self {
        self.fallback_overrides.push((field, locale, None));
        self
    }

    pub fn article_marker_regex(mut self, pattern: &str) -> Self {
        self.article_marker = Some(pattern.to_string());
        self
    }

    /// Word count at or below which a primary match triggers the fallback.
    pub fn fallback_max_words(mut self, n: usize) -> Self {
        self.fallback_max_words = Some(n);
        self
    }

    pub fn build(self) -> Result<PatternCatalog, CatalogError> {
        let mut defs = default_defs();

        for (field, locale, pattern) in self.primary_overrides {
            match defs
                .iter_mut()
                .find(|d| d.field == field && d.locale == locale)
            {
                Some(s) => s.primary = pattern,
                None => defs.push(def(field, locale, pattern, None)),
            }
        }
        for (field, locale, pattern) in self.fallback_overrides {
            if let Some(s) = defs
                .iter_mut()
                .find(|d| d.field == field && d.locale == locale)
            {
                s.fallback = pattern;
            }
        }

        let trigger = FallbackTrigger::MaxWords(
            self.fallback_max_words
                .unwrap_or(DEFAULT_FALLBACK_MAX_WORDS),
        );

        let entries = defs
            .into_iter()
            .map(|s| {
                let name = format!("{:?}/{}", s.field, s.locale.as_str());
                Ok(CatalogEntry {
                    field: s.field,
                    locale: s.locale,
                    primary: compile(&name, &s.primary)?,
                    fallback: s
                        .fallback
                        .map(|p| compile(&format!("{name} fallback"), &p))
                        .transpose()?
                        .map(|pattern| Fallback { pattern, trigger }),
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Ok(PatternCatalog {
            entries,
            article_marker: compile(
                "article marker",
                self.article_marker
                    .as_deref()
                    .unwrap_or(DEFAULT_ARTICLE_MARKER),
            )?,
            citation_fragment: compile("citation fragment", DEFAULT_CITATION_FRAGMENT)?,
            header_tags: vec![
                (Field::Volume, compile("volume tag", &issue_tag("volume", VOLUME_DIGITS))?),
                (Field::Number, compile("number tag", &issue_tag("number", NUMBER_DIGITS))?),
                (Field::Year, compile("year tag", &issue_tag("year", YEAR_DIGITS))?),
            ],
        })
    }
}

fn compile(name: &str, pattern: &str) -> Result<Regex, CatalogError> {
    Regex::new(pattern).map_err(|source| CatalogError::InvalidPattern {
        name: name.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_builds() {
        let catalog = PatternCatalog::default();
        for (field, locale) in [
            (Field::Volume, Locale::None),
            (Field::Number, Locale::None),
            (Field::Year, Locale::None),
            (Field::Title, Locale::Tr),
            (Field::Title, Locale::En),
            (Field::Abstract, Locale::Tr),
            (Field::Abstract, Locale::En),
            (Field::Keywords, Locale::Tr),
            (Field::Keywords, Locale::En),
            (Field::Authors, Locale::None),
            (Field::Pages, Locale::None),
            (Field::Citations, Locale::None),
        ] {
            assert!(
                catalog.entry(field, locale).is_some(),
                "missing entry {:?}/{:?}",
                field,
                locale
            );
        }
    }

    #[test]
    fn test_only_abstracts_have_fallbacks() {
        let catalog = PatternCatalog::default();
        for entry in catalog.entries() {
            assert_eq!(
                entry.fallback.is_some(),
                entry.field == Field::Abstract,
                "{:?}/{:?}",
                entry.field,
                entry.locale
            );
        }
    }

    #[test]
    fn test_trigger_threshold() {
        let t = FallbackTrigger::MaxWords(5);
        assert!(t.fires("Not provided"));
        assert!(t.fires("one two three four five"));
        assert!(!t.fires("one two three four five six"));
        assert!(t.fires(""));
    }

    #[test]
    fn test_builder_fallback_max_words() {
        let catalog = PatternCatalogBuilder::new()
            .fallback_max_words(2)
            .build()
            .unwrap();
        let entry = catalog.entry(Field::Abstract, Locale::Tr).unwrap();
        assert_eq!(
            entry.fallback.as_ref().unwrap().trigger,
            FallbackTrigger::MaxWords(2)
        );
    }

    #[test]
    fn test_builder_replaces_primary() {
        let catalog = PatternCatalogBuilder::new()
            .primary_regex(Field::Title, Locale::En, r"(?i)Heading:\s*(?P<value>.+)")
            .build()
            .unwrap();
        let entry = catalog.entry(Field::Title, Locale::En).unwrap();
        assert!(entry.primary.is_match("Heading: Something"));
        assert_eq!(
            catalog
                .entries()
                .iter()
                .filter(|e| e.field == Field::Title)
                .count(),
            2
        );
    }

    #[test]
    fn test_builder_without_fallback() {
        let catalog = PatternCatalogBuilder::new()
            .without_fallback(Field::Abstract, Locale::En)
            .build()
            .unwrap();
        assert!(
            catalog
                .entry(Field::Abstract, Locale::En)
                .unwrap()
                .fallback
                .is_none()
        );
        assert!(
            catalog
                .entry(Field::Abstract, Locale::Tr)
                .unwrap()
                .fallback
                .is_some()
        );
    }

    #[test]
    fn test_builder_invalid_regex() {
        let result = PatternCatalogBuilder::new()
            .article_marker_regex(r"[invalid")
            .build();
        match result {
            Err(CatalogError::InvalidPattern { name, .. }) => assert_eq!(name, "article marker"),
            Ok(_) => panic!("invalid pattern must not build"),
        }
    }

    #[test]
    fn test_article_marker_default() {
        let catalog = PatternCatalog::default();
        let marker = catalog.article_marker();
        assert!(marker.is_match("Makale 3"));
        assert!(marker.is_match("Cilt 1\n  Article 12\n"));
        assert!(marker.is_match("<w:t xml:space=\"preserve\">Makale 2</w:t>"));
        assert!(!marker.is_match("Makale Başlığı"));
        assert!(!marker.is_match("ARTICLE 12"));
        assert!(!marker.is_match("Bu makale 3 bölümden oluşmaktadır."));
        assert!(!marker.is_match("as shown in Article 3 above"));
    }

    #[test]
    fn test_article_marker_groups() {
        let catalog = PatternCatalog::default();
        let caps = catalog.article_marker().captures("x</w:t><w:t>Makale 7</w:t>").unwrap();
        assert_eq!(&caps["marker"], "Makale 7");
        assert_eq!(&caps["number"], "7");
    }

    #[test]
    fn test_header_tags_ignore_labels() {
        let catalog = PatternCatalog::default();
        let number = catalog.header_tag(Field::Number).unwrap();
        assert!(number.is_match("<number>4</number>"));
        assert!(!number.is_match("Sayfa No: 12-25"));
        assert!(!catalog.header_tag(Field::Volume).unwrap().is_match("Volume 3 of the atlas"));
        assert!(catalog.header_tag(Field::Title).is_none());
    }
}
