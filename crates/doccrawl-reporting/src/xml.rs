use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use doccrawl_core::{Article, Author, Citation, Issue, Locale};

use crate::SerializeError;

/// Renders issues into the canonical `issues` document.
///
/// Element order is fixed. Text is entity-escaped, except `fulltext-file`,
/// which carries the PDF path verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlSerializer;

const INDENT: usize = 2;

impl XmlSerializer {
    pub fn new() -> Self {
        Self
    }

    pub fn serialize(&self, issues: &[Issue]) -> Result<Vec<u8>, SerializeError> {
        let mut buf = Vec::new();
        self.write_to(issues, &mut buf)?;
        Ok(buf)
    }

    pub fn write_to<W: Write>(&self, issues: &[Issue], out: W) -> Result<(), SerializeError> {
        let mut w = Writer::new_with_indent(out, b' ', INDENT);
        w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        container(&mut w, "issues", issues, write_issue)?;

        w.get_mut().write_all(b"\n")?;
        Ok(())
    }
}

fn write_issue<W: Write>(w: &mut Writer<W>, issue: &Issue) -> Result<(), SerializeError> {
    start(w, "issue")?;
    text_element(w, "volume", issue.volume.as_deref().unwrap_or(""))?;
    text_element(w, "year", issue.year.as_deref().unwrap_or(""))?;
    text_element(w, "number", issue.number.as_deref().unwrap_or(""))?;
    container(w, "articles", &issue.articles, write_article)?;
    end(w, "issue")
}

fn write_article<W: Write>(w: &mut Writer<W>, article: &Article) -> Result<(), SerializeError> {
    start(w, "article")?;
    raw_element(w, "fulltext-file", article.pdf_url.as_deref().unwrap_or(""))?;
    text_element(w, "firstpage", article.first_page.as_deref().unwrap_or(""))?;
    text_element(w, "lastpage", article.last_page.as_deref().unwrap_or(""))?;
    text_element(w, "primary-language", article.primary_language())?;

    let locales: Vec<Locale> = [Locale::Tr, Locale::En]
        .into_iter()
        .filter(|&l| article.title(l).is_some())
        .collect();
    container(w, "translations", &locales, |w, &locale| {
        write_translation(w, article, locale)
    })?;

    container(w, "authors", &article.authors, write_author)?;
    container(w, "citations", &article.citations, write_citation)?;
    end(w, "article")
}

fn write_translation<W: Write>(
    w: &mut Writer<W>,
    article: &Article,
    locale: Locale,
) -> Result<(), SerializeError> {
    start(w, "translation")?;
    text_element(w, "locale", locale.as_str())?;
    text_element(w, "title", article.title(locale).unwrap_or(""))?;
    text_element(w, "abstract", article.abstract_text(locale).unwrap_or(""))?;
    text_element(w, "keywords", article.keywords(locale).unwrap_or(""))?;
    end(w, "translation")
}

fn write_author<W: Write>(w: &mut Writer<W>, author: &Author) -> Result<(), SerializeError> {
    start(w, "author")?;
    text_element(w, "firstname", author.first_name.as_deref().unwrap_or(""))?;
    text_element(w, "lastname", author.last_name.as_deref().unwrap_or(""))?;
    end(w, "author")
}

fn write_citation<W: Write>(w: &mut Writer<W>, citation: &Citation) -> Result<(), SerializeError> {
    start(w, "citation")?;
    text_element(w, "row", &citation.row.to_string())?;
    text_element(w, "value", &citation.value)?;
    end(w, "citation")
}

/// Write `name` wrapping one child per item; self-closing when `items` is empty.
fn container<W, T, F>(
    w: &mut Writer<W>,
    name: &str,
    items: &[T],
    mut child: F,
) -> Result<(), SerializeError>
where
    W: Write,
    F: FnMut(&mut Writer<W>, &T) -> Result<(), SerializeError>,
{
    if items.is_empty() {
        w.write_event(Event::Empty(BytesStart::new(name)))?;
        return Ok(());
    }
    start(w, name)?;
    for item in items {
        child(w, item)?;
    }
    end(w, name)
}

fn start<W: Write>(w: &mut Writer<W>, name: &str) -> Result<(), SerializeError> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn end<W: Write>(w: &mut Writer<W>, name: &str) -> Result<(), SerializeError> {
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn text_element<W: Write>(w: &mut Writer<W>, name: &str, value: &str) -> Result<(), SerializeError> {
    start(w, name)?;
    w.write_event(Event::Text(BytesText::new(value)))?;
    end(w, name)
}

fn raw_element<W: Write>(w: &mut Writer<W>, name: &str, value: &str) -> Result<(), SerializeError> {
    start(w, name)?;
    w.write_event(Event::Text(BytesText::from_escaped(value)))?;
    end(w, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(issues: &[Issue]) -> String {
        String::from_utf8(XmlSerializer::new().serialize(issues).unwrap()).unwrap()
    }

    #[test]
    fn test_declaration_and_empty_root() {
        let out = render(&[]);
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(out.contains("<issues/>"));
    }

    #[test]
    fn test_issue_field_order() {
        let issue = Issue {
            volume: Some("12".into()),
            number: Some("3".into()),
            year: Some("2020".into()),
            articles: vec![],
        };
        let out = render(&[issue]);
        let v = out.find("<volume>12</volume>").unwrap();
        let y = out.find("<year>2020</year>").unwrap();
        let n = out.find("<number>3</number>").unwrap();
        let a = out.find("<articles/>").unwrap();
        assert!(v < y && y < n && n < a, "{out}");
    }

    #[test]
    fn test_text_escaped_path_raw() {
        let article = Article {
            title_en: Some("Fish & <Chips> \"quoted\" 'single'".into()),
            pdf_url: Some("PDFS/A&B/1.pdf".into()),
            ..Default::default()
        };
        let issue = Issue {
            articles: vec![article],
            ..Default::default()
        };
        let out = render(&[issue]);
        assert!(out.contains("<fulltext-file>PDFS/A&B/1.pdf</fulltext-file>"), "{out}");
        assert!(
            out.contains("<title>Fish &amp; &lt;Chips&gt; &quot;quoted&quot; &apos;single&apos;</title>"),
            "{out}"
        );
    }

    #[test]
    fn test_missing_values_are_empty_elements() {
        let issue = Issue {
            articles: vec![Article::default()],
            ..Default::default()
        };
        let out = render(&[issue]);
        assert!(out.contains("<volume></volume>"));
        assert!(out.contains("<fulltext-file></fulltext-file>"));
        assert!(out.contains("<firstpage></firstpage>"));
        assert!(out.contains("<primary-language></primary-language>"));
        assert!(out.contains("<translations/>"));
        assert!(out.contains("<authors/>"));
        assert!(out.contains("<citations/>"));
    }

    #[test]
    fn test_two_space_indent() {
        let issue = Issue::default();
        let out = render(&[issue]);
        assert!(out.contains("\n  <issue>"), "{out}");
        assert!(out.contains("\n    <volume>"), "{out}");
    }
}
