//! Output file behavior of [`export_issues`] and translation layout.

use doccrawl_core::{Article, Author, Citation, Issue};
use doccrawl_reporting::{SerializeError, XmlSerializer, export_issues};

fn render(issues: &[Issue]) -> String {
    String::from_utf8(XmlSerializer::new().serialize(issues).unwrap()).unwrap()
}

fn issue_with(article: Article) -> Issue {
    Issue {
        volume: Some("5".into()),
        number: Some("1".into()),
        year: Some("2018".into()),
        articles: vec![article],
    }
}

#[test]
fn turkish_only_article_has_one_translation() {
    let out = render(&[issue_with(Article {
        title_tr: Some("Başlık".into()),
        abstract_tr: Some("Özet metni".into()),
        ..Default::default()
    })]);
    assert_eq!(out.matches("<translation>").count(), 1, "{out}");
    assert!(out.contains("<locale>tr</locale>"));
    assert!(!out.contains("<locale>en</locale>"));
    assert!(out.contains("<primary-language>tr</primary-language>"));
    assert!(out.contains("<keywords></keywords>"), "absent keywords render empty");
}

#[test]
fn bilingual_article_lists_turkish_first() {
    let out = render(&[issue_with(Article {
        title_tr: Some("Başlık".into()),
        title_en: Some("Title".into()),
        ..Default::default()
    })]);
    assert_eq!(out.matches("<translation>").count(), 2, "{out}");
    let tr = out.find("<locale>tr</locale>").unwrap();
    let en = out.find("<locale>en</locale>").unwrap();
    assert!(tr < en);
    assert!(out.contains("<primary-language>tr</primary-language>"));
}

#[test]
fn empty_title_omits_translation() {
    let out = render(&[issue_with(Article {
        title_tr: Some(String::new()),
        title_en: Some("Title".into()),
        abstract_tr: Some("orphan abstract".into()),
        ..Default::default()
    })]);
    assert_eq!(out.matches("<translation>").count(), 1, "{out}");
    assert!(!out.contains("orphan abstract"));
    assert!(out.contains("<primary-language>en</primary-language>"));
}

#[test]
fn article_element_order() {
    let out = render(&[issue_with(Article {
        title_en: Some("Title".into()),
        first_page: Some("3".into()),
        last_page: Some("9".into()),
        pdf_url: Some("PDFS/Aquatic/Cilt 5 Sayı 1/a.pdf".into()),
        authors: vec![Author {
            first_name: None,
            last_name: Some("Plato".into()),
        }],
        citations: vec![Citation {
            row: 1,
            value: "Ref".into(),
        }],
        ..Default::default()
    })]);
    let order = [
        "<fulltext-file>PDFS/Aquatic/Cilt 5 Sayı 1/a.pdf</fulltext-file>",
        "<firstpage>3</firstpage>",
        "<lastpage>9</lastpage>",
        "<primary-language>en</primary-language>",
        "<translations>",
        "<authors>",
        "<firstname></firstname>",
        "<lastname>Plato</lastname>",
        "<citations>",
        "<row>1</row>",
        "<value>Ref</value>",
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|needle| out.find(needle).unwrap_or_else(|| panic!("missing {needle} in {out}")))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{out}");
}

#[test]
fn export_creates_directory_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("out").join("Aquatic_output.xml");
    let issues = vec![issue_with(Article::default())];

    export_issues(&path, &issues).expect("first export");
    export_issues(&path, &issues).expect("second export must not fail");

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("<?xml"));
    assert_eq!(content.matches("<issue>").count(), 1);
}

#[test]
fn export_fails_when_parent_is_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a dir").unwrap();
    let result = export_issues(&blocker.join("x_output.xml"), &[]);
    assert!(matches!(result, Err(SerializeError::Io(_))));
}

#[test]
fn write_to_reports_io_errors() {
    struct Closed;
    impl std::io::Write for Closed {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let err = XmlSerializer::new()
        .write_to(&[Issue::default()], Closed)
        .unwrap_err();
    let SerializeError::Io(e) = err;
    assert_eq!(e.kind(), std::io::ErrorKind::BrokenPipe);
}
