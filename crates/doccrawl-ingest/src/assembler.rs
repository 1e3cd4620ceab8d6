use std::path::Path;
use std::sync::Arc;

use doccrawl_core::Issue;
use doccrawl_parsing::FieldExtractor;

use crate::missing_log::MissingPdfLog;
use crate::resolver::{PdfResolver, assign_pdfs};
use crate::{AssembleError, ResolveError};

/// An issue assembled from one document, with the outcome of PDF resolution.
#[derive(Debug)]
pub struct AssembledIssue {
    pub issue: Issue,
    pub pdfs_assigned: usize,
    /// Why no PDFs were assigned, when resolution failed.
    pub pdf_error: Option<ResolveError>,
}

impl AssembledIssue {
    pub fn articles_without_pdf(&self) -> usize {
        self.issue
            .articles
            .iter()
            .filter(|a| a.pdf_url.is_none())
            .count()
    }
}

/// Builds one [`Issue`] per document: segmentation and extraction through the
/// [`FieldExtractor`], then PDF resolution and positional assignment.
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    extractor: Arc<FieldExtractor>,
    resolver: PdfResolver,
    missing_log: Option<Arc<MissingPdfLog>>,
}

impl RecordAssembler {
    pub fn new(extractor: Arc<FieldExtractor>) -> Self {
        Self {
            extractor,
            resolver: PdfResolver::default(),
            missing_log: None,
        }
    }

    pub fn with_resolver(mut self, resolver: PdfResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_missing_log(mut self, log: Arc<MissingPdfLog>) -> Self {
        self.missing_log = Some(log);
        self
    }

    pub fn extractor(&self) -> &FieldExtractor {
        &self.extractor
    }

    /// Assemble an issue from document text.
    ///
    /// Returns `None` when the document has no article markers. With no
    /// `pdf_root`, PDF resolution is skipped. Resolution failures are logged
    /// and leave every article without a PDF.
    pub fn assemble(&self, text: &str, pdf_root: Option<&Path>) -> Option<AssembledIssue> {
        let mut issue = self.extractor.extract_issue(text)?;

        let Some(root) = pdf_root else {
            return Some(AssembledIssue {
                issue,
                pdfs_assigned: 0,
                pdf_error: None,
            });
        };

        match self.resolver.resolve(root, &issue) {
            Ok(paths) => {
                let pdfs_assigned = assign_pdfs(&mut issue.articles, &paths);
                if paths.len() < issue.articles.len() {
                    tracing::debug!(
                        articles = issue.articles.len(),
                        pdfs = paths.len(),
                        "fewer PDFs than articles"
                    );
                }
                Some(AssembledIssue {
                    issue,
                    pdfs_assigned,
                    pdf_error: None,
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "PDF resolution failed");
                self.log_missing(&e);
                Some(AssembledIssue {
                    issue,
                    pdfs_assigned: 0,
                    pdf_error: Some(e),
                })
            }
        }
    }

    /// Read a document from disk and [`assemble`](Self::assemble) it.
    pub fn assemble_document(
        &self,
        path: &Path,
        pdf_root: Option<&Path>,
    ) -> Result<Option<AssembledIssue>, AssembleError> {
        let text = read_document(path)?;
        let assembled = self.assemble(&text, pdf_root);
        if assembled.is_none() {
            tracing::warn!(path = %path.display(), "no article markers, skipping document");
        }
        Ok(assembled)
    }

    fn log_missing(&self, error: &ResolveError) {
        let (Some(log), Some(missing)) = (&self.missing_log, error.missing_path()) else {
            return;
        };
        if let Err(e) = log.record(&missing) {
            tracing::warn!(log = %log.path().display(), error = %e, "failed to append to missing-PDF log");
        }
    }
}

/// Read a markup document as UTF-8, dropping a leading byte-order mark.
pub fn read_document(path: &Path) -> Result<String, AssembleError> {
    let bytes = std::fs::read(path).map_err(|source| AssembleError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| AssembleError::Encoding {
        path: path.to_path_buf(),
    })?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const DOC: &str = "Cilt 5 Sayı 1 Yıl 2019
Makale 1
Başlık (TR): Birinci
Makale 2
Başlık (TR): İkinci
Makale 3
Başlık (EN): Third
";

    fn assembler_with_log(log: &Path) -> RecordAssembler {
        RecordAssembler::new(Arc::new(FieldExtractor::new()))
            .with_missing_log(Arc::new(MissingPdfLog::new(log)))
    }

    #[test]
    fn test_positional_pdfs_three_articles_two_files() {
        let tmp = tempfile::tempdir().unwrap();
        let issue_dir = tmp.path().join("Aquatic").join("Cilt 5 Sayı 1");
        fs::create_dir_all(&issue_dir).unwrap();
        fs::write(issue_dir.join("b.pdf"), b"%PDF").unwrap();
        fs::write(issue_dir.join("a.pdf"), b"%PDF").unwrap();

        let log = tmp.path().join("missing.log");
        let assembled = assembler_with_log(&log)
            .assemble(DOC, Some(&tmp.path().join("Aquatic")))
            .unwrap();

        let urls: Vec<Option<String>> = assembled
            .issue
            .articles
            .iter()
            .map(|a| a.pdf_url.clone())
            .collect();
        assert_eq!(
            urls,
            vec![
                Some(issue_dir.join("a.pdf").display().to_string()),
                Some(issue_dir.join("b.pdf").display().to_string()),
                None,
            ]
        );
        assert_eq!(assembled.pdfs_assigned, 2);
        assert_eq!(assembled.articles_without_pdf(), 1);
        assert!(!log.exists(), "nothing missing, nothing logged");
    }

    #[test]
    fn test_missing_directory_is_logged_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("Aquatic");
        fs::create_dir_all(root.join("Cilt 6 Sayı 1")).unwrap();
        let log = tmp.path().join("missing.log");

        let assembled = assembler_with_log(&log).assemble(DOC, Some(&root)).unwrap();
        assert!(matches!(
            assembled.pdf_error,
            Some(ResolveError::DirectoryNotFound { .. })
        ));
        assert_eq!(assembled.issue.articles.len(), 3);
        assert!(assembled.issue.articles.iter().all(|a| a.pdf_url.is_none()));

        let content = fs::read_to_string(&log).unwrap();
        assert!(
            content.starts_with(&format!(
                "Missing PDF directory: {} - ",
                root.join("Cilt 5 Sayı 1").display()
            )),
            "{content}"
        );
    }

    #[test]
    fn test_missing_category_root_is_logged() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("NoSuchCategory");
        let log = tmp.path().join("missing.log");

        let assembled = assembler_with_log(&log).assemble(DOC, Some(&root)).unwrap();
        assert!(matches!(
            assembled.pdf_error,
            Some(ResolveError::CategoryRootMissing(_))
        ));
        let content = fs::read_to_string(&log).unwrap();
        assert!(content.contains(&root.display().to_string()));
    }

    #[test]
    fn test_no_markers() {
        let assembler = RecordAssembler::new(Arc::new(FieldExtractor::new()));
        assert!(assembler.assemble("Cilt 1 Sayı 1", None).is_none());
    }

    #[test]
    fn test_read_document_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("absent.xml");
        assert!(matches!(
            read_document(&missing),
            Err(AssembleError::Read { .. })
        ));

        let latin1 = tmp.path().join("latin1.xml");
        fs::write(&latin1, [0x4d, 0x61, 0x6b, 0x61, 0x6c, 0x65, 0x20, 0xfe]).unwrap();
        assert!(matches!(
            read_document(&latin1),
            Err(AssembleError::Encoding { .. })
        ));
    }

    #[test]
    fn test_read_document_strips_bom() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bom.xml");
        fs::write(&path, "\u{feff}Makale 1").unwrap();
        assert_eq!(read_document(&path).unwrap(), "Makale 1");
    }
}
