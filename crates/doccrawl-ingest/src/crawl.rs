//! Concurrent crawl over every category of the documents root.
//!
//! Architecture: a fixed number of category workers drain an `async_channel`
//! job queue. Each worker fans its category's documents out onto blocking
//! tasks, bounded by one semaphore shared across all categories, and joins
//! them in document order before writing the category's XML output.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::{Semaphore, oneshot};

use doccrawl_core::{CategoryReport, Config, CrawlEvent, CrawlSummary, Issue, SkippedDocument};
use doccrawl_parsing::FieldExtractor;
use doccrawl_reporting::export_issues;

use crate::assembler::{AssembledIssue, RecordAssembler};
use crate::listing::{Entry, FsListing, sorted_entries};
use crate::missing_log::MissingPdfLog;
use crate::{AssembleError, CrawlError};

/// Progress callback, invoked from worker tasks.
pub type ProgressFn = Arc<dyn Fn(CrawlEvent) + Send + Sync>;

struct CategoryJob {
    name: String,
    result_tx: oneshot::Sender<CategoryReport>,
}

/// Crawl every selected category and write one XML file per category.
///
/// Only a missing or unreadable documents root fails the run. Per-document
/// and per-category failures are recorded in the returned summary, whose
/// categories are in name order.
pub async fn crawl(
    config: Arc<Config>,
    extractor: Arc<FieldExtractor>,
    progress: ProgressFn,
) -> Result<CrawlSummary, CrawlError> {
    let categories = {
        let config = Arc::clone(&config);
        tokio::task::spawn_blocking(move || list_categories(&config)).await??
    };
    tracing::info!(
        root = %config.documents_dir.display(),
        categories = categories.len(),
        "starting crawl"
    );

    let missing_log = Arc::new(MissingPdfLog::new(&config.missing_pdf_log));
    let assembler = Arc::new(RecordAssembler::new(extractor).with_missing_log(missing_log));
    let documents = Arc::new(Semaphore::new(config.document_workers.max(1)));

    let (job_tx, job_rx) = async_channel::unbounded::<CategoryJob>();
    let num_workers = config.category_workers.max(1);
    let mut workers = Vec::with_capacity(num_workers);
    for _ in 0..num_workers {
        workers.push(tokio::spawn(category_worker(
            job_rx.clone(),
            config.clone(),
            assembler.clone(),
            documents.clone(),
            progress.clone(),
        )));
    }
    // Workers hold the remaining receivers and exit once the queue closes.
    drop(job_rx);

    let mut receivers = Vec::with_capacity(categories.len());
    for name in categories {
        let (result_tx, result_rx) = oneshot::channel();
        let _ = job_tx
            .send(CategoryJob {
                name: name.clone(),
                result_tx,
            })
            .await;
        receivers.push((name, result_rx));
    }
    job_tx.close();

    let mut reports = Vec::with_capacity(receivers.len());
    for (name, rx) in receivers {
        let report = rx.await.unwrap_or_else(|_| CategoryReport {
            category: name,
            error: Some("category worker stopped before reporting".to_string()),
            ..Default::default()
        });
        reports.push(report);
    }
    for worker in workers {
        let _ = worker.await;
    }

    Ok(CrawlSummary {
        categories: reports,
    })
}

async fn category_worker(
    jobs: async_channel::Receiver<CategoryJob>,
    config: Arc<Config>,
    assembler: Arc<RecordAssembler>,
    documents: Arc<Semaphore>,
    progress: ProgressFn,
) {
    while let Ok(job) = jobs.recv().await {
        let report = process_category(&job.name, &config, &assembler, &documents, &progress).await;
        progress(CrawlEvent::CategoryFinished {
            report: report.clone(),
        });
        let _ = job.result_tx.send(report);
    }
}

/// Process one category: assemble each document, then export the issues.
pub async fn process_category(
    name: &str,
    config: &Config,
    assembler: &Arc<RecordAssembler>,
    documents: &Arc<Semaphore>,
    progress: &ProgressFn,
) -> CategoryReport {
    let mut report = CategoryReport {
        category: name.to_string(),
        ..Default::default()
    };

    let dir = config.documents_dir.join(name);
    let listed = tokio::task::spawn_blocking(move || list_documents(&dir))
        .await
        .map_err(CrawlError::from)
        .and_then(|r| r);
    let docs = match listed {
        Ok(docs) => docs,
        Err(e) => {
            tracing::warn!(category = name, error = %e, "cannot list category");
            report.error = Some(e.to_string());
            return report;
        }
    };
    report.documents = docs.len();
    progress(CrawlEvent::CategoryStarted {
        category: name.to_string(),
        documents: docs.len(),
    });

    let pdf_root = config.pdfs_dir.join(name);
    let tasks = docs.into_iter().map(|path| {
        let assembler = Arc::clone(assembler);
        let documents = Arc::clone(documents);
        let pdf_root = pdf_root.clone();
        async move {
            // Never closed, so the permit is always granted.
            let _permit = documents.acquire_owned().await;
            let doc = path.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                assembler.assemble_document(&doc, Some(&pdf_root))
            })
            .await;
            (path, outcome)
        }
    });
    let outcomes = join_all(tasks).await;

    let mut issues: Vec<Issue> = Vec::new();
    for (path, outcome) in outcomes {
        match flatten(outcome) {
            Ok(Some(assembled)) => {
                record_assembled(&mut report, &assembled);
                progress(CrawlEvent::DocumentProcessed {
                    category: name.to_string(),
                    document: path,
                    articles: assembled.issue.articles.len(),
                    pdfs: assembled.pdfs_assigned,
                });
                issues.push(assembled.issue);
            }
            Ok(None) => skip(&mut report, progress, path, "no article markers found".into()),
            Err(reason) => {
                tracing::warn!(category = name, document = %path.display(), %reason, "skipping document");
                skip(&mut report, progress, path, reason);
            }
        }
    }
    report.issues = issues.len();

    if issues.is_empty() {
        tracing::info!(category = name, "no issues extracted, no output written");
        return report;
    }

    let output = config.output_path(name);
    match write_output(output.clone(), issues).await {
        Ok(()) => {
            tracing::info!(
                category = name,
                issues = report.issues,
                articles = report.articles,
                output = %output.display(),
                "category finished"
            );
            report.output = Some(output);
        }
        Err(e) => {
            tracing::warn!(category = name, error = %e, "failed to write category output");
            report.error = Some(e.to_string());
        }
    }
    report
}

fn flatten(
    outcome: Result<Result<Option<AssembledIssue>, AssembleError>, tokio::task::JoinError>,
) -> Result<Option<AssembledIssue>, String> {
    match outcome {
        Ok(Ok(assembled)) => Ok(assembled),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(CrawlError::Join(e).to_string()),
    }
}

fn record_assembled(report: &mut CategoryReport, assembled: &AssembledIssue) {
    report.articles += assembled.issue.articles.len();
    report.articles_without_pdf += assembled.articles_without_pdf();
    if assembled.pdf_error.is_some() {
        report.missing_pdf_dirs += 1;
    }
}

fn skip(report: &mut CategoryReport, progress: &ProgressFn, path: PathBuf, reason: String) {
    progress(CrawlEvent::DocumentSkipped {
        category: report.category.clone(),
        document: path.clone(),
        reason: reason.clone(),
    });
    report.skipped_documents.push(SkippedDocument { path, reason });
}

async fn write_output(path: PathBuf, issues: Vec<Issue>) -> Result<(), CrawlError> {
    tokio::task::spawn_blocking(move || export_issues(&path, &issues)).await??;
    Ok(())
}

/// Category directory names under the documents root, in natural order,
/// restricted by the category filter. Blocking; async callers run it on the
/// blocking pool.
pub fn list_categories(config: &Config) -> Result<Vec<String>, CrawlError> {
    let root = &config.documents_dir;
    let entries = sorted_entries(&FsListing, root).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CrawlError::DocumentsRootMissing(root.clone()),
        _ => CrawlError::Io {
            path: root.clone(),
            source: e,
        },
    })?;

    Ok(entries
        .into_iter()
        .filter(|e| e.is_dir)
        .map(|e| e.file_name())
        .filter(|name| config.includes_category(name))
        .collect())
}

/// Markup documents (`*.xml`) directly inside a category directory, in
/// natural order.
pub fn list_documents(dir: &Path) -> Result<Vec<PathBuf>, CrawlError> {
    let entries = sorted_entries(&FsListing, dir).map_err(|source| CrawlError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(entries
        .into_iter()
        .filter(is_document)
        .map(|e| e.path)
        .collect())
}

fn is_document(entry: &Entry) -> bool {
    !entry.is_dir
        && entry
            .path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xml"))
}
