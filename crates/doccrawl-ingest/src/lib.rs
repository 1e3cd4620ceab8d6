use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub mod assembler;
pub mod crawl;
pub mod listing;
pub mod missing_log;
pub mod resolver;

// Re-export domain types for convenience
pub use doccrawl_core::{
    Article, CategoryReport, Config, CrawlEvent, CrawlSummary, Issue, SkippedDocument,
};
pub use assembler::{AssembledIssue, RecordAssembler, read_document};
pub use crawl::{ProgressFn, crawl};
pub use listing::{DirectoryListing, Entry, FsListing, natural_cmp};
pub use missing_log::MissingPdfLog;
pub use resolver::{NamingConvention, PdfResolver, ResolvedDir, assign_pdfs};

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("category PDF root not found: {}", .0.display())]
    CategoryRootMissing(PathBuf),
    #[error("no PDF directory for volume {volume} number {number} under {}", root.display())]
    DirectoryNotFound {
        root: PathBuf,
        volume: String,
        number: String,
    },
    #[error("failed to list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ResolveError {
    /// Path recorded in the missing-PDF log for this failure, if any.
    pub fn missing_path(&self) -> Option<PathBuf> {
        match self {
            Self::CategoryRootMissing(root) => Some(root.clone()),
            Self::DirectoryNotFound {
                root,
                volume,
                number,
            } => Some(root.join(format!("Cilt {volume} Sayı {number}"))),
            Self::Io { .. } => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },
}

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("documents root not found: {}", .0.display())]
    DocumentsRootMissing(PathBuf),
    #[error("failed to list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("failed to write output: {0}")]
    Serialize(#[from] doccrawl_reporting::SerializeError),
}
