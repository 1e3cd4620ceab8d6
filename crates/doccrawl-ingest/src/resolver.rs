use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use doccrawl_core::{Article, Issue};

use crate::ResolveError;
use crate::listing::{DirectoryListing, Entry, FsListing, sorted_entries};

/// Folder naming schemes for issue PDF directories, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingConvention {
    /// `Cilt 5 Sayı 1`, `Volume 5 - Number 1`, `Vol_05_No_1`
    VerboseLocale,
    /// `C5S1`
    CompactCode,
    /// `Cilt5Sayı1`, `Volume5Number1`
    NoSpaceVerbose,
}

impl NamingConvention {
    pub const CASCADE: [NamingConvention; 3] = [
        NamingConvention::VerboseLocale,
        NamingConvention::CompactCode,
        NamingConvention::NoSpaceVerbose,
    ];

    /// Folder-name pattern for `volume`/`number`. Leading zeros in folder
    /// names are accepted; a number never matches as a prefix of a longer one.
    pub fn pattern(&self, volume: &str, number: &str) -> Result<Regex, regex::Error> {
        let v = number_pattern(volume);
        let n = number_pattern(number);
        let pattern = match self {
            Self::VerboseLocale => format!(
                r"(?i)^(?:Cilt|Volume|Vol\.?)[\s_.\-]+{v}(?:[^0-9].*?)?(?:Say[ıi]|Number|Issue|No\.?)[\s_.\-]+{n}(?:[^0-9]|$)"
            ),
            Self::CompactCode => format!(r"(?i)^C{v}S{n}(?:[^0-9]|$)"),
            Self::NoSpaceVerbose => format!(
                r"(?i)^(?:Cilt|Volume|Vol)\.?{v}[_.\-]*(?:Say[ıi]|Number|No)\.?{n}(?:[^0-9]|$)"
            ),
        };
        Regex::new(&pattern)
    }
}

fn number_pattern(value: &str) -> String {
    let trimmed = value.trim().trim_start_matches('0');
    let digits = if trimmed.is_empty() { "0" } else { trimmed };
    format!("0*{}", regex::escape(digits))
}

/// Subdirectory chosen by the cascade and the convention that matched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDir {
    pub path: PathBuf,
    pub convention: NamingConvention,
}

/// Finds an issue's PDF directory under a category PDF root and lists its PDFs.
#[derive(Clone)]
pub struct PdfResolver {
    listing: Arc<dyn DirectoryListing>,
}

impl Default for PdfResolver {
    fn default() -> Self {
        Self::new(Arc::new(FsListing))
    }
}

impl std::fmt::Debug for PdfResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfResolver").finish_non_exhaustive()
    }
}

impl PdfResolver {
    pub fn new(listing: Arc<dyn DirectoryListing>) -> Self {
        Self { listing }
    }

    /// Run the naming cascade over the subdirectories of `category_root`.
    ///
    /// Conventions are tried in [`NamingConvention::CASCADE`] order and the
    /// first one matching any subdirectory wins. Subdirectories are scanned in
    /// natural name order.
    pub fn resolve_dir(
        &self,
        category_root: &Path,
        issue: &Issue,
    ) -> Result<ResolvedDir, ResolveError> {
        let entries = match sorted_entries(self.listing.as_ref(), category_root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ResolveError::CategoryRootMissing(
                    category_root.to_path_buf(),
                ));
            }
            Err(source) => {
                return Err(ResolveError::Io {
                    path: category_root.to_path_buf(),
                    source,
                });
            }
        };

        let not_found = || ResolveError::DirectoryNotFound {
            root: category_root.to_path_buf(),
            volume: issue.volume.clone().unwrap_or_default(),
            number: issue.number.clone().unwrap_or_default(),
        };
        let (Some(volume), Some(number)) = (issue.volume.as_deref(), issue.number.as_deref())
        else {
            return Err(not_found());
        };

        let dirs: Vec<&Entry> = entries.iter().filter(|e| e.is_dir).collect();

        NamingConvention::CASCADE
            .iter()
            .find_map(|&convention| {
                let re = match convention.pattern(volume, number) {
                    Ok(re) => re,
                    Err(e) => {
                        tracing::warn!(?convention, error = %e, "skipping naming convention");
                        return None;
                    }
                };
                tracing::trace!(?convention, volume, number, "trying naming convention");
                dirs.iter()
                    .find(|d| re.is_match(&d.file_name()))
                    .map(|d| ResolvedDir {
                        path: d.path.clone(),
                        convention,
                    })
            })
            .ok_or_else(not_found)
    }

    /// Files in `dir` whose extension is exactly `pdf`, in natural name order.
    pub fn list_pdfs(&self, dir: &Path) -> Result<Vec<PathBuf>, ResolveError> {
        let entries =
            sorted_entries(self.listing.as_ref(), dir).map_err(|source| ResolveError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        Ok(entries
            .into_iter()
            .filter(|e| !e.is_dir && e.path.extension().is_some_and(|ext| ext == "pdf"))
            .map(|e| e.path)
            .collect())
    }

    pub fn resolve(&self, category_root: &Path, issue: &Issue) -> Result<Vec<PathBuf>, ResolveError> {
        let dir = self.resolve_dir(category_root, issue)?;
        tracing::debug!(dir = %dir.path.display(), convention = ?dir.convention, "resolved PDF directory");
        self.list_pdfs(&dir.path)
    }
}

/// Assign the Nth path to the Nth article. Articles beyond the path count keep
/// no PDF; surplus paths are ignored. Returns the number assigned.
pub fn assign_pdfs(articles: &mut [Article], paths: &[PathBuf]) -> usize {
    let mut assigned = 0;
    for (article, path) in articles.iter_mut().zip(paths) {
        article.pdf_url = Some(path.display().to_string());
        assigned += 1;
    }
    assigned
}
