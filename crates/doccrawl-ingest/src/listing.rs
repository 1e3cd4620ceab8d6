use std::cmp::Ordering;
use std::io;
use std::path::{Path, PathBuf};

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub is_dir: bool,
}

impl Entry {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Source of directory listings.
///
/// Implementations return entries in any order; callers sort with
/// [`sorted_entries`] when order matters.
pub trait DirectoryListing: Send + Sync {
    /// `Err` with `NotFound` when `dir` does not exist.
    fn entries(&self, dir: &Path) -> io::Result<Vec<Entry>>;
}

/// Real filesystem listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsListing;

impl DirectoryListing for FsListing {
    fn entries(&self, dir: &Path) -> io::Result<Vec<Entry>> {
        let mut out = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            // Follow symlinks so linked issue folders count as directories.
            let is_dir = std::fs::metadata(entry.path())
                .map(|m| m.is_dir())
                .unwrap_or(false);
            out.push(Entry {
                path: entry.path(),
                is_dir,
            });
        }
        Ok(out)
    }
}

/// List `dir` and sort entries by file name in natural order.
pub fn sorted_entries(listing: &dyn DirectoryListing, dir: &Path) -> io::Result<Vec<Entry>> {
    let mut entries = listing.entries(dir)?;
    entries.sort_by(|a, b| natural_cmp(&a.file_name(), &b.file_name()));
    Ok(entries)
}

/// Compare names with digit runs ordered numerically: `2.pdf` < `10.pdf`.
///
/// Ties (`01` vs `1`) are broken by plain string comparison so the order is
/// total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut xs = a.chars().peekable();
    let mut ys = b.chars().peekable();

    loop {
        match (xs.peek().copied(), ys.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let nx = take_digits(&mut xs);
                let ny = take_digits(&mut ys);
                let ord = compare_digit_runs(&nx, &ny);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                xs.next();
                ys.next();
            }
        }
    }
}

fn take_digits(it: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = it.peek().copied().filter(char::is_ascii_digit) {
        run.push(c);
        it.next();
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
