use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local};

/// Append-only log of PDF directories that could not be found.
///
/// The file (and its parent directory) is created on the first record. Each
/// record is a single `write_all` under the mutex, so concurrent callers never
/// interleave partial lines.
#[derive(Debug)]
pub struct MissingPdfLog {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl MissingPdfLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, missing: &Path) -> io::Result<()> {
        let line = format_line(missing, Local::now());
        let mut guard = self.file.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_none() {
            *guard = Some(open_append(&self.path)?);
        }
        if let Some(file) = guard.as_mut() {
            file.write_all(line.as_bytes())?;
        }
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// `Missing PDF directory: {path} - {YYYY-MM-DD HH:MM:SS}\n`
pub fn format_line(missing: &Path, at: DateTime<Local>) -> String {
    format!(
        "Missing PDF directory: {} - {}\n",
        missing.display(),
        at.format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use regex::Regex;

    use super::*;

    #[test]
    fn test_line_format() {
        let line = format_line(Path::new("PDFS/Aquatic/Cilt 5 Sayı 1"), Local::now());
        let re = Regex::new(
            r"^Missing PDF directory: PDFS/Aquatic/Cilt 5 Sayı 1 - \d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\n$",
        )
        .unwrap();
        assert!(re.is_match(&line), "{line:?}");
    }

    #[test]
    fn test_created_on_first_use_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("missing.log");
        let log = MissingPdfLog::new(&path);
        assert!(!path.exists(), "no file before the first record");

        log.record(Path::new("a")).unwrap();
        log.record(Path::new("b")).unwrap();
        drop(log);

        // A second logger appends rather than truncating.
        MissingPdfLog::new(&path).record(Path::new("c")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Missing PDF directory: a - "));
        assert!(lines[2].starts_with("Missing PDF directory: c - "));
    }

    #[test]
    fn test_concurrent_records_are_whole_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(MissingPdfLog::new(dir.path().join("missing.log")));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        log.record(Path::new(&format!("thread{t}/dir{i}"))).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let content = std::fs::read_to_string(log.path()).unwrap();
        let re = Regex::new(r"^Missing PDF directory: thread\d/dir\d+ - [0-9: -]{19}$").unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 200);
        assert!(lines.iter().all(|l| re.is_match(l)));
    }
}
