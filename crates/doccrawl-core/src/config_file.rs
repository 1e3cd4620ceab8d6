use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Config;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub paths: Option<PathsConfig>,
    pub concurrency: Option<ConcurrencyConfig>,
    pub extraction: Option<ExtractionConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    pub documents_dir: Option<String>,
    pub pdfs_dir: Option<String>,
    pub output_dir: Option<String>,
    pub missing_pdf_log: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    pub category_workers: Option<usize>,
    pub document_workers: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub fallback_max_words: Option<usize>,
}

/// Platform config directory path: `<config_dir>/doccrawl/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("doccrawl").join("config.toml"))
}

/// Load config by cascading CWD `.doccrawl.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".doccrawl.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

fn pick<T, S>(
    overlay: &Option<S>,
    base: &Option<S>,
    field: impl Fn(&S) -> Option<T>,
) -> Option<T> {
    overlay
        .as_ref()
        .and_then(&field)
        .or_else(|| base.as_ref().and_then(&field))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        paths: Some(PathsConfig {
            documents_dir: pick(&overlay.paths, &base.paths, |p| p.documents_dir.clone()),
            pdfs_dir: pick(&overlay.paths, &base.paths, |p| p.pdfs_dir.clone()),
            output_dir: pick(&overlay.paths, &base.paths, |p| p.output_dir.clone()),
            missing_pdf_log: pick(&overlay.paths, &base.paths, |p| p.missing_pdf_log.clone()),
        }),
        concurrency: Some(ConcurrencyConfig {
            category_workers: pick(&overlay.concurrency, &base.concurrency, |c| {
                c.category_workers
            }),
            document_workers: pick(&overlay.concurrency, &base.concurrency, |c| {
                c.document_workers
            }),
        }),
        extraction: Some(ExtractionConfig {
            fallback_max_words: pick(&overlay.extraction, &base.extraction, |e| {
                e.fallback_max_words
            }),
        }),
    }
}

impl ConfigFile {
    /// Apply the file's values on top of `config`. Unset fields leave
    /// `config` untouched; zero worker counts are ignored.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(paths) = &self.paths {
            if let Some(dir) = &paths.documents_dir {
                config.documents_dir = PathBuf::from(dir);
            }
            if let Some(dir) = &paths.pdfs_dir {
                config.pdfs_dir = PathBuf::from(dir);
            }
            if let Some(dir) = &paths.output_dir {
                config.output_dir = PathBuf::from(dir);
            }
            if let Some(log) = &paths.missing_pdf_log {
                config.missing_pdf_log = PathBuf::from(log);
            }
        }
        if let Some(concurrency) = &self.concurrency {
            if let Some(n) = concurrency.category_workers.filter(|&n| n > 0) {
                config.category_workers = n;
            }
            if let Some(n) = concurrency.document_workers.filter(|&n| n > 0) {
                config.document_workers = n;
            }
        }
        if let Some(n) = self.extraction.as_ref().and_then(|e| e.fallback_max_words) {
            config.fallback_max_words = n;
        }
    }
}
