use std::path::Path;

use thiserror::Error;

use doccrawl_core::Issue;

pub mod xml;

pub use xml::XmlSerializer;

#[derive(Error, Debug)]
pub enum SerializeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize `issues` and write them to `path`, creating parent directories
/// as needed. Writing to an existing directory or overwriting an earlier
/// output is not an error.
pub fn export_issues(path: &Path, issues: &[Issue]) -> Result<(), SerializeError> {
    let content = XmlSerializer::new().serialize(issues)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    tracing::debug!(path = %path.display(), issues = issues.len(), "wrote XML output");
    Ok(())
}
