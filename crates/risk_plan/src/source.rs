//! Injectable document access.
//!
//! The planner is the only part of the core that touches documents by path;
//! routing that access through a trait keeps planning testable without a
//! filesystem and keeps I/O policy (base directories, sandboxing) out of
//! the resolution logic.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure to produce a document's text.
#[derive(Error, Debug)]
pub enum SourceError {
    /// No document at the given path.
    #[error("File not found: {0}")]
    NotFound(String),

    /// The document exists but could not be read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// The path that failed.
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Provides document text by logical path.
pub trait DocumentSource {
    /// Returns the resolved form of `path` (for reporting). The default is
    /// the identity.
    fn resolve(&self, path: &str) -> String {
        path.to_string()
    }

    /// Reads the document at `path` into a string.
    fn read(&self, path: &str) -> Result<String, SourceError>;
}

/// Filesystem-backed source resolving relative paths against a base
/// directory (conventionally the portfolio document's directory).
#[derive(Clone, Debug, Default)]
pub struct FsDocumentSource {
    base_dir: Option<PathBuf>,
}

impl FsDocumentSource {
    /// Creates a source with no base directory (paths used as-is).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source resolving relative paths against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        match (&self.base_dir, p.is_absolute()) {
            (Some(base), false) => base.join(p),
            _ => p.to_path_buf(),
        }
    }
}

impl DocumentSource for FsDocumentSource {
    fn resolve(&self, path: &str) -> String {
        self.resolve_path(path).to_string_lossy().into_owned()
    }

    fn read(&self, path: &str) -> Result<String, SourceError> {
        let resolved = self.resolve_path(path);
        if !resolved.exists() {
            return Err(SourceError::NotFound(
                resolved.to_string_lossy().into_owned(),
            ));
        }
        std::fs::read_to_string(&resolved).map_err(|source| SourceError::Io {
            path: resolved.to_string_lossy().into_owned(),
            source,
        })
    }
}

/// In-memory source for tests and inlined bundles.
#[derive(Clone, Debug, Default)]
pub struct MemoryDocumentSource {
    documents: HashMap<String, String>,
}

impl MemoryDocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a document under a logical path.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) -> &mut Self {
        self.documents.insert(path.into(), content.into());
        self
    }
}

impl DocumentSource for MemoryDocumentSource {
    fn read(&self, path: &str) -> Result<String, SourceError> {
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_roundtrip() {
        let mut src = MemoryDocumentSource::new();
        src.insert("a.json", "{}");
        assert_eq!(src.read("a.json").unwrap(), "{}");
        assert!(matches!(
            src.read("missing.json"),
            Err(SourceError::NotFound(_))
        ));
    }

    #[test]
    fn test_fs_source_resolves_relative_against_base() {
        let src = FsDocumentSource::with_base_dir("/tmp/portfolios");
        assert_eq!(
            src.resolve("scenarios/a.json"),
            "/tmp/portfolios/scenarios/a.json"
        );
        assert_eq!(src.resolve("/abs/a.json"), "/abs/a.json");
    }

    #[test]
    fn test_fs_source_missing_file() {
        let src = FsDocumentSource::new();
        assert!(matches!(
            src.read("/definitely/not/here.json"),
            Err(SourceError::NotFound(_))
        ));
    }
}
