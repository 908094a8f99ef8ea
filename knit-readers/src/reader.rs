//! Reader trait definition
//!
//! This module defines the core Reader trait that all document readers implement.
//! A reader turns a source file into the `(content, metadata)` pair the site
//! generator consumes.

use crate::error::ReadError;
use crate::metadata::Metadata;
use serde::Serialize;
use std::path::Path;

/// Output of a [`Reader`]: the rendered body and the document metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadOutput {
    pub content: String,
    pub metadata: Metadata,
}

impl ReadOutput {
    pub fn new(content: String, metadata: Metadata) -> Self {
        Self { content, metadata }
    }

    /// Consume the output and return the `(content, metadata)` pair.
    pub fn into_parts(self) -> (String, Metadata) {
        (self.content, self.metadata)
    }
}

/// Trait for document readers
///
/// Implementors claim a set of file extensions and parse files with those
/// extensions into a [`ReadOutput`].
///
/// # Examples
///
/// ```ignore
/// struct PlainReader;
///
/// impl Reader for PlainReader {
///     fn name(&self) -> &str {
///         "plain"
///     }
///
///     fn file_extensions(&self) -> &[&str] {
///         &["txt"]
///     }
///
///     fn read(&self, path: &Path) -> Result<ReadOutput, ReadError> {
///         todo!()
///     }
/// }
/// ```
pub trait Reader: Send + Sync {
    /// The name of this reader (e.g., "markdown", "rmd")
    fn name(&self) -> &str;

    /// Optional description of this reader
    fn description(&self) -> &str {
        ""
    }

    /// File extensions claimed by this reader, without the leading dot.
    ///
    /// Matching is exact: `Rmd` and `rmd` are distinct extensions.
    fn file_extensions(&self) -> &[&str];

    /// Capability flag. A disabled reader is never registered.
    fn enabled(&self) -> bool {
        true
    }

    /// Whether this reader claims the given path
    fn claims(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.file_extensions().contains(&ext))
    }

    /// Parse the file at `path` into content and metadata
    fn read(&self, path: &Path) -> Result<ReadOutput, ReadError>;
}
