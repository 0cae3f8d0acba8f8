use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by query resolution, searching and fetching.
///
/// An unparseable version is deliberately *not* part of this: it only excludes the affected
///  artifact from version aware filtering (see `ParsedVersion`).
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid coordinate string {input:?}: expected g:a:v, g:a:e:v or g:a:e:c:v, got {segments} segment(s)")]
    InvalidCoordinateString {
        input: String,
        segments: usize,
    },

    #[error("no matching artifact for {query:?}")]
    NoMatchingArtifact {
        query: String,
    },

    #[error("{count} artifacts match {query:?} but exactly one is required")]
    AmbiguousMatch {
        query: String,
        count: usize,
    },

    #[error("{operation} failed: {source:#}")]
    Backend {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
