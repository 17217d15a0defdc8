//! Errors raised while reading content from disk

use std::path::PathBuf;
use thiserror::Error;

use super::ContentType;

/// Problems with the front-matter block itself, before any field is checked
#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("file does not start with a `---` front-matter block")]
    Missing,

    #[error("front-matter block is never closed with `---`")]
    Unterminated,

    #[error("front-matter is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure to turn on-disk content into records.
///
/// An absent content directory is not an error; everything here means a file
/// exists but cannot be read as a record.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to scan {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("{path:?}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },

    #[error("{path:?}: missing required field `{field}`")]
    MissingField { path: PathBuf, field: &'static str },

    #[error("{path:?}: `{value}` is not a calendar date")]
    InvalidDate { path: PathBuf, value: String },

    #[error("{path:?}: declares type `{found}` but lives under the {expected} directory")]
    TypeMismatch {
        path: PathBuf,
        expected: ContentType,
        found: String,
    },

    #[error("slug `{slug}` is used by more than one {content_type} record")]
    DuplicateSlug {
        content_type: ContentType,
        slug: String,
    },

    #[error("failed to parse timeline {path:?}: {source}")]
    Timeline {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
