//! Error taxonomy for the update pipeline and its collaborators.

use std::path::PathBuf;

use thiserror::Error;

/// Metadata could not be obtained. The pipeline treats every variant alike.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("http status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("response has no image url")]
    MissingUrl,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("http status {0}")]
    Status(u16),
    #[error("empty response body")]
    Empty,
    #[error("write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("image not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("no supported desktop detected ({0})")]
    UnsupportedDesktop(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Directory-level failures of the image store.
#[derive(Debug, Error)]
#[error("{op} {}: {source}", path.display())]
pub struct StoreError {
    pub op: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl StoreError {
    pub fn new(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            op,
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("io {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: String, value: String },
    #[error("encode: {0}")]
    Encode(String),
}

/// A run that ended in `Done(failure)`, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("wallpaper directory unavailable: {0}")]
    Prepare(#[from] StoreError),
    #[error("download failed: {0}")]
    Download(#[from] DownloadError),
    #[error("apply failed: {0}")]
    Apply(#[from] ApplyError),
}

impl PipelineError {
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetching",
            Self::Prepare(_) | Self::Download(_) => "downloading",
            Self::Apply(_) => "applying",
        }
    }
}
