use std::path::PathBuf;

use thiserror::Error;

/// Failure writing the flattened drawing to disk.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("could not create output directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Failure loading or running a headless replay script.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("could not read script '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed script '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Save(#[from] SaveError),
}

#[derive(Debug, Error)]
pub enum FontError {
    #[error("no installed font matches {0}")]
    NotFound(String),
    #[error("font could not be loaded: {0}")]
    Load(String),
}
