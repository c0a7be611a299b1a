use scantron_core::DataError;
use scantron_mark::{AnnotateError, ImageError};

/// JSON config / report I/O failures.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors produced by the facade helpers and the `scantron` binary.
#[derive(thiserror::Error, Debug)]
pub enum ScantronError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Annotate(#[from] AnnotateError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
