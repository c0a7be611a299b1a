use crate::export::ExportFormat;

/// Reference image could not be used, or the result could not be encoded.
#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    #[error("reference image {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("reference image {path}: cannot decode: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("reference image has zero size ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("{format} encoding failed: {source}")]
    Encode {
        format: ExportFormat,
        #[source]
        source: image::ImageError,
    },
}
