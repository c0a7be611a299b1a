//! Encoding of annotated images.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};

use crate::engine::AnnotatedImage;
use crate::error::ImageError;

/// JPEG quality used when the caller does not pick one.
pub const DEFAULT_QUALITY: u8 = 90;

/// File name offered for the annotated download.
pub const DEFAULT_FILE_NAME: &str = "Colored_Scantron.jpg";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
}

impl ExportFormat {
    /// Guess the format from a file extension (`.jpg`, `.jpeg`, `.png`).
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        ext.parse().ok()
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Png => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Png => "image/png",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Png => "png",
        })
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown image format {0:?} (expected jpeg, jpg or png)")]
pub struct UnknownFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            "png" => Ok(ExportFormat::Png),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Encode an annotated image.
///
/// `quality` is clamped to `1..=100` and only affects JPEG.
pub fn encode(
    annotated: &AnnotatedImage,
    format: ExportFormat,
    quality: u8,
) -> Result<Vec<u8>, ImageError> {
    let mut buf = Vec::new();
    let result = match format {
        ExportFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
            annotated.image().write_with_encoder(encoder)
        }
        ExportFormat::Png => annotated.image().write_with_encoder(PngEncoder::new(&mut buf)),
    };
    result.map_err(|source| ImageError::Encode { format, source })?;
    Ok(buf)
}
