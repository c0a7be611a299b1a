//! Load-once reference assets: the coordinate index and the blank form image.
//!
//! Both are loaded a single time and then only read, so a [`ReferenceAssets`]
//! can be cloned cheaply (two `Arc`s) and used from any number of threads.
//! [`init_global`] keeps one instance for the lifetime of the process.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use image::{ImageReader, RgbImage};
use log::info;

#[cfg(feature = "tracing")]
use tracing::instrument;

use scantron_core::{AnswerKeyEntry, CoordinateIndex, MarkOutcome};
use scantron_mark::{annotate, AnnotateError, AnnotatedImage, ImageError, MarkStyle};

use crate::dataset;
use crate::error::ScantronError;

/// Shared, read-only handle on the coordinate index and reference image.
#[derive(Clone, Debug)]
pub struct ReferenceAssets {
    index: Arc<CoordinateIndex>,
    image: Arc<RgbImage>,
}

impl ReferenceAssets {
    pub fn new(index: CoordinateIndex, image: RgbImage) -> Self {
        Self {
            index: Arc::new(index),
            image: Arc::new(image),
        }
    }

    /// Load the coordinate dataset and decode the reference image.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(coords_path, image_path))
    )]
    pub fn load(
        coords_path: impl AsRef<Path>,
        image_path: impl AsRef<Path>,
    ) -> Result<Self, ScantronError> {
        let index = dataset::load_coordinate_index(coords_path)?;
        let image = load_reference_image(image_path)?;
        info!(
            "reference assets: {} questions, {} options, image {}x{}",
            index.question_count(),
            index.len(),
            image.width(),
            image.height()
        );
        Ok(Self::new(index, image))
    }

    #[inline]
    pub fn index(&self) -> &CoordinateIndex {
        &self.index
    }

    #[inline]
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Run the marking engine against these assets.
    pub fn annotate(
        &self,
        answer_key: &[AnswerKeyEntry],
        style: &MarkStyle,
    ) -> Result<(AnnotatedImage, Vec<MarkOutcome>), AnnotateError> {
        annotate(answer_key, &self.index, &self.image, style)
    }
}

static GLOBAL: OnceLock<ReferenceAssets> = OnceLock::new();

/// Load the process-wide assets once and return them.
///
/// Later calls return the already-loaded assets and ignore their arguments.
pub fn init_global(
    coords_path: impl AsRef<Path>,
    image_path: impl AsRef<Path>,
) -> Result<&'static ReferenceAssets, ScantronError> {
    if let Some(assets) = GLOBAL.get() {
        return Ok(assets);
    }
    let assets = ReferenceAssets::load(coords_path, image_path)?;
    Ok(GLOBAL.get_or_init(|| assets))
}

/// Process-wide assets, if [`init_global`] has succeeded.
pub fn global() -> Option<&'static ReferenceAssets> {
    GLOBAL.get()
}

/// Decode a reference image file into 8-bit RGB.
///
/// The format is detected from the file content, not the extension.
pub fn load_reference_image(path: impl AsRef<Path>) -> Result<RgbImage, ImageError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|source| ImageError::Open {
            path: display.clone(),
            source,
        })?;
    let img = reader
        .decode()
        .map_err(|source| ImageError::Decode {
            path: display,
            source,
        })?
        .to_rgb8();
    ensure_non_empty(img)
}

/// Decode an in-memory reference image (e.g. an uploaded file).
pub fn decode_reference_image(bytes: &[u8]) -> Result<RgbImage, ImageError> {
    let img = image::load_from_memory(bytes)
        .map_err(|source| ImageError::Decode {
            path: "<memory>".to_string(),
            source,
        })?
        .to_rgb8();
    ensure_non_empty(img)
}

fn ensure_non_empty(img: RgbImage) -> Result<RgbImage, ImageError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(ImageError::EmptyImage {
            width: img.width(),
            height: img.height(),
        });
    }
    Ok(img)
}
