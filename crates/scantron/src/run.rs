//! End-to-end marking run: load, annotate, encode, write.

use std::fs;
use std::path::Path;

use log::{info, warn};

#[cfg(feature = "tracing")]
use tracing::instrument;

use scantron_core::AnswerKey;
use scantron_mark::encode;

use crate::assets::ReferenceAssets;
use crate::config::RunConfig;
use crate::dataset;
use crate::error::ScantronError;
use crate::report::MarkReport;

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub answer_key: AnswerKey,
    pub report: MarkReport,
    /// Size of the encoded image written to `report.output_path`.
    pub encoded_bytes: usize,
}

/// Execute one marking run described by `cfg`.
///
/// Any dataset or image error aborts before anything is written. The image
/// and the optional report are written together: if the report cannot be
/// written, the image is removed again.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(cfg)))]
pub fn run(cfg: &RunConfig) -> Result<RunSummary, ScantronError> {
    let assets = ReferenceAssets::load(&cfg.coords_path, &cfg.image_path)?;
    run_with_assets(&assets, cfg)
}

/// Same as [`run`], reusing already-loaded assets.
pub fn run_with_assets(
    assets: &ReferenceAssets,
    cfg: &RunConfig,
) -> Result<RunSummary, ScantronError> {
    let answer_key = dataset::load_answer_key(&cfg.answers_path)?;
    let (annotated, outcomes) = assets.annotate(answer_key.entries(), &cfg.style)?;

    let format = cfg.export_format();
    let bytes = encode(&annotated, format, cfg.quality)?;

    let report = MarkReport::new(cfg, outcomes);
    if report.unresolved > 0 {
        warn!(
            "{} of {} answers had no coordinate",
            report.unresolved,
            report.outcomes.len()
        );
    }
    let report_json = match &cfg.report_path {
        Some(path) => Some((Path::new(path), report.to_json()?)),
        None => None,
    };

    let output = cfg.output_path();
    write_file(&output, &bytes)?;
    if let Some((path, json)) = report_json {
        if let Err(err) = write_file(path, json.as_bytes()) {
            // Leave no image behind without its report.
            let _ = fs::remove_file(&output);
            return Err(err);
        }
        info!("wrote report {}", path.display());
    }
    info!("wrote {} ({format}, {} bytes)", output.display(), bytes.len());

    Ok(RunSummary {
        answer_key,
        report,
        encoded_bytes: bytes.len(),
    })
}

fn ensure_parent(path: &Path) -> Result<(), ScantronError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| ScantronError::Write {
                path: parent.display().to_string(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ScantronError> {
    ensure_parent(path)?;
    fs::write(path, bytes).map_err(|source| ScantronError::Write {
        path: path.display().to_string(),
        source,
    })
}
