// JSON-Lines result files: one `inference_results_<stamp>.jsonl` per run.
//
// Files are written fresh (not appended to). A write failure is logged by
// `save_batch` and never reaches the HTTP response.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::{error, info};

use crate::inference::classifier::InferenceResult;

/// File name for a run started at `now`: `inference_results_YYYYMMDD_HHMMSS.jsonl`.
pub fn output_file_name(now: DateTime<Local>) -> String {
    format!("inference_results_{}.jsonl", now.format("%Y%m%d_%H%M%S"))
}

/// Write `results` to a new file in `dir`, one JSON object per line, in order.
pub fn write_batch(dir: &Path, results: &[InferenceResult], now: DateTime<Local>) -> Result<PathBuf> {
    let path = dir.join(output_file_name(now));

    let file = File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for result in results {
        serde_json::to_writer(&mut writer, result).context("Failed to serialize result")?;
        writer.write_all(b"\n")?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

/// Write the results and log the outcome. Returns the path on success.
pub fn save_batch(dir: &Path, results: &[InferenceResult]) -> Option<PathBuf> {
    match write_batch(dir, results, Local::now()) {
        Ok(path) => {
            info!(path = %path.display(), count = results.len(), "Inference results saved");
            Some(path)
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "Failed to save results to file");
            None
        }
    }
}
