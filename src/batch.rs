//! Sequential embedding of a sorted file list.
//!
//! Every file yields an [`ItemOutcome`]; failures are collected next to the records
//! instead of aborting the run.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::artifact::OutputRecord;
use crate::encoder::VisionEncoder;
use crate::metadata::{MetadataCache, resolve};
use crate::session::VisionSession;
use crate::{Result, SpriteError};

/// Emit an `info` progress line every this many files.
const PROGRESS_EVERY: usize = 100;

/// A file that could not be embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of processing one file.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Embedded(OutputRecord),
    Skipped(ItemFailure),
}

/// Everything a batch run produced, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub records: Vec<OutputRecord>,
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    fn push(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Embedded(record) => self.records.push(record),
            ItemOutcome::Skipped(failure) => self.failures.push(failure),
        }
    }
}

/// Key for an image: its filename without extension.
pub fn key_for_path(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(OsStr::to_str)
        .map(str::to_owned)
        .ok_or_else(|| SpriteError::InvalidKey {
            path: path.to_path_buf(),
        })
}

fn load_image(path: &Path) -> Result<image::DynamicImage> {
    image::ImageReader::open(path)
        .map_err(|e| SpriteError::io_at(e, path))?
        .with_guessed_format()
        .map_err(|e| SpriteError::io_at(e, path))?
        .decode()
        .map_err(|e| SpriteError::ImageDecode {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })
}

fn embed_file<S: VisionSession>(
    path: &Path,
    cache: &MetadataCache,
    encoder: &mut VisionEncoder<S>,
) -> Result<OutputRecord> {
    let key = key_for_path(path)?;
    let meta = resolve(&key, cache);
    let image = load_image(path)?;
    let vec = encoder.embed_image(&image)?;

    Ok(OutputRecord {
        key,
        name: meta.name,
        src: meta.src,
        vec,
    })
}

/// Process one file, converting any error into a skip.
pub fn process_file<S: VisionSession>(
    path: &Path,
    cache: &MetadataCache,
    encoder: &mut VisionEncoder<S>,
) -> ItemOutcome {
    match embed_file(path, cache, encoder) {
        Ok(record) => ItemOutcome::Embedded(record),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "skipping file");
            ItemOutcome::Skipped(ItemFailure {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })
        }
    }
}

/// Embed every file in order. Never fails as a whole.
pub fn run_batch<S: VisionSession>(
    files: &[PathBuf],
    cache: &MetadataCache,
    encoder: &mut VisionEncoder<S>,
) -> BatchReport {
    let total = files.len();
    let mut report = BatchReport::default();

    for (idx, path) in files.iter().enumerate() {
        tracing::debug!(path = %path.display(), "embedding");
        report.push(process_file(path, cache, encoder));

        let done = idx + 1;
        if done % PROGRESS_EVERY == 0 && done < total {
            tracing::info!(done, total, failures = report.failure_count(), "embedding sprites");
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_the_file_stem() {
        assert_eq!(key_for_path(Path::new("/s/slime.png")).unwrap(), "slime");
        assert_eq!(key_for_path(Path::new("a/b/hero.v2.webp")).unwrap(), "hero.v2");
        assert_eq!(key_for_path(Path::new("Bat")).unwrap(), "Bat");
        assert!(matches!(
            key_for_path(Path::new("/")),
            Err(SpriteError::InvalidKey { .. })
        ));
    }

    #[test]
    fn report_splits_outcomes() {
        let mut report = BatchReport::default();
        report.push(ItemOutcome::Skipped(ItemFailure {
            path: PathBuf::from("x.png"),
            reason: "bad".into(),
        }));
        report.push(ItemOutcome::Embedded(OutputRecord {
            key: "y".into(),
            name: "y".into(),
            src: String::new(),
            vec: vec![1.0],
        }));
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.failure_count(), 1);
    }
}
