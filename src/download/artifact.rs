//! Artifact location: picking the one meaningful output file out of a
//! working directory that may also hold partial downloads, thumbnails,
//! and the odd text file.
//!
//! yt-dlp's post-processing (audio re-encoding in particular) can still be
//! writing when the download step returns, so the stable variant polls the
//! candidate's size until two consecutive observations match before
//! trusting it.

use std::path::{Path, PathBuf};

use crate::core::config::{RetryPolicy, MIN_ARTIFACT_BYTES};
use crate::core::error::{AppError, AppResult};

/// Suffixes of in-flight or junk files yt-dlp leaves behind.
const PARTIAL_SUFFIXES: &[&str] = &[".part", ".ytdl", ".mhtml"];

/// Extensions that can never be the media artifact.
const NOISE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "txt"];

/// A candidate artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub size: u64,
}

fn is_noise(name: &str) -> bool {
    let lower = name.to_lowercase();
    if PARTIAL_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        return true;
    }
    NOISE_EXTENSIONS
        .iter()
        .any(|ext| lower.rsplit('.').next() == Some(*ext))
}

/// Largest non-partial, non-thumbnail file above the minimum size.
pub fn largest_candidate(dir: &Path) -> AppResult<Option<Candidate>> {
    scan(dir, MIN_ARTIFACT_BYTES, true)
}

/// Fallback: largest file that is not a partial download, with no size
/// floor and thumbnails allowed. Used when no candidate ever stabilizes.
pub fn largest_any(dir: &Path) -> AppResult<Option<Candidate>> {
    scan(dir, 0, false)
}

fn scan(dir: &Path, min_size: u64, exclude_noise: bool) -> AppResult<Option<Candidate>> {
    let mut best: Option<Candidate> = None;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.to_lowercase().ends_with(".part") {
            continue;
        }
        if exclude_noise && is_noise(&name) {
            continue;
        }
        let size = metadata.len();
        if size <= min_size {
            continue;
        }
        if best.as_ref().map(|b| size > b.size).unwrap_or(true) {
            best = Some(Candidate {
                path: entry.path(),
                size,
            });
        }
    }
    Ok(best)
}

/// Waits until two consecutive snapshots from `probe` agree.
///
/// `probe` is the snapshot-producing capability: it pauses for the poll
/// interval and then observes, so this function stays a pure comparison
/// loop testable against scripted sequences. Snapshots compare as whole
/// values, so a different file reporting the same size does not count as
/// stable. A `None` snapshot (no candidate yet) resets the comparison and
/// keeps polling. Gives up after `attempts` snapshots without two equal
/// in a row.
pub fn settle<T, F>(mut probe: F, attempts: u32) -> Option<T>
where
    T: PartialEq,
    F: FnMut() -> Option<T>,
{
    let mut previous: Option<T> = None;
    for _ in 0..attempts {
        let current = probe();
        if current.is_some() && previous == current {
            return current;
        }
        previous = current;
    }
    None
}

/// Locates the artifact, waiting for its size to stabilize.
///
/// Runs on a blocking task: up to `retry.stabilize_attempts` polls,
/// `retry.stabilize_interval` apart, until the largest candidate reports
/// the same size twice in a row. If nothing ever stabilizes, falls back
/// to the largest non-partial file.
pub async fn locate_stable(dir: &Path, retry: &RetryPolicy) -> AppResult<Candidate> {
    let dir = dir.to_path_buf();
    let retry = retry.clone();
    tokio::task::spawn_blocking(move || locate_stable_blocking(&dir, &retry))
        .await
        .map_err(|e| AppError::Extraction(format!("Artifact watcher task failed: {}", e)))?
}

fn locate_stable_blocking(dir: &Path, retry: &RetryPolicy) -> AppResult<Candidate> {
    let settled = settle(
        || {
            std::thread::sleep(retry.stabilize_interval);
            largest_candidate(dir).ok().flatten()
        },
        retry.stabilize_attempts,
    );

    if let Some(candidate) = settled {
        return Ok(candidate);
    }

    log::warn!(
        "No artifact stabilized in {} polls, falling back to largest file in {}",
        retry.stabilize_attempts,
        dir.display()
    );
    largest_any(dir)?.ok_or_else(|| AppError::Extraction("No downloaded file found".to_string()))
}
