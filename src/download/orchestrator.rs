//! The retry orchestrator: walks the strategy grid until one attempt
//! produces a stable artifact, then moves it into the persistent store.
//!
//! Every download runs inside its own temporary working directory, so
//! concurrent requests never see each other's files and failed attempts
//! leave nothing behind.

use std::sync::Arc;

use url::Url;

use crate::core::config::Config;
use crate::core::error::{AppError, AppResult};
use crate::core::utils::sanitize_title;
use crate::download::artifact;
use crate::download::classify::{classify, next_step, RetryStep};
use crate::download::extractor::{MediaExtractor, MediaInfo};
use crate::download::plan::{OutputKind, StrategyPlan};
use crate::download::store::{FileStore, StoredFile};

/// Audio containers served as-is when no transcoder is available.
const NATIVE_AUDIO_EXTENSIONS: &[&str] = &["m4a", "webm", "opus", "ogg", "aac"];

/// A validated download request.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: Url,
    pub kind: OutputKind,
}

/// A finished download, already placed in the store.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub filename: String,
    pub path: std::path::PathBuf,
    pub size: u64,
    pub title: String,
}

/// Drives one request through the strategy grid.
pub struct Orchestrator {
    config: Arc<Config>,
    extractor: Arc<dyn MediaExtractor>,
    store: FileStore,
}

impl Orchestrator {
    pub fn new(config: Arc<Config>, extractor: Arc<dyn MediaExtractor>, store: FileStore) -> Self {
        Self {
            config,
            extractor,
            store,
        }
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Metadata probe without a download.
    pub async fn probe(&self, url: &Url) -> AppResult<MediaInfo> {
        self.extractor.probe(url).await
    }

    /// Runs the full pipeline: probe, strategy grid, artifact location,
    /// store placement.
    pub async fn download(&self, request: &DownloadRequest) -> AppResult<DownloadResult> {
        let info = self.extractor.probe(&request.url).await?;
        if info.has_drm {
            log::warn!("Rejecting DRM-protected source: {}", request.url);
            return Err(AppError::DrmProtected);
        }

        let title = sanitize_title(&info.title);

        let workdir = tempfile::tempdir()?;
        self.run_strategies(request, workdir.path()).await?;

        let candidate = artifact::locate_stable(workdir.path(), &self.config.retry).await?;
        let ext = self.output_extension(request.kind, &candidate.path);
        let stored = self.store.place(&candidate.path, &title, ext)?;

        log::info!(
            "Download complete: {} -> {} ({} bytes)",
            request.url,
            stored.filename,
            stored.size
        );
        Ok(result_from(stored, info.title))
    }

    /// Walks the (client, format) grid in priority order.
    ///
    /// Format-level failures move to the next selector under the same
    /// client; client-level failures skip to the next client. Two clients
    /// hitting block-shaped errors means the site is refusing this network,
    /// and the remaining grid is abandoned.
    async fn run_strategies(&self, request: &DownloadRequest, workdir: &std::path::Path) -> AppResult<()> {
        let plan = StrategyPlan::for_kind(request.kind);
        let retry = &self.config.retry;
        let mut blocked_clients = 0u32;
        let mut last_error: Option<AppError> = None;

        'clients: for &client in plan.clients() {
            for format in plan.formats() {
                log::info!("Trying client={} format={}", client, format);
                let attempt = self
                    .extractor
                    .extract(&request.url, client, format, request.kind, workdir)
                    .await;

                let err = match attempt {
                    Ok(()) => return Ok(()),
                    Err(err) => err,
                };

                let class = classify(&err.to_string());
                log::warn!("Attempt failed (client={}, {:?}): {}", client, class, err);
                let step = next_step(class);
                last_error = Some(err);

                match step {
                    RetryStep::NextFormat => continue,
                    RetryStep::NextClient { blocked } => {
                        if blocked {
                            blocked_clients += 1;
                            if blocked_clients >= retry.block_abort_threshold {
                                log::error!(
                                    "{} clients hit block-shaped errors, giving up",
                                    blocked_clients
                                );
                                return Err(AppError::SystemicBlock);
                            }
                            tokio::time::sleep(retry.client_block_delay).await;
                        }
                        continue 'clients;
                    }
                    RetryStep::Abort => return Err(AppError::DrmProtected),
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| AppError::Extraction("All download strategies failed".to_string())))
    }

    /// Final extension of the served file.
    ///
    /// Audio is mp3 when a transcoder re-encoded it; otherwise the native
    /// container survives, with m4a as the fallback label. Video is always
    /// mp4 by the time it leaves yt-dlp.
    fn output_extension(&self, kind: OutputKind, artifact: &std::path::Path) -> &'static str {
        match kind {
            OutputKind::Video => "mp4",
            OutputKind::Audio if self.extractor.ffmpeg_available() => "mp3",
            OutputKind::Audio => {
                let native = artifact
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.to_lowercase());
                NATIVE_AUDIO_EXTENSIONS
                    .iter()
                    .find(|known| native.as_deref() == Some(**known))
                    .copied()
                    .unwrap_or("m4a")
            }
        }
    }
}

fn result_from(stored: StoredFile, title: String) -> DownloadResult {
    DownloadResult {
        filename: stored.filename,
        path: stored.path,
        size: stored.size,
        title,
    }
}
