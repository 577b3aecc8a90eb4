//! The extraction collaborator: yt-dlp behind a trait seam.
//!
//! The orchestrator only ever talks to [`MediaExtractor`], so tests can
//! script failures without a network or a yt-dlp binary. [`YtDlpExtractor`]
//! is the real implementation: it shells out to yt-dlp with
//! browser-mimicking headers, per-attempt client/format hints, and the
//! cookie configuration resolved at startup, all bounded by a hard timeout.

use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use url::Url;

use crate::core::config::Config;
use crate::core::error::{AppError, AppResult};
use crate::download::classify::{self, ErrorClass};
use crate::download::cookies::{self, Cookies};
use crate::download::plan::{OutputKind, PlayerClient};

/// User-agent presented to the source site on every request.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Extra headers mimicking a real browser session.
const BROWSER_HEADERS: &[&str] = &[
    "Accept:text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    "Accept-Language:es-ES,es;q=0.9,en-US;q=0.8,en;q=0.7",
    "DNT:1",
    "Sec-Fetch-Mode:navigate",
];

/// Metadata of a source URL, as reported by a `--dump-json` probe.
#[derive(Debug, Clone, Serialize)]
pub struct MediaInfo {
    pub title: String,
    pub duration: u64,
    pub thumbnail: String,
    pub uploader: String,
    pub has_drm: bool,
}

/// The external extraction collaborator.
///
/// `extract` fetches the media for one (client, format) attempt into
/// `workdir`; errors carry the tool's message so the orchestrator can
/// classify them.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Fetches metadata without downloading.
    async fn probe(&self, url: &Url) -> AppResult<MediaInfo>;

    /// Runs one download attempt, writing output files into `workdir`.
    async fn extract(
        &self,
        url: &Url,
        client: PlayerClient,
        format: &str,
        kind: OutputKind,
        workdir: &Path,
    ) -> AppResult<()>;

    /// Whether a transcoder is available for mp3 re-encoding.
    fn ffmpeg_available(&self) -> bool;
}

/// yt-dlp subprocess implementation of [`MediaExtractor`].
pub struct YtDlpExtractor {
    bin: String,
    invocation_timeout: Duration,
    cookies: Option<Cookies>,
    ffmpeg: bool,
}

impl YtDlpExtractor {
    /// Resolves cookies and probes for ffmpeg once; both are fixed for the
    /// process lifetime.
    pub async fn new(config: &Config) -> AppResult<Self> {
        let cookies = cookies::load(config)?;
        let ffmpeg = probe_ffmpeg().await;
        if !ffmpeg {
            log::warn!("ffmpeg not found: audio downloads will keep their native container");
        }

        Ok(Self {
            bin: config.ytdlp_bin.clone(),
            invocation_timeout: config.ytdlp_timeout,
            cookies,
            ffmpeg,
        })
    }

    /// Logs the yt-dlp version at startup; a missing binary is fatal.
    pub async fn log_version(&self) -> AppResult<()> {
        let output = Command::new(&self.bin)
            .arg("--version")
            .output()
            .await
            .map_err(|e| AppError::Extraction(format!("Failed to run {} --version: {}", self.bin, e)))?;
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if version.is_empty() {
            return Err(AppError::Extraction(format!(
                "{} is not installed or --version produced no output",
                self.bin
            )));
        }
        log::info!("yt-dlp version: {}", version);
        Ok(())
    }

    /// Shared argument tail: network tuning, browser fingerprint, cookies.
    fn push_common_args(&self, args: &mut Vec<String>) {
        args.extend(
            [
                "--no-playlist",
                "--no-warnings",
                "--socket-timeout",
                "30",
                "--retries",
                "10",
                "--fragment-retries",
                "10",
                "--user-agent",
                USER_AGENT,
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        for header in BROWSER_HEADERS {
            args.push("--add-headers".to_string());
            args.push(header.to_string());
        }
        if let Some(cookies) = &self.cookies {
            args.push("--cookies".to_string());
            args.push(cookies.path().to_string_lossy().into_owned());
        }
    }

    /// `--extractor-args` value for one client, with `visitor_data` when
    /// the cookie file carried one.
    fn extractor_args(&self, client: PlayerClient) -> String {
        let mut value = format!("youtube:player_client={};player_skip=webpage", client.as_str());
        if let Some(visitor_data) = self.cookies.as_ref().and_then(|c| c.visitor_data.as_deref()) {
            value.push_str(";visitor_data=");
            value.push_str(visitor_data);
        }
        value
    }

    async fn run(&self, args: &[String]) -> AppResult<std::process::Output> {
        log::debug!("yt-dlp invocation: {} {}", self.bin, args.join(" "));
        let result = timeout(
            self.invocation_timeout,
            Command::new(&self.bin)
                .args(args)
                .stdin(Stdio::null())
                .output(),
        )
        .await;

        match result {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(AppError::Extraction(format!("Failed to execute {}: {}", self.bin, e))),
            Err(_) => Err(AppError::Extraction(format!(
                "yt-dlp timed out after {} seconds",
                self.invocation_timeout.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    async fn probe(&self, url: &Url) -> AppResult<MediaInfo> {
        let mut args = vec!["--dump-json".to_string()];
        self.push_common_args(&mut args);
        args.push(url.as_str().to_string());

        let output = self.run(&args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if classify::classify(&stderr) == ErrorClass::Drm {
                return Err(AppError::DrmProtected);
            }
            return Err(AppError::Extraction(format!(
                "Failed to fetch media info: {}",
                tail(&stderr)
            )));
        }

        let info: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        Ok(parse_media_info(&info))
    }

    async fn extract(
        &self,
        url: &Url,
        client: PlayerClient,
        format: &str,
        kind: OutputKind,
        workdir: &Path,
    ) -> AppResult<()> {
        let outtmpl = workdir.join("%(title)s.%(ext)s");
        let mut args = vec![
            "-o".to_string(),
            outtmpl.to_string_lossy().into_owned(),
            "--format".to_string(),
            format.to_string(),
            "--extractor-args".to_string(),
            self.extractor_args(client),
        ];
        self.push_common_args(&mut args);

        match kind {
            OutputKind::Audio if self.ffmpeg => {
                args.extend(
                    ["-x", "--audio-format", "mp3", "--audio-quality", "192K"]
                        .iter()
                        .map(|s| s.to_string()),
                );
            }
            OutputKind::Audio => {}
            OutputKind::Video if self.ffmpeg => {
                args.push("--merge-output-format".to_string());
                args.push("mp4".to_string());
            }
            OutputKind::Video => {}
        }
        args.push(url.as_str().to_string());

        let output = self.run(&args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Extraction(tail(&stderr).to_string()));
        }
        Ok(())
    }

    fn ffmpeg_available(&self) -> bool {
        self.ffmpeg
    }
}

/// Maps a `--dump-json` document to [`MediaInfo`].
///
/// A source is DRM-flagged when any of its formats carries a truthy
/// `has_drm` or `drm` field.
fn parse_media_info(info: &serde_json::Value) -> MediaInfo {
    let formats = info.get("formats").and_then(|f| f.as_array());
    let has_drm = formats
        .map(|formats| {
            formats.iter().any(|fmt| {
                let flagged = |key: &str| match fmt.get(key) {
                    Some(serde_json::Value::Bool(b)) => *b,
                    Some(serde_json::Value::Null) | None => false,
                    Some(other) => !matches!(other.as_str(), Some("") | Some("none")),
                };
                flagged("has_drm") || flagged("drm")
            })
        })
        .unwrap_or(false);

    MediaInfo {
        title: info
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or("Video")
            .to_string(),
        duration: info.get("duration").and_then(|v| v.as_f64()).unwrap_or(0.0) as u64,
        thumbnail: info
            .get("thumbnail")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        uploader: info
            .get("uploader")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string(),
        has_drm,
    }
}

/// Last ~500 bytes of stderr; the tail carries the actual error line.
fn tail(stderr: &str) -> &str {
    let trimmed = stderr.trim();
    match trimmed.char_indices().rev().nth(499) {
        Some((idx, _)) => &trimmed[idx..],
        None => trimmed,
    }
}

/// Checks whether ffmpeg is on the PATH (5 second bound, as a hung probe
/// must not stall startup).
async fn probe_ffmpeg() -> bool {
    matches!(
        timeout(
            Duration::from_secs(5),
            Command::new("ffmpeg").arg("-version").stdin(Stdio::null()).output(),
        )
        .await,
        Ok(Ok(output)) if output.status.success()
    )
}
