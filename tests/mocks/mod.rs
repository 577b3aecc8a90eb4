//! Scripted stand-in for the yt-dlp collaborator.
//!
//! Outcomes are queued per extraction attempt: a failure carries the error
//! text the classifier will see, a success writes a plausible artifact
//! into the working directory. Every attempt is recorded so tests can
//! assert on the exact (client, format) walk.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use tubedrop::core::config::{Config, RetryPolicy};
use tubedrop::core::error::{AppError, AppResult};
use tubedrop::download::extractor::{MediaExtractor, MediaInfo};
use tubedrop::download::plan::{OutputKind, PlayerClient};

/// Size of the fake artifact; comfortably above the minimum-size floor.
const ARTIFACT_BYTES: usize = 64 * 1024;

pub enum Outcome {
    /// Write an artifact with this filename and report success.
    Succeed(&'static str),
    /// Write an artifact of an explicit size and report success.
    SucceedBytes(&'static str, usize),
    /// Fail with this error text.
    Fail(&'static str),
}

pub struct ScriptedExtractor {
    info: MediaInfo,
    outcomes: Mutex<VecDeque<Outcome>>,
    /// Used when the outcome queue runs dry.
    default_error: &'static str,
    pub attempts: Mutex<Vec<(PlayerClient, String)>>,
    pub last_workdir: Mutex<Option<PathBuf>>,
    ffmpeg: bool,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self {
            info: MediaInfo {
                title: "Test Video".to_string(),
                duration: 120,
                thumbnail: "https://example.com/thumb.jpg".to_string(),
                uploader: "Tester".to_string(),
                has_drm: false,
            },
            outcomes: Mutex::new(VecDeque::new()),
            default_error: "HTTP Error 500: Internal Server Error",
            attempts: Mutex::new(Vec::new()),
            last_workdir: Mutex::new(None),
            ffmpeg: true,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.info.title = title.to_string();
        self
    }

    pub fn with_drm(mut self) -> Self {
        self.info.has_drm = true;
        self
    }

    pub fn without_ffmpeg(mut self) -> Self {
        self.ffmpeg = false;
        self
    }

    pub fn script(self, outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        self.outcomes.lock().unwrap().extend(outcomes);
        self
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

#[async_trait]
impl MediaExtractor for ScriptedExtractor {
    async fn probe(&self, _url: &Url) -> AppResult<MediaInfo> {
        Ok(self.info.clone())
    }

    async fn extract(
        &self,
        _url: &Url,
        client: PlayerClient,
        format: &str,
        _kind: OutputKind,
        workdir: &Path,
    ) -> AppResult<()> {
        self.attempts
            .lock()
            .unwrap()
            .push((client, format.to_string()));
        *self.last_workdir.lock().unwrap() = Some(workdir.to_path_buf());

        let outcome = self.outcomes.lock().unwrap().pop_front();
        match outcome {
            Some(Outcome::Succeed(filename)) => {
                std::fs::write(workdir.join(filename), vec![0u8; ARTIFACT_BYTES])?;
                Ok(())
            }
            Some(Outcome::SucceedBytes(filename, bytes)) => {
                std::fs::write(workdir.join(filename), vec![0u8; bytes])?;
                Ok(())
            }
            Some(Outcome::Fail(message)) => Err(AppError::Extraction(message.to_string())),
            None => Err(AppError::Extraction(self.default_error.to_string())),
        }
    }

    fn ffmpeg_available(&self) -> bool {
        self.ffmpeg
    }
}

/// Config pointed at a temp store, with millisecond-scale retry delays.
pub fn test_config(download_dir: &Path) -> Config {
    Config {
        download_dir: download_dir.to_path_buf(),
        retry: RetryPolicy {
            client_block_delay: Duration::from_millis(1),
            stabilize_attempts: 4,
            stabilize_interval: Duration::from_millis(2),
            ..RetryPolicy::default()
        },
        ..Config::default()
    }
}
