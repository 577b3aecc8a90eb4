use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Minimum plausible artifact size; anything smaller is a failed or
/// incomplete download.
pub const MIN_ARTIFACT_BYTES: u64 = 10 * 1024;

/// Default cap on the size of a single downloaded file (2 GiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Maximum length of a sanitized title used as a filename stem.
pub const MAX_TITLE_LEN: usize = 200;

/// Retry and stabilization tuning for the download orchestrator.
///
/// Kept separate from [`Config`] so tests can shrink the delays without
/// touching the environment.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay inserted after a client trips the block counter, before the
    /// next client is tried.
    pub client_block_delay: Duration,
    /// Number of blocked clients that signals a site-wide block and aborts
    /// the remaining strategy grid.
    pub block_abort_threshold: u32,
    /// Upper bound on artifact stabilization polls.
    pub stabilize_attempts: u32,
    /// Interval between stabilization polls.
    pub stabilize_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            client_block_delay: Duration::from_secs(1),
            block_abort_threshold: 2,
            stabilize_attempts: 30,
            stabilize_interval: Duration::from_secs(1),
        }
    }
}

/// Application configuration, read from the environment once at startup and
/// passed by reference everywhere else. No global singletons.
#[derive(Debug, Clone)]
pub struct Config {
    /// Verbose error details in API responses (DEBUG)
    pub debug: bool,
    /// Bind host (HOST, default 0.0.0.0)
    pub host: String,
    /// Bind port (PORT, default 5000)
    pub port: u16,
    /// Persistent store for finished downloads (DOWNLOAD_DIR, tilde-expanded)
    pub download_dir: PathBuf,
    /// Maximum accepted artifact size in bytes (MAX_FILE_SIZE)
    pub max_file_size: u64,
    /// Raw Netscape cookie-file payload (YOUTUBE_COOKIES)
    pub cookies_payload: Option<String>,
    /// yt-dlp binary (YTDL_BIN, default "yt-dlp")
    pub ytdlp_bin: String,
    /// Hard bound on a single yt-dlp invocation (YTDLP_TIMEOUT_SECS)
    pub ytdlp_timeout: Duration,
    /// Optional log file path (LOG_FILE_PATH); console-only when unset
    pub log_file: Option<String>,
    /// Retry/stabilization tuning
    pub retry: RetryPolicy,
}

impl Config {
    /// Reads the configuration from environment variables, falling back to
    /// deployment defaults where a variable is unset.
    pub fn from_env() -> Self {
        let download_dir = env::var("DOWNLOAD_DIR").unwrap_or_else(|_| "downloads".to_string());
        let download_dir = PathBuf::from(shellexpand::tilde(&download_dir).into_owned());

        Self {
            debug: env::var("DEBUG")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(5000),
            download_dir,
            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_FILE_SIZE),
            cookies_payload: env::var("YOUTUBE_COOKIES")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            ytdlp_bin: env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()),
            ytdlp_timeout: Duration::from_secs(
                env::var("YTDLP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(240),
            ),
            log_file: env::var("LOG_FILE_PATH").ok().filter(|s| !s.trim().is_empty()),
            retry: RetryPolicy::default(),
        }
    }
}

impl Default for Config {
    /// Defaults without consulting the environment; used by tests.
    fn default() -> Self {
        Self {
            debug: false,
            host: "0.0.0.0".to_string(),
            port: 5000,
            download_dir: PathBuf::from("downloads"),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            cookies_payload: None,
            ytdlp_bin: "yt-dlp".to_string(),
            ytdlp_timeout: Duration::from_secs(240),
            log_file: None,
            retry: RetryPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_file_size, 2 * 1024 * 1024 * 1024);
        assert_eq!(config.ytdlp_bin, "yt-dlp");
        assert!(!config.debug);
    }

    #[test]
    fn retry_policy_defaults() {
        let retry = RetryPolicy::default();
        assert_eq!(retry.block_abort_threshold, 2);
        assert_eq!(retry.stabilize_attempts, 30);
        assert_eq!(retry.stabilize_interval, Duration::from_secs(1));
    }
}
