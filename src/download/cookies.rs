//! Cookie handling for yt-dlp authentication.
//!
//! Cookies arrive either as a raw Netscape-format payload in the
//! `YOUTUBE_COOKIES` environment variable (materialized into a temp file
//! once at startup) or as a local `cookies.txt` next to the binary. The
//! `VISITOR_INFO1_LIVE` cookie value doubles as the `visitor_data`
//! extractor argument, which lowers the odds of a bot check.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::core::config::Config;
use crate::core::error::AppResult;

/// Where the cookie file lives for the lifetime of the process.
enum CookieSource {
    /// Materialized from the env payload; the temp file is removed when
    /// this is dropped.
    Env(NamedTempFile),
    /// Pre-existing file on disk, left untouched.
    Local(PathBuf),
}

/// Cookie configuration resolved once at startup.
pub struct Cookies {
    source: CookieSource,
    /// Value of the `VISITOR_INFO1_LIVE` cookie, if present.
    pub visitor_data: Option<String>,
}

impl Cookies {
    /// Path to pass to yt-dlp's `--cookies`.
    pub fn path(&self) -> &Path {
        match &self.source {
            CookieSource::Env(file) => file.path(),
            CookieSource::Local(path) => path,
        }
    }
}

/// Resolves the cookie configuration: env payload first, then a local
/// `cookies.txt`, else none.
pub fn load(config: &Config) -> AppResult<Option<Cookies>> {
    if let Some(payload) = &config.cookies_payload {
        let mut file = tempfile::Builder::new().prefix("cookies-").suffix(".txt").tempfile()?;
        file.write_all(payload.as_bytes())?;
        file.flush()?;

        let visitor_data = extract_visitor_data(payload);
        log::info!(
            "Cookies loaded from YOUTUBE_COOKIES ({} entries, visitor_data: {})",
            active_cookie_lines(payload),
            if visitor_data.is_some() { "found" } else { "absent" }
        );
        return Ok(Some(Cookies {
            source: CookieSource::Env(file),
            visitor_data,
        }));
    }

    let local = PathBuf::from("cookies.txt");
    if local.exists() {
        let content = std::fs::read_to_string(&local)?;
        let visitor_data = extract_visitor_data(&content);
        log::info!(
            "Cookies loaded from cookies.txt ({} entries)",
            active_cookie_lines(&content)
        );
        return Ok(Some(Cookies {
            source: CookieSource::Local(local),
            visitor_data,
        }));
    }

    Ok(None)
}

/// Pulls the `VISITOR_INFO1_LIVE` value out of a Netscape cookie file.
///
/// Netscape format is seven tab-separated fields per line; the value is
/// the last one. Comment lines start with `#`.
pub fn extract_visitor_data(content: &str) -> Option<String> {
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('#') || !trimmed.contains("VISITOR_INFO1_LIVE") {
            continue;
        }
        let parts: Vec<&str> = trimmed.split('\t').collect();
        if parts.len() >= 7 {
            return Some(parts[6].to_string());
        }
    }
    None
}

/// Counts non-comment, non-empty lines in a cookie file.
fn active_cookie_lines(content: &str) -> usize {
    content
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
        .count()
}
