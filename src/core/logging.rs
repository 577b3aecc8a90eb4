//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console, plus file when configured)
//! - Cookies configuration validation and logging

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config::Config;

/// Initialize logger for console output, and file output when
/// `log_file_path` is set.
///
/// # Arguments
/// * `debug` - lowers the level filter to Debug
/// * `log_file_path` - optional path to the log file
pub fn init_logger(debug: bool, log_file_path: Option<&str>) -> Result<()> {
    let level = if debug { LevelFilter::Debug } else { LevelFilter::Info };

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    if let Some(path) = log_file_path {
        let log_file = File::create(path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;
        loggers.push(WriteLogger::new(level, simplelog::Config::default(), log_file));
    }

    CombinedLogger::init(loggers).map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs cookies configuration at application startup.
///
/// Downloads work without cookies, but age-restricted and bot-checked
/// videos usually need them, so a missing configuration is worth a warning.
pub fn log_cookies_configuration(config: &Config) {
    match &config.cookies_payload {
        Some(payload) => {
            let lines = payload
                .lines()
                .filter(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
                .count();
            log::info!("YOUTUBE_COOKIES set: {} cookie entries will be passed to yt-dlp", lines);
        }
        None => {
            if std::path::Path::new("cookies.txt").exists() {
                log::info!("Using local cookies.txt for yt-dlp authentication");
            } else {
                log::warn!("No cookies configured (YOUTUBE_COOKIES unset, no cookies.txt)");
                log::warn!("Bot-checked or age-restricted videos may fail to download");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_console_only() {
        // The global logger can only be installed once per process; a second
        // init attempt from another test is a valid error.
        let result = init_logger(false, None);
        assert!(result.is_ok() || result.is_err());
    }
}
