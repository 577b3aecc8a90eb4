//! Tubedrop - self-hosted web backend for downloading video and audio
//!
//! Accepts a video URL over HTTP, drives yt-dlp through a priority-ordered
//! grid of (player client, format selector) strategies with classified
//! retries, and serves the resulting file back as a download.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, filename utilities
//! - `download`: strategy plan, error classification, yt-dlp collaborator,
//!   retry orchestration, artifact location, persistent store
//! - `server`: HTTP API and file streaming

pub mod core;
pub mod download;
pub mod server;

// Re-export commonly used types for convenience
pub use crate::core::{config::Config, error::AppError, error::AppResult};
pub use crate::download::orchestrator::{DownloadRequest, DownloadResult, Orchestrator};
