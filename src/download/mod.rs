//! Download engine: strategy plan, error classification, the yt-dlp
//! collaborator, retry orchestration, artifact location, and the
//! persistent file store.

pub mod artifact;
pub mod classify;
pub mod cookies;
pub mod extractor;
pub mod orchestrator;
pub mod plan;
pub mod store;

pub use extractor::{MediaExtractor, MediaInfo, YtDlpExtractor};
pub use orchestrator::{DownloadRequest, DownloadResult, Orchestrator};
pub use plan::{OutputKind, PlayerClient, StrategyPlan};
pub use store::FileStore;
