//! Strategy plan: the priority-ordered grid of (player client, format
//! selector) pairs the orchestrator walks until one attempt succeeds.

use serde::Deserialize;
use std::fmt;

/// Requested output kind. Wire values are `"video"` and `"mp3"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum OutputKind {
    #[serde(rename = "video")]
    Video,
    #[serde(rename = "mp3")]
    Audio,
}

impl OutputKind {
    /// Parses the wire value; `None` for anything outside {"video", "mp3"}.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "video" => Some(OutputKind::Video),
            "mp3" => Some(OutputKind::Audio),
            _ => None,
        }
    }
}

/// A YouTube player-client fingerprint presented to the site. Which client
/// is used changes which anti-automation policy the site applies, so the
/// orchestrator tries several in order of empirical success rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerClient {
    /// Mobile web — historically the most permissive
    Mweb,
    /// Embedded TV client
    TvEmbedded,
    /// Desktop web
    Web,
    /// Native Android app
    Android,
    /// Native iOS app
    Ios,
}

impl PlayerClient {
    /// Clients in preferred order.
    pub const PRIORITY: [PlayerClient; 5] = [
        PlayerClient::Mweb,
        PlayerClient::TvEmbedded,
        PlayerClient::Web,
        PlayerClient::Android,
        PlayerClient::Ios,
    ];

    /// The identifier yt-dlp expects in `--extractor-args youtube:player_client=...`
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerClient::Mweb => "mweb",
            PlayerClient::TvEmbedded => "tv_embedded",
            PlayerClient::Web => "web",
            PlayerClient::Android => "android",
            PlayerClient::Ios => "ios",
        }
    }
}

impl fmt::Display for PlayerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format selectors for video requests, most specific first. The leading
/// selector is its own fallback chain (yt-dlp resolves `/` internally);
/// the rest are progressively more permissive retries for when the whole
/// chain is rejected.
const VIDEO_FORMATS: &[&str] = &[
    "best[ext=mp4]/best[height<=720]/best[height<=480]/best",
    "best[ext=mp4]/best",
    "bestvideo+bestaudio/best",
    "worstvideo+worstaudio/worst",
    "best",
    "worst",
];

/// Format selectors for audio requests.
const AUDIO_FORMATS: &[&str] = &["bestaudio/best", "bestaudio", "worstaudio"];

/// The ordered grid of strategies for one request. Built once from the
/// fixed priority tables above; read-only during execution.
#[derive(Debug, Clone)]
pub struct StrategyPlan {
    clients: &'static [PlayerClient],
    formats: &'static [&'static str],
}

impl StrategyPlan {
    /// Builds the plan for the requested output kind.
    pub fn for_kind(kind: OutputKind) -> Self {
        let formats = match kind {
            OutputKind::Video => VIDEO_FORMATS,
            OutputKind::Audio => AUDIO_FORMATS,
        };
        Self {
            clients: &PlayerClient::PRIORITY,
            formats,
        }
    }

    pub fn clients(&self) -> &[PlayerClient] {
        self.clients
    }

    pub fn formats(&self) -> &[&'static str] {
        self.formats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_priority_starts_with_mobile_web() {
        let plan = StrategyPlan::for_kind(OutputKind::Video);
        assert_eq!(plan.clients()[0], PlayerClient::Mweb);
        assert_eq!(plan.clients()[1], PlayerClient::TvEmbedded);
        assert_eq!(plan.clients().len(), 5);
    }

    #[test]
    fn video_formats_end_with_worst_fallback() {
        let plan = StrategyPlan::for_kind(OutputKind::Video);
        assert_eq!(plan.formats().first(), Some(&"best[ext=mp4]/best[height<=720]/best[height<=480]/best"));
        assert_eq!(plan.formats().last(), Some(&"worst"));
    }

    #[test]
    fn audio_plan_prefers_bestaudio() {
        let plan = StrategyPlan::for_kind(OutputKind::Audio);
        assert_eq!(plan.formats(), &["bestaudio/best", "bestaudio", "worstaudio"]);
    }

    #[test]
    fn wire_values_round_trip() {
        assert_eq!(OutputKind::from_wire("video"), Some(OutputKind::Video));
        assert_eq!(OutputKind::from_wire("mp3"), Some(OutputKind::Audio));
        assert_eq!(OutputKind::from_wire("flac"), None);
    }
}
