//! Classification of yt-dlp failures and the retry decision table.
//!
//! yt-dlp surfaces everything as free-form error text, so classification is
//! substring matching over a lowercased copy. The classifier is a pure
//! function; the mapping from a class to the orchestrator's next move lives
//! in a single decision table instead of being scattered across control flow.

/// Classified cause of a failed extraction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The requested format selector matched nothing. Cheap to retry with
    /// the next selector under the same client.
    FormatUnavailable,
    /// Signature/challenge (SABR) failures are per-client; other formats
    /// under the same client will fail the same way.
    SignatureChallenge,
    /// The site flagged the request as automated.
    BotDetected,
    /// The player response came back as an unparseable page instead of
    /// JSON. One client doing this is a quirk; two is a site-wide block.
    JsonBlocked,
    /// DRM/protected content; no strategy will ever succeed.
    Drm,
    /// Anything else is treated as transient.
    Other,
}

/// Next move of the retry driver after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    /// Try the next format selector under the same client.
    NextFormat,
    /// Abandon this client. `blocked` marks failures that count toward the
    /// site-wide block threshold.
    NextClient { blocked: bool },
    /// Stop immediately; no strategy can succeed.
    Abort,
}

/// Maps a raw yt-dlp error message to its classification.
pub fn classify(message: &str) -> ErrorClass {
    let msg = message.to_lowercase();

    if msg.contains("drm") || msg.contains("protected") || msg.contains("encrypted") {
        return ErrorClass::Drm;
    }
    if msg.contains("format is not available") || msg.contains("requested format") {
        return ErrorClass::FormatUnavailable;
    }
    if msg.contains("failed to parse json") || msg.contains("failed to extract any player response") {
        return ErrorClass::JsonBlocked;
    }
    if msg.contains("signature") || msg.contains("challenge") || msg.contains("sabr") {
        return ErrorClass::SignatureChallenge;
    }
    if msg.contains("confirm that you are not a bot") || msg.contains("bot") {
        return ErrorClass::BotDetected;
    }

    ErrorClass::Other
}

/// The retry decision table.
pub fn next_step(class: ErrorClass) -> RetryStep {
    match class {
        ErrorClass::FormatUnavailable | ErrorClass::Other => RetryStep::NextFormat,
        ErrorClass::SignatureChallenge => RetryStep::NextClient { blocked: false },
        ErrorClass::BotDetected | ErrorClass::JsonBlocked => RetryStep::NextClient { blocked: true },
        ErrorClass::Drm => RetryStep::Abort,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_format_errors() {
        assert_eq!(
            classify("ERROR: [youtube] abc: Requested format is not available"),
            ErrorClass::FormatUnavailable
        );
        assert_eq!(classify("requested format not found"), ErrorClass::FormatUnavailable);
    }

    #[test]
    fn classifies_signature_and_challenge_errors() {
        assert_eq!(classify("Signature extraction failed"), ErrorClass::SignatureChallenge);
        assert_eq!(classify("nsig challenge could not be solved"), ErrorClass::SignatureChallenge);
        assert_eq!(classify("SABR streaming is forced"), ErrorClass::SignatureChallenge);
    }

    #[test]
    fn classifies_bot_detection() {
        assert_eq!(
            classify("Sign in to confirm that you are not a bot"),
            ErrorClass::BotDetected
        );
    }

    #[test]
    fn classifies_json_blocks() {
        assert_eq!(classify("Failed to parse JSON"), ErrorClass::JsonBlocked);
        assert_eq!(
            classify("Failed to extract any player response"),
            ErrorClass::JsonBlocked
        );
    }

    #[test]
    fn classifies_drm() {
        assert_eq!(classify("This video is DRM protected"), ErrorClass::Drm);
        assert_eq!(classify("content is encrypted"), ErrorClass::Drm);
    }

    #[test]
    fn unknown_errors_are_transient() {
        assert_eq!(classify("HTTP Error 500: Internal Server Error"), ErrorClass::Other);
    }

    #[test]
    fn decision_table() {
        assert_eq!(next_step(ErrorClass::FormatUnavailable), RetryStep::NextFormat);
        assert_eq!(next_step(ErrorClass::Other), RetryStep::NextFormat);
        assert_eq!(
            next_step(ErrorClass::SignatureChallenge),
            RetryStep::NextClient { blocked: false }
        );
        assert_eq!(next_step(ErrorClass::BotDetected), RetryStep::NextClient { blocked: true });
        assert_eq!(next_step(ErrorClass::JsonBlocked), RetryStep::NextClient { blocked: true });
        assert_eq!(next_step(ErrorClass::Drm), RetryStep::Abort);
    }
}
