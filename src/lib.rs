pub mod captions;
pub mod clean;
pub mod config;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod server;
pub mod summarize;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static BARE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9A-Za-z_-]{11}$").unwrap());
static QUERY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v=([0-9A-Za-z_-]{11})(?:[^0-9A-Za-z_-]|$)").unwrap());
static PATH_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([0-9A-Za-z_-]{11})(?:[^0-9A-Za-z_-]|$)").unwrap());

/// A single timed caption cue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cue {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Which upstream produced a caption track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CaptionOrigin {
    Web,
    Android,
    YtDlp,
}

impl std::fmt::Display for CaptionOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptionOrigin::Web => write!(f, "web"),
            CaptionOrigin::Android => write!(f, "android"),
            CaptionOrigin::YtDlp => write!(f, "yt-dlp"),
        }
    }
}

/// Caption payload, either timed cues or an already-flattened blob
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CaptionBody {
    Cues(Vec<Cue>),
    Text(String),
}

/// Captions for one video as returned by a single source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptionTrack {
    pub video_id: String,
    pub language: String,
    pub origin: CaptionOrigin,
    pub body: CaptionBody,
}

impl CaptionTrack {
    /// Flatten the track into plain text (one cue per line)
    pub fn text(&self) -> String {
        match &self.body {
            CaptionBody::Cues(cues) => cues.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join("\n"),
            CaptionBody::Text(text) => text.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.body {
            CaptionBody::Cues(cues) => cues.iter().all(|c| c.text.trim().is_empty()),
            CaptionBody::Text(text) => text.trim().is_empty(),
        }
    }
}

/// Extract the 11-character video ID from a URL or bare ID.
///
/// `v=` takes priority over a path segment. A run longer than 11 characters
/// never matches, so a partial ID is never returned.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    if BARE_ID.is_match(input) {
        return Some(input.to_string());
    }

    QUERY_ID
        .captures(input)
        .or_else(|| PATH_ID.captures(input))
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(text: &str) -> Cue {
        Cue {
            text: text.to_string(),
            start: 0.0,
            duration: 1.0,
        }
    }

    #[test]
    fn test_bare_video_id() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_short_url() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?si=abc"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_embed_and_shorts_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_query_takes_priority_over_path() {
        assert_eq!(
            extract_video_id("https://example.com/abcdefghijk?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_longer_run_is_not_truncated() {
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQXYZ"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/channel/UCabcdefghijklmnop"), None);
    }

    #[test]
    fn test_invalid_url() {
        assert_eq!(extract_video_id("not-a-valid-id"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=short"), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_whitespace_trimming() {
        assert_eq!(extract_video_id("  dQw4w9WgXcQ  "), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_track_text_joins_cues_with_newlines() {
        let track = CaptionTrack {
            video_id: "dQw4w9WgXcQ".to_string(),
            language: "en".to_string(),
            origin: CaptionOrigin::Web,
            body: CaptionBody::Cues(vec![cue("Never"), cue("gonna"), cue("give")]),
        };
        assert_eq!(track.text(), "Never\ngonna\ngive");
        assert!(!track.is_empty());
    }

    #[test]
    fn test_track_is_empty() {
        let track = CaptionTrack {
            video_id: "dQw4w9WgXcQ".to_string(),
            language: "en".to_string(),
            origin: CaptionOrigin::YtDlp,
            body: CaptionBody::Text("  \n ".to_string()),
        };
        assert!(track.is_empty());

        let cues = CaptionTrack {
            body: CaptionBody::Cues(vec![]),
            ..track
        };
        assert!(cues.is_empty());
    }
}
