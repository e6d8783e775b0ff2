use log::debug;
use serde::Deserialize;

use crate::error::CaptionError;

pub const YOUTUBE_BASE_URL: &str = "https://www.youtube.com";

#[derive(Debug, Deserialize)]
pub struct PlayerResponse {
    pub captions: Option<CaptionsData>,
    #[serde(rename = "playabilityStatus")]
    pub playability_status: Option<PlayabilityStatus>,
}

#[derive(Debug, Deserialize)]
pub struct PlayabilityStatus {
    pub status: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    pub player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
pub struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    pub caption_tracks: Option<Vec<TrackInfo>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackInfo {
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    #[serde(rename = "languageCode")]
    pub language_code: String,
}

/// InnerTube client identity sent in the request context
#[derive(Debug, Clone, Copy)]
pub struct ClientProfile {
    pub name: &'static str,
    pub version: &'static str,
    pub user_agent: &'static str,
}

pub const WEB_CLIENT: ClientProfile = ClientProfile {
    name: "WEB",
    version: "2.20241126.01.00",
    user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
};

pub const ANDROID_CLIENT: ClientProfile = ClientProfile {
    name: "ANDROID",
    version: "20.10.38",
    user_agent: "com.google.android.youtube/20.10.38 (Linux; U; Android 14) gzip",
};

impl PlayerResponse {
    /// Caption tracks listed for the video, in upstream order
    pub fn tracks(self, video_id: &str) -> Result<Vec<TrackInfo>, CaptionError> {
        if let Some(ps) = self
            .playability_status
            .as_ref()
            .filter(|p| p.status.as_deref() != Some("OK"))
        {
            debug!(
                "Video {video_id} not playable: {} ({})",
                ps.status.as_deref().unwrap_or("unknown"),
                ps.reason.as_deref().unwrap_or("no reason given")
            );
        }

        let tracks = self
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .and_then(|r| r.caption_tracks)
            .unwrap_or_default();

        if tracks.is_empty() {
            return Err(CaptionError::Unavailable {
                video_id: video_id.to_string(),
            });
        }
        Ok(tracks)
    }
}

/// Call the InnerTube player endpoint as `profile`
pub async fn fetch_player(
    client: &reqwest::Client,
    url: &str,
    video_id: &str,
    lang: &str,
    profile: ClientProfile,
) -> Result<PlayerResponse, CaptionError> {
    let body = serde_json::json!({
        "context": {
            "client": {
                "hl": lang,
                "gl": "US",
                "clientName": profile.name,
                "clientVersion": profile.version
            }
        },
        "videoId": video_id
    });

    debug!("Calling InnerTube player as {} for {video_id}", profile.name);

    let resp = client
        .post(url)
        .header("User-Agent", profile.user_agent)
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(resp)
}

/// Pick the track in `lang`, or the first listed track if there is none
pub fn select_track<'a>(tracks: &'a [TrackInfo], lang: &str) -> Option<&'a TrackInfo> {
    tracks
        .iter()
        .find(|t| t.language_code == lang)
        .or_else(|| tracks.first())
}

/// Caption track URLs sometimes arrive with JSON-escaped ampersands
pub fn normalize_track_url(base_url: &str) -> String {
    base_url.replace("\\u0026", "&")
}
