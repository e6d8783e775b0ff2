use async_trait::async_trait;
use log::debug;

use super::CaptionSource;
use super::innertube::{self, ANDROID_CLIENT, YOUTUBE_BASE_URL};
use crate::clean::{clean_vtt, strip_markup};
use crate::error::CaptionError;
use crate::{CaptionBody, CaptionOrigin, CaptionTrack};

/// Fetches captions while posing as the Android app, which skips the watch page
pub struct AndroidSource {
    client: reqwest::Client,
    lang: String,
}

impl AndroidSource {
    pub fn new(client: reqwest::Client, lang: impl Into<String>) -> Self {
        AndroidSource {
            client,
            lang: lang.into(),
        }
    }
}

#[async_trait]
impl CaptionSource for AndroidSource {
    fn name(&self) -> &'static str {
        "android"
    }

    async fn fetch(&self, video_id: &str) -> Result<CaptionTrack, CaptionError> {
        let player_url = format!("{YOUTUBE_BASE_URL}/youtubei/v1/player?prettyPrint=false");
        let tracks = innertube::fetch_player(&self.client, &player_url, video_id, &self.lang, ANDROID_CLIENT)
            .await?
            .tracks(video_id)?;

        let Some(track) = innertube::select_track(&tracks, &self.lang) else {
            return Err(CaptionError::Unavailable {
                video_id: video_id.to_string(),
            });
        };
        debug!("Android client caption track: lang={}", track.language_code);

        let raw = self
            .client
            .get(innertube::normalize_track_url(&track.base_url))
            .header("User-Agent", ANDROID_CLIENT.user_agent)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(CaptionTrack {
            video_id: video_id.to_string(),
            language: track.language_code.clone(),
            origin: CaptionOrigin::Android,
            body: CaptionBody::Text(flatten_caption_payload(&raw)),
        })
    }
}

/// Strip timed-text markup down to the spoken words
fn flatten_caption_payload(raw: &str) -> String {
    clean_vtt(&strip_markup(raw))
}
