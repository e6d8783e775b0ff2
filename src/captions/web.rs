use std::sync::LazyLock;

use async_trait::async_trait;
use log::debug;
use regex::Regex;

use super::CaptionSource;
use super::innertube::{self, WEB_CLIENT, YOUTUBE_BASE_URL};
use crate::error::CaptionError;
use crate::{CaptionBody, CaptionOrigin, CaptionTrack, Cue};

static API_KEY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#).unwrap());
static API_KEY_LEGACY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#).unwrap());

/// Lists caption tracks the way the watch page does and parses timed-text XML
pub struct WebSource {
    client: reqwest::Client,
    lang: String,
}

impl WebSource {
    pub fn new(client: reqwest::Client, lang: impl Into<String>) -> Self {
        WebSource {
            client,
            lang: lang.into(),
        }
    }
}

#[async_trait]
impl CaptionSource for WebSource {
    fn name(&self) -> &'static str {
        "web"
    }

    async fn fetch(&self, video_id: &str) -> Result<CaptionTrack, CaptionError> {
        // Step 1: Fetch the watch page to get the InnerTube API key
        let watch_url = format!("{YOUTUBE_BASE_URL}/watch?v={video_id}");
        debug!("Fetching watch page: {watch_url}");

        let page_html = self
            .client
            .get(&watch_url)
            .header("User-Agent", WEB_CLIENT.user_agent)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let api_key = extract_api_key(&page_html)?;
        debug!("Extracted InnerTube API key: {api_key}");

        // Step 2: List caption tracks through the player endpoint
        let player_url = format!("{YOUTUBE_BASE_URL}/youtubei/v1/player?key={api_key}&prettyPrint=false");
        let tracks = innertube::fetch_player(&self.client, &player_url, video_id, &self.lang, WEB_CLIENT)
            .await?
            .tracks(video_id)?;

        debug!(
            "Available caption tracks: {:?}",
            tracks.iter().map(|t| t.language_code.as_str()).collect::<Vec<_>>()
        );

        let Some(track) = innertube::select_track(&tracks, &self.lang) else {
            return Err(CaptionError::Unavailable {
                video_id: video_id.to_string(),
            });
        };
        debug!("Using caption track: lang={}", track.language_code);

        // Step 3: Fetch the caption XML
        let caption_xml = self
            .client
            .get(innertube::normalize_track_url(&track.base_url))
            .header("User-Agent", WEB_CLIENT.user_agent)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let cues = parse_caption_xml(&caption_xml)?;

        Ok(CaptionTrack {
            video_id: video_id.to_string(),
            language: track.language_code.clone(),
            origin: CaptionOrigin::Web,
            body: CaptionBody::Cues(cues),
        })
    }
}

fn extract_api_key(html: &str) -> Result<String, CaptionError> {
    API_KEY
        .captures(html)
        .or_else(|| API_KEY_LEGACY.captures(html))
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| CaptionError::Parse("could not extract InnerTube API key from watch page".to_string()))
}

fn parse_caption_xml(xml: &str) -> Result<Vec<Cue>, CaptionError> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut cues = Vec::new();
    let mut current_start: Option<f64> = None;
    let mut current_dur: Option<f64> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"start" => {
                            start = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        b"dur" => {
                            dur = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                        }
                        _ => {}
                    }
                }
                current_start = start;
                current_dur = Some(dur.unwrap_or(0.0));
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(start), Some(duration)) = (current_start.take(), current_dur.take()) {
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    let text = html_escape::decode_html_entities(&raw_text).to_string();
                    if !text.trim().is_empty() {
                        cues.push(Cue { text, start, duration });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(CaptionError::Parse(format!("error parsing caption XML: {e}"))),
            _ => {}
        }
    }

    Ok(cues)
}
