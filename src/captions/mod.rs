pub mod android;
pub mod innertube;
pub mod web;
pub mod ytdlp;

use async_trait::async_trait;
use log::{info, warn};

use crate::CaptionTrack;
use crate::config::Settings;
use crate::error::CaptionError;

pub use android::AndroidSource;
pub use web::WebSource;
pub use ytdlp::YtDlpSource;

/// Anything that can produce captions for a video ID
#[async_trait]
pub trait CaptionSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, video_id: &str) -> Result<CaptionTrack, CaptionError>;
}

/// Caption sources tried in order until one returns a non-empty track
pub struct CaptionChain {
    sources: Vec<Box<dyn CaptionSource>>,
}

impl CaptionChain {
    pub fn new(sources: Vec<Box<dyn CaptionSource>>) -> Self {
        CaptionChain { sources }
    }

    /// Web listing first, then the Android client, then yt-dlp
    pub fn from_settings(client: reqwest::Client, settings: &Settings) -> Self {
        Self::new(vec![
            Box::new(WebSource::new(client.clone(), &settings.lang)),
            Box::new(AndroidSource::new(client.clone(), &settings.lang)),
            Box::new(YtDlpSource::new(
                client,
                &settings.ytdlp_path,
                &settings.lang,
                settings.proxy.clone(),
                settings.timeout,
            )),
        ])
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub async fn fetch(&self, video_id: &str) -> Result<CaptionTrack, CaptionError> {
        for source in &self.sources {
            match source.fetch(video_id).await {
                Ok(track) if track.is_empty() => {
                    warn!("{} returned an empty caption track for {video_id}", source.name());
                }
                Ok(track) => {
                    info!(
                        "Captions for {video_id} from {} (lang={})",
                        source.name(),
                        track.language
                    );
                    return Ok(track);
                }
                Err(e) => warn!("{} failed for {video_id}: {e}", source.name()),
            }
        }

        Err(CaptionError::NoTranscript {
            video_id: video_id.to_string(),
        })
    }
}
