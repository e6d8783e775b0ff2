use log::{debug, info};

use crate::captions::CaptionChain;
use crate::error::ServiceError;
use crate::summarize::Summarizer;
use crate::{CaptionTrack, extract_video_id};

/// URL in, formatted summary out
pub struct SummaryService {
    captions: CaptionChain,
    summarizer: Summarizer,
}

impl SummaryService {
    pub fn new(captions: CaptionChain, summarizer: Summarizer) -> Self {
        SummaryService { captions, summarizer }
    }

    /// Resolve the video ID and fetch its captions
    pub async fn captions_for_url(&self, url: &str) -> Result<CaptionTrack, ServiceError> {
        let video_id = extract_video_id(url).ok_or_else(|| ServiceError::InvalidUrl {
            input: url.to_string(),
        })?;
        debug!("Resolved {url} to video {video_id}");
        Ok(self.captions.fetch(&video_id).await?)
    }

    pub async fn summarize_url(&self, url: &str) -> Result<String, ServiceError> {
        let track = self.captions_for_url(url).await?;
        let text = track.text();
        info!(
            "Summarizing {} ({} chars of {} captions)",
            track.video_id,
            text.len(),
            track.origin
        );
        Ok(self.summarizer.summarize(&text).await?)
    }
}
