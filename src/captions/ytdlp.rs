use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use tokio::process::Command;

use super::CaptionSource;
use super::innertube::YOUTUBE_BASE_URL;
use crate::clean::{clean_vtt, strip_markup};
use crate::error::CaptionError;
use crate::{CaptionBody, CaptionOrigin, CaptionTrack};

#[derive(Debug, Deserialize)]
struct VideoInfo {
    #[serde(default)]
    subtitles: Option<HashMap<String, Vec<SubtitleFormat>>>,
    #[serde(default)]
    automatic_captions: Option<HashMap<String, Vec<SubtitleFormat>>>,
}

#[derive(Debug, Deserialize)]
struct SubtitleFormat {
    ext: Option<String>,
    url: Option<String>,
}

/// Asks yt-dlp for subtitle URLs and downloads the VTT file itself
pub struct YtDlpSource {
    client: reqwest::Client,
    program: String,
    lang: String,
    proxy: Option<String>,
    timeout: Duration,
}

impl YtDlpSource {
    pub fn new(
        client: reqwest::Client,
        program: impl Into<String>,
        lang: impl Into<String>,
        proxy: Option<String>,
        timeout: Duration,
    ) -> Self {
        YtDlpSource {
            client,
            program: program.into(),
            lang: lang.into(),
            proxy,
            timeout,
        }
    }

    fn args(&self, video_id: &str) -> Vec<String> {
        let mut args: Vec<String> = ["--dump-json", "--skip-download", "--no-warnings", "--no-playlist"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        if let Some(ref proxy) = self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }
        args.push(format!("{YOUTUBE_BASE_URL}/watch?v={video_id}"));
        args
    }

    async fn dump_json(&self, video_id: &str) -> Result<VideoInfo, CaptionError> {
        let tool_err = |reason: String| CaptionError::Tool {
            tool: self.program.clone(),
            reason,
        };

        debug!("Running {} for {video_id}", self.program);
        let child = Command::new(&self.program)
            .args(self.args(video_id))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    tool_err("not found on PATH".to_string())
                } else {
                    tool_err(e.to_string())
                }
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| tool_err(format!("timed out after {:?}", self.timeout)))?
            .map_err(|e| tool_err(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(tool_err(format!("exited with {}: {}", output.status, stderr.trim())));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| CaptionError::Parse(format!("yt-dlp JSON: {e}")))
    }
}

#[async_trait]
impl CaptionSource for YtDlpSource {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch(&self, video_id: &str) -> Result<CaptionTrack, CaptionError> {
        let info = self.dump_json(video_id).await?;

        let Some(url) = select_subtitle_url(&info, &self.lang) else {
            return Err(CaptionError::Unavailable {
                video_id: video_id.to_string(),
            });
        };
        debug!("Downloading subtitles from {url}");

        let raw = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(CaptionTrack {
            video_id: video_id.to_string(),
            language: self.lang.clone(),
            origin: CaptionOrigin::YtDlp,
            body: CaptionBody::Text(clean_vtt(&strip_markup(&raw))),
        })
    }
}

/// Uploaded subtitles win over auto-generated ones; VTT wins over other formats
fn select_subtitle_url<'a>(info: &'a VideoInfo, lang: &str) -> Option<&'a str> {
    [&info.subtitles, &info.automatic_captions]
        .into_iter()
        .filter_map(|m| m.as_ref()?.get(lang))
        .find_map(|formats| {
            formats
                .iter()
                .find(|f| f.ext.as_deref() == Some("vtt") && f.url.is_some())
                .or_else(|| formats.iter().find(|f| f.url.is_some()))
                .and_then(|f| f.url.as_deref())
        })
}
