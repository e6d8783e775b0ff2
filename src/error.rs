use thiserror::Error;

/// Failure of a single caption source, or of the whole chain
#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("no captions available for video {video_id}")]
    Unavailable { video_id: String },

    #[error("caption request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not parse caption data: {0}")]
    Parse(String),

    #[error("{tool} failed: {reason}")]
    Tool { tool: String, reason: String },

    #[error(
        "Could not retrieve a transcript for video {video_id}. This is most likely caused by subtitles being disabled for this video."
    )]
    NoTranscript { video_id: String },
}

/// Failure talking to the chat-completion endpoint
#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("{env_var} environment variable is not set")]
    MissingApiKey { env_var: String },

    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("received empty response from API after {attempts} attempts")]
    EmptyResponse { attempts: u32 },

    #[error("error while calling the API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected API response format: {0}")]
    MalformedResponse(String),
}

impl SummaryError {
    pub fn kind(&self) -> &'static str {
        match self {
            SummaryError::MissingApiKey { .. } => "missing_api_key",
            SummaryError::Api { .. } => "api_error",
            SummaryError::EmptyResponse { .. } => "empty_response",
            SummaryError::Transport(_) => "transport",
            SummaryError::MalformedResponse(_) => "malformed_response",
        }
    }
}

/// Failure of one URL-to-summary request
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid URL format")]
    InvalidUrl { input: String },

    #[error(transparent)]
    Captions(#[from] CaptionError),

    #[error(transparent)]
    Summary(#[from] SummaryError),
}

impl ServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::InvalidUrl { .. } => "invalid_url",
            ServiceError::Captions(_) => "no_transcript",
            ServiceError::Summary(e) => e.kind(),
        }
    }
}
