use std::time::Duration;

use log::{debug, error, info, warn};
use serde::Serialize;

use crate::config::{API_KEY_ENV, Settings};
use crate::error::SummaryError;
use crate::format::{Emphasis, format_summary};

const SYSTEM_PROMPT: &str = "You are a summarization agent designed to create a powerful, engaging, and chronological \
summary of a video transcription. Keep it concise, social-media friendly, and exciting.";

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1000;
const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

/// Body of a chat-completion request
#[derive(Debug, Clone, Serialize)]
struct SummaryRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

impl<'a> SummaryRequest<'a> {
    fn new(model: &'a str, text: &str) -> Self {
        SummaryRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Summarize the following text: \n{text}"),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

/// Client for an OpenAI-compatible chat-completion endpoint
#[derive(Debug, Clone)]
pub struct Summarizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    retry_delay: Duration,
    emphasis: Emphasis,
}

impl Summarizer {
    pub fn new(client: reqwest::Client, settings: &Settings) -> Self {
        Summarizer {
            client,
            endpoint: format!("{}/v1/chat/completions", settings.api_base),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            retry_delay: settings.retry_delay,
            emphasis: settings.emphasis,
        }
    }

    /// Summarize `text` and return it formatted for HTML.
    ///
    /// Only empty responses are retried, with `retry_delay` between attempts.
    /// A non-success status, transport failure or unparseable body ends the
    /// call immediately.
    pub async fn summarize(&self, text: &str) -> Result<String, SummaryError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            error!("{API_KEY_ENV} not set, cannot summarize");
            SummaryError::MissingApiKey {
                env_var: API_KEY_ENV.to_string(),
            }
        })?;

        let request = SummaryRequest::new(&self.model, text);
        debug!(
            "Summarizing {} chars via {} with model {}",
            text.len(),
            self.endpoint,
            self.model
        );

        for attempt in 1..=MAX_ATTEMPTS {
            let resp = self
                .client
                .post(&self.endpoint)
                .bearer_auth(api_key)
                .json(&request)
                .send()
                .await
                .inspect_err(|e| error!("Completion request failed: {e}"))?;

            let status = resp.status();
            let body = resp.text().await?;
            debug!("Completion response {status}: {body}");

            if !status.is_success() {
                error!("Completion endpoint returned {status}: {body}");
                return Err(SummaryError::Api {
                    status: status.as_u16(),
                    body,
                });
            }

            if body.trim().is_empty() {
                warn!("Empty response from completion endpoint, attempt {attempt} of {MAX_ATTEMPTS}");
                if attempt < MAX_ATTEMPTS {
                    tokio::time::sleep(self.retry_delay).await;
                }
                continue;
            }

            let summary = extract_content(&body)?;
            info!("Summary received ({} chars) on attempt {attempt}", summary.len());
            return Ok(format_summary(&summary, self.emphasis));
        }

        Err(SummaryError::EmptyResponse {
            attempts: MAX_ATTEMPTS,
        })
    }
}

fn extract_content(body: &str) -> Result<String, SummaryError> {
    let json: serde_json::Value =
        serde_json::from_str(body).map_err(|e| SummaryError::MalformedResponse(e.to_string()))?;
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .map(|t| t.to_string())
        .ok_or_else(|| SummaryError::MalformedResponse("missing choices[0].message.content".to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;

    use super::*;
    use crate::config::Config;

    /// Serve `responses` in order from a local completion endpoint; the last one repeats
    async fn mock_endpoint(responses: Vec<(StatusCode, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap| {
                let counter = counter.clone();
                let responses = responses.clone();
                async move {
                    assert_eq!(
                        headers.get("authorization").and_then(|v| v.to_str().ok()),
                        Some("Bearer sk-test")
                    );
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    responses[n.min(responses.len() - 1)]
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (format!("http://{addr}"), hits)
    }

    fn summarizer(api_base: &str, api_key: Option<&str>, retry_delay: Duration) -> Summarizer {
        let mut settings = Settings::resolve(Config::default(), |_| None).unwrap();
        settings.api_base = api_base.to_string();
        settings.api_key = api_key.map(|k| k.to_string());
        settings.retry_delay = retry_delay;
        Summarizer::new(reqwest::Client::new(), &settings)
    }

    const OK_BODY: &str = r#"{"choices":[{"message":{"role":"assistant","content":"Key Takeaways:\n**great** video"}}]}"#;

    #[test]
    fn test_request_body_shape() {
        let request = SummaryRequest::new("deepseek-chat", "hello");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "deepseek-chat");
        assert_eq!(json["max_tokens"], 1000);
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(json["messages"][0]["role"], "system");
        assert!(json["messages"][0]["content"].as_str().unwrap().contains("chronological"));
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "Summarize the following text: \nhello");
    }

    #[test]
    fn test_extract_content() {
        assert_eq!(extract_content(OK_BODY).unwrap(), "Key Takeaways:\n**great** video");
    }

    #[test]
    fn test_extract_content_empty_choices() {
        assert!(matches!(
            extract_content(r#"{"choices": []}"#),
            Err(SummaryError::MalformedResponse(_))
        ));
        assert!(matches!(
            extract_content("not json"),
            Err(SummaryError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key_makes_no_request() {
        let (base, hits) = mock_endpoint(vec![(StatusCode::OK, OK_BODY)]).await;
        let err = summarizer(&base, None, Duration::ZERO).summarize("text").await.unwrap_err();
        assert!(matches!(err, SummaryError::MissingApiKey { .. }));
        assert_eq!(err.to_string(), "DEEPSEEK_API_KEY environment variable is not set");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_is_formatted() {
        let (base, hits) = mock_endpoint(vec![(StatusCode::OK, OK_BODY)]).await;
        let summary = summarizer(&base, Some("sk-test"), Duration::ZERO)
            .summarize("text")
            .await
            .unwrap();
        assert_eq!(summary, "<h2>Key Takeaways:</h2><br><strong>great<strong> video");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_responses_are_retried() {
        let delay = Duration::from_millis(200);
        let (base, hits) = mock_endpoint(vec![
            (StatusCode::OK, ""),
            (StatusCode::OK, ""),
            (StatusCode::OK, OK_BODY),
        ])
        .await;
        let started = Instant::now();
        let summary = summarizer(&base, Some("sk-test"), delay)
            .summarize("text")
            .await
            .unwrap();
        let elapsed = started.elapsed();
        assert_eq!(summary, "<h2>Key Takeaways:</h2><br><strong>great<strong> video");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        // two waits, no third
        assert!(elapsed >= delay * 2, "elapsed {elapsed:?}");
        assert!(elapsed < delay * 3, "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn test_empty_responses_exhaust_attempts() {
        let delay = Duration::from_millis(200);
        let (base, hits) = mock_endpoint(vec![(StatusCode::OK, "  \n")]).await;
        let started = Instant::now();
        let err = summarizer(&base, Some("sk-test"), delay)
            .summarize("text")
            .await
            .unwrap_err();
        let elapsed = started.elapsed();
        assert!(matches!(err, SummaryError::EmptyResponse { attempts: 3 }));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        // no sleep after the final empty response
        assert!(elapsed >= delay * 2, "elapsed {elapsed:?}");
        assert!(elapsed < delay * 3, "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn test_error_status_is_not_retried() {
        let (base, hits) = mock_endpoint(vec![
            (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded"),
            (StatusCode::OK, OK_BODY),
        ])
        .await;
        let err = summarizer(&base, Some("sk-test"), Duration::ZERO)
            .summarize("text")
            .await
            .unwrap_err();
        match err {
            SummaryError::Api { status, ref body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_is_not_retried() {
        let (base, hits) = mock_endpoint(vec![(StatusCode::OK, "{\"choices\": []}")]).await;
        let err = summarizer(&base, Some("sk-test"), Duration::ZERO)
            .summarize("text")
            .await
            .unwrap_err();
        assert!(matches!(err, SummaryError::MalformedResponse(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = summarizer(&format!("http://{addr}"), Some("sk-test"), Duration::ZERO)
            .summarize("text")
            .await
            .unwrap_err();
        assert!(matches!(err, SummaryError::Transport(_)));
        assert_eq!(err.kind(), "transport");
    }
}
