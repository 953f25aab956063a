use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::{Result, VideosumError},
    llm::{
        CompletionRequest,
        sse::{SseDecoder, SseEvent},
    },
    provider::ProviderConfig,
    stop::StopHandle,
};

/// Receives streamed text as it arrives.
pub type DeltaSink<'s> = dyn for<'a> FnMut(&'a str) + Send + 's;

/// Text generation backend. `stream` reports each delta as it arrives and
/// returns the full text; it gives up with `Cancelled` at the next delta once
/// `stop` fires.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    async fn stream(
        &self,
        request: &CompletionRequest,
        on_delta: &mut DeltaSink<'_>,
        stop: &StopHandle,
    ) -> Result<String>;
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl OpenAiCompatClient {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn send(&self, request: &CompletionRequest, stream: bool) -> Result<reqwest::Response> {
        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": request.wire_messages(),
            "stream": stream,
        });
        if let Some(temperature) = request.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }

        debug!(
            model = %self.config.model,
            messages = request.messages.len(),
            stream,
            "completion request"
        );

        let response = self
            .http
            .post(&self.config.api_url)
            .header("Content-Type", "application/json")
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(%status, "completion request rejected");
            return Err(VideosumError::Completion {
                reason: format!("{status}: {text}"),
            });
        }
        Ok(response)
    }
}

fn api_error(value: &Value) -> Option<VideosumError> {
    let error = value.get("error")?;
    let message = error["message"].as_str().unwrap_or("unknown error");
    Some(VideosumError::Completion {
        reason: message.to_string(),
    })
}

fn parse_delta(data: &str) -> Result<Option<String>> {
    let value: Value = serde_json::from_str(data)?;
    if let Some(err) = api_error(&value) {
        return Err(err);
    }
    Ok(value["choices"][0]["delta"]["content"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string))
}

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let response = self.send(request, false).await?.json::<Value>().await?;
        if let Some(err) = api_error(&response) {
            return Err(err);
        }

        response["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| VideosumError::Completion {
                reason: format!("Invalid API response structure: {response}"),
            })
    }

    async fn stream(
        &self,
        request: &CompletionRequest,
        on_delta: &mut DeltaSink<'_>,
        stop: &StopHandle,
    ) -> Result<String> {
        if stop.is_stopped() {
            return Err(VideosumError::Cancelled);
        }

        let response = tokio::select! {
            _ = stop.stopped() => return Err(VideosumError::Cancelled),
            response = self.send(request, true) => response?,
        };
        let mut body = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        let mut text = String::new();

        let mut handle = |event: SseEvent, text: &mut String| -> Result<bool> {
            match event {
                SseEvent::Done => Ok(true),
                SseEvent::Data(data) => {
                    if let Some(delta) = parse_delta(&data)? {
                        on_delta(&delta);
                        text.push_str(&delta);
                    }
                    Ok(false)
                }
            }
        };

        loop {
            let chunk = tokio::select! {
                _ = stop.stopped() => return Err(VideosumError::Cancelled),
                chunk = body.next() => chunk,
            };
            let Some(chunk) = chunk else { break };

            for event in decoder.push(&chunk?) {
                if handle(event, &mut text)? {
                    return Ok(text);
                }
            }
        }

        if let Some(event) = decoder.finish() {
            handle(event, &mut text)?;
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_parsing() {
        let data = r#"{"choices":[{"delta":{"content":"Hel"}}]}"#;
        assert_eq!(parse_delta(data).unwrap().as_deref(), Some("Hel"));

        let role_only = r#"{"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_delta(role_only).unwrap(), None);

        let err = r#"{"error":{"message":"quota exceeded"}}"#;
        assert!(matches!(
            parse_delta(err),
            Err(VideosumError::Completion { reason }) if reason == "quota exceeded"
        ));
    }
}
