use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::{
    error::{Result, VideosumError},
    gateway::{GatewayClient, code_ok},
    types::Subtitle,
};

/// Subtitles for one submission plus whatever metadata the transcript
/// service knows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub id: Option<String>,
    pub title: Option<String>,
    pub cover: Option<String>,
    pub subtitles: Vec<Subtitle>,
}

impl Transcript {
    /// Reject empty transcripts and lines that end before they start.
    pub fn validate(&self) -> Result<()> {
        if self.subtitles.is_empty() {
            return Err(VideosumError::NoSubtitles);
        }
        if let Some(bad) = self.subtitles.iter().find(|s| !s.is_well_formed()) {
            return Err(VideosumError::InvalidSubtitle {
                index: bad.index,
                start: bad.start,
                end: bad.end,
            });
        }
        Ok(())
    }
}

pub fn parse(url: &str, response: &Value) -> Result<Transcript> {
    let failed = |reason: String| VideosumError::TranscriptFailed {
        url: url.to_string(),
        reason,
    };

    if !code_ok(response) {
        return Err(failed(format!("unexpected response code {}", response["code"])));
    }
    let detail = &response["detail"];
    let subtitles: Vec<Subtitle> = serde_json::from_value(detail["subtitlesArray"].clone())
        .map_err(|e| failed(format!("malformed subtitles: {e}")))?;

    let text = |v: &Value| match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };
    let transcript = Transcript {
        id: text(&detail["id"]),
        title: text(&detail["title"]),
        cover: text(&detail["cover"]),
        subtitles,
    };
    transcript.validate()?;
    Ok(transcript)
}

pub async fn fetch_transcript(gateway: &GatewayClient, url: &str) -> Result<Transcript> {
    let response = gateway
        .get("tools/transcript", &[("url", url)])
        .await
        .map_err(|e| {
            error!(url, error = %e, "transcript request failed");
            VideosumError::TranscriptFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

    let transcript = parse(url, &response)?;
    info!(url, subtitles = transcript.subtitles.len(), "transcript fetched");
    Ok(transcript)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_subtitles_and_metadata() {
        let response = json!({
            "code": 200,
            "detail": {
                "id": 42,
                "title": "Talk",
                "subtitlesArray": [
                    {"index": 0, "startTime": 0.0, "end": 1.2, "text": "hi", "speaker_id": 0},
                    {"index": 1, "startTime": 1.2, "end": 3.0, "text": "there"}
                ]
            }
        });
        let transcript = parse("https://v", &response).unwrap();
        assert_eq!(transcript.id.as_deref(), Some("42"));
        assert_eq!(transcript.title.as_deref(), Some("Talk"));
        assert_eq!(transcript.cover, None);
        assert_eq!(transcript.subtitles.len(), 2);
    }

    #[test]
    fn rejects_reversed_times() {
        let response = json!({
            "code": 0,
            "detail": {"subtitlesArray": [{"index": 7, "startTime": 5.0, "end": 4.0, "text": "x"}]}
        });
        assert!(matches!(
            parse("https://v", &response),
            Err(VideosumError::InvalidSubtitle { index: 7, .. })
        ));
    }

    #[test]
    fn empty_transcript_is_an_error() {
        let response = json!({"code": 0, "detail": {"subtitlesArray": []}});
        assert!(matches!(
            parse("https://v", &response),
            Err(VideosumError::NoSubtitles)
        ));
    }
}
