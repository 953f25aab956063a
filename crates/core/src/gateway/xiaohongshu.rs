use serde_json::Value;
use tracing::error;

use crate::{
    error::PlatformError,
    gateway::{GatewayClient, response_code},
    platform::Platform,
};

const PLATFORM: Platform = Platform::Xiaohongshu;

#[derive(Debug, Clone, PartialEq)]
pub struct XhsNote {
    pub video_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

pub fn validate(response: &Value) -> Result<XhsNote, PlatformError> {
    let outer = response_code(response);
    let inner = response["data"]["code"].as_i64();
    if outer != Some(0) || inner != Some(0) {
        let err = PlatformError::new(PLATFORM, "API request failed");
        return Err(match outer {
            Some(code) => err.with_code(code),
            None => err,
        });
    }

    let item = response["data"]["data"]["data"]
        .get(0)
        .ok_or_else(|| PlatformError::new(PLATFORM, "No note data found in response"))?;
    let note = item["note_list"]
        .get(0)
        .ok_or_else(|| PlatformError::new(PLATFORM, "No note found in response"))?;
    let video_url = note["video"]["url"]
        .as_str()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| PlatformError::new(PLATFORM, "No video URL found in response"))?;

    let text = |v: &Value| v.as_str().filter(|s| !s.is_empty()).map(str::to_string);
    Ok(XhsNote {
        video_url: video_url.to_string(),
        title: text(&note["title"]),
        description: text(&note["desc"]),
        thumbnail: text(&note["video"]["thumbnail"]),
    })
}

pub async fn fetch_note(gateway: &GatewayClient, note_id: &str) -> Result<XhsNote, PlatformError> {
    if note_id.is_empty() {
        return Err(PlatformError::new(PLATFORM, "Missing note ID"));
    }
    if !gateway.has_api_key() {
        return Err(PlatformError::new(PLATFORM, "Missing API key"));
    }

    let result = gateway
        .get("tools/xiaohongshu/web/get_note_info", &[("note_id", note_id)])
        .await
        .map_err(|e| e.into_platform(PLATFORM))
        .and_then(|response| validate(&response));

    if let Err(e) = &result {
        error!(note_id, error = %e.message, "Xiaohongshu video URL retrieval failed");
    }
    result
}
