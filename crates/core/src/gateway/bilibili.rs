use serde_json::Value;
use tracing::error;

use crate::{
    error::PlatformError,
    gateway::{GatewayClient, response_code},
    platform::Platform,
};

const PLATFORM: Platform = Platform::Bilibili;

fn check_code(response: &Value) -> Result<(), PlatformError> {
    match response_code(response) {
        Some(0) => Ok(()),
        code => {
            let message = response["message"]
                .as_str()
                .filter(|m| !m.is_empty())
                .unwrap_or("API request failed");
            let err = PlatformError::new(PLATFORM, message);
            Err(match code {
                Some(code) => err.with_code(code),
                None => err,
            })
        }
    }
}

/// The last `durl` entry is the playable stream.
pub fn validate_play_url(response: &Value) -> Result<String, PlatformError> {
    check_code(response)?;
    response["data"]["durl"]
        .as_array()
        .and_then(|durl| durl.last())
        .and_then(|entry| entry["url"].as_str())
        .map(str::to_string)
        .ok_or_else(|| PlatformError::new(PLATFORM, "No video URL found in response"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct BilibiliInfo {
    pub title: String,
    pub description: Option<String>,
    pub cover: Option<String>,
}

pub fn validate_info(response: &Value) -> Result<BilibiliInfo, PlatformError> {
    check_code(response)?;
    let data = response
        .get("data")
        .filter(|d| d.is_object())
        .ok_or_else(|| PlatformError::new(PLATFORM, "No video info found in response"))?;

    let text = |key: &str| data[key].as_str().filter(|s| !s.is_empty()).map(str::to_string);
    Ok(BilibiliInfo {
        title: text("title").unwrap_or_default(),
        description: text("desc"),
        cover: text("pic"),
    })
}

fn require_id(bvid: &str) -> Result<(), PlatformError> {
    if bvid.is_empty() {
        return Err(PlatformError::new(PLATFORM, "Missing Bilibili video ID"));
    }
    Ok(())
}

pub async fn fetch_play_url(gateway: &GatewayClient, bvid: &str) -> Result<String, PlatformError> {
    require_id(bvid)?;
    let response = gateway
        .get_bilibili("getvideo", &[("bvid", bvid)])
        .await
        .map_err(|e| e.into_platform(PLATFORM))
        .and_then(|r| validate_play_url(&r));
    if let Err(e) = &response {
        error!(bvid, error = %e.message, "Bilibili video URL retrieval failed");
    }
    response
}

pub async fn fetch_info(gateway: &GatewayClient, bvid: &str) -> Result<BilibiliInfo, PlatformError> {
    require_id(bvid)?;
    let response = gateway
        .get_bilibili("info", &[("bvid", bvid)])
        .await
        .map_err(|e| e.into_platform(PLATFORM))
        .and_then(|r| validate_info(&r));
    if let Err(e) = &response {
        error!(bvid, error = %e.message, "Bilibili video info retrieval failed");
    }
    response
}
