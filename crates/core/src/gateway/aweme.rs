//! Douyin and TikTok share the `aweme` response shape.

use serde_json::Value;
use tracing::{error, warn};

use crate::{
    error::PlatformError,
    gateway::{GatewayClient, code_ok, response_code},
    platform::Platform,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AwemeVideo {
    pub play_url: String,
    pub audio_url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

pub fn validate(platform: Platform, response: &Value) -> Result<AwemeVideo, PlatformError> {
    if !code_ok(response) {
        let err = PlatformError::new(platform, "API request failed");
        return Err(match response_code(response) {
            Some(code) => err.with_code(code),
            None => err,
        });
    }

    let details = response["data"]["aweme_details"]
        .get(0)
        .filter(|d| !d.is_null())
        .ok_or_else(|| PlatformError::new(platform, "No video details found in response"))?;

    let play_url = details["video"]["play_addr"]["url_list"][0]
        .as_str()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| PlatformError::new(platform, "No video URL found in response"))?;

    let text = |v: &Value| v.as_str().filter(|s| !s.is_empty()).map(str::to_string);
    Ok(AwemeVideo {
        play_url: play_url.to_string(),
        audio_url: text(&details["music"]["play_url"]["url_list"][0]),
        title: text(&details["share_info"]["share_title"]),
        description: text(&details["share_info"]["share_desc"]),
    })
}

fn require(platform: Platform, share_url: &str, gateway_key: bool) -> Result<(), PlatformError> {
    if share_url.is_empty() {
        return Err(PlatformError::new(platform, "Missing video ID"));
    }
    if !gateway_key {
        return Err(PlatformError::new(platform, "Missing API key"));
    }
    Ok(())
}

/// Douyin needs the aweme id resolved from the share URL first.
pub async fn fetch_douyin(gateway: &GatewayClient, share_url: &str) -> Result<AwemeVideo, PlatformError> {
    let platform = Platform::Douyin;
    require(platform, share_url, gateway.has_api_key())?;

    let result = async {
        let aweme_id = match gateway
            .get("tools/douyin/web/get_aweme_id", &[("url", share_url)])
            .await
        {
            Ok(response) => response["data"].as_str().map(str::to_string),
            Err(e) => {
                warn!(share_url, error = %e, "aweme id lookup failed");
                None
            }
        }
        .filter(|id| !id.is_empty())
        .ok_or_else(|| PlatformError::new(platform, "Failed to get aweme ID"))?;

        let response = gateway
            .get(
                "tools/douyin/web/fetch_one_video_v2",
                &[("aweme_id", aweme_id.as_str())],
            )
            .await
            .map_err(|e| e.into_platform(platform))?;
        validate(platform, &response)
    }
    .await;

    if let Err(e) = &result {
        error!(share_url, error = %e.message, "Douyin video URL retrieval failed");
    }
    result
}

pub async fn fetch_tiktok(gateway: &GatewayClient, share_url: &str) -> Result<AwemeVideo, PlatformError> {
    let platform = Platform::Tiktok;
    require(platform, share_url, gateway.has_api_key())?;

    let result = gateway
        .get(
            "tools/tiktok/app/v3/fetch_one_video_by_share_url",
            &[("share_url", share_url)],
        )
        .await
        .map_err(|e| e.into_platform(platform))
        .and_then(|response| validate(platform, &response));

    if let Err(e) = &result {
        error!(share_url, error = %e.message, "TikTok video URL retrieval failed");
    }
    result
}
