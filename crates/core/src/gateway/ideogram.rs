use serde_json::{Value, json};

use crate::gateway::{GatewayClient, GatewayError};

pub fn request_body(prompt: &str) -> Value {
    json!({
        "image_request": {
            "model": "V_2",
            "magic_prompt_option": "AUTO",
            "aspect_ratio": "ASPECT_1_1",
            "prompt": prompt,
            "style_type": "REALISTIC",
            "negative_prompt": "painting",
            "seed": 12345,
        }
    })
}

/// Request one square image and return its URL, if the service produced one.
pub async fn generate_image(gateway: &GatewayClient, prompt: &str) -> Result<Option<String>, GatewayError> {
    let response = gateway.post("ideogram/generate", &request_body(prompt)).await?;
    Ok(response["data"][0]["url"]
        .as_str()
        .filter(|u| !u.is_empty())
        .map(str::to_string))
}
