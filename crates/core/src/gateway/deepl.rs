use serde_json::{Value, json};

use crate::{
    error::{Result, VideosumError},
    gateway::GatewayClient,
};

pub fn request_body(texts: &[String], target_lang: &str) -> Value {
    json!({
        "source_lang": "",
        "target_lang": target_lang.to_uppercase(),
        "text": texts,
    })
}

/// Pull the translated texts out of a DeepL response, which must have one
/// translation per input.
pub fn parse_translations(response: &Value, expected: usize) -> Result<Vec<String>> {
    let translations = response["translations"]
        .as_array()
        .filter(|t| t.len() == expected)
        .ok_or_else(|| VideosumError::Translation {
            reason: "Number of translations does not match original subtitles".to_string(),
        })?;

    translations
        .iter()
        .map(|t| {
            t["text"]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| VideosumError::Translation {
                    reason: "translation entry without text".to_string(),
                })
        })
        .collect()
}

pub async fn translate_texts(
    gateway: &GatewayClient,
    texts: &[String],
    target_lang: &str,
) -> Result<Vec<String>> {
    let response = gateway
        .post("deepl/v2/translate", &request_body(texts, target_lang))
        .await
        .map_err(|e| VideosumError::Translation {
            reason: e.to_string(),
        })?;
    parse_translations(&response, texts.len())
}
