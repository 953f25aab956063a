//! Subtitle translation through the completion model or DeepL.

use std::{
    collections::HashMap,
    sync::{Arc, LazyLock},
};

use futures_util::{StreamExt, TryStreamExt, stream};
use regex::Regex;
use tracing::{debug, error, info};

use crate::{
    error::{Result, VideosumError},
    gateway::{GatewayClient, deepl},
    llm::{CompletionClient, CompletionRequest},
    prompts::{PromptLanguage, fill_prompt, summary},
    types::Subtitle,
};

const LLM_BATCH: usize = 50;
const LLM_IN_FLIGHT: usize = 10;
const LLM_ATTEMPTS: usize = 3;
const DEEPL_BATCH: usize = 100;
const DEEPL_IN_FLIGHT: usize = 5;

static OUTPUT_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<output_text>(.*?)</output_text>").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationProgress {
    pub done: usize,
    pub total: usize,
}

impl TranslationProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.done * 100 / self.total) as u8
    }
}

#[derive(Clone)]
pub enum TranslationBackend {
    Llm(Arc<dyn CompletionClient>),
    Deepl(GatewayClient),
}

pub async fn translate_subtitles(
    backend: &TranslationBackend,
    subtitles: &[Subtitle],
    target_language: &str,
    on_progress: &mut (dyn FnMut(TranslationProgress) + Send),
) -> Result<Vec<Subtitle>> {
    if subtitles.is_empty() {
        return Err(VideosumError::NoSubtitles);
    }
    let translated = match backend {
        TranslationBackend::Llm(client) => {
            translate_with_llm(client.as_ref(), subtitles, target_language, on_progress).await?
        }
        TranslationBackend::Deepl(gateway) => {
            translate_with_deepl(gateway, subtitles, target_language, on_progress).await?
        }
    };
    info!(count = translated.len(), target_language, "subtitles translated");
    Ok(translated)
}

/// Each batch as an owned copy.
fn owned_batches(subtitles: &[Subtitle], size: usize) -> Vec<Vec<Subtitle>> {
    subtitles.chunks(size).map(<[Subtitle]>::to_vec).collect()
}

/// `{index} {text}` per line, the shape the translation prompt works on.
pub fn batch_content(batch: &[Subtitle]) -> String {
    batch
        .iter()
        .map(|s| format!("{} {}", s.index, s.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pull the translated lines out of a model answer. Falls back to the input
/// when the model says no translation is needed.
pub fn extract_translation(raw: &str, batch_content: &str) -> Result<Vec<String>> {
    let text = OUTPUT_TEXT
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(raw);

    let text = if text.to_uppercase().contains("<NO_NEED>") {
        batch_content.to_string()
    } else {
        text.lines()
            .filter(|line| !line.starts_with("```"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    if lines.len() < batch_content.split('\n').count() {
        return Err(VideosumError::Translation {
            reason: "Number of translated lines is less than input lines".to_string(),
        });
    }
    if !lines[0].starts_with(|c: char| c.is_ascii_digit()) {
        lines.remove(0);
    }
    Ok(lines)
}

/// Map numbered lines back onto the source subtitles' timing.
pub fn apply_translation(
    lines: &[String],
    source: &HashMap<usize, &Subtitle>,
) -> Result<Vec<Subtitle>> {
    lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let (index, text) = line.split_once(' ').unwrap_or((line.as_str(), ""));
            let original = index
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|i| source.get(&i))
                .ok_or_else(|| VideosumError::Translation {
                    reason: format!("unmatched translated line: {line}"),
                })?;
            Ok(Subtitle {
                text: text.to_string(),
                ..(*original).clone()
            })
        })
        .collect()
}

async fn translate_llm_batch(
    client: &dyn CompletionClient,
    batch: Vec<Subtitle>,
    target_language: &str,
    source: &HashMap<usize, &Subtitle>,
) -> Result<Vec<Subtitle>> {
    let content = batch_content(&batch);
    let prompt = fill_prompt(
        summary::translation(PromptLanguage::from_tag(target_language)),
        &[("targetLanguage", target_language), ("content", &content)],
    );
    let request = CompletionRequest::prompt(prompt).with_temperature(0.0);

    let mut attempt = 1;
    loop {
        let result = async {
            let raw = client.complete(&request).await?;
            let lines = extract_translation(&raw, &content)?;
            apply_translation(&lines, source)
        }
        .await;

        match result {
            Ok(translated) => return Ok(translated),
            Err(e) if attempt < LLM_ATTEMPTS => {
                error!(attempt, max = LLM_ATTEMPTS, error = %e, "translation batch failed, retrying");
                attempt += 1;
            }
            Err(e) => {
                error!(attempt, error = %e, "translation batch failed");
                return Err(e);
            }
        }
    }
}

async fn translate_with_llm(
    client: &dyn CompletionClient,
    subtitles: &[Subtitle],
    target_language: &str,
    on_progress: &mut (dyn FnMut(TranslationProgress) + Send),
) -> Result<Vec<Subtitle>> {
    let source: HashMap<usize, &Subtitle> = subtitles.iter().map(|s| (s.index, s)).collect();
    let total = subtitles.len().div_ceil(LLM_BATCH);
    let mut progress = TranslationProgress { done: 0, total };

    let source = &source;
    let mut batches = stream::iter(owned_batches(subtitles, LLM_BATCH))
        .map(|batch| translate_llm_batch(client, batch, target_language, source))
        .buffer_unordered(LLM_IN_FLIGHT);

    let mut translated = Vec::with_capacity(subtitles.len());
    while let Some(batch) = batches.try_next().await? {
        translated.extend(batch);
        progress.done += 1;
        debug!(done = progress.done, total, "translation batch done");
        on_progress(progress);
    }

    translated.sort_by_key(|s| s.index);
    Ok(translated)
}

async fn translate_with_deepl(
    gateway: &GatewayClient,
    subtitles: &[Subtitle],
    target_language: &str,
    on_progress: &mut (dyn FnMut(TranslationProgress) + Send),
) -> Result<Vec<Subtitle>> {
    let total = subtitles.len().div_ceil(DEEPL_BATCH);
    let mut progress = TranslationProgress { done: 0, total };

    let mut batches = stream::iter(owned_batches(subtitles, DEEPL_BATCH))
        .map(|batch| async move {
            let texts: Vec<String> = batch.iter().map(|s| s.text.clone()).collect();
            let translations = deepl::translate_texts(gateway, &texts, target_language).await?;
            Ok::<_, VideosumError>(
                batch
                    .into_iter()
                    .zip(translations)
                    .map(|(s, text)| Subtitle { text, ..s })
                    .collect::<Vec<_>>(),
            )
        })
        .buffered(DEEPL_IN_FLIGHT);

    let mut translated = Vec::with_capacity(subtitles.len());
    while let Some(batch) = batches.try_next().await? {
        translated.extend(batch);
        progress.done += 1;
        on_progress(progress);
    }
    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subs() -> Vec<Subtitle> {
        vec![
            Subtitle::new(0, 0.0, 1.0, "hello"),
            Subtitle::new(1, 1.0, 2.5, "world"),
        ]
    }

    #[test]
    fn output_text_block_is_preferred() {
        let raw = "Sure!\n<output_text>\n0 bonjour\n1 le monde\n</output_text>";
        let lines = extract_translation(raw, "0 hello\n1 world").unwrap();
        assert_eq!(lines, vec!["0 bonjour", "1 le monde"]);
    }

    #[test]
    fn no_need_passes_the_source_through() {
        let lines = extract_translation("<no_need>", "0 hello\n1 world").unwrap();
        assert_eq!(lines, vec!["0 hello", "1 world"]);
    }

    #[test]
    fn short_answers_are_rejected() {
        assert!(extract_translation("0 bonjour", "0 hello\n1 world").is_err());
    }

    #[test]
    fn fenced_answers_are_unwrapped() {
        let lines = extract_translation("```text\n0 a\n1 b\n```", "0 x\n1 y").unwrap();
        assert_eq!(lines, vec!["0 a", "1 b"]);
    }

    #[test]
    fn translated_lines_keep_source_timing() {
        let subs = subs();
        let source: HashMap<usize, &Subtitle> = subs.iter().map(|s| (s.index, s)).collect();
        let lines = vec!["1 le monde".to_string(), String::new(), "0 bonjour".to_string()];
        let out = apply_translation(&lines, &source).unwrap();
        assert_eq!(out[0].index, 1);
        assert_eq!(out[0].start, 1.0);
        assert_eq!(out[0].end, 2.5);
        assert_eq!(out[1].text, "bonjour");

        assert!(apply_translation(&["7 nope".to_string()], &source).is_err());
    }

    #[test]
    fn progress_percent() {
        assert_eq!(TranslationProgress { done: 1, total: 3 }.percent(), 33);
        assert_eq!(TranslationProgress { done: 0, total: 0 }.percent(), 100);
    }
}
