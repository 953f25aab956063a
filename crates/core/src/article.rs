//! Chunked article generation: one streaming completion per subtitle chunk,
//! strictly in order, then a merge completion over all chunk outputs.

use std::{collections::BTreeMap, sync::Arc, sync::LazyLock};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::{
    chunking::{SubtitleChunk, chunk_subtitles},
    error::{Result, VideosumError},
    gateway::{GatewayClient, ideogram},
    llm::{CompletionClient, CompletionRequest},
    prompts::{PromptLanguage, article, fill_prompt},
    stop::StopHandle,
    types::{Article, ArticleChunk, ArticleType, Subtitle},
};

static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[^#\s]+").expect("valid regex"));

const CHUNK_SEPARATOR: &str = "\n\n---\n\n";
const CHUNK_SHARE: f32 = 85.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArticleStage {
    Chunk { index: usize, total: usize },
    Merging,
    Image,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArticleProgress {
    pub stage: ArticleStage,
    pub percent: f32,
}

/// Chunks fill the first 85%. While merging the bar sits halfway through
/// the rest.
pub fn article_percent(completed: usize, total: usize, merging: bool) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let base = completed as f32 / total as f32 * CHUNK_SHARE;
    if merging { base + (100.0 - base) / 2.0 } else { base }
}

#[derive(Debug, Clone)]
pub struct ArticleRequest<'a> {
    pub article_type: ArticleType,
    pub subtitles: &'a [Subtitle],
    pub language: &'a str,
    pub chunk_duration: f64,
    pub custom_prompt: Option<&'a str>,
    pub generate_image: bool,
}

pub struct ArticlePipeline {
    client: Arc<dyn CompletionClient>,
    gateway: Option<GatewayClient>,
}

impl ArticlePipeline {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            gateway: None,
        }
    }

    /// Gateway used for Xiaohongshu cover images.
    pub fn with_gateway(mut self, gateway: GatewayClient) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub async fn generate(
        &self,
        request: &ArticleRequest<'_>,
        stop: &StopHandle,
        on_progress: &mut (dyn FnMut(ArticleProgress) + Send),
    ) -> Result<Article> {
        let chunks = chunk_subtitles(request.subtitles, request.chunk_duration);
        if chunks.is_empty() {
            return Err(VideosumError::NoSubtitles);
        }
        let total = chunks.len();
        info!(article_type = %request.article_type, total, "generating article");

        let mut article = Article::default();
        for (index, chunk) in chunks.iter().enumerate() {
            if stop.is_stopped() {
                return Err(VideosumError::Cancelled);
            }
            on_progress(ArticleProgress {
                stage: ArticleStage::Chunk { index, total },
                percent: article_percent(index, total, false),
            });

            let content = self.generate_chunk(request, chunk, stop).await?;
            debug!(index, len = content.len(), "chunk done");
            article.chunks.insert(
                index,
                ArticleChunk {
                    content,
                    time_range: chunk.time_range(),
                },
            );
        }

        on_progress(ArticleProgress {
            stage: ArticleStage::Merging,
            percent: article_percent(total, total, true),
        });
        let mut merged = self.merge(request, &article.chunks, stop).await?;

        if request.article_type == ArticleType::Xhs && request.generate_image {
            on_progress(ArticleProgress {
                stage: ArticleStage::Image,
                percent: article_percent(total, total, true),
            });
            if let Some(url) = self.cover_image(&merged).await {
                merged = format!("![Generated Image]({url})\n\n{merged}");
            }
        }

        article.merged_content = merged;
        on_progress(ArticleProgress {
            stage: ArticleStage::Done,
            percent: 100.0,
        });
        Ok(article)
    }

    async fn generate_chunk(
        &self,
        request: &ArticleRequest<'_>,
        chunk: &SubtitleChunk,
        stop: &StopHandle,
    ) -> Result<String> {
        let target_length = chunk.target_length().to_string();
        let prompt = fill_prompt(
            &article::base_prompt(request.article_type),
            &[
                ("timeRange", &chunk.time_range()),
                ("contentType", "video"),
                ("targetLength", &target_length),
                ("sectionContent", &chunk.content()),
                ("targetLanguage", request.language),
            ],
        );
        self.client
            .stream(&CompletionRequest::prompt(prompt), &mut |_: &str| {}, stop)
            .await
    }

    async fn merge(
        &self,
        request: &ArticleRequest<'_>,
        chunks: &BTreeMap<usize, ArticleChunk>,
        stop: &StopHandle,
    ) -> Result<String> {
        let joined = chunks
            .values()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join(CHUNK_SEPARATOR);
        let prompt = merge_input(request.article_type, request.custom_prompt, &joined);

        let mut completion = CompletionRequest::prompt(prompt);
        if request.article_type == ArticleType::Xhs {
            let lang = PromptLanguage::from_tag(request.language);
            completion = completion.with_system(article::xhs_system_prompt(lang));
        }
        self.client.stream(&completion, &mut |_: &str| {}, stop).await
    }

    /// Best effort: hashtags become an image prompt, then an image URL.
    async fn cover_image(&self, merged: &str) -> Option<String> {
        let gateway = self.gateway.as_ref()?;
        let keywords = hashtags(merged);
        if keywords.is_empty() {
            return None;
        }

        let request = CompletionRequest::prompt(fill_prompt(
            article::GEN_IMAGE_PROMPT,
            &[("text", &keywords.join(" "))],
        ));
        let image_prompt = match self.client.complete(&request).await {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "image prompt generation failed");
                return None;
            }
        };

        match ideogram::generate_image(gateway, image_prompt.trim()).await {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "image generation failed");
                None
            }
        }
    }
}

pub fn hashtags(text: &str) -> Vec<&str> {
    HASHTAG.find_iter(text).map(|m| m.as_str()).collect()
}

/// Prompt for the merge stage. A custom prompt takes the chunks at
/// `{{chunks}}`, or after a blank line when it has no such placeholder.
pub fn merge_input(ty: ArticleType, custom_prompt: Option<&str>, chunks: &str) -> String {
    match custom_prompt.filter(|p| ty == ArticleType::Custom && !p.trim().is_empty()) {
        Some(custom) if custom.contains("{{chunks}}") => custom.replace("{{chunks}}", chunks),
        Some(custom) => format!("{custom}\n\n{chunks}"),
        None => article::merge_prompt(ty).replace("{{chunks}}", chunks),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_curve() {
        assert_eq!(article_percent(0, 4, false), 0.0);
        assert_eq!(article_percent(2, 4, false), 42.5);
        assert_eq!(article_percent(4, 4, true), 92.5);
        assert_eq!(article_percent(0, 0, true), 0.0);
    }

    #[test]
    fn custom_prompts_take_the_chunks() {
        assert_eq!(
            merge_input(ArticleType::Custom, Some("Sum up: {{chunks}} now"), "A"),
            "Sum up: A now"
        );
        assert_eq!(merge_input(ArticleType::Custom, Some("Sum up"), "A"), "Sum up\n\nA");

        let builtin = merge_input(ArticleType::Custom, None, "A");
        assert!(builtin.contains("\nA\n"));
        assert!(!builtin.contains("{{chunks}}"));

        // only the custom type reads the custom prompt
        let list = merge_input(ArticleType::List, Some("ignored"), "A");
        assert!(!list.contains("ignored"));
    }

    #[test]
    fn finds_hashtags() {
        assert_eq!(
            hashtags("Great trip #travel #food\n#城市 not#tag ##"),
            vec!["#travel", "#food", "#城市", "#tag"]
        );
    }
}
