//! Brief (mind-map shaped) and three-stage detailed summaries.

use tracing::{debug, info};

use crate::{
    error::{Result, VideosumError},
    format::strip_code_fences,
    llm::{CompletionClient, CompletionRequest},
    prompts::{PromptLanguage, fill_prompt, summary},
    types::{Subtitle, subtitle_lines},
};

fn non_empty(text: String, stage: &'static str) -> Result<String> {
    let text = strip_code_fences(&text);
    if text.trim().is_empty() {
        return Err(VideosumError::EmptyCompletion { stage });
    }
    Ok(text)
}

pub async fn generate_brief(
    client: &dyn CompletionClient,
    title: &str,
    subtitles: &[Subtitle],
    language: &str,
) -> Result<String> {
    let lang = PromptLanguage::from_tag(language);
    let system = fill_prompt(summary::brief(lang), &[("targetLanguage", language)]);
    let prompt = format!(
        "Video Title: {title}\nVideo Subtitles:\n{}",
        subtitle_lines(subtitles)
    );

    let text = client
        .complete(&CompletionRequest::prompt(prompt).with_system(system))
        .await?;
    info!(len = text.len(), "brief summary generated");
    non_empty(text, "brief")
}

/// Narrative, then outline of the narrative, then the detailed summary from
/// the subtitles plus outline. `on_progress` sees 0, 33, 66 and 100.
pub async fn generate_detail(
    client: &dyn CompletionClient,
    subtitles: &[Subtitle],
    language: &str,
    on_progress: &mut (dyn FnMut(u8) + Send),
) -> Result<String> {
    let lang = PromptLanguage::from_tag(language);
    let lines = subtitle_lines(subtitles);
    on_progress(0);

    let system = fill_prompt(
        summary::detail_narrative(lang),
        &[("targetLanguage", language), ("subtitle", &lines)],
    );
    let narrative = client
        .complete(&CompletionRequest::prompt(lines.as_str()).with_system(system))
        .await?;
    debug!(len = narrative.len(), "narrative stage done");
    on_progress(33);

    let system = fill_prompt(
        summary::detail_outline(lang),
        &[("targetLanguage", language), ("subtitle", &narrative)],
    );
    let outline = client
        .complete(&CompletionRequest::prompt(narrative.as_str()).with_system(system))
        .await?;
    debug!(len = outline.len(), "outline stage done");
    on_progress(66);

    let system = fill_prompt(
        summary::detail_summary(lang),
        &[
            ("targetLanguage", language),
            ("subtitle", &lines),
            ("outline", &outline),
        ],
    );
    let detail = client
        .complete(&CompletionRequest::prompt(lines.as_str()).with_system(system))
        .await?;
    let detail = non_empty(detail, "detail")?;
    on_progress(100);
    info!(len = detail.len(), "detailed summary generated");
    Ok(detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fences_are_stripped_before_the_empty_check() {
        assert_eq!(non_empty("```markdown\n# A\n```".into(), "brief").unwrap(), "# A");
        assert!(matches!(
            non_empty("```\n```".into(), "brief"),
            Err(VideosumError::EmptyCompletion { stage: "brief" })
        ));
    }
}
