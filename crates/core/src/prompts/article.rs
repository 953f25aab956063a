//! Article prompts. Every style is described once and rendered into both the
//! per-chunk prompt and the merge prompt.

use super::PromptLanguage;
use crate::types::ArticleType;

struct ArticleStyle {
    role: &'static str,
    task: &'static str,
    guidelines: &'static [&'static str],
    structure: &'static str,
    merge_guidelines: &'static [&'static str],
}

const REGULAR: ArticleStyle = ArticleStyle {
    role: "Article Writer",
    task: "Turn the video section into a well-structured article.",
    guidelines: &[
        "Write a headline that makes people want to read on",
        "Open with a short hook and the context",
        "Split the body into logical sections with smooth transitions",
        "Quote the speaker where it adds weight, with the timestamp",
        "Close with a clear conclusion",
    ],
    structure: "# [Headline]\n\n## Introduction\n[Hook and context]\n\n## [Section title]\n[Body, 3 to 5 sections]\n\n## Conclusion\n[Closing thoughts]",
    merge_guidelines: &[
        "Build one narrative out of all sections",
        "Remove repeated information",
        "Keep tone and style consistent",
        "Keep the important quotes",
    ],
};

fn style(ty: ArticleType) -> ArticleStyle {
    match ty {
        ArticleType::List => ArticleStyle {
            role: "List Article Writer",
            task: "Turn the video section into an engaging list article.",
            guidelines: &[
                "Write a headline that announces the list",
                "Introduce the topic in two or three sentences",
                "Give every point a sub-heading and concrete details",
                "Reference timestamps where relevant",
                "Finish with a brief conclusion",
            ],
            structure: "# [List headline]\n\n## Introduction\n[Context and hook]\n\n## Main points\n1. [Point]\n   - details\n   - time reference\n\n## Conclusion\n[Wrap-up]",
            merge_guidelines: &[
                "Number the points continuously across all sections",
                "Drop duplicate points",
                "Keep the strongest examples",
            ],
        },
        ArticleType::Regular | ArticleType::Custom => REGULAR,
        ArticleType::Timeline => ArticleStyle {
            role: "Timeline Writer",
            task: "Describe the video section as a chronological sequence of events.",
            guidelines: &[
                "Order events by time",
                "Start every entry with its timestamp",
                "Explain how each event leads to the next",
                "Highlight turning points",
            ],
            structure: "# [Title]\n\n## Overview\n[What the timeline covers]\n\n## Timeline\n### [MM:SS] [Event]\n[What happened and why it matters]\n\n## Takeaways\n[Patterns across the timeline]",
            merge_guidelines: &[
                "Keep one chronological order across all sections",
                "Merge entries that describe the same event",
                "Keep every timestamp",
            ],
        },
        ArticleType::Brief => ArticleStyle {
            role: "News Brief Writer",
            task: "Write a short, dense brief of the video section.",
            guidelines: &[
                "Lead with the single most important fact",
                "Use short paragraphs",
                "Stay neutral and factual",
                "Keep only what a busy reader needs",
            ],
            structure: "# [Headline]\n\n[Lead paragraph]\n\n## Key facts\n- [fact]\n\n## Why it matters\n[One paragraph]",
            merge_guidelines: &[
                "Keep the result short",
                "Pick the strongest lead from all sections",
                "Collapse the key facts into one list",
            ],
        },
        ArticleType::Summary => ArticleStyle {
            role: "Summary Writer",
            task: "Summarize the video section for someone who has not watched it.",
            guidelines: &[
                "State the main argument first",
                "Group supporting points by theme",
                "Keep the speaker's conclusions and caveats",
                "Avoid opinions that are not in the source",
            ],
            structure: "# [Title]\n\n## Main idea\n[One paragraph]\n\n## Key points\n### [Theme]\n- point\n\n## Conclusion\n[What the speaker concludes]",
            merge_guidelines: &[
                "Produce one main idea for the whole video",
                "Group key points by theme across sections",
                "Remove repetition",
            ],
        },
        ArticleType::Tutorial => ArticleStyle {
            role: "Tutorial Writer",
            task: "Turn the video section into a step-by-step tutorial.",
            guidelines: &[
                "List prerequisites first",
                "Write one action per numbered step",
                "Add tips and common mistakes",
                "Reference the timestamp where each step is shown",
            ],
            structure: "# [How to ...]\n\n## What you need\n- item\n\n## Steps\n1. [Step] (MM:SS)\n   [Explanation]\n\n## Tips\n- tip\n\n## Summary\n[What the reader can now do]",
            merge_guidelines: &[
                "Number the steps continuously",
                "Merge duplicate prerequisites and tips",
                "Keep the steps in the order they are performed",
            ],
        },
        ArticleType::Press => ArticleStyle {
            role: "Press Release Writer",
            task: "Write a press release based on the video section.",
            guidelines: &[
                "Put who, what, when and where in the first paragraph",
                "Use a formal third-person voice",
                "Include at least one attributed quote",
                "End with background information",
            ],
            structure: "# [Headline]\n## [Sub-headline]\n\n[Lead paragraph]\n\n[Body paragraphs]\n\n> \"[Quote]\" said [speaker]\n\n## About\n[Background]",
            merge_guidelines: &[
                "Keep a single lead paragraph",
                "Keep the strongest quotes",
                "Stay formal throughout",
            ],
        },
        ArticleType::Podcast => ArticleStyle {
            role: "Podcast Show Notes Writer",
            task: "Write show notes for the video section as if it were a podcast episode.",
            guidelines: &[
                "Summarize the episode in a short paragraph",
                "List the topics with timestamps",
                "Pull out memorable quotes",
                "Mention resources or names that came up",
            ],
            structure: "# [Episode title]\n\n## In this episode\n[Summary]\n\n## Topics\n- [MM:SS] [Topic]\n\n## Quotes\n> [Quote]\n\n## Mentioned\n- [Resource]",
            merge_guidelines: &[
                "Write one episode summary",
                "Keep every topic timestamp in order",
                "Deduplicate quotes and resources",
            ],
        },
        ArticleType::Quotes => ArticleStyle {
            role: "Quote Curator",
            task: "Collect the most meaningful quotes from the video section.",
            guidelines: &[
                "Quote the exact words",
                "Add the timestamp to every quote",
                "Explain briefly why each quote matters",
                "Group quotes by theme",
            ],
            structure: "# [Title]\n\n## [Theme]\n> \"[Quote]\" (MM:SS)\n\n[Why it matters]\n\n## Closing thoughts\n[One paragraph]",
            merge_guidelines: &[
                "Keep the best quotes across all sections",
                "Group them by theme",
                "Keep every timestamp",
            ],
        },
        ArticleType::Xhs => ArticleStyle {
            role: "Xiaohongshu Note Writer",
            task: "Turn the video section into material for a Xiaohongshu note.",
            guidelines: &[
                "Use a warm, conversational tone",
                "Start paragraphs with a fitting emoji",
                "Keep practical tips and personal angles",
                "Suggest hashtags at the end",
            ],
            structure: "[Catchy title with emoji]\n\n[Body with emoji-led paragraphs]\n\n#tag #tag #tag",
            merge_guidelines: &[],
        },
    }
}

fn numbered(items: &[&str]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{}. {line}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt for one chunk. Placeholders: `timeRange`, `contentType`,
/// `targetLength`, `sectionContent`, `targetLanguage`.
pub fn base_prompt(ty: ArticleType) -> String {
    let style = style(ty);
    format!(
        "# Role: {role}\n\n## Task\n{task}\nWrite in {{{{targetLanguage}}}}.\n\n## Context\nTime period: {{{{timeRange}}}}\nContent type: {{{{contentType}}}}\nTarget length: {{{{targetLength}}}} words\n\n## Guidelines\n{guidelines}\n\n## Required structure\n{structure}\n\n## Input section\n{{{{sectionContent}}}}\n",
        role = style.role,
        task = style.task,
        guidelines = numbered(style.guidelines),
        structure = style.structure,
    )
}

/// Prompt merging all chunk outputs. Placeholder: `chunks`.
pub fn merge_prompt(ty: ArticleType) -> String {
    if ty == ArticleType::Xhs {
        return XHS_MERGE.to_string();
    }
    let style = style(ty);
    let mut guidelines = style.merge_guidelines.to_vec();
    guidelines.extend(["Make the transitions between merged sections smooth", "Keep the structure below"]);
    format!(
        "# Role: {role} (merging)\n\n## Task\nMerge the article sections below into one cohesive article. Write it in the language of the sections.\n\n## Guidelines\n{guidelines}\n\n## Required structure\n{structure}\n\n## Input sections\n{{{{chunks}}}}\n",
        role = style.role,
        guidelines = numbered(&guidelines),
        structure = style.structure,
    )
}

/// System prompt used for the Xiaohongshu merge stage.
pub fn xhs_system_prompt(lang: PromptLanguage) -> &'static str {
    match lang {
        PromptLanguage::En => EN_XHS_SYSTEM,
        PromptLanguage::Zh => ZH_XHS_SYSTEM,
        PromptLanguage::Ja => JA_XHS_SYSTEM,
    }
}

/// Turns article hashtags into an image generation prompt. Placeholder: `text`.
pub const GEN_IMAGE_PROMPT: &str = r#"
Rewrite the keywords below into a detailed prompt for an image generation model.
Describe the subject first and give it the most weight. Add concrete visual
details when the keywords are thin. Describe only what is visible: no opening
phrases such as "This image shows", no words about mood, values or atmosphere,
nothing vague.

Keywords:<text>
{{text}}
</text>
Answer in English, plain text, with nothing but the prompt."#;

const XHS_MERGE: &str = r#"
Turn the content below into a Xiaohongshu note and answer in this shape:

1. First line: a catchy title with emoji
2. An empty line
3. The body, 600 to 800 words, emoji-led paragraphs
4. An empty line
5. Hashtags, each starting with #

Requirements:
1. The title must make people want to click
2. Informative content in easy language
3. Two or three points that invite comments
4. Hashtags cover core words, related words and trending terms

Content:
{{chunks}}
"#;

const EN_XHS_SYSTEM: &str = r#"
You are an expert Xiaohongshu copywriter who turns ordinary content into viral notes.

Title:
- At most 20 words with 2 to 4 fitting emoji
- Promise a concrete benefit or warn about a concrete loss
- Spoken style, leave some suspense

Body:
- Open with the reader's pain point or a vivid scene
- Start every paragraph with an emoji
- Bold the key content, use blank lines generously
- Warm, personal tone with questions to the reader

Hashtags:
- One or two each of core, long-tail, high-intent and trending tags

Avoid sounding like an advertisement or a machine.
"#;

const ZH_XHS_SYSTEM: &str = r#"
你是小红书爆款文案专家，擅长把普通内容改写成爆款笔记。

标题：
- 不超过 20 字，带 2 到 4 个相关表情
- 给出具体好处或提醒具体损失
- 口语化，制造悬念

正文：
- 以读者痛点或生动场景开头
- 每段以表情开头
- 重点内容加粗，多用空行
- 语气亲切，加入个人经历和互动提问

标签：
- 核心词、长尾词、高转化词、热搜词各一到两个

避免过度营销和机器感。
"#;

const JA_XHS_SYSTEM: &str = r#"
あなたは小紅書のバズる投稿を書くコピーライターです。普通の内容を人気ノートに書き換えます。

タイトル：
- 20 文字以内、関連する絵文字を 2〜4 個
- 具体的なメリット、または具体的な損失を示す
- 話し言葉で、続きが気になるように

本文：
- 読者の悩みや具体的な場面から始める
- 各段落の先頭に絵文字
- 重要な部分は太字、空行を多めに
- 親しみやすい口調で、読者への問いかけを入れる

ハッシュタグ：
- コア、ロングテール、購買意欲、トレンドの各タグを 1〜2 個

宣伝臭さや機械的な文章は避けてください。
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::fill_prompt;

    #[test]
    fn base_prompts_fill_completely() {
        for ty in ArticleType::ALL {
            let prompt = fill_prompt(
                &base_prompt(ty),
                &[
                    ("timeRange", "00:00-05:00"),
                    ("contentType", "video"),
                    ("targetLength", "40"),
                    ("sectionContent", "hello"),
                    ("targetLanguage", "en"),
                ],
            );
            assert!(!prompt.contains("{{"), "{ty}: {prompt}");
            assert!(prompt.contains("Target length: 40 words"));
        }
    }

    #[test]
    fn merge_prompts_take_chunks() {
        for ty in ArticleType::ALL {
            let prompt = fill_prompt(&merge_prompt(ty), &[("chunks", "A\n\n---\n\nB")]);
            assert!(prompt.contains("A\n\n---\n\nB"), "{ty}");
        }
    }
}
