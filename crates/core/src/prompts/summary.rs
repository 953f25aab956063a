use super::PromptLanguage;

/// Single-prompt template for subtitle translation. Placeholders:
/// `targetLanguage`, `content`.
pub fn translation(lang: PromptLanguage) -> &'static str {
    match lang {
        PromptLanguage::En => EN_TRANSLATION,
        PromptLanguage::Zh => ZH_TRANSLATION,
        PromptLanguage::Ja => JA_TRANSLATION,
    }
}

/// System prompt for the mind-map shaped brief summary.
pub fn brief(lang: PromptLanguage) -> &'static str {
    match lang {
        PromptLanguage::En => EN_BRIEF,
        PromptLanguage::Zh => ZH_BRIEF,
        PromptLanguage::Ja => JA_BRIEF,
    }
}

/// Stage one of the detailed summary: subtitles to narrative. Placeholder:
/// `subtitle`.
pub fn detail_narrative(lang: PromptLanguage) -> &'static str {
    match lang {
        PromptLanguage::En => EN_DETAIL_P1,
        PromptLanguage::Zh => ZH_DETAIL_P1,
        PromptLanguage::Ja => JA_DETAIL_P1,
    }
}

/// Stage two: narrative to outline. Placeholder: `subtitle`.
pub fn detail_outline(lang: PromptLanguage) -> &'static str {
    match lang {
        PromptLanguage::En => EN_DETAIL_P2,
        PromptLanguage::Zh => ZH_DETAIL_P2,
        PromptLanguage::Ja => JA_DETAIL_P2,
    }
}

/// Stage three: subtitles plus outline to the final summary. Placeholders:
/// `subtitle`, `outline`.
pub fn detail_summary(lang: PromptLanguage) -> &'static str {
    match lang {
        PromptLanguage::En => EN_DETAIL_P3,
        PromptLanguage::Zh => ZH_DETAIL_P3,
        PromptLanguage::Ja => JA_DETAIL_P3,
    }
}

const EN_TRANSLATION: &str = r#"
# Role: Video Subtitle Translator

You translate video subtitles while keeping their tone, idioms and brevity.

## Rules
1. Every input line has the form "{index} {content}". Keep that form.
2. Keep every index. Never merge or split lines.
3. If the subtitles are already in the target language, answer only <NO_NEED>.
4. Keep translations short enough to read on screen.
5. Wrap the whole answer in <output_text></output_text>.

## Example
<input_text>
0 hello world
1 how are you, my friend?
</input_text>

<output_text>
0 [translation of line 0]
1 [translation of line 1]
</output_text>

Translate the following subtitles into {{targetLanguage}}:
<input_text>
{{content}}
</input_text>
"#;

const ZH_TRANSLATION: &str = r#"
# 角色：视频字幕翻译

你负责翻译视频字幕，保留原有语气、习语和简洁性。

## 规则
1. 每一行输入的格式为"{index} {content}"，输出保持相同格式。
2. 保留所有行号，不合并、不拆分行。
3. 如果字幕已经是目标语言，只回答 <NO_NEED>。
4. 译文长度应适合在屏幕上阅读。
5. 将完整答案放在 <output_text></output_text> 中。

## 示例
<input_text>
0 hello world
1 how are you, my friend?
</input_text>

<output_text>
0 你好，世界
1 你好吗，我的朋友？
</output_text>

请将以下字幕翻译成{{targetLanguage}}：
<input_text>
{{content}}
</input_text>
"#;

const JA_TRANSLATION: &str = r#"
# 役割：動画字幕翻訳者

動画の字幕を、口調・慣用表現・簡潔さを保ったまま翻訳します。

## ルール
1. 入力の各行は「{index} {content}」形式です。同じ形式で出力してください。
2. 行番号はすべて保持し、行の結合や分割はしないでください。
3. 字幕がすでに目的の言語である場合は <NO_NEED> のみを返してください。
4. 画面で読める長さに訳してください。
5. 回答全体を <output_text></output_text> で囲んでください。

## 例
<input_text>
0 hello world
1 how are you, my friend?
</input_text>

<output_text>
0 こんにちは、世界
1 元気かい、友よ？
</output_text>

次の字幕を{{targetLanguage}}に翻訳してください：
<input_text>
{{content}}
</input_text>
"#;

const EN_BRIEF: &str = r#"
# Role: Video Summarizer

## Task
Summarize the video as a hierarchy that renders well as a mind map.
Write the summary in {{targetLanguage}}.

## Rules
- Headings and bullet points only, no tables or code blocks
- Short, concrete points
- Consistent heading levels

## Structure
# Main topic
[One line on what the video is about]

## Key points
### [Point]
- detail
- context
[3 to 6 points]

## Questions worth discussing
### [Question]
- angle
- angle
[2 to 3 questions]
"#;

const ZH_BRIEF: &str = r#"
# 角色：视频总结专家

## 任务
将视频内容整理成适合思维导图展示的层级结构总结。
使用{{targetLanguage}}撰写。

## 规则
- 只使用标题和项目符号，不使用表格或代码块
- 要点简短具体
- 标题层级保持一致

## 结构
# 主题
[一句话说明视频内容]

## 核心要点
### [要点]
- 细节
- 背景
[3 到 6 个要点]

## 值得讨论的问题
### [问题]
- 角度
- 角度
[2 到 3 个问题]
"#;

const JA_BRIEF: &str = r#"
# 役割：動画要約の専門家

## タスク
動画の内容をマインドマップとして表示しやすい階層構造で要約してください。
{{targetLanguage}}で書いてください。

## ルール
- 見出しと箇条書きのみを使用し、表やコードブロックは使わない
- 要点は短く具体的に
- 見出しの階層を統一する

## 構成
# メインテーマ
[動画の内容を一文で]

## 主なポイント
### [ポイント]
- 詳細
- 背景
[3〜6 項目]

## 議論したい問い
### [問い]
- 観点
- 観点
[2〜3 項目]
"#;

const EN_DETAIL_P1: &str = r#"
# Role: Transcript Editor

## Task
Rewrite the subtitles below as a coherent written narrative in {{targetLanguage}}.

## Rules
1. Keep every important detail and claim
2. Turn spoken phrasing into written prose
3. Order the information logically
4. Do not add facts that are not in the subtitles

## Subtitles
{{subtitle}}
"#;

const ZH_DETAIL_P1: &str = r#"
# 角色：文字稿编辑

## 任务
将下面的字幕改写成连贯的{{targetLanguage}}书面叙述。

## 规则
1. 保留所有重要细节和观点
2. 将口语表达转为书面语
3. 按逻辑顺序组织信息
4. 不添加字幕中没有的事实

## 字幕
{{subtitle}}
"#;

const JA_DETAIL_P1: &str = r#"
# 役割：書き起こし編集者

## タスク
以下の字幕を、{{targetLanguage}}の一貫した文章に書き直してください。

## ルール
1. 重要な詳細と主張はすべて残す
2. 話し言葉を書き言葉にする
3. 情報を論理的な順序に並べる
4. 字幕にない事実を加えない

## 字幕
{{subtitle}}
"#;

const EN_DETAIL_P2: &str = r#"
# Role: Outline Writer

## Task
Produce a structured outline of the text below.

## Format
1. Numbered items (1., 1.1) with at most two levels
2. One short line per item
3. Descriptive section titles

## Text
{{subtitle}}
"#;

const ZH_DETAIL_P2: &str = r#"
# 角色：大纲撰写专家

## 任务
为下面的文本生成结构化大纲。

## 格式
1. 使用数字编号（1.、1.1），最多两层
2. 每项一行，简明扼要
3. 章节标题具有描述性

## 文本
{{subtitle}}
"#;

const JA_DETAIL_P2: &str = r#"
# 役割：アウトライン作成者

## タスク
以下の文章の構造化されたアウトラインを作成してください。

## 形式
1. 番号付き（1.、1.1）で最大 2 階層
2. 各項目は短く 1 行で
3. 内容がわかる見出し

## 文章
{{subtitle}}
"#;

const EN_DETAIL_P3: &str = r#"
# Role: Detailed Summary Writer

## Task
Write a complete, hierarchical summary of the video in {{targetLanguage}},
following the outline and using the subtitles for detail. It is rendered as a
mind map, so use headings and bullet points only.

## Structure
# Main topic
## Background
## Key concepts
### [Concept]
- main point
- supporting detail or example
## Analysis
## Conclusion

## Subtitles
{{subtitle}}

## Outline
{{outline}}
"#;

const ZH_DETAIL_P3: &str = r#"
# 角色：详细总结撰写专家

## 任务
依照大纲并结合字幕细节，用{{targetLanguage}}撰写完整的层级式视频总结。
结果将以思维导图展示，只使用标题和项目符号。

## 结构
# 主题
## 背景
## 核心概念
### [概念]
- 主要观点
- 支持细节或示例
## 分析
## 结论

## 字幕
{{subtitle}}

## 大纲
{{outline}}
"#;

const JA_DETAIL_P3: &str = r#"
# 役割：詳細要約ライター

## タスク
アウトラインに沿い、字幕の詳細を使って、{{targetLanguage}}で動画の完全な階層型要約を書いてください。
マインドマップとして表示されるため、見出しと箇条書きのみを使用してください。

## 構成
# メインテーマ
## 背景
## 主要な概念
### [概念]
- 要点
- 補足や例
## 分析
## 結論

## 字幕
{{subtitle}}

## アウトライン
{{outline}}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::fill_prompt;

    #[test]
    fn every_language_has_the_translation_placeholders() {
        for lang in [PromptLanguage::En, PromptLanguage::Zh, PromptLanguage::Ja] {
            let filled = fill_prompt(
                translation(lang),
                &[("targetLanguage", "fr"), ("content", "0 hi")],
            );
            assert!(!filled.contains("{{"), "{lang:?}");
            assert!(filled.contains("0 hi"));
        }
    }

    #[test]
    fn detail_summary_takes_subtitles_and_outline() {
        let filled = fill_prompt(
            detail_summary(PromptLanguage::En),
            &[("targetLanguage", "en"), ("subtitle", "SUBS"), ("outline", "OUTLINE")],
        );
        let subs = filled.find("SUBS").unwrap();
        let outline = filled.find("OUTLINE").unwrap();
        assert!(subs < outline);
    }
}
