use std::sync::LazyLock;

use regex::Regex;

use crate::types::Subtitle;

static LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```.*\n").expect("valid regex"));
static TRAILING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?```\s*$").expect("valid regex"));

/// Format seconds as MM:SS timestamp. Minutes are not wrapped into hours.
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Format seconds as HH:MM:SS,mmm
pub fn format_subtitle_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60,
        ms
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Vtt,
    Srt,
    Txt,
}

impl SubtitleFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::Vtt => "vtt",
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Txt => "txt",
        }
    }
}

pub fn format_subtitles(subtitles: &[Subtitle], format: SubtitleFormat) -> String {
    match format {
        SubtitleFormat::Vtt => {
            let mut out = String::from("WEBVTT\n\n");
            for sub in subtitles {
                out.push_str(&format!(
                    "{} --> {}\n{}\n\n",
                    format_subtitle_timestamp(sub.start),
                    format_subtitle_timestamp(sub.end),
                    sub.text
                ));
            }
            out
        }
        SubtitleFormat::Srt => subtitles
            .iter()
            .enumerate()
            .map(|(i, sub)| {
                format!(
                    "{}\n{} --> {}\n{}\n\n",
                    i + 1,
                    format_subtitle_timestamp(sub.start),
                    format_subtitle_timestamp(sub.end),
                    sub.text
                )
            })
            .collect(),
        SubtitleFormat::Txt => crate::types::subtitle_lines(subtitles),
    }
}

/// Remove a markdown code fence wrapped around a model answer.
pub fn strip_code_fences(text: &str) -> String {
    let text = text.trim();
    let text = LEADING_FENCE.replace(text, "");
    TRAILING_FENCE.replace(&text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(65.9), "01:05");
        assert_eq!(format_timestamp(3725.0), "62:05");
        assert_eq!(format_subtitle_timestamp(3725.25), "01:02:05,250");
        assert_eq!(format_subtitle_timestamp(59.9996), "00:01:00,000");
    }

    #[test]
    fn exports_vtt_and_srt() {
        let subs = vec![
            Subtitle::new(0, 0.0, 1.5, "Hello"),
            Subtitle::new(1, 1.5, 3.0, "World"),
        ];
        assert_eq!(
            format_subtitles(&subs, SubtitleFormat::Vtt),
            "WEBVTT\n\n00:00:00,000 --> 00:00:01,500\nHello\n\n00:00:01,500 --> 00:00:03,000\nWorld\n\n"
        );
        let srt = format_subtitles(&subs, SubtitleFormat::Srt);
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:01,500\nHello\n\n2\n"));
        assert_eq!(format_subtitles(&subs, SubtitleFormat::Txt), "Hello\nWorld");
    }

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_fences("```markdown\n# Title\n```"), "# Title");
        assert_eq!(strip_code_fences("  plain  "), "plain");
        assert_eq!(strip_code_fences("```\n```"), "");
    }
}
