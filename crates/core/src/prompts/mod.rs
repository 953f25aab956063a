//! Prompt templates and placeholder substitution.
//!
//! Templates use `{{key}}` placeholders. Keys without a value are left in
//! place so a template can be filled in more than one pass.

pub mod article;
pub mod summary;

use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("valid regex"));

/// Languages with their own prompt set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptLanguage {
    En,
    Zh,
    Ja,
}

impl PromptLanguage {
    /// Pick a prompt set from a language tag such as `zh-CN` or `ja`.
    /// Anything unknown gets English.
    pub fn from_tag(tag: &str) -> Self {
        let prefix: String = tag.trim().chars().take(2).collect::<String>().to_lowercase();
        match prefix.as_str() {
            "zh" => PromptLanguage::Zh,
            "ja" => PromptLanguage::Ja,
            _ => PromptLanguage::En,
        }
    }
}

/// Replace every `{{key}}` that has a non-empty value in `placeholders`.
pub fn fill_prompt(template: &str, placeholders: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let key = &caps[1];
            placeholders
                .iter()
                .find(|(k, v)| *k == key && !v.is_empty())
                .map(|(_, v)| v.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
