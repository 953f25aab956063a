use std::fmt;

use serde::Serialize;
use uuid::Uuid;
use videosum_core::{
    ArticleType,
    events::{Event, EventHeader, Persistence},
};

/// What to generate once the transcript is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "article_type", rename_all = "lowercase")]
pub enum Task {
    Brief,
    Detail,
    Article(ArticleType),
    Translate,
}

impl Task {
    /// Tasks that need a completion endpoint. DeepL translation does not.
    pub fn needs_llm(&self, deepl: bool) -> bool {
        !matches!(self, Task::Translate) || !deepl
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Brief => f.write_str("brief summary"),
            Task::Detail => f.write_str("detailed summary"),
            Task::Article(ty) => write!(f, "{ty} article"),
            Task::Translate => f.write_str("translation"),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Submission {
    pub url: String,
    pub task: Option<Task>,
    pub language: String,
    pub custom_prompt: Option<String>,
    /// Ignore a cached transcript.
    pub force: bool,
}

#[derive(Serialize)]
pub struct SubmissionRequested {
    pub header: EventHeader,
    pub submission: Submission,
}

impl SubmissionRequested {
    pub const EVENT_TYPE: &'static str = "submission.requested";

    pub fn new(submission: Submission) -> Self {
        Self {
            header: EventHeader::root(),
            submission,
        }
    }
}

impl Event for SubmissionRequested {
    fn event_id(&self) -> Uuid {
        self.header.event_id
    }

    fn parent_ids(&self) -> &[Uuid] {
        &self.header.parent_ids
    }

    fn event_type(&self) -> &'static str {
        Self::EVENT_TYPE
    }

    fn timestamp(&self) -> std::time::SystemTime {
        self.header.timestamp
    }

    fn persistence(&self) -> Persistence {
        Persistence::Cold
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self as &dyn std::any::Any
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_deepl_translation_skips_the_llm() {
        assert!(Task::Brief.needs_llm(true));
        assert!(Task::Article(ArticleType::Xhs).needs_llm(true));
        assert!(Task::Translate.needs_llm(false));
        assert!(!Task::Translate.needs_llm(true));
    }
}
