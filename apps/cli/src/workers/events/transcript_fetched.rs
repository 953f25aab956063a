use serde::Serialize;
use uuid::Uuid;
use videosum_core::{
    Session,
    events::{Event, EventHeader},
};

use crate::workers::events::Task;

/// A session with subtitles, ready for generation. Also published directly
/// for sessions loaded from the store.
#[derive(Serialize)]
pub struct TranscriptFetched {
    pub header: EventHeader,
    pub session: Session,
    pub task: Option<Task>,
    /// The subtitles came from the local cache.
    pub cached: bool,
}

impl TranscriptFetched {
    pub const EVENT_TYPE: &'static str = "transcript.fetched";

    pub fn new(header: EventHeader, session: Session, task: Option<Task>, cached: bool) -> Self {
        Self {
            header,
            session,
            task,
            cached,
        }
    }
}

impl Event for TranscriptFetched {
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

    fn as_any(&self) -> &dyn std::any::Any {
        self as &dyn std::any::Any
    }
}
