use serde::Serialize;
use uuid::Uuid;
use videosum_core::{
    MediaKind, VideoInfo,
    events::{Event, EventHeader},
};

use crate::workers::events::Submission;

#[derive(Serialize)]
pub struct MediaResolved {
    pub header: EventHeader,
    pub submission: Submission,
    pub media_kind: MediaKind,
    /// `None` for audio files.
    pub info: Option<VideoInfo>,
}

impl MediaResolved {
    pub const EVENT_TYPE: &'static str = "media.resolved";

    pub fn new(
        parent_event_id: Uuid,
        submission: Submission,
        media_kind: MediaKind,
        info: Option<VideoInfo>,
    ) -> Self {
        Self {
            header: EventHeader::child_of(parent_event_id),
            submission,
            media_kind,
            info,
        }
    }
}

impl Event for MediaResolved {
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
