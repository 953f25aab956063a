use serde::Serialize;
use uuid::Uuid;
use videosum_core::events::{Event, EventHeader, Persistence};

#[derive(Serialize)]
pub struct GenerationProgressed {
    pub header: EventHeader,
    pub label: String,
    /// 0 to 100.
    pub percent: f32,
}

impl GenerationProgressed {
    pub const EVENT_TYPE: &'static str = "generation.progressed";

    pub fn new(parent_event_id: Uuid, label: impl Into<String>, percent: f32) -> Self {
        Self {
            header: EventHeader::child_of(parent_event_id),
            label: label.into(),
            percent: percent.clamp(0.0, 100.0),
        }
    }
}

impl Event for GenerationProgressed {
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
        Persistence::None
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self as &dyn std::any::Any
    }
}
