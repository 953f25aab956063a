use std::any::Any;

use serde::Serialize;
use uuid::Uuid;

use crate::events::{Event, EventHeader, Persistence};

/// A worker could not handle an event. `stage` is the worker's subscriber id.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineFailed {
    pub header: EventHeader,
    pub stage: &'static str,
    pub message: String,
}

impl PipelineFailed {
    pub const EVENT_TYPE: &'static str = "pipeline.failed";

    pub fn new(cause: &dyn Event, stage: &'static str, message: impl Into<String>) -> Self {
        Self {
            header: EventHeader::child_of(cause.event_id()),
            stage,
            message: message.into(),
        }
    }
}

impl Event for PipelineFailed {
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

    fn as_any(&self) -> &dyn Any {
        self as &dyn Any
    }
}
