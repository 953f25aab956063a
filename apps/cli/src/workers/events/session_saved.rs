use std::path::PathBuf;

use serde::Serialize;
use uuid::Uuid;
use videosum_core::{
    Session,
    events::{Event, EventHeader, Persistence},
};

use crate::workers::events::Task;

#[derive(Serialize)]
pub struct SessionSaved {
    pub header: EventHeader,
    #[serde(skip)]
    pub session: Session,
    pub session_id: String,
    pub task: Option<Task>,
    pub path: PathBuf,
}

impl SessionSaved {
    pub const EVENT_TYPE: &'static str = "session.saved";

    pub fn new(parent_event_id: Uuid, session: Session, task: Option<Task>, path: PathBuf) -> Self {
        Self {
            header: EventHeader::child_of(parent_event_id),
            session_id: session.id.clone(),
            session,
            task,
            path,
        }
    }
}

impl Event for SessionSaved {
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
