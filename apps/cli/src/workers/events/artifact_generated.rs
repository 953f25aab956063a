use serde::Serialize;
use uuid::Uuid;
use videosum_core::{
    Session,
    events::{Event, EventHeader, Persistence},
};

use crate::workers::events::Task;

/// The session after its task ran. `task` is `None` when nothing was
/// requested and the session only needs saving.
#[derive(Serialize)]
pub struct ArtifactGenerated {
    pub header: EventHeader,
    pub session: Session,
    pub task: Option<Task>,
}

impl ArtifactGenerated {
    pub const EVENT_TYPE: &'static str = "artifact.generated";

    pub fn new(parent_event_id: Uuid, session: Session, task: Option<Task>) -> Self {
        Self {
            header: EventHeader::child_of(parent_event_id),
            session,
            task,
        }
    }
}

impl Event for ArtifactGenerated {
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
