use std::{path::PathBuf, sync::Arc};

use tracing::warn;
use videosum_core::{
    events::{EnrichedEvent, EventBus, journal},
    queues::QueueKind,
    workers::{InputSpec, PipelineFailed, SubscriptionSpec, Worker},
};

use crate::workers::events::{
    ArtifactGenerated, MediaResolved, SessionSaved, SubmissionRequested, TranscriptFetched,
};

/// Appends every persistable pipeline event to a JSON-lines file.
pub struct JournalWorker {
    path: PathBuf,
}

impl JournalWorker {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Worker for JournalWorker {
    const SUBSCRIBER_ID: &'static str = "journal.append";

    fn subscription() -> SubscriptionSpec {
        let fifo = QueueKind::FifoDropOldest { capacity: 16 };
        SubscriptionSpec {
            subscriber_id: Self::SUBSCRIBER_ID,
            inputs: [
                SubmissionRequested::EVENT_TYPE,
                MediaResolved::EVENT_TYPE,
                TranscriptFetched::EVENT_TYPE,
                ArtifactGenerated::EVENT_TYPE,
                SessionSaved::EVENT_TYPE,
                PipelineFailed::EVENT_TYPE,
            ]
            .into_iter()
            .map(|event_type| InputSpec::new(event_type, fifo))
            .collect(),
        }
    }

    async fn handle(&mut self, event: Arc<EnrichedEvent>, _bus: &EventBus) -> anyhow::Result<()> {
        // a broken journal must not fail the run
        if let Err(e) = journal::append(&self.path, &event).await {
            warn!(path = %self.path.display(), error = %e, "journal append failed");
        }
        Ok(())
    }
}
