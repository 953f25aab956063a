use std::{path::PathBuf, sync::Arc};

use tokio::sync::oneshot;
use videosum_core::{
    Session,
    events::{EnrichedEvent, EventBus, downcast_ref},
    queues::QueueKind,
    workers::{InputSpec, PipelineFailed, SubscriptionSpec, Worker},
};

use crate::workers::events::{SessionSaved, Task};

pub struct Finished {
    pub session: Session,
    pub task: Option<Task>,
    pub path: PathBuf,
}

pub type Completion = Result<Finished, PipelineFailed>;

/// Resolves the run with the first saved session or the first failure.
pub struct CliCompletionSinkWorker {
    done: Option<oneshot::Sender<Completion>>,
}

impl CliCompletionSinkWorker {
    pub fn new(done: oneshot::Sender<Completion>) -> Self {
        Self { done: Some(done) }
    }

    fn finish(&mut self, outcome: Completion) {
        if let Some(done) = self.done.take() {
            // the receiver is gone once the CLI has been interrupted
            let _ = done.send(outcome);
        }
    }
}

impl Worker for CliCompletionSinkWorker {
    const SUBSCRIBER_ID: &'static str = "cli.completion_sink";

    fn subscription() -> SubscriptionSpec {
        SubscriptionSpec {
            subscriber_id: Self::SUBSCRIBER_ID,
            inputs: vec![
                InputSpec::new(SessionSaved::EVENT_TYPE, QueueKind::Isolated { output_buffer: 4 }),
                InputSpec::new(
                    PipelineFailed::EVENT_TYPE,
                    QueueKind::FifoDropOldest { capacity: 4 },
                ),
            ],
        }
    }

    async fn handle(&mut self, event: Arc<EnrichedEvent>, _bus: &EventBus) -> anyhow::Result<()> {
        if let Some(saved) = downcast_ref::<SessionSaved>(&event.event) {
            self.finish(Ok(Finished {
                session: saved.session.clone(),
                task: saved.task,
                path: saved.path.clone(),
            }));
        }

        if let Some(failed) = downcast_ref::<PipelineFailed>(&event.event) {
            self.finish(Err(failed.clone()));
        }
        Ok(())
    }
}
