use std::sync::Arc;

use anyhow::Result;
use tokio::sync::broadcast;
use tracing::{debug, error};

use crate::{
    events::{EnrichedEvent, EventBus},
    workers::{PipelineFailed, SubscriptionSpec, WorkerBatch, WorkerInputs},
};

/// A subscriber that owns its state and handles one event at a time.
/// A handler error is published as `pipeline.failed` and the worker carries
/// on with its next event.
pub trait Worker: Send + Sized + 'static {
    const SUBSCRIBER_ID: &'static str;

    fn subscription() -> SubscriptionSpec;

    fn handle(
        &mut self,
        event: Arc<EnrichedEvent>,
        bus: &EventBus,
    ) -> impl Future<Output = Result<()>> + Send;

    fn run(
        mut self,
        mut inputs: WorkerInputs,
        bus: Arc<EventBus>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> impl Future<Output = Result<()>> + Send {
        async move {
            loop {
                let batch = tokio::select! {
                    _ = shutdown.recv() => {
                        debug!(worker = Self::SUBSCRIBER_ID, "shutting down");
                        return Ok(());
                    }
                    batch = inputs.next() => batch,
                };

                let events = match batch {
                    WorkerBatch::Snapshots(updates) => {
                        updates.into_iter().map(|u| u.event).collect::<Vec<_>>()
                    }
                    WorkerBatch::FifoItem { event, .. } => vec![event],
                };

                for event in events {
                    let parent = Arc::clone(&event.event);
                    if let Err(e) = self.handle(event, &bus).await {
                        error!(worker = Self::SUBSCRIBER_ID, error = %e, "handler failed");
                        bus.publish(Arc::new(PipelineFailed::new(
                            parent.as_ref(),
                            Self::SUBSCRIBER_ID,
                            format!("{e:#}"),
                        )));
                    }
                }
            }
        }
    }
}
