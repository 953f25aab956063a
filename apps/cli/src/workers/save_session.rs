use std::sync::Arc;

use videosum_core::{
    events::{EnrichedEvent, EventBus, expect},
    queues::QueueKind,
    workers::{InputSpec, SubscriptionSpec, Worker},
};

use crate::{
    context::AppContext,
    workers::events::{ArtifactGenerated, SessionSaved},
};

pub struct SaveSessionWorker {
    ctx: Arc<AppContext>,
}

impl SaveSessionWorker {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }
}

impl Worker for SaveSessionWorker {
    const SUBSCRIBER_ID: &'static str = "session.save";

    fn subscription() -> SubscriptionSpec {
        SubscriptionSpec {
            subscriber_id: Self::SUBSCRIBER_ID,
            inputs: vec![InputSpec::new(
                ArtifactGenerated::EVENT_TYPE,
                QueueKind::FifoDropOldest { capacity: 4 },
            )],
        }
    }

    async fn handle(&mut self, event: Arc<EnrichedEvent>, bus: &EventBus) -> anyhow::Result<()> {
        let req = expect::<ArtifactGenerated>(&event.event, ArtifactGenerated::EVENT_TYPE)?;
        let path = self.ctx.store.save(&req.session).await?;

        bus.publish(Arc::new(SessionSaved::new(
            event.event.event_id(),
            req.session.clone(),
            req.task,
            path,
        )));
        Ok(())
    }
}
