use std::sync::Arc;

use tracing::info;
use videosum_core::{
    MediaKind,
    events::{EnrichedEvent, EventBus, expect},
    queues::QueueKind,
    workers::{InputSpec, SubscriptionSpec, Worker},
};

use crate::{
    context::AppContext,
    workers::events::{MediaResolved, SubmissionRequested},
};

/// Decides what a submitted URL is and looks up its platform metadata.
pub struct ResolveMediaWorker {
    ctx: Arc<AppContext>,
}

impl ResolveMediaWorker {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }
}

impl Worker for ResolveMediaWorker {
    const SUBSCRIBER_ID: &'static str = "media.resolve";

    fn subscription() -> SubscriptionSpec {
        SubscriptionSpec {
            subscriber_id: Self::SUBSCRIBER_ID,
            inputs: vec![InputSpec::new(
                SubmissionRequested::EVENT_TYPE,
                QueueKind::FifoDropOldest { capacity: 4 },
            )],
        }
    }

    async fn handle(&mut self, event: Arc<EnrichedEvent>, bus: &EventBus) -> anyhow::Result<()> {
        let req = expect::<SubmissionRequested>(&event.event, SubmissionRequested::EVENT_TYPE)?;
        let url = req.submission.url.trim();
        let resolver = &self.ctx.resolver;

        let media_kind = resolver.detect_media(url).await?;
        let info = match media_kind {
            MediaKind::Video(_) => Some(resolver.resolve_video_info(url).await?),
            MediaKind::Audio(_) => None,
        };
        info!(%media_kind, url, "media resolved");

        bus.publish(Arc::new(MediaResolved::new(
            event.event.event_id(),
            req.submission.clone(),
            media_kind,
            info,
        )));
        Ok(())
    }
}
