use std::sync::Arc;

use tracing::{debug, warn};
use videosum_core::{
    Session,
    cache::{get_cache_dir, load_transcript, save_transcript},
    events::{EnrichedEvent, EventBus, EventHeader, expect},
    gateway::transcript::fetch_transcript,
    queues::QueueKind,
    workers::{InputSpec, SubscriptionSpec, Worker},
};

use crate::{
    context::AppContext,
    workers::events::{MediaResolved, TranscriptFetched},
};

/// Loads subtitles from the cache or the transcript gateway and opens a
/// session for them.
pub struct FetchTranscriptWorker {
    ctx: Arc<AppContext>,
}

impl FetchTranscriptWorker {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }
}

impl Worker for FetchTranscriptWorker {
    const SUBSCRIBER_ID: &'static str = "transcript.fetch";

    fn subscription() -> SubscriptionSpec {
        SubscriptionSpec {
            subscriber_id: Self::SUBSCRIBER_ID,
            inputs: vec![InputSpec::new(
                MediaResolved::EVENT_TYPE,
                QueueKind::FifoDropOldest { capacity: 4 },
            )],
        }
    }

    async fn handle(&mut self, event: Arc<EnrichedEvent>, bus: &EventBus) -> anyhow::Result<()> {
        let req = expect::<MediaResolved>(&event.event, MediaResolved::EVENT_TYPE)?;
        let submission = &req.submission;
        let cache_dir = get_cache_dir(&submission.url);

        let cached = if submission.force {
            None
        } else {
            load_transcript(&cache_dir).await
        };
        let from_cache = cached.is_some();
        let transcript = match cached {
            Some(transcript) => {
                debug!(dir = %cache_dir.display(), "using cached transcript");
                transcript
            }
            None => {
                let transcript =
                    fetch_transcript(self.ctx.resolver.gateway(), &submission.url).await?;
                if let Err(e) = save_transcript(&cache_dir, &transcript).await {
                    warn!(error = %e, "could not cache transcript");
                }
                transcript
            }
        };

        let fresh = Session::from_submission(
            &submission.url,
            req.media_kind,
            req.info.clone(),
            transcript,
            &submission.language,
        );
        let mut session = self.ctx.store.resume(fresh).await?;
        if submission.custom_prompt.is_some() {
            session.custom_article_prompt = submission.custom_prompt.clone();
        }

        bus.publish(Arc::new(TranscriptFetched::new(
            EventHeader::child_of(event.event.event_id()),
            session,
            submission.task,
            from_cache,
        )));
        Ok(())
    }
}
