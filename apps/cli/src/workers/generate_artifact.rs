use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use videosum_core::{
    ArticlePipeline, ArticleProgress, ArticleRequest, ArticleStage, ArticleType, Background,
    Session, TranslationProgress,
    events::{EnrichedEvent, EventBus, expect},
    queues::QueueKind,
    summary, translate_subtitles,
    workers::{InputSpec, SubscriptionSpec, Worker},
};

use crate::{
    context::AppContext,
    workers::events::{ArtifactGenerated, GenerationProgressed, Task, TranscriptFetched},
};

/// Runs the requested task against a session and hands the updated session on.
pub struct GenerateArtifactWorker {
    ctx: Arc<AppContext>,
}

fn stage_label(ty: ArticleType, stage: ArticleStage) -> String {
    match stage {
        ArticleStage::Chunk { index, total } => {
            format!("{ty} article: section {}/{total}", index + 1)
        }
        ArticleStage::Merging => format!("{ty} article: merging sections"),
        ArticleStage::Image => format!("{ty} article: cover image"),
        ArticleStage::Done => format!("{ty} article: done"),
    }
}

impl GenerateArtifactWorker {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    async fn run_task(
        &self,
        session: &mut Session,
        task: Task,
        bus: &EventBus,
        parent: Uuid,
    ) -> anyhow::Result<()> {
        let language = session.language.clone();

        match task {
            Task::Brief => {
                let client = self.ctx.completion()?;
                bus.publish(Arc::new(GenerationProgressed::new(parent, "brief summary", 0.0)));
                let brief = summary::generate_brief(
                    client.as_ref(),
                    &session.title,
                    session.current_subtitles(),
                    &language,
                )
                .await?;
                session.brief = Some(brief);
            }
            Task::Detail => {
                let client = self.ctx.completion()?;
                let detail = summary::generate_detail(
                    client.as_ref(),
                    session.current_subtitles(),
                    &language,
                    &mut |percent: u8| {
                        bus.publish(Arc::new(GenerationProgressed::new(
                            parent,
                            "detailed summary",
                            f32::from(percent),
                        )));
                    },
                )
                .await?;
                session.detail = Some(detail);
                if session.background.is_none() {
                    session.background = Some(Background::DetailSummary);
                }
            }
            Task::Article(ty) => {
                let config = &self.ctx.config;
                let mut pipeline = ArticlePipeline::new(self.ctx.completion()?);
                if config.generate_xhs_image && self.ctx.resolver.gateway().has_api_key() {
                    pipeline = pipeline.with_gateway(self.ctx.resolver.gateway().clone());
                }

                let article = {
                    let request = ArticleRequest {
                        article_type: ty,
                        subtitles: session.current_subtitles(),
                        language: &language,
                        chunk_duration: config.chunk_duration_secs,
                        custom_prompt: session.custom_article_prompt.as_deref(),
                        generate_image: config.generate_xhs_image,
                    };
                    pipeline
                        .generate(&request, &self.ctx.stop, &mut |p: ArticleProgress| {
                            bus.publish(Arc::new(GenerationProgressed::new(
                                parent,
                                stage_label(ty, p.stage),
                                p.percent,
                            )));
                        })
                        .await?
                };
                session.set_article(ty, article);
                session.background = Some(Background::Article(ty));
            }
            Task::Translate => {
                let backend = self.ctx.translation_backend()?;
                let translated = translate_subtitles(
                    &backend,
                    &session.original_subtitles,
                    &language,
                    &mut |p: TranslationProgress| {
                        bus.publish(Arc::new(GenerationProgressed::new(
                            parent,
                            format!("translation to {language}: batch {}/{}", p.done, p.total),
                            f32::from(p.percent()),
                        )));
                    },
                )
                .await?;
                session.set_translation(&language, translated);
            }
        }

        session.touch();
        Ok(())
    }
}

impl Worker for GenerateArtifactWorker {
    const SUBSCRIBER_ID: &'static str = "artifact.generate";

    fn subscription() -> SubscriptionSpec {
        SubscriptionSpec {
            subscriber_id: Self::SUBSCRIBER_ID,
            inputs: vec![InputSpec::new(
                TranscriptFetched::EVENT_TYPE,
                QueueKind::FifoDropOldest { capacity: 4 },
            )],
        }
    }

    async fn handle(&mut self, event: Arc<EnrichedEvent>, bus: &EventBus) -> anyhow::Result<()> {
        let req = expect::<TranscriptFetched>(&event.event, TranscriptFetched::EVENT_TYPE)?;
        let parent = event.event.event_id();
        let mut session = req.session.clone();

        if let Some(task) = req.task {
            info!(%task, session = %session.id, "generating");
            self.run_task(&mut session, task, bus, parent).await?;
        }

        bus.publish(Arc::new(ArtifactGenerated::new(parent, session, req.task)));
        Ok(())
    }
}
