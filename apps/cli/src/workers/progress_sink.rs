use std::{sync::Arc, time::Instant};

use indicatif::ProgressBar;
use videosum_core::{
    MediaKind,
    events::{EnrichedEvent, EventBus, downcast_ref},
    queues::QueueKind,
    workers::{InputSpec, SubscriptionSpec, Worker},
};

use crate::{
    ui,
    workers::events::{ArtifactGenerated, GenerationProgressed, MediaResolved, TranscriptFetched},
};

/// Turns pipeline events into terminal output on one shared progress bar.
pub struct ProgressSinkWorker {
    bar: ProgressBar,
    step_started: Instant,
    percent_mode: bool,
}

impl ProgressSinkWorker {
    pub fn new(bar: ProgressBar) -> Self {
        Self {
            bar,
            step_started: Instant::now(),
            percent_mode: false,
        }
    }

    fn step_done(&mut self, line: String, next: &str) {
        self.bar.suspend(|| println!("{line}"));
        self.bar.set_message(next.to_string());
        self.step_started = Instant::now();
    }
}

impl Worker for ProgressSinkWorker {
    const SUBSCRIBER_ID: &'static str = "cli.progress_sink";

    fn subscription() -> SubscriptionSpec {
        SubscriptionSpec {
            subscriber_id: Self::SUBSCRIBER_ID,
            inputs: vec![
                InputSpec::new(GenerationProgressed::EVENT_TYPE, QueueKind::Latest1),
                InputSpec::new(
                    MediaResolved::EVENT_TYPE,
                    QueueKind::BoundedDropNewest { capacity: 4 },
                ),
                InputSpec::new(
                    TranscriptFetched::EVENT_TYPE,
                    QueueKind::BoundedDropNewest { capacity: 4 },
                ),
                InputSpec::new(
                    ArtifactGenerated::EVENT_TYPE,
                    QueueKind::BoundedDropNewest { capacity: 4 },
                ),
            ],
        }
    }

    async fn handle(&mut self, event: Arc<EnrichedEvent>, _bus: &EventBus) -> anyhow::Result<()> {
        if let Some(progress) = downcast_ref::<GenerationProgressed>(&event.event) {
            if !self.percent_mode {
                ui::as_percent_bar(&self.bar);
                self.percent_mode = true;
            }
            self.bar.set_position(progress.percent.round() as u64);
            self.bar.set_message(progress.label.clone());
            return Ok(());
        }

        let elapsed = Some(self.step_started.elapsed());
        if let Some(resolved) = downcast_ref::<MediaResolved>(&event.event) {
            let line = match (&resolved.media_kind, &resolved.info) {
                (MediaKind::Video(platform), Some(info)) => {
                    format!("Resolved {platform} video: {}", info.title)
                }
                (kind, _) => format!("Resolved {kind} audio"),
            };
            self.step_done(ui::done_line(line, elapsed), "Fetching subtitles...");
        } else if let Some(fetched) = downcast_ref::<TranscriptFetched>(&event.event) {
            let msg = format!(
                "Subtitles: {} lines",
                fetched.session.original_subtitles.len()
            );
            let line = if fetched.cached {
                ui::cached_line(msg)
            } else {
                ui::done_line(msg, elapsed)
            };
            let next = match fetched.task {
                Some(task) => format!("Generating {task}..."),
                None => "Saving session...".to_string(),
            };
            self.step_done(line, &next);
        } else if let Some(generated) = downcast_ref::<ArtifactGenerated>(&event.event) {
            if let Some(task) = generated.task {
                self.step_done(ui::done_line(format!("Generated {task}"), elapsed), "Saving session...");
            }
        }
        Ok(())
    }
}
