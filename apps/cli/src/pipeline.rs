use std::{path::PathBuf, sync::Arc};

use indicatif::ProgressBar;
use tokio::sync::{broadcast, oneshot};
use tracing::debug;
use videosum_core::{
    events::{BusConfig, EventBus, EventBusBuilder},
    workers::Worker,
};

use crate::{
    context::AppContext,
    workers::{
        cli_completion_sink::{CliCompletionSinkWorker, Completion},
        fetch_transcript::FetchTranscriptWorker,
        generate_artifact::GenerateArtifactWorker,
        journal::JournalWorker,
        progress_sink::ProgressSinkWorker,
        resolve_media::ResolveMediaWorker,
        save_session::SaveSessionWorker,
    },
};

pub struct PipelineHandle {
    pub bus: Arc<EventBus>,
    pub shutdown_tx: broadcast::Sender<()>,
    pub done_rx: oneshot::Receiver<Completion>,
}

impl PipelineHandle {
    pub fn shutdown(&self) {
        // no receivers left means every worker already stopped
        let _ = self.shutdown_tx.send(());
    }
}

/// Wire every worker onto a fresh bus. `journal` is where persistable
/// events go, if anywhere.
pub fn start_pipeline(
    ctx: Arc<AppContext>,
    bar: ProgressBar,
    journal: Option<PathBuf>,
) -> anyhow::Result<PipelineHandle> {
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let (done_tx, done_rx) = oneshot::channel::<Completion>();

    let mut builder = EventBusBuilder::new(BusConfig::default())
        .subscribe(ResolveMediaWorker::subscription())
        .subscribe(FetchTranscriptWorker::subscription())
        .subscribe(GenerateArtifactWorker::subscription())
        .subscribe(SaveSessionWorker::subscription())
        .subscribe(ProgressSinkWorker::subscription())
        .subscribe(CliCompletionSinkWorker::subscription());
    if journal.is_some() {
        builder = builder.subscribe(JournalWorker::subscription());
    }

    let (bus, mut wiring, tasks) = builder.build()?;
    let bus = Arc::new(bus);
    debug!(run_id = %bus.run_id(), "event bus ready");

    // isolated drain tasks must run before anything is published
    tasks.spawn_all();

    wiring.spawn(ResolveMediaWorker::new(Arc::clone(&ctx)), &bus, &shutdown_rx)?;
    wiring.spawn(FetchTranscriptWorker::new(Arc::clone(&ctx)), &bus, &shutdown_rx)?;
    wiring.spawn(GenerateArtifactWorker::new(Arc::clone(&ctx)), &bus, &shutdown_rx)?;
    wiring.spawn(SaveSessionWorker::new(Arc::clone(&ctx)), &bus, &shutdown_rx)?;
    wiring.spawn(ProgressSinkWorker::new(bar), &bus, &shutdown_rx)?;
    wiring.spawn(CliCompletionSinkWorker::new(done_tx), &bus, &shutdown_rx)?;
    if let Some(path) = journal {
        debug!(path = %path.display(), "journaling events");
        wiring.spawn(JournalWorker::new(path), &bus, &shutdown_rx)?;
    }

    Ok(PipelineHandle {
        bus,
        shutdown_tx,
        done_rx,
    })
}
