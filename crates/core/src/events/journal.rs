//! Append-only JSON-lines record of persistable events.

use std::{path::Path, time::UNIX_EPOCH};

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::events::{EnrichedEvent, Event, Persistence};

#[derive(Serialize)]
pub struct JournalRecord<'a> {
    pub run_id: Uuid,
    pub ingest_seq: u64,
    pub event_id: Uuid,
    pub event_type: &'static str,
    pub parent_ids: &'a [Uuid],
    pub timestamp_millis: u128,
    pub persistence: Persistence,
    pub payload: &'a dyn Event,
}

impl<'a> JournalRecord<'a> {
    pub fn new(enriched: &'a EnrichedEvent) -> Self {
        let event = enriched.event.as_ref();
        Self {
            run_id: enriched.run_id,
            ingest_seq: enriched.ingest_seq,
            event_id: event.event_id(),
            event_type: event.event_type(),
            parent_ids: event.parent_ids(),
            timestamp_millis: event
                .timestamp()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            persistence: event.persistence(),
            payload: event,
        }
    }
}

/// Append one line for `enriched` unless its event is not persistable.
/// Returns whether a line was written.
pub async fn append(path: &Path, enriched: &EnrichedEvent) -> anyhow::Result<bool> {
    if !enriched.event.is_persistable() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut line = serde_json::to_vec(&JournalRecord::new(enriched))?;
    line.push(b'\n');

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(&line).await?;
    file.flush().await?;
    Ok(true)
}
