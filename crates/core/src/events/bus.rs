use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::time::Instant;
use tracing::{trace, warn};
use uuid::Uuid;

use crate::{
    events::{BusConfig, BusMetrics, EnrichedEvent, Event},
    routes::Routes,
};

#[derive(Clone)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

pub struct EventBusInner {
    run_id: Uuid,
    next_ingest_seq: AtomicU64,
    routes: Arc<Routes>,
    metrics: Arc<BusMetrics>,
    strict_routing: bool,
}

impl EventBus {
    pub fn new(cfg: BusConfig, routes: Routes, metrics: Arc<BusMetrics>) -> Self {
        Self {
            inner: Arc::new(EventBusInner {
                run_id: cfg.run_id,
                next_ingest_seq: AtomicU64::new(0),
                routes: Arc::new(routes),
                metrics,
                strict_routing: cfg.strict_routing,
            }),
        }
    }

    /// Deliver to every subscriber of the event's type. Returns how many
    /// inboxes accepted it.
    pub fn publish(&self, event: Arc<dyn Event>) -> usize {
        let ingest_seq = self.inner.next_ingest_seq.fetch_add(1, Ordering::Relaxed);
        let event_type = event.event_type();

        let enriched_event = Arc::new(EnrichedEvent {
            event,
            run_id: self.inner.run_id,
            ingest_seq,
            ingested_at: Instant::now(),
        });

        let Some(routes) = self.inner.routes.table.get(event_type) else {
            self.inner.metrics.record_unrouted(event_type);

            if self.inner.strict_routing {
                panic!("Unrouted event type: {event_type}");
            }

            return 0;
        };

        let mut delivered = 0;
        for route in routes {
            if route.inbox.try_deliver(Arc::clone(&enriched_event)) {
                delivered += 1;
            } else {
                route.drops_total.fetch_add(1, Ordering::Relaxed);
                warn!(
                    subscriber = route.subscriber_id,
                    event_type, "inbox full, event dropped"
                );
            }
        }
        trace!(event_type, ingest_seq, delivered, "published");
        delivered
    }

    pub fn run_id(&self) -> Uuid {
        self.inner.run_id
    }

    pub fn unrouted_total(&self) -> u64 {
        self.inner.metrics.unrouted_publish_total.load(Ordering::Relaxed)
    }

    /// Events a subscriber's inboxes refused, across all its inputs.
    pub fn drops_for(&self, subscriber_id: &str) -> u64 {
        self.inner
            .routes
            .table
            .values()
            .flatten()
            .filter(|route| route.subscriber_id == subscriber_id)
            .map(|route| route.drops_total.load(Ordering::Relaxed))
            .sum()
    }
}
