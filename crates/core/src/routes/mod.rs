use std::{
    collections::HashMap,
    sync::{Arc, atomic::AtomicU64},
};

use crate::{
    events::EnrichedEvent,
    queues::{BoundedDropNewestQueue, FifoDropOldestQueue, IsolatedForwarder, Latest1Queue},
};

pub type Delivery = Arc<EnrichedEvent>;

/// Event type to every subscriber route that receives it.
pub struct Routes {
    pub table: HashMap<&'static str, Vec<Route>>,
}

pub struct Route {
    pub subscriber_id: &'static str,
    pub inbox: RouteInbox,
    pub drops_total: Arc<AtomicU64>,
}

pub enum RouteInbox {
    Latest1(Arc<Latest1Queue<Delivery>>),
    FifoDropOldest(Arc<FifoDropOldestQueue<Delivery>>),
    BoundedDropNewest(Arc<BoundedDropNewestQueue<Delivery>>),
    Isolated(IsolatedForwarder<Delivery>),
}

impl RouteInbox {
    /// `false` when the event was refused. Overwrites in the keep-newest
    /// inboxes still count as delivered.
    pub fn try_deliver(&self, event: Delivery) -> bool {
        match self {
            RouteInbox::Latest1(q) => {
                q.set(event);
                true
            }
            RouteInbox::FifoDropOldest(q) => {
                q.push_overwrite(event);
                true
            }
            RouteInbox::BoundedDropNewest(q) => q.try_push(event),
            RouteInbox::Isolated(fwd) => fwd.try_send(event).is_ok(),
        }
    }
}
