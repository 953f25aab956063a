use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::Notify;

/// Bounded FIFO that refuses new items when full, keeping what it has.
pub struct BoundedDropNewestQueue<T> {
    inner: Arc<BoundedInner<T>>,
}

struct BoundedInner<T> {
    buf: Mutex<VecDeque<T>>,
    capacity: usize,
    notify_any: Arc<Notify>,
}

pub struct BoundedDropNewestReceiver<T> {
    inner: Arc<BoundedInner<T>>,
}

impl<T> BoundedDropNewestQueue<T> {
    pub fn new(capacity: usize, notify_any: Arc<Notify>) -> Self {
        assert!(capacity > 0);

        Self {
            inner: Arc::new(BoundedInner {
                buf: Mutex::new(VecDeque::with_capacity(capacity)),
                capacity,
                notify_any,
            }),
        }
    }

    /// `false` when the queue is full and `value` was discarded.
    pub fn try_push(&self, value: T) -> bool {
        let mut buf = self.inner.buf.lock().unwrap_or_else(PoisonError::into_inner);
        if buf.len() >= self.inner.capacity {
            return false;
        }
        buf.push_back(value);
        drop(buf);
        self.inner.notify_any.notify_one();
        true
    }

    pub fn receiver(&self) -> BoundedDropNewestReceiver<T> {
        BoundedDropNewestReceiver {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> BoundedDropNewestReceiver<T> {
    pub fn try_recv(&self) -> Option<T> {
        self.inner
            .buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}
