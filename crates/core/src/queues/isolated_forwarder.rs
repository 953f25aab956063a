use std::{pin::Pin, sync::Arc};

use tokio::sync::{Notify, mpsc};

pub type DrainTask = Pin<Box<dyn Future<Output = ()> + Send>>;

const INBOX_BUFFER: usize = 16;

/// Hands events to a dedicated drain task so a slow subscriber only ever
/// blocks its own forwarder, never the publisher.
pub struct IsolatedForwarder<T> {
    inbox_tx: mpsc::Sender<T>,
}

/// Drain tasks created while building the bus. Spawn them before anything
/// publishes.
#[derive(Default)]
pub struct StartupTasks {
    pub tokio: Vec<DrainTask>,
}

impl StartupTasks {
    pub fn spawn_all(self) {
        for task in self.tokio {
            tokio::spawn(task);
        }
    }
}

impl<T: Send + 'static> IsolatedForwarder<T> {
    pub fn new(
        output_buffer: usize,
        notify_any: Arc<Notify>,
    ) -> (IsolatedForwarder<T>, mpsc::Receiver<T>, DrainTask) {
        let (inbox_tx, mut inbox_rx) = mpsc::channel::<T>(INBOX_BUFFER);
        let (out_tx, out_rx) = mpsc::channel::<T>(output_buffer);

        let drain_task = Box::pin(async move {
            while let Some(value) = inbox_rx.recv().await {
                if out_tx.send(value).await.is_err() {
                    break;
                }
                notify_any.notify_one();
            }
        });

        (IsolatedForwarder { inbox_tx }, out_rx, drain_task)
    }

    pub fn try_send(&self, value: T) -> Result<(), T> {
        self.inbox_tx.try_send(value).map_err(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drain_task_forwards_in_order() {
        let notify = Arc::new(Notify::new());
        let (fwd, mut out, task) = IsolatedForwarder::new(4, Arc::clone(&notify));
        tokio::spawn(task);

        fwd.try_send("first").unwrap();
        fwd.try_send("second").unwrap();
        assert_eq!(out.recv().await, Some("first"));
        assert_eq!(out.recv().await, Some("second"));
    }
}
