pub mod bounded_drop_newest_queue;
pub mod fifo_drop_oldest_queue;
pub mod isolated_forwarder;
pub mod latest1_queue;

pub use bounded_drop_newest_queue::*;
pub use fifo_drop_oldest_queue::*;
pub use isolated_forwarder::*;
pub use latest1_queue::*;

/// Delivery policy for one subscriber input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    /// Newest value only, delivered as a snapshot.
    Latest1,
    FifoDropOldest { capacity: usize },
    BoundedDropNewest { capacity: usize },
    Isolated { output_buffer: usize },
}
