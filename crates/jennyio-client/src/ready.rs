use crate::multiplexer::ChannelMultiplexer;

/// A callback waiting for the connection to open.
pub type ReadyCallback = Box<dyn FnOnce(&ChannelMultiplexer)>;

/// Callbacks queued before the connection opened, in registration order.
#[derive(Default)]
pub struct ReadyQueue {
    pending: Vec<ReadyCallback>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, callback: ReadyCallback) {
        self.pending.push(callback);
    }

    /// Take every queued callback, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<ReadyCallback> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl std::fmt::Debug for ReadyQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadyQueue")
            .field("pending", &self.pending.len())
            .finish()
    }
}
