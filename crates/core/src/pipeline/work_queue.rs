use crossbeam_channel::{Receiver, Sender};

/// Shared pool of webcam identifiers awaiting one stage's work.
///
/// The queue is filled before any worker starts, so a worker that finds it
/// empty can simply stop: there is no blocking pop and no close signal. Every
/// pushed item is popped exactly once; ordering across workers is not
/// guaranteed.
pub struct WorkQueue {
    sender: Sender<String>,
    receiver: Receiver<String>,
}

impl WorkQueue {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self { sender, receiver }
    }

    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = Self::new();
        for item in items {
            queue.push(item);
        }
        queue
    }

    pub fn push(&self, item: impl Into<String>) {
        // Both channel ends live in `self`, so the send cannot fail.
        let _ = self.sender.send(item.into());
    }

    /// Removes and returns the next item, or `None` once the queue is drained.
    pub fn pop(&self) -> Option<String> {
        self.receiver.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}
