//! FIFO message queue with edge-triggered readiness.
//!
//! The queue itself is single-threaded; what it adds over a `VecDeque` is
//! the wakeup protocol an external selector relies on. A bounded(1)
//! channel plays the role of a self-pipe: at most one token is ever
//! outstanding, tracked by the explicit `readable` flag, so the channel
//! never inflates no matter how many messages are posted.
//!
//! Protocol:
//! * `post` enqueues and raises the token when the queue transitions
//!   empty -> non-empty or when the readable bit was cleared.
//! * `mark_readable` raises the token without enqueuing (used by the paint
//!   scheduler to get the selector's attention).
//! * The selector blocks on `wake_receiver()`; receiving consumes the
//!   token, and `ack` reconciles the flag once the owner has drained the
//!   queue and claimed no further readiness.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::collections::VecDeque;

#[derive(Debug)]
pub struct MessageQueue<M> {
    items: VecDeque<M>,
    readable: bool,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl<M> Default for MessageQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> MessageQueue<M> {
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = bounded(1);
        Self {
            items: VecDeque::new(),
            readable: false,
            wake_tx,
            wake_rx,
        }
    }

    /// Append a message, signalling the selector when needed.
    pub fn post(&mut self, msg: M) {
        self.items.push_back(msg);
        if !self.readable {
            self.mark_readable();
        }
    }

    /// Raise the wakeup token if it is not already outstanding.
    pub fn mark_readable(&mut self) {
        if !self.readable {
            // A full channel means the selector has not consumed the
            // previous token yet; either way exactly one is pending.
            let _ = self.wake_tx.try_send(());
            self.readable = true;
            tracing::trace!(target: "queue", "wakeup raised");
        }
    }

    /// Pop the head of the queue.
    pub fn pop(&mut self) -> Option<M> {
        self.items.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Clear readiness: drain any unconsumed token so the selector blocks
    /// until the next `post`/`mark_readable`. Call only when the queue is
    /// empty and no readiness was claimed.
    pub fn ack(&mut self) {
        if self.readable {
            let _ = self.wake_rx.try_recv();
            self.readable = false;
        }
    }

    /// Receiver end of the wakeup channel, for the application selector.
    pub fn wake_receiver(&self) -> Receiver<()> {
        self.wake_rx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let mut q = MessageQueue::new();
        q.post(1);
        q.post(2);
        q.post(3);
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.pop(), Some(3));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn post_raises_exactly_one_token() {
        let mut q = MessageQueue::new();
        let rx = q.wake_receiver();
        q.post(());
        q.post(());
        q.post(());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err(), "only one token may be outstanding");
    }

    #[test]
    fn ack_clears_unconsumed_token() {
        let mut q = MessageQueue::<u8>::new();
        let rx = q.wake_receiver();
        q.post(7);
        assert_eq!(q.pop(), Some(7));
        q.ack();
        assert!(rx.try_recv().is_err());
        // The next post raises a fresh token.
        q.post(8);
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn repost_after_selector_consumed_token() {
        let mut q = MessageQueue::new();
        let rx = q.wake_receiver();
        q.post(1);
        assert!(rx.try_recv().is_ok());
        assert_eq!(q.pop(), Some(1));
        q.ack();
        q.post(2);
        assert!(rx.try_recv().is_ok(), "readable bit was cleared by ack");
    }

    #[test]
    fn mark_readable_without_messages() {
        let mut q = MessageQueue::<u8>::new();
        let rx = q.wake_receiver();
        q.mark_readable();
        q.mark_readable();
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
        assert!(q.is_empty());
    }
}
