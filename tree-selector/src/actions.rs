//! Deferred mutations requested while the flattened view is being walked.
//!
//! Draw callbacks only hold a shared view of the rows they are iterating, so
//! any structural change they want is recorded here and replayed after the
//! traversal loop ends. Replay works on a detached batch: actions queued
//! while a batch runs land in the queue and wait for the next drain.
//!
//! Actions receive the value they mutate plus a shared context (the
//! selector passes the host tree there).

use std::fmt;

/// A deferred mutation of `T`, given read access to a context `C`.
pub type Action<T, C> = Box<dyn FnOnce(&mut T, &C)>;

/// FIFO inbox of deferred actions.
pub struct ActionQueue<T, C: ?Sized = ()> {
    pending: Vec<Action<T, C>>,
}

impl<T, C: ?Sized> Default for ActionQueue<T, C> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<T, C: ?Sized> fmt::Debug for ActionQueue<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionQueue")
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl<T, C: ?Sized> ActionQueue<T, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action. Safe to call at any time, including from a running
    /// action.
    pub fn enqueue(&mut self, action: impl FnOnce(&mut T, &C) + 'static) {
        self.pending.push(Box::new(action));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Detach exactly the actions queued so far.
    ///
    /// Use this when the queue lives inside the value the actions mutate:
    /// take the batch, then [`ActionBatch::run`] it against the owner.
    pub fn take(&mut self) -> ActionBatch<T, C> {
        ActionBatch {
            actions: std::mem::take(&mut self.pending),
        }
    }

    /// Run the actions queued so far against `target`, returning how many ran.
    pub fn drain(&mut self, target: &mut T, context: &C) -> usize {
        self.take().run(target, context)
    }

    /// Discard actions queued after the first `len`.
    pub(crate) fn truncate(&mut self, len: usize) -> usize {
        let dropped = self.pending.len().saturating_sub(len);
        self.pending.truncate(len);
        dropped
    }
}

/// Actions detached from an [`ActionQueue`] by [`ActionQueue::take`].
#[must_use = "a detached batch does nothing until it is run"]
pub struct ActionBatch<T, C: ?Sized = ()> {
    actions: Vec<Action<T, C>>,
}

impl<T, C: ?Sized> ActionBatch<T, C> {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Execute every action once, in queue order.
    pub fn run(self, target: &mut T, context: &C) -> usize {
        let count = self.actions.len();
        for action in self.actions {
            action(target, context);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::ActionQueue;

    #[derive(Default)]
    struct Host {
        queue: ActionQueue<Host>,
        log: Vec<&'static str>,
    }

    impl Host {
        fn drain(&mut self) -> usize {
            self.queue.take().run(self, &())
        }
    }

    #[test]
    fn actions_run_once_in_fifo_order() {
        let mut host = Host::default();
        host.queue.enqueue(|host, _| host.log.push("first"));
        host.queue.enqueue(|host, _| host.log.push("second"));

        assert_eq!(host.drain(), 2);
        assert_eq!(host.log, vec!["first", "second"]);
        assert_eq!(host.drain(), 0);
        assert_eq!(host.log.len(), 2);
    }

    #[test]
    fn actions_queued_during_drain_wait_for_next_drain() {
        let mut host = Host::default();
        host.queue.enqueue(|host, _| {
            host.log.push("outer");
            host.queue.enqueue(|host, _| host.log.push("a"));
            host.queue.enqueue(|host, _| host.log.push("b"));
            host.queue.enqueue(|host, _| host.log.push("c"));
        });

        assert_eq!(host.drain(), 1);
        assert_eq!(host.log, vec!["outer"]);
        assert_eq!(host.queue.len(), 3);

        host.queue.enqueue(|host, _| host.log.push("later"));
        let batch = host.queue.take();
        host.queue.enqueue(|host, _| host.log.push("after-take"));

        assert_eq!(batch.len(), 4);
        assert_eq!(batch.run(&mut host, &()), 4);
        assert_eq!(host.log, vec!["outer", "a", "b", "c", "later"]);
        assert_eq!(host.queue.len(), 1);
    }

    #[test]
    fn standalone_queue_drains_into_target() {
        let mut queue: ActionQueue<Vec<u32>> = ActionQueue::new();
        let mut target = Vec::new();
        queue.enqueue(|values, _| values.push(1));
        queue.enqueue(|values, _| values.push(2));

        assert_eq!(queue.drain(&mut target, &()), 2);
        assert_eq!(target, vec![1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn truncate_discards_tail() {
        let mut queue: ActionQueue<Vec<u32>> = ActionQueue::new();
        queue.enqueue(|values, _| values.push(1));
        queue.enqueue(|values, _| values.push(2));
        queue.enqueue(|values, _| values.push(3));

        assert_eq!(queue.truncate(1), 2);
        let mut target = Vec::new();
        queue.drain(&mut target, &());
        assert_eq!(target, vec![1]);
    }
}
