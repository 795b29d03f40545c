//! The callback sink: the single queue all notifications and action
//! callbacks are posted to.
//!
//! Mutations never invoke listener or action callbacks inline; they post a
//! [`Task`] to the entry's sink and return. Tasks posted by one entry are
//! delivered in post order (FIFO), so the consumer observes state changes
//! in the order the mutations produced them. The sink is injected so a UI
//! can route tasks onto its own thread and tests can drain them
//! deterministically.

use log::warn;
use tokio::sync::mpsc;

/// A deferred callback invocation.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Destination for deferred callback invocations.
///
/// `post` must be non-blocking; it is called from inside the entry's
/// critical sections.
pub trait CallbackSink: Send + Sync {
    fn post(&self, task: Task);
}

/// Posts tasks onto an unbounded tokio channel. The receiving half is
/// typically drained on the UI task:
///
/// ```no_run
/// # async fn example() {
/// let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<wifitrack::Task>();
/// // Hand `tx` to NetworkEntry::new, then drive callbacks here:
/// while let Some(task) = rx.recv().await {
///     task();
/// }
/// # }
/// ```
impl CallbackSink for mpsc::UnboundedSender<Task> {
    fn post(&self, task: Task) {
        if self.send(task).is_err() {
            warn!("callback queue receiver dropped, discarding notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn tasks_are_delivered_in_post_order() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Task>();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        for n in 0..3 {
            let order = Arc::clone(&order);
            tx.post(Box::new(move || order.lock().unwrap().push(n)));
        }

        while let Ok(task) = rx.try_recv() {
            task();
        }
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn post_after_receiver_dropped_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel::<Task>();
        drop(rx);
        let fired = Arc::new(AtomicUsize::new(0));
        let fired2 = Arc::clone(&fired);
        tx.post(Box::new(move || {
            fired2.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
