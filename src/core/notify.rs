//! Change notifications between the store and live viewers

use di::{inject, injectable};
use log::error;
use std::collections::{HashMap, HashSet};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;

/// Directory-level refresh cadence for polled delivery.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// What changed. Chat-scoped topics carry the chat id, so a viewer can watch
/// one thread without hearing about every other chat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    ChatListChanged,
    ChatChanged(i64),
    NewMessage(i64),
}

pub type Handler = Arc<dyn Fn(Topic) + Send + Sync>;

/// How published changes reach subscribers.
#[derive(Clone, Copy, Debug)]
pub enum Delivery {
    /// Handlers run on the publishing call. Used by tests and by anything
    /// that wants push semantics.
    Immediate,
    /// Changes are parked and flushed once per tick. Repeat changes to one
    /// topic within a tick coalesce into a single notification.
    Interval(Duration),
}

#[derive(Default)]
struct Inner {
    open: bool,
    subscribers: HashMap<Topic, Vec<Handler>>,
    pending: HashSet<Topic>,
    worker: Option<JoinHandle<()>>,
}

/// Fan-out point for store mutations.
///
/// Delivery is at least once: a subscriber may see one notification for
/// several underlying changes, and never sees a change that was not
/// committed. A handler that panics is logged and skipped without stopping
/// delivery to the remaining handlers. Publishing on a closed notifier is a
/// no-op.
pub struct ChangeNotifier {
    delivery: Delivery,
    inner: Arc<Mutex<Inner>>,
}

#[injectable]
impl ChangeNotifier {
    #[inject]
    pub fn create() -> Self {
        Self::new(Delivery::Interval(POLL_INTERVAL))
    }
}

impl ChangeNotifier {
    pub fn new(delivery: Delivery) -> Self {
        Self {
            delivery,
            inner: Arc::default(),
        }
    }

    /// Starts delivering. With `Delivery::Interval` this spawns the poll
    /// worker, so it must run inside a tokio runtime.
    pub fn open(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.open {
            return;
        }
        inner.open = true;
        if let Delivery::Interval(every) = self.delivery {
            let shared = Arc::clone(&self.inner);
            inner.worker = Some(tokio::spawn(async move {
                let mut ticker = time::interval(every);
                // The first tick resolves immediately, consume it so the
                // first flush happens one full interval after open.
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    Self::drain(&shared);
                }
            }));
        }
    }

    /// Stops delivering and discards anything still pending. Subscriptions
    /// survive a close, the notifier can be reopened.
    pub fn close(&self) {
        let worker = {
            let mut inner = self.inner.lock().unwrap();
            inner.open = false;
            inner.pending.clear();
            inner.worker.take()
        };
        if let Some(worker) = worker {
            worker.abort();
        }
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().unwrap().open
    }

    pub fn subscribe(&self, topic: Topic, handler: Handler) {
        self.inner
            .lock()
            .unwrap()
            .subscribers
            .entry(topic)
            .or_default()
            .push(handler);
    }

    /// Removes a handler registered for `topic`. Identity is the `Arc`
    /// allocation, so keep a clone of the handler you subscribed with.
    pub fn unsubscribe(&self, topic: Topic, handler: &Handler) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(handlers) = inner.subscribers.get_mut(&topic) {
            handlers.retain(|h| !handler_eq(h, handler));
        }
    }

    /// Records that `topic` changed. Immediate delivery runs handlers before
    /// returning; interval delivery parks the topic until the next flush.
    pub fn publish(&self, topic: Topic) {
        let handlers = {
            let mut inner = self.inner.lock().unwrap();
            if !inner.open {
                return;
            }
            match self.delivery {
                Delivery::Immediate => inner
                    .subscribers
                    .get(&topic)
                    .cloned()
                    .unwrap_or_default(),
                Delivery::Interval(_) => {
                    inner.pending.insert(topic);
                    return;
                }
            }
        };
        Self::dispatch(topic, &handlers);
    }

    /// Flushes pending notifications without waiting for the next tick.
    pub fn poll_now(&self) {
        Self::drain(&self.inner);
    }

    fn drain(inner: &Arc<Mutex<Inner>>) {
        let batch: Vec<(Topic, Vec<Handler>)> = {
            let mut inner = inner.lock().unwrap();
            let topics: Vec<Topic> = inner.pending.drain().collect();
            topics
                .into_iter()
                .map(|topic| {
                    let handlers = inner.subscribers.get(&topic).cloned().unwrap_or_default();
                    (topic, handlers)
                })
                .collect()
        };
        for (topic, handlers) in batch {
            Self::dispatch(topic, &handlers);
        }
    }

    // Handlers run outside the lock, so a handler may subscribe or publish
    // without deadlocking.
    fn dispatch(topic: Topic, handlers: &[Handler]) {
        for handler in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(topic))).is_err() {
                error!("Notification handler panicked on {topic:?}");
            }
        }
    }
}

impl Drop for ChangeNotifier {
    fn drop(&mut self) {
        self.close();
    }
}

fn handler_eq(a: &Handler, b: &Handler) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}
