//! Trailing-edge debouncer keyed by scope.
//!
//! Every submission overwrites the latest intent for its scope. A timer is armed
//! only when none is pending, so the window is measured from the first intent of
//! a burst and the burst collapses into one firing with the last intent.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

pub const DEFAULT_WINDOW: Duration = Duration::from_millis(200);

struct Slot<I> {
    latest: I,
    timer: JoinHandle<()>,
}

pub struct ScopedDebouncer<K, I> {
    window: Duration,
    slots: Arc<Mutex<HashMap<K, Slot<I>>>>,
    /// Timers that have left their slot but whose `fire` has not returned.
    firing: Arc<AtomicUsize>,
}

impl<K, I> ScopedDebouncer<K, I>
where
    K: Eq + Hash + Clone + Send + 'static,
    I: Send + 'static,
{
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            slots: Arc::new(Mutex::new(HashMap::new())),
            firing: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record `intent` as the latest for `key`.
    ///
    /// `fire` is kept only when this call arms the timer; later submissions in
    /// the same window replace the intent, not the callback.
    pub fn submit<F>(&self, key: K, intent: I, fire: F)
    where
        F: FnOnce(K, I) + Send + 'static,
    {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get_mut(&key) {
            slot.latest = intent;
            return;
        }

        let weak = Arc::downgrade(&self.slots);
        let firing = Arc::clone(&self.firing);
        let window = self.window;
        let timer_key = key.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let Some(slots) = weak.upgrade() else {
                return;
            };
            let latest = {
                let mut slots = slots.lock();
                let latest = slots.remove(&timer_key).map(|slot| slot.latest);
                if latest.is_some() {
                    firing.fetch_add(1, Ordering::SeqCst);
                }
                latest
            };
            if let Some(latest) = latest {
                fire(timer_key, latest);
                firing.fetch_sub(1, Ordering::SeqCst);
            }
        });
        slots.insert(
            key,
            Slot {
                latest: intent,
                timer,
            },
        );
    }

    /// Number of scopes with an armed timer, counting timers still handing
    /// their intent to `fire`.
    pub fn armed(&self) -> usize {
        let slots = self.slots.lock();
        slots.len() + self.firing.load(Ordering::SeqCst)
    }

    pub fn is_armed(&self, key: &K) -> bool {
        self.slots.lock().contains_key(key)
    }

    pub fn latest(&self, key: &K) -> Option<I>
    where
        I: Clone,
    {
        self.slots.lock().get(key).map(|slot| slot.latest.clone())
    }
}

impl<K, I> Drop for ScopedDebouncer<K, I> {
    fn drop(&mut self) {
        for (_, slot) in self.slots.lock().drain() {
            slot.timer.abort();
        }
    }
}
