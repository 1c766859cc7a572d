//! Per-scope serial execution. Jobs for one scope run strictly one after another
//! in submission order; different scopes never wait on each other.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;

struct Tail {
    seq: u64,
    done: oneshot::Receiver<()>,
}

struct Inner<K> {
    tails: Mutex<HashMap<K, Tail>>,
    next_seq: AtomicU64,
    pending: AtomicUsize,
    idle: Notify,
}

pub struct SerialQueue<K> {
    inner: Arc<Inner<K>>,
}

impl<K> Default for SerialQueue<K> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Inner {
                tails: Mutex::new(HashMap::new()),
                next_seq: AtomicU64::new(0),
                pending: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
        }
    }
}

/// Marks a job settled when dropped, including when the job panicked.
struct Settled<K: Eq + Hash> {
    inner: Arc<Inner<K>>,
    key: K,
    seq: u64,
    done: Option<oneshot::Sender<()>>,
}

impl<K: Eq + Hash> Drop for Settled<K> {
    fn drop(&mut self) {
        {
            let mut tails = self.inner.tails.lock();
            if tails.get(&self.key).map(|tail| tail.seq) == Some(self.seq) {
                tails.remove(&self.key);
            }
        }
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
        if self.inner.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

impl<K> SerialQueue<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `job` once every earlier job for `key` has settled.
    pub fn enqueue<F>(&self, key: K, job: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        let previous = self.inner.tails.lock().insert(
            key.clone(),
            Tail {
                seq,
                done: done_rx,
            },
        );
        self.inner.pending.fetch_add(1, Ordering::AcqRel);

        let settled = Settled {
            inner: Arc::clone(&self.inner),
            key,
            seq,
            done: Some(done_tx),
        };
        tokio::spawn(async move {
            let _settled = settled;
            if let Some(previous) = previous {
                // A dropped sender also means the predecessor settled.
                let _ = previous.done.await;
            }
            job.await;
        })
    }

    /// Jobs enqueued and not yet settled, across all scopes.
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Resolves once no job is pending in any scope.
    pub async fn idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}
