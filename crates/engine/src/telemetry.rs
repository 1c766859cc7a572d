//! Records what the engine did with each scope so sync behavior can be inspected in tests and logs.

use std::collections::VecDeque;

use ordo_core::model::Id;
use parking_lot::Mutex;

/// Events kept in memory; older ones are dropped first.
pub const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    FetchCompleted { scope: String, count: usize },
    FetchFailed { scope: String, error: String },
    ReorderQueued { scope: String, moved_id: Id },
    ReorderCommitted { scope: String, count: usize },
    ReorderFailed { scope: String, error: String },
    Reconciled(String),
    MutationApplied(String),
    MutationFailed { action: String, error: String },
}

pub struct Handle {
    #[cfg(feature = "telemetry")]
    events: Mutex<VecDeque<Event>>,
}

impl Default for Handle {
    fn default() -> Self {
        Self::new()
    }
}

impl Handle {
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "telemetry")]
            events: Mutex::new(VecDeque::with_capacity(EVENT_CAPACITY)),
        }
    }

    pub fn record(&self, event: Event) {
        #[cfg(feature = "telemetry")]
        {
            match &event {
                Event::FetchCompleted { scope, count } => {
                    tracing::debug!(scope = scope.as_str(), count, "sync telemetry fetch completed")
                }
                Event::FetchFailed { scope, error } => {
                    tracing::debug!(scope = scope.as_str(), error = %error, "sync telemetry fetch failed")
                }
                Event::ReorderQueued { scope, moved_id } => tracing::debug!(
                    scope = scope.as_str(),
                    moved_id,
                    "sync telemetry reorder queued"
                ),
                Event::ReorderCommitted { scope, count } => tracing::debug!(
                    scope = scope.as_str(),
                    count,
                    "sync telemetry reorder committed"
                ),
                Event::ReorderFailed { scope, error } => tracing::debug!(
                    scope = scope.as_str(),
                    error = %error,
                    "sync telemetry reorder failed"
                ),
                Event::Reconciled(scope) => {
                    tracing::debug!(scope = scope.as_str(), "sync telemetry scope reconciled")
                }
                Event::MutationApplied(action) => tracing::debug!(
                    action = action.as_str(),
                    "sync telemetry mutation applied"
                ),
                Event::MutationFailed { action, error } => tracing::debug!(
                    action = action.as_str(),
                    error = %error,
                    "sync telemetry mutation failed"
                ),
            }
            let mut events = self.events.lock();
            if events.len() == EVENT_CAPACITY {
                events.pop_front();
            }
            events.push_back(event);
        }
        #[cfg(not(feature = "telemetry"))]
        {
            let _ = event;
        }
    }

    pub fn is_enabled(&self) -> bool {
        cfg!(feature = "telemetry")
    }

    /// The most recent events, oldest first. Always empty without the
    /// `telemetry` feature.
    pub fn events(&self) -> Vec<Event> {
        #[cfg(feature = "telemetry")]
        {
            self.events.lock().iter().cloned().collect()
        }
        #[cfg(not(feature = "telemetry"))]
        {
            Vec::new()
        }
    }
}
