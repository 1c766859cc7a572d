use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

/// How long repeated 401s are ignored after one has been handled.
pub const UNAUTHORIZED_COOLDOWN: Duration = Duration::from_millis(300);

/// Source of the bearer token; login and token persistence live elsewhere.
pub trait SessionProvider: Send + Sync {
    fn token(&self) -> Option<String>;

    fn clear_session(&self);
}

#[derive(Debug, Default)]
pub struct MemorySession {
    token: Mutex<Option<String>>,
}

impl MemorySession {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Mutex::new(token),
        }
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.lock() = Some(token.into());
    }
}

impl SessionProvider for MemorySession {
    fn token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    fn clear_session(&self) {
        *self.token.lock() = None;
    }
}

/// Makes sure a burst of 401 responses is handled only once.
#[derive(Debug, Clone)]
pub struct UnauthorizedGuard {
    handling: Arc<AtomicBool>,
    cooldown: Duration,
}

impl Default for UnauthorizedGuard {
    fn default() -> Self {
        Self::new(UNAUTHORIZED_COOLDOWN)
    }
}

impl UnauthorizedGuard {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            handling: Arc::new(AtomicBool::new(false)),
            cooldown,
        }
    }

    /// Returns `true` when the caller should handle this 401. Must be called
    /// from within a tokio runtime; the flag is reset by a timer task.
    pub fn try_begin(&self) -> bool {
        if self
            .handling
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let handling = Arc::clone(&self.handling);
        let cooldown = self.cooldown;
        tokio::spawn(async move {
            tokio::time::sleep(cooldown).await;
            handling.store(false, Ordering::Release);
        });
        true
    }

    pub fn is_handling(&self) -> bool {
        self.handling.load(Ordering::Acquire)
    }
}
