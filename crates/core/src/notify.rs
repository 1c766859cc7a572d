//! User-facing notification seam.

/// Surfaces errors to whoever drives the engine.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

/// Routes notifications into the tracing pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}
