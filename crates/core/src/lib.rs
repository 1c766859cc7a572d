pub mod config;
pub mod dto;
pub mod envelope;
pub mod error;
pub mod model;
pub mod notify;
pub mod ordering;
pub mod scope;

pub use config::{AppConfig, ConfigOverrides};
pub use envelope::{normalize, Envelope, EnvelopeFamily};
pub use error::{SyncError, SyncResult};
pub use model::*;
pub use notify::{LogNotifier, Notifier};
pub use ordering::Placement;
pub use scope::{Scope, TaskScope};
