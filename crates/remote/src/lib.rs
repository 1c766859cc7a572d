//! Client for the remote task store: envelope handling, bearer tokens and the
//! global unauthorized policy on top of a pluggable [`Transport`].

pub mod api;
pub mod client;
pub mod session;
pub mod transport;

use std::sync::Arc;

use ordo_core::config::AppConfig;
use ordo_core::error::SyncResult;
use ordo_core::notify::Notifier;

pub use api::TaskApi;
pub use client::RemoteApi;
pub use session::{MemorySession, SessionProvider, UnauthorizedGuard};
pub use transport::{HttpTransport, Method, Request, Transport};

/// Build an HTTP-backed client from resolved configuration.
pub fn connect(
    config: &AppConfig,
    session: Arc<dyn SessionProvider>,
    notifier: Arc<dyn Notifier>,
) -> SyncResult<RemoteApi<HttpTransport>> {
    let transport = HttpTransport::new(config.api_base_url(), config.request_timeout())?;
    Ok(RemoteApi::new(transport, session, notifier))
}
