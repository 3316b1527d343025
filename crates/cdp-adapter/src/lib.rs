//! pagetag L0 CDP adapter.
//!
//! Everything above this crate talks to the browser through one primitive: a
//! session-scoped [`Cdp::send`] that performs a single request/response round trip.
//! The adapter owns the websocket, command correlation and browser discovery; callers
//! only ever see decoded JSON results or an [`AdapterError`].

pub mod browser;
pub mod channel;
pub mod config;
pub mod error;
pub mod metrics;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod transport;
pub mod util;

pub use browser::{attach_page, open_page, PageTarget};
pub use channel::{Cdp, SessionChannel};
pub use config::CdpConfig;
pub use error::AdapterError;
pub use metrics::register_metrics;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockCdp;
pub use transport::{CdpTransport, ChromiumTransport, CommandTarget};
