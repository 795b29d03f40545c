//! A Rust library for tracking the live connectivity state of a single
//! Wi-Fi network entry.
//!
//! This crate provides the state reconciliation engine behind one row of a
//! network-picker UI: it merges updates that arrive independently and
//! asynchronously (link-layer info, L3 capabilities, default-route status,
//! link properties, connectivity diagnostics) into one consistent snapshot
//! and derives the properties no single source reports directly:
//!
//! - Is this network connected, connecting, or disconnected?
//! - Is it the default route, even indirectly (a VPN tunneled over it)?
//! - Is it a low-quality fallback the system is bypassing for cellular?
//! - Is it the primary radio connection?
//!
//! One [`NetworkEntry`] tracks exactly one logical network identity (an
//! SSID and security combination). Enumerating saved networks, scanning,
//! and the OS-level connect calls are external collaborators, injected as
//! traits at construction.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wifitrack::{
//!     ActionInvoker, NetworkEntry, Security, SignalLevelCalculator, Task,
//! };
//!
//! struct OsLevels;
//! impl SignalLevelCalculator for OsLevels {
//!     fn level_for_rssi(&self, rssi: i16) -> i32 {
//!         (i32::from(rssi) + 100).clamp(0, 48) / 12
//!     }
//! }
//!
//! struct OsActions;
//! impl ActionInvoker for OsActions {
//!     fn connect(&self, _ssid: &str, _security: Security) -> wifitrack::Result<()> {
//!         Ok(())
//!     }
//!     fn disconnect(&self) -> wifitrack::Result<()> {
//!         Ok(())
//!     }
//!     fn forget(&self) -> wifitrack::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Task>();
//! let entry = NetworkEntry::new(
//!     "MyNetwork",
//!     Security::Psk,
//!     Arc::new(tx),
//!     Arc::new(OsLevels),
//!     Arc::new(OsActions),
//!     None,
//! );
//!
//! entry.connect(Box::new(|status| println!("connect result: {status}")));
//! // Drive the observation layer into the entry's `on_*` methods, and
//! // drain `rx` on the UI task to deliver callbacks.
//! ```
//!
//! # Concurrency
//!
//! All mutation entry points and accessors serialize on one per-entry
//! lock; critical sections are short and never block on I/O. Listener and
//! action callbacks are posted to an injected [`CallbackSink`] in mutation
//! order (FIFO per entry) and run outside the lock, so a callback can
//! safely re-enter the entry.
//!
//! # Error Handling
//!
//! No failure in this engine is fatal. Updates addressed to another
//! network are ignored, malformed underlying-network graphs and missing
//! collaborators degrade to conservative answers (disconnected,
//! non-default, non-match) and are logged, and OS-call rejections surface
//! once through the action callback as a status code.
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade. To see log
//! output, add a logging implementation like `env_logger`:
//!
//! ```no_run,ignore
//! env_logger::init();
//! // ...
//! ```

// Internal implementation modules
mod matcher;
mod pending;
mod reconcile;
mod snapshot;
mod utils;

// Public API modules
pub mod constants;
pub mod entry;
pub mod models;
pub mod sink;

// Re-exported public API
pub use entry::{
    ActionInvoker, EntryListener, ListenerHandle, NetworkEntry, SignalLevelCalculator,
};
pub use matcher::CapabilityLookup;
pub use models::{
    ActionError, Capability, ConnectStatus, ConnectedInfo, ConnectedState, ConnectivityReport,
    DetailedState, DisconnectStatus, ForgetStatus, LinkAddress, LinkInfo, LinkProperties,
    NetworkCapabilities, NetworkId, RouteInfo, Security, Transport, WifiStandard,
};
pub use pending::{ConnectCallback, DisconnectCallback, ForgetCallback};
pub use sink::{CallbackSink, Task};

/// A specialized `Result` type for OS-level action calls.
pub type Result<T> = std::result::Result<T, models::ActionError>;
