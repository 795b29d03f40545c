//! Tracking of outstanding connect/disconnect requests.
//!
//! A user action succeeds at the OS-call layer long before the network
//! layer confirms it. This tracker holds the user-facing callback from the
//! moment the OS accepts the call ("issued") until a later snapshot
//! mutation proves the action took effect, at which point the callback is
//! taken exactly once and the slot returns to idle.

use log::debug;

use crate::models::{ConnectStatus, DisconnectStatus, ForgetStatus};

/// Terminal callback of a connect request. Invoked exactly once, on the
/// callback sink, never from inside a mutation.
pub type ConnectCallback = Box<dyn FnOnce(ConnectStatus) + Send>;

/// Terminal callback of a disconnect request.
pub type DisconnectCallback = Box<dyn FnOnce(DisconnectStatus) + Send>;

/// Terminal callback of a forget request. Forget resolves immediately from
/// the OS call result, so it never waits in the tracker.
pub type ForgetCallback = Box<dyn FnOnce(ForgetStatus) + Send>;

/// One slot per action kind; `None` is idle, `Some` is issued, and taking
/// the callback resolves the slot back to idle.
///
/// Only the most recent user action per kind is tracked: a second issue
/// before resolution overwrites the first, whose callback is dropped
/// unfired.
#[derive(Default)]
pub(crate) struct PendingActionTracker {
    connect: Option<ConnectCallback>,
    disconnect: Option<DisconnectCallback>,
}

impl PendingActionTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn issue_connect(&mut self, callback: ConnectCallback) {
        if self.connect.is_some() {
            debug!("superseding outstanding connect request");
        }
        self.connect = Some(callback);
    }

    pub(crate) fn issue_disconnect(&mut self, callback: DisconnectCallback) {
        if self.disconnect.is_some() {
            debug!("superseding outstanding disconnect request");
        }
        self.disconnect = Some(callback);
    }

    /// Takes the issued connect callback, if any, returning the slot to
    /// idle. Called on the mutation that first observes a connected state.
    pub(crate) fn resolve_connect(&mut self) -> Option<ConnectCallback> {
        self.connect.take()
    }

    /// Takes the issued disconnect callback, if any. Called on the
    /// mutation that clears the connection.
    pub(crate) fn resolve_disconnect(&mut self) -> Option<DisconnectCallback> {
        self.disconnect.take()
    }

    /// Drops any issued connect unfired. Used when an immediate OS-call
    /// failure bypasses the tracker.
    pub(crate) fn reset_connect(&mut self) {
        self.connect = None;
    }

    pub(crate) fn reset_disconnect(&mut self) {
        self.disconnect = None;
    }
}
