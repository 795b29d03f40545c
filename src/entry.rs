//! The per-entry engine: one tracked network identity, its snapshot, and
//! the serialized mutation surface the observation layer drives.
//!
//! A [`NetworkEntry`] represents a single logical network (one SSID and
//! security combination) in a network picker. Independent observers report
//! link info, L3 capabilities, default-route changes, link properties, and
//! diagnostics through the `on_*` entry points; queries derive a consistent
//! view from the merged snapshot on demand. All entry points and accessors
//! serialize on one per-entry lock, and every listener or action callback
//! is posted to the injected [`CallbackSink`] rather than invoked inline,
//! so callbacks never run inside a critical section.

use log::{debug, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::constants::signal;
use crate::matcher::CapabilityLookup;
use crate::models::{
    ConnectStatus, ConnectedInfo, ConnectedState, ConnectivityReport, DetailedState,
    DisconnectStatus, ForgetStatus, LinkInfo, LinkProperties, NetworkCapabilities, NetworkId,
    Security,
};
use crate::pending::{ConnectCallback, DisconnectCallback, ForgetCallback, PendingActionTracker};
use crate::reconcile;
use crate::sink::CallbackSink;
use crate::snapshot::Snapshot;
use crate::utils::{first_ipv4_address, first_ipv4_default_gateway, ipv6_addresses};

/// RSSI to discrete signal level, supplied by the OS layer.
pub trait SignalLevelCalculator: Send + Sync {
    fn level_for_rssi(&self, rssi: i16) -> i32;
}

/// The OS-call layer for user actions.
///
/// `Ok` means the OS accepted the call; confirmation comes later through
/// the state updates. `Err` is an immediate, synchronous rejection.
pub trait ActionInvoker: Send + Sync {
    fn connect(&self, ssid: &str, security: Security) -> crate::Result<()>;
    fn disconnect(&self) -> crate::Result<()>;
    fn forget(&self) -> crate::Result<()>;
}

/// Listener for changes to the state of an entry.
///
/// `on_updated` carries no payload; re-read the entry's accessors. Rapid
/// successive notifications may be coalesced by the consumer since each
/// one just signals "re-read current state".
pub trait EntryListener: Send + Sync {
    fn on_updated(&self);
}

/// Clears the listener registration it was returned for, unless a newer
/// registration has replaced it in the meantime.
#[must_use = "dropping the handle does not unsubscribe; call unsubscribe()"]
pub struct ListenerHandle {
    inner: Weak<EntryInner>,
    generation: u64,
}

impl ListenerHandle {
    pub fn unsubscribe(self) {
        if let Some(inner) = self.inner.upgrade() {
            let mut slot = lock(&inner.listener);
            if slot.generation == self.generation {
                slot.listener = None;
            }
        }
    }
}

#[derive(Default)]
struct ListenerSlot {
    listener: Option<Arc<dyn EntryListener>>,
    generation: u64,
}

/// Snapshot and pending actions live under the same lock: pending
/// resolution is decided by snapshot mutations.
struct Tracked {
    snapshot: Snapshot,
    pending: PendingActionTracker,
}

struct EntryInner {
    ssid: String,
    security: Security,
    state: Mutex<Tracked>,
    listener: Mutex<ListenerSlot>,
    sink: Arc<dyn CallbackSink>,
    levels: Arc<dyn SignalLevelCalculator>,
    invoker: Arc<dyn ActionInvoker>,
    lookup: Option<Arc<dyn CapabilityLookup>>,
}

/// Recover the guard even if a holder panicked; the snapshot is always
/// left in a consistent state between field writes that matter.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Live connectivity state of one identified network.
///
/// Cloning is cheap and shares the same tracked state, so the observation
/// layer and the UI can each hold a handle.
#[derive(Clone)]
pub struct NetworkEntry {
    inner: Arc<EntryInner>,
}

impl NetworkEntry {
    pub fn new(
        ssid: impl Into<String>,
        security: Security,
        sink: Arc<dyn CallbackSink>,
        levels: Arc<dyn SignalLevelCalculator>,
        invoker: Arc<dyn ActionInvoker>,
        lookup: Option<Arc<dyn CapabilityLookup>>,
    ) -> Self {
        Self {
            inner: Arc::new(EntryInner {
                ssid: ssid.into(),
                security,
                state: Mutex::new(Tracked {
                    snapshot: Snapshot::new(),
                    pending: PendingActionTracker::new(),
                }),
                listener: Mutex::new(ListenerSlot::default()),
                sink,
                levels,
                invoker,
                lookup,
            }),
        }
    }

    // Identity //

    pub fn ssid(&self) -> &str {
        &self.inner.ssid
    }

    pub fn security(&self) -> Security {
        self.inner.security
    }

    /// The unique key defining this entry.
    pub fn key(&self) -> String {
        format!("{}:{}", self.inner.ssid, self.inner.security)
    }

    /// Whether the supplied link info represents this entry.
    fn connection_info_matches(&self, link: &LinkInfo) -> bool {
        link.ssid == self.inner.ssid && link.security == self.inner.security
    }

    // Query surface. Each accessor takes the entry lock and derives from
    // the current snapshot; nothing is cached. //

    pub fn connected_state(&self) -> ConnectedState {
        reconcile::connected_state(&lock(&self.inner.state).snapshot)
    }

    /// Signal level in `[LEVEL_MIN, LEVEL_MAX]`, or `LEVEL_UNREACHABLE`
    /// for an out-of-range network.
    pub fn level(&self) -> i32 {
        reconcile::signal_level(&lock(&self.inner.state).snapshot)
    }

    pub fn is_primary_network(&self) -> bool {
        reconcile::is_primary_network(&lock(&self.inner.state).snapshot)
    }

    pub fn is_default_network(&self) -> bool {
        reconcile::is_default_network(&lock(&self.inner.state).snapshot, self.lookup())
    }

    pub fn has_internet_access(&self) -> bool {
        reconcile::has_internet_access(&lock(&self.inner.state).snapshot)
    }

    pub fn is_low_quality(&self) -> bool {
        reconcile::is_low_quality(&lock(&self.inner.state).snapshot, self.lookup())
    }

    pub fn can_sign_in(&self) -> bool {
        reconcile::can_sign_in(&lock(&self.inner.state).snapshot)
    }

    pub fn should_show_degraded_icon(&self) -> bool {
        reconcile::should_show_degraded_icon(&lock(&self.inner.state).snapshot, self.lookup())
    }

    /// Display snapshot of the active connection, or `None` unless the
    /// entry is connected. Returns a value copy.
    pub fn connected_info(&self) -> Option<ConnectedInfo> {
        let tracked = lock(&self.inner.state);
        if reconcile::connected_state(&tracked.snapshot) != ConnectedState::Connected {
            return None;
        }
        tracked.snapshot.connected_info.clone()
    }

    // Listener registration //

    /// Registers the listener notified after every state mutation.
    ///
    /// Single slot: registering again overwrites the previous listener
    /// silently (intended behavior, not an oversight). The returned handle
    /// unsubscribes only its own registration.
    pub fn set_listener(&self, listener: Arc<dyn EntryListener>) -> ListenerHandle {
        let mut slot = lock(&self.inner.listener);
        slot.generation += 1;
        slot.listener = Some(listener);
        ListenerHandle {
            inner: Arc::downgrade(&self.inner),
            generation: slot.generation,
        }
    }

    // Mutation surface, driven by the observation layer //

    /// Applies a primary link info update.
    ///
    /// When the link info is absent or identifies some other network, any
    /// previously adopted connection phase is cleared (this entry is no
    /// longer the one connecting). Otherwise the phase and link info are
    /// merged and a notification is posted.
    pub fn on_primary_link_info_changed(
        &self,
        link: Option<&LinkInfo>,
        state: Option<DetailedState>,
    ) {
        let mut tracked = lock(&self.inner.state);
        let matching = link.filter(|link| self.connection_info_matches(link));

        let Some(link) = matching else {
            if tracked.snapshot.detailed_state.is_some() {
                tracked.snapshot.detailed_state = None;
                self.notify_on_updated();
            }
            return;
        };

        if let Some(state) = state {
            tracked.snapshot.detailed_state = Some(state);
        }
        self.update_link_info_locked(&mut tracked, Some(link.clone()));
        self.notify_on_updated();
    }

    /// Applies an L3 capability update for `network`.
    ///
    /// The link info carried inside the capability set decides ownership:
    /// a set for another network, or for a non-primary connection without
    /// an OEM exemption, is treated as loss of `network` for this entry.
    pub fn on_capabilities_changed(&self, network: NetworkId, capabilities: NetworkCapabilities) {
        let Some(link) = capabilities.link_info.clone() else {
            // Not a Wi-Fi capability set; nothing to do for this entry.
            return;
        };

        if !self.connection_info_matches(&link) {
            self.on_network_lost(network);
            return;
        }

        // Treat non-primary, non-exempt connections as disconnected.
        if !link.is_primary && !capabilities.is_exempt() {
            self.on_network_lost(network);
            return;
        }

        let mut tracked = lock(&self.inner.state);
        tracked.snapshot.last_network = tracked.snapshot.network;
        tracked.snapshot.network = Some(network);
        tracked.snapshot.capabilities = Some(capabilities);
        self.update_link_info_locked(&mut tracked, Some(link));
        self.notify_on_updated();
    }

    /// Marks this entry disconnected if `network` is the one it tracks.
    ///
    /// Losing only the prior network instance ends the handoff grace
    /// period without touching the live connection.
    pub fn on_network_lost(&self, network: NetworkId) {
        let mut tracked = lock(&self.inner.state);
        if tracked.snapshot.network == Some(network) {
            self.clear_connection_info_locked(&mut tracked);
            self.notify_on_updated();
        } else if tracked.snapshot.last_network == Some(network) {
            tracked.snapshot.last_network = None;
            self.notify_on_updated();
        }
    }

    /// Adopts the system's current default route, or clears it when the
    /// default network was lost. Orthogonal to this entry's own
    /// connection state, so it always notifies.
    pub fn on_default_network_changed(
        &self,
        network: Option<NetworkId>,
        capabilities: Option<NetworkCapabilities>,
    ) {
        let mut tracked = lock(&self.inner.state);
        tracked.snapshot.default_network = network;
        tracked.snapshot.default_capabilities = capabilities;
        self.notify_on_updated();
    }

    /// Applies IP-layer properties if `network` is the tracked network;
    /// silently ignored otherwise.
    pub fn on_link_properties_changed(&self, network: NetworkId, properties: &LinkProperties) {
        let mut tracked = lock(&self.inner.state);
        if tracked.snapshot.network != Some(network) {
            debug!("ignoring link properties for unrelated {network}");
            return;
        }

        let info = tracked
            .snapshot
            .connected_info
            .get_or_insert_with(ConnectedInfo::default);
        match first_ipv4_address(properties) {
            Some((address, mask)) => {
                info.ip_address = Some(address);
                info.subnet_mask = Some(mask);
            }
            None => {
                info.ip_address = None;
                info.subnet_mask = None;
            }
        }
        info.ipv6_addresses = ipv6_addresses(properties);
        info.gateway = first_ipv4_default_gateway(properties);
        info.dns_servers = properties.dns_servers.clone();
        self.notify_on_updated();
    }

    /// Applies a diagnostics report if it targets the tracked network;
    /// silently ignored otherwise.
    pub fn on_connectivity_report_changed(&self, report: &ConnectivityReport) {
        let mut tracked = lock(&self.inner.state);
        if tracked.snapshot.network != Some(report.network) {
            debug!("ignoring connectivity report for unrelated {}", report.network);
            return;
        }
        tracked.snapshot.connectivity_report = Some(*report);
        self.notify_on_updated();
    }

    /// Feeds the scan-based fallback level from the external scan layer.
    pub fn on_scan_level_changed(&self, level: i32) {
        let mut tracked = lock(&self.inner.state);
        tracked.snapshot.scan_level = level;
        self.notify_on_updated();
    }

    // Action surface //

    /// Requests a connection to this network.
    ///
    /// If the OS accepts the call, the callback waits for the next state
    /// update that reaches the connected state. An immediate rejection
    /// fires the callback with the mapped failure right away. Either way
    /// the callback is invoked exactly once, on the callback sink. A
    /// second connect before resolution supersedes the first, whose
    /// callback is dropped unfired.
    pub fn connect(&self, callback: ConnectCallback) {
        match self.inner.invoker.connect(&self.inner.ssid, self.inner.security) {
            Ok(()) => {
                lock(&self.inner.state).pending.issue_connect(callback);
            }
            Err(err) => {
                debug!("connect call for '{}' rejected: {err}", self.inner.ssid);
                lock(&self.inner.state).pending.reset_connect();
                let status = ConnectStatus::from(err);
                self.inner.sink.post(Box::new(move || callback(status)));
            }
        }
    }

    /// Requests a disconnect; resolution mirrors [`connect`].
    ///
    /// [`connect`]: Self::connect
    pub fn disconnect(&self, callback: DisconnectCallback) {
        match self.inner.invoker.disconnect() {
            Ok(()) => {
                lock(&self.inner.state).pending.issue_disconnect(callback);
            }
            Err(err) => {
                debug!("disconnect call for '{}' rejected: {err}", self.inner.ssid);
                lock(&self.inner.state).pending.reset_disconnect();
                let status = DisconnectStatus::from(err);
                self.inner.sink.post(Box::new(move || callback(status)));
            }
        }
    }

    /// Forgets the saved network. The OS call resolves synchronously in
    /// both directions, so the callback fires on the next sink drain
    /// without waiting for a state transition.
    pub fn forget(&self, callback: ForgetCallback) {
        let status = match self.inner.invoker.forget() {
            Ok(()) => ForgetStatus::Success,
            Err(err) => {
                warn!("forget call for '{}' failed: {err}", self.inner.ssid);
                ForgetStatus::from(err)
            }
        };
        self.inner.sink.post(Box::new(move || callback(status)));
    }

    // Internals //

    fn lookup(&self) -> Option<&dyn CapabilityLookup> {
        self.inner.lookup.as_deref()
    }

    /// Merges link info into the snapshot and, if the entry just became
    /// (or remains) connected, resolves an issued connect request.
    fn update_link_info_locked(&self, tracked: &mut Tracked, link: Option<LinkInfo>) {
        let level = match &link {
            Some(link) if link.has_valid_rssi() => self.inner.levels.level_for_rssi(link.rssi),
            _ => signal::LEVEL_UNREACHABLE,
        };
        tracked.snapshot.update_link_info(link, level);

        if reconcile::connected_state(&tracked.snapshot) == ConnectedState::Connected
            && let Some(callback) = tracked.pending.resolve_connect()
        {
            self.inner
                .sink
                .post(Box::new(move || callback(ConnectStatus::Success)));
        }
    }

    /// Clears all connection state and resolves an issued disconnect.
    fn clear_connection_info_locked(&self, tracked: &mut Tracked) {
        tracked.snapshot.clear_connection_info();
        if let Some(callback) = tracked.pending.resolve_disconnect() {
            self.inner
                .sink
                .post(Box::new(move || callback(DisconnectStatus::Success)));
        }
    }

    /// Posts an `on_updated` notification. Called while the state lock is
    /// held so posts happen in mutation order; the task re-reads the
    /// listener slot at delivery time, so a listener replaced after the
    /// post is the one that gets invoked, and an unsubscribed slot drops
    /// the notification.
    fn notify_on_updated(&self) {
        if lock(&self.inner.listener).listener.is_none() {
            return;
        }
        let inner = Arc::clone(&self.inner);
        self.inner.sink.post(Box::new(move || {
            let listener = lock(&inner.listener).listener.clone();
            if let Some(listener) = listener {
                listener.on_updated();
            }
        }));
    }
}

impl PartialEq for NetworkEntry {
    fn eq(&self, other: &Self) -> bool {
        self.inner.ssid == other.inner.ssid && self.inner.security == other.inner.security
    }
}

impl Eq for NetworkEntry {}

impl std::fmt::Debug for NetworkEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkEntry")
            .field("key", &self.key())
            .field("connected_state", &self.connected_state())
            .finish()
    }
}
