//! The mutable per-entry state record.
//!
//! A [`Snapshot`] is exclusively owned by one [`NetworkEntry`] and mutated
//! only under its lock. It holds what the independent observers have
//! reported so far; everything displayable is derived from it on demand by
//! the reconciliation functions in [`crate::reconcile`].
//!
//! [`NetworkEntry`]: crate::entry::NetworkEntry

use crate::constants::signal;
use crate::models::{
    ConnectedInfo, ConnectedState, ConnectivityReport, DetailedState, LinkInfo,
    NetworkCapabilities, NetworkId,
};
use crate::reconcile;

/// Per-entry state merged from the independent update sources.
///
/// Every field is optional: absence means "no information yet" or
/// "explicitly cleared", both of which degrade derivations to the
/// conservative answer (disconnected, non-default, unreachable).
#[derive(Debug, Default)]
pub(crate) struct Snapshot {
    /// Live link-layer info. Absent = no radio association.
    pub(crate) link_info: Option<LinkInfo>,
    /// Coarse OS connection phase, bridging the gap before L3 capabilities.
    pub(crate) detailed_state: Option<DetailedState>,
    /// Handle of the current network instance.
    pub(crate) network: Option<NetworkId>,
    /// Handle of the immediately-prior network instance. Kept briefly so a
    /// roam does not flicker to "disconnected" mid-handoff.
    pub(crate) last_network: Option<NetworkId>,
    /// L3 capability set for `network`. Present iff L3-connected.
    pub(crate) capabilities: Option<NetworkCapabilities>,
    /// The system's currently chosen default route.
    pub(crate) default_network: Option<NetworkId>,
    pub(crate) default_capabilities: Option<NetworkCapabilities>,
    /// Diagnostics snapshot targeting `network`.
    pub(crate) connectivity_report: Option<ConnectivityReport>,
    /// Display snapshot of the active connection. Populated only while
    /// connected; handed out by value copy.
    pub(crate) connected_info: Option<ConnectedInfo>,
    /// Signal level derived from the live link info.
    pub(crate) link_level: i32,
    /// Last known scan-based signal level, fed by the external scan layer.
    pub(crate) scan_level: i32,
}

impl Snapshot {
    pub(crate) fn new() -> Self {
        Self {
            link_level: signal::LEVEL_UNREACHABLE,
            scan_level: signal::LEVEL_UNREACHABLE,
            ..Default::default()
        }
    }

    /// Merges new live link info, or clears it when `link` is `None`.
    ///
    /// `level` is the discrete signal level precomputed from the link's
    /// RSSI; it is adopted only when the RSSI reading is valid, so a stale
    /// live level survives a momentary invalid sample. While connected,
    /// the link-layer display fields of `connected_info` are refreshed.
    pub(crate) fn update_link_info(&mut self, link: Option<LinkInfo>, level: i32) {
        let Some(link) = link else {
            self.link_info = None;
            self.connected_info = None;
            self.link_level = signal::LEVEL_UNREACHABLE;
            return;
        };

        if link.has_valid_rssi() {
            self.link_level = level;
        }
        let frequency_mhz = link.frequency_mhz;
        let link_speed_mbps = link.link_speed_mbps;
        let standard = link.standard;
        self.link_info = Some(link);

        if reconcile::connected_state(self) == ConnectedState::Connected {
            let info = self.connected_info.get_or_insert_with(ConnectedInfo::default);
            info.frequency_mhz = frequency_mhz;
            info.link_speed_mbps = link_speed_mbps;
            info.standard = Some(standard);
        }
    }

    /// Clears every connection-related field, returning the entry to the
    /// disconnected baseline. Default-route fields are untouched; they are
    /// orthogonal to this entry's own connection.
    pub(crate) fn clear_connection_info(&mut self) {
        self.update_link_info(None, signal::LEVEL_UNREACHABLE);
        self.network = None;
        self.last_network = None;
        self.detailed_state = None;
        self.capabilities = None;
        self.connectivity_report = None;
    }
}
