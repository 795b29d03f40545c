//! Derivation of displayable state from a [`Snapshot`].
//!
//! These functions are pure and recomputed on every read; nothing here is
//! cached. They encode the merge rules that no single update source
//! reports directly: what "connected" means while L3 capabilities are
//! still in flight, when the entry is the default route despite a VPN on
//! top, and when a working Wi-Fi link is being bypassed for cellular.

use crate::constants::signal;
use crate::matcher::{CapabilityLookup, underlying_network_matches};
use crate::models::{Capability, ConnectedState, DetailedState, Transport};
use crate::snapshot::Snapshot;

/// L3 capabilities are the authoritative connected signal; the coarse OS
/// phase only bridges the gap before they arrive.
pub(crate) fn connected_state(snap: &Snapshot) -> ConnectedState {
    if snap.capabilities.is_some() {
        return ConnectedState::Connected;
    }

    if let Some(state) = snap.detailed_state {
        return match state {
            DetailedState::Scanning
            | DetailedState::Connecting
            | DetailedState::Authenticating
            | DetailedState::ObtainingIpAddr
            | DetailedState::VerifyingPoorLink
            | DetailedState::CaptivePortalCheck
            | DetailedState::Connected => ConnectedState::Connecting,
            _ => ConnectedState::Disconnected,
        };
    }

    ConnectedState::Disconnected
}

/// Whether this entry is the OS's active foreground Wi-Fi association.
pub(crate) fn is_primary_network(snap: &Snapshot) -> bool {
    if connected_state(snap) == ConnectedState::Disconnected {
        return false;
    }
    snap.detailed_state.is_some()
        || snap.link_info.as_ref().is_some_and(|link| link.is_primary)
}

/// Whether this entry currently carries general application traffic,
/// directly, through handoff grace on the prior network instance, or as
/// the transport underneath the default network (e.g. VPN-over-Wi-Fi).
pub(crate) fn is_default_network(snap: &Snapshot, lookup: Option<&dyn CapabilityLookup>) -> bool {
    if snap.network.is_some() && snap.network == snap.default_network {
        return true;
    }

    // The prior network may still be default right after a roam, before
    // the default-route observer has caught up.
    if snap.last_network.is_some() && snap.last_network == snap.default_network {
        return true;
    }

    underlying_network_matches(lookup, snap.default_capabilities.as_ref(), snap.network, 0)
}

/// Whether internet access was probed and confirmed. Does not imply the
/// network is the default route.
pub(crate) fn has_internet_access(snap: &Snapshot) -> bool {
    snap.capabilities
        .as_ref()
        .is_some_and(|caps| caps.has_capability(Capability::VALIDATED))
}

/// Whether a captive portal is waiting to be signed in to.
pub(crate) fn can_sign_in(snap: &Snapshot) -> bool {
    snap.capabilities
        .as_ref()
        .is_some_and(|caps| caps.has_capability(Capability::CAPTIVE_PORTAL))
}

/// A working Wi-Fi link that the system is bypassing in favor of an
/// unrestricted, non-VPN cellular default route. A fallback-quality
/// signal, not a signal-strength one.
pub(crate) fn is_low_quality(snap: &Snapshot, lookup: Option<&dyn CapabilityLookup>) -> bool {
    is_primary_network(snap)
        && has_internet_access(snap)
        && !is_default_network(snap, lookup)
        && snap
            .capabilities
            .as_ref()
            .is_some_and(|caps| caps.has_capability(Capability::INTERNET))
        && snap.default_capabilities.as_ref().is_some_and(|caps| {
            caps.has_transport(Transport::CELLULAR)
                && !caps.has_transport(Transport::VPN)
                && caps.has_capability(Capability::NOT_RESTRICTED)
        })
}

/// Whether the signal icon should carry a degraded marker: the primary
/// connection has been diagnosed and is not delivering usable internet,
/// and there is no captive portal to sign in to.
pub(crate) fn should_show_degraded_icon(
    snap: &Snapshot,
    lookup: Option<&dyn CapabilityLookup>,
) -> bool {
    connected_state(snap) != ConnectedState::Disconnected
        && snap.connectivity_report.is_some()
        && (!has_internet_access(snap) || is_low_quality(snap, lookup))
        && !can_sign_in(snap)
        && is_primary_network(snap)
}

/// Prefers the live link-derived level; falls back to the last scan-based
/// level. Liveness, not magnitude, is the tiebreak.
pub(crate) fn signal_level(snap: &Snapshot) -> i32 {
    if snap.link_level != signal::LEVEL_UNREACHABLE {
        return snap.link_level;
    }
    snap.scan_level
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LinkInfo, NetworkCapabilities, NetworkId, Security, WifiStandard};

    fn primary_link() -> LinkInfo {
        LinkInfo {
            ssid: "Lobby".into(),
            security: Security::Psk,
            bssid: None,
            rssi: -55,
            frequency_mhz: 5180,
            link_speed_mbps: 400,
            standard: WifiStandard::Ax,
            is_primary: true,
        }
    }

    fn caps(capabilities: Capability, transports: Transport) -> NetworkCapabilities {
        NetworkCapabilities {
            capabilities,
            transports,
            ..Default::default()
        }
    }

    /// Snapshot of a connected, primary entry with validated internet.
    fn connected_snapshot() -> Snapshot {
        let mut snap = Snapshot::new();
        snap.network = Some(NetworkId(1));
        snap.capabilities = Some(caps(
            Capability::INTERNET | Capability::VALIDATED,
            Transport::WIFI,
        ));
        snap.link_info = Some(primary_link());
        snap
    }

    #[test]
    fn capabilities_mean_connected() {
        let mut snap = Snapshot::new();
        snap.capabilities = Some(NetworkCapabilities::default());
        assert_eq!(connected_state(&snap), ConnectedState::Connected);
    }

    #[test]
    fn transitional_states_mean_connecting() {
        let mut snap = Snapshot::new();
        for state in [
            DetailedState::Scanning,
            DetailedState::Connecting,
            DetailedState::Authenticating,
            DetailedState::ObtainingIpAddr,
            DetailedState::VerifyingPoorLink,
            DetailedState::CaptivePortalCheck,
            DetailedState::Connected,
        ] {
            snap.detailed_state = Some(state);
            assert_eq!(connected_state(&snap), ConnectedState::Connecting, "{state}");
        }
    }

    #[test]
    fn terminal_states_mean_disconnected() {
        let mut snap = Snapshot::new();
        for state in [
            DetailedState::Idle,
            DetailedState::Disconnecting,
            DetailedState::Disconnected,
            DetailedState::Failed,
        ] {
            snap.detailed_state = Some(state);
            assert_eq!(connected_state(&snap), ConnectedState::Disconnected, "{state}");
        }
        snap.detailed_state = None;
        assert_eq!(connected_state(&snap), ConnectedState::Disconnected);
    }

    #[test]
    fn primary_requires_not_disconnected() {
        let mut snap = Snapshot::new();
        snap.link_info = Some(primary_link());
        // Disconnected overall, so never primary even with a primary link.
        assert!(!is_primary_network(&snap));

        snap.capabilities = Some(NetworkCapabilities::default());
        assert!(is_primary_network(&snap));
    }

    #[test]
    fn primary_via_detailed_state() {
        let mut snap = Snapshot::new();
        snap.detailed_state = Some(DetailedState::Authenticating);
        assert!(is_primary_network(&snap));
    }

    #[test]
    fn non_primary_link_without_detailed_state() {
        let mut snap = Snapshot::new();
        snap.capabilities = Some(NetworkCapabilities::default());
        let mut link = primary_link();
        link.is_primary = false;
        snap.link_info = Some(link);
        assert!(!is_primary_network(&snap));
    }

    #[test]
    fn default_by_direct_handle_match() {
        let mut snap = connected_snapshot();
        snap.default_network = Some(NetworkId(1));
        assert!(is_default_network(&snap, None));
    }

    #[test]
    fn default_by_last_network_grace() {
        let mut snap = connected_snapshot();
        snap.network = Some(NetworkId(2));
        snap.last_network = Some(NetworkId(1));
        snap.default_network = Some(NetworkId(1));
        assert!(is_default_network(&snap, None));
    }

    #[test]
    fn default_by_underlying_network() {
        let mut snap = connected_snapshot();
        snap.default_network = Some(NetworkId(7));
        snap.default_capabilities = Some(NetworkCapabilities {
            transports: Transport::VPN,
            underlying: vec![NetworkId(1)],
            ..Default::default()
        });
        assert!(is_default_network(&snap, None));
    }

    #[test]
    fn not_default_when_nothing_set() {
        let snap = Snapshot::new();
        assert!(!is_default_network(&snap, None));
    }

    #[test]
    fn internet_access_requires_validated() {
        let mut snap = Snapshot::new();
        snap.capabilities = Some(caps(Capability::INTERNET, Transport::WIFI));
        assert!(!has_internet_access(&snap));
        snap.capabilities = Some(caps(
            Capability::INTERNET | Capability::VALIDATED,
            Transport::WIFI,
        ));
        assert!(has_internet_access(&snap));
    }

    #[test]
    fn sign_in_requires_captive_portal() {
        let mut snap = Snapshot::new();
        assert!(!can_sign_in(&snap));
        snap.capabilities = Some(caps(Capability::CAPTIVE_PORTAL, Transport::WIFI));
        assert!(can_sign_in(&snap));
    }

    #[test]
    fn low_quality_when_cellular_default_bypasses_wifi() {
        let mut snap = connected_snapshot();
        snap.default_network = Some(NetworkId(9));
        snap.default_capabilities = Some(caps(
            Capability::NOT_RESTRICTED,
            Transport::CELLULAR,
        ));
        assert!(is_low_quality(&snap, None));
    }

    #[test]
    fn vpn_default_is_not_low_quality() {
        let mut snap = connected_snapshot();
        snap.default_network = Some(NetworkId(9));
        snap.default_capabilities = Some(caps(
            Capability::NOT_RESTRICTED,
            Transport::CELLULAR | Transport::VPN,
        ));
        assert!(!is_low_quality(&snap, None));
    }

    #[test]
    fn restricted_cellular_default_is_not_low_quality() {
        let mut snap = connected_snapshot();
        snap.default_network = Some(NetworkId(9));
        snap.default_capabilities = Some(caps(Capability::empty(), Transport::CELLULAR));
        assert!(!is_low_quality(&snap, None));
    }

    #[test]
    fn being_default_is_not_low_quality() {
        let mut snap = connected_snapshot();
        snap.default_network = Some(NetworkId(1));
        assert!(!is_low_quality(&snap, None));
    }

    #[test]
    fn degraded_icon_requires_report() {
        let mut snap = connected_snapshot();
        snap.capabilities = Some(caps(Capability::INTERNET, Transport::WIFI));
        assert!(!should_show_degraded_icon(&snap, None));

        snap.connectivity_report = Some(crate::models::ConnectivityReport {
            network: NetworkId(1),
            probe_elapsed_millis: 40,
        });
        assert!(should_show_degraded_icon(&snap, None));
    }

    #[test]
    fn degraded_icon_suppressed_by_captive_portal() {
        let mut snap = connected_snapshot();
        snap.capabilities = Some(caps(
            Capability::INTERNET | Capability::CAPTIVE_PORTAL,
            Transport::WIFI,
        ));
        snap.connectivity_report = Some(crate::models::ConnectivityReport {
            network: NetworkId(1),
            probe_elapsed_millis: 40,
        });
        assert!(!should_show_degraded_icon(&snap, None));
    }

    #[test]
    fn healthy_connection_shows_no_degraded_icon() {
        let mut snap = connected_snapshot();
        snap.default_network = Some(NetworkId(1));
        snap.connectivity_report = Some(crate::models::ConnectivityReport {
            network: NetworkId(1),
            probe_elapsed_millis: 40,
        });
        assert!(!should_show_degraded_icon(&snap, None));
    }

    #[test]
    fn live_level_beats_scan_level() {
        let mut snap = Snapshot::new();
        assert_eq!(signal_level(&snap), signal::LEVEL_UNREACHABLE);

        snap.scan_level = 4;
        assert_eq!(signal_level(&snap), 4);

        // A numerically worse live level still wins once present.
        snap.link_level = 2;
        assert_eq!(signal_level(&snap), 2);
    }
}
