use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use thiserror::Error;

use crate::constants::signal;

/// Opaque handle identifying one live network instance.
///
/// Handles are comparable for equality only; no ordering is assumed. A new
/// handle is minted by the OS every time a network comes up, so two
/// associations to the same access point get distinct handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkId(pub u64);

impl Display for NetworkId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "net#{}", self.0)
    }
}

bitflags! {
    /// L3 capability bits carried by a [`NetworkCapabilities`] set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capability: u32 {
        /// The network is expected to provide general internet access.
        const INTERNET             = 1 << 0;
        /// Internet access was probed and confirmed working.
        const VALIDATED            = 1 << 1;
        /// A captive portal intercepted the validation probe.
        const CAPTIVE_PORTAL       = 1 << 2;
        /// Only some validation probes succeeded.
        const PARTIAL_CONNECTIVITY = 1 << 3;
        /// The network is usable by general application traffic.
        const NOT_RESTRICTED       = 1 << 4;
        /// Restricted network paid for by an OEM.
        const OEM_PAID             = 1 << 5;
        /// Restricted network private to an OEM.
        const OEM_PRIVATE          = 1 << 6;
    }
}

bitflags! {
    /// Transport bits carried by a [`NetworkCapabilities`] set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Transport: u32 {
        const WIFI     = 1 << 0;
        const CELLULAR = 1 << 1;
        const VPN      = 1 << 2;
        const ETHERNET = 1 << 3;
    }
}

/// L3 capability set reported for a network by the connectivity layer.
///
/// `underlying` lists the lower-layer transports a virtual network (for
/// example a VPN) is carried over. `link_info` is the link-layer transport
/// info the connectivity layer attaches to Wi-Fi networks; it is how a
/// capabilities update identifies which entry it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkCapabilities {
    pub capabilities: Capability,
    pub transports: Transport,
    pub underlying: Vec<NetworkId>,
    pub link_info: Option<LinkInfo>,
}

impl NetworkCapabilities {
    pub fn has_capability(&self, cap: Capability) -> bool {
        self.capabilities.contains(cap)
    }

    pub fn has_transport(&self, transport: Transport) -> bool {
        self.transports.contains(transport)
    }

    /// OEM-restricted connections stay tracked even when not primary.
    pub fn is_exempt(&self) -> bool {
        self.capabilities
            .intersects(Capability::OEM_PAID | Capability::OEM_PRIVATE)
    }
}

impl Default for NetworkCapabilities {
    fn default() -> Self {
        Self {
            capabilities: Capability::empty(),
            transports: Transport::WIFI,
            underlying: Vec::new(),
            link_info: None,
        }
    }
}

/// Wi-Fi security type, the identity-matching half of an entry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Security {
    Open,
    Owe,
    Wep,
    Psk,
    Sae,
    Eap,
}

impl Display for Security {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::Owe => write!(f, "OWE"),
            Self::Wep => write!(f, "WEP"),
            Self::Psk => write!(f, "PSK"),
            Self::Sae => write!(f, "SAE"),
            Self::Eap => write!(f, "802.1X"),
        }
    }
}

/// Wi-Fi PHY standard of a live association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WifiStandard {
    Unknown,
    Legacy,
    N,
    Ac,
    Ax,
    Be,
}

impl Display for WifiStandard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Legacy => write!(f, "legacy"),
            Self::N => write!(f, "802.11n"),
            Self::Ac => write!(f, "802.11ac"),
            Self::Ax => write!(f, "802.11ax"),
            Self::Be => write!(f, "802.11be"),
        }
    }
}

/// Link-layer info for a live radio association.
///
/// Absent from the snapshot entirely when there is no association. The
/// `ssid`/`security` pair is what identity matching compares against the
/// entry key; `is_primary` marks the OS's active foreground association as
/// opposed to a secondary/multi-internet link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkInfo {
    pub ssid: String,
    pub security: Security,
    pub bssid: Option<String>,
    /// Received signal strength in dBm, or [`signal::INVALID_RSSI`].
    pub rssi: i16,
    pub frequency_mhz: u32,
    pub link_speed_mbps: u32,
    pub standard: WifiStandard,
    pub is_primary: bool,
}

impl LinkInfo {
    pub fn has_valid_rssi(&self) -> bool {
        self.rssi != signal::INVALID_RSSI
    }
}

/// Coarse OS-level connection phase, reported alongside primary link info.
///
/// Only used to infer "connecting" before L3 capabilities exist; once a
/// capability set arrives it is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailedState {
    Idle,
    Scanning,
    Connecting,
    Authenticating,
    ObtainingIpAddr,
    VerifyingPoorLink,
    CaptivePortalCheck,
    Connected,
    Disconnecting,
    Disconnected,
    Failed,
}

impl Display for DetailedState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Scanning => write!(f, "scanning"),
            Self::Connecting => write!(f, "connecting"),
            Self::Authenticating => write!(f, "authenticating"),
            Self::ObtainingIpAddr => write!(f, "obtaining IP address"),
            Self::VerifyingPoorLink => write!(f, "verifying link"),
            Self::CaptivePortalCheck => write!(f, "captive portal check"),
            Self::Connected => write!(f, "connected"),
            Self::Disconnecting => write!(f, "disconnecting"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Derived connection state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectedState {
    Disconnected,
    Connecting,
    Connected,
}

impl Display for ConnectedState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
        }
    }
}

/// One address assigned to a link, with its prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkAddress {
    pub address: IpAddr,
    pub prefix_len: u8,
}

/// One route installed on a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub destination: LinkAddress,
    pub gateway: Option<IpAddr>,
}

impl RouteInfo {
    /// A default route covers the whole address space.
    pub fn is_default_route(&self) -> bool {
        self.destination.prefix_len == 0
    }
}

/// IP-layer properties reported for a network by the link-property observer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkProperties {
    pub addresses: Vec<LinkAddress>,
    pub routes: Vec<RouteInfo>,
    pub dns_servers: Vec<IpAddr>,
}

/// Diagnostics snapshot from the connectivity-report producer.
///
/// Applied to an entry only when it targets the entry's current network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityReport {
    pub network: NetworkId,
    /// How long the validation probe took, for display in detail views.
    pub probe_elapsed_millis: u64,
}

/// Display snapshot of the active connection.
///
/// Populated only while connected; reads hand out value copies so callers
/// cannot corrupt the tracked state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectedInfo {
    pub frequency_mhz: u32,
    pub link_speed_mbps: u32,
    pub standard: Option<WifiStandard>,
    pub ip_address: Option<Ipv4Addr>,
    pub subnet_mask: Option<Ipv4Addr>,
    pub gateway: Option<Ipv4Addr>,
    pub ipv6_addresses: Vec<Ipv6Addr>,
    pub dns_servers: Vec<IpAddr>,
}

/// Terminal status of a connect request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectStatus {
    Success,
    FailureNoConfig,
    FailureUnknown,
    FailureSimAbsent,
}

impl Display for ConnectStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::FailureNoConfig => write!(f, "no saved configuration"),
            Self::FailureUnknown => write!(f, "unknown failure"),
            Self::FailureSimAbsent => write!(f, "SIM absent"),
        }
    }
}

/// Terminal status of a disconnect request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisconnectStatus {
    Success,
    FailureUnknown,
}

impl Display for DisconnectStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::FailureUnknown => write!(f, "unknown failure"),
        }
    }
}

/// Terminal status of a forget request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForgetStatus {
    Success,
    FailureUnknown,
}

impl Display for ForgetStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::FailureUnknown => write!(f, "unknown failure"),
        }
    }
}

/// Synchronous failure reported by the OS-level action invoker.
///
/// These are immediate rejections of the call itself; failures discovered
/// later at the network layer never surface through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    /// No saved configuration exists for the network.
    #[error("no saved configuration for network")]
    NoConfig,

    /// The network requires a SIM that is not present.
    #[error("required SIM is absent")]
    SimAbsent,

    /// The OS rejected the call for an unspecified reason.
    #[error("action rejected by the OS")]
    Unknown,
}

impl From<ActionError> for ConnectStatus {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::NoConfig => Self::FailureNoConfig,
            ActionError::SimAbsent => Self::FailureSimAbsent,
            ActionError::Unknown => Self::FailureUnknown,
        }
    }
}

impl From<ActionError> for DisconnectStatus {
    fn from(_: ActionError) -> Self {
        Self::FailureUnknown
    }
}

impl From<ActionError> for ForgetStatus {
    fn from(_: ActionError) -> Self {
        Self::FailureUnknown
    }
}
