//! Constants shared across the entry state engine.
//!
//! Signal level bounds match what Wi-Fi picker UIs display (0-4 bars plus
//! an unreachable sentinel); the matching depth bounds the underlying
//! network graph walk.

/// Signal level constants for displaying signal strength.
pub mod signal {
    /// Lowest displayable signal level.
    pub const LEVEL_MIN: i32 = 0;

    /// Highest displayable signal level.
    pub const LEVEL_MAX: i32 = 4;

    /// Sentinel level for an out-of-range or never-seen network.
    pub const LEVEL_UNREACHABLE: i32 = -1;

    /// Sentinel RSSI meaning "no valid measurement".
    pub const INVALID_RSSI: i16 = -127;
}

/// Underlying-network graph matching constants.
pub mod matching {
    /// Maximum recursion depth when walking underlying networks.
    ///
    /// A capability graph deeper than this is treated as malformed and the
    /// walk gives up (non-match) rather than chasing a possible cycle.
    pub const MAX_UNDERLYING_NETWORK_DEPTH: u32 = 5;
}
