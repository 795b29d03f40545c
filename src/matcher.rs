//! Underlying-network graph matching.
//!
//! Detects that the tracked network is the transport underneath another
//! network's capability set, for example a VPN tunneled over this Wi-Fi
//! link. The walk is a pure function over an injected capability-lookup
//! collaborator so tests can run it against synthetic graphs.

use log::error;

use crate::constants::matching::MAX_UNDERLYING_NETWORK_DEPTH;
use crate::models::{NetworkCapabilities, NetworkId};

/// Lookup of the current capability set for a network handle.
///
/// Returns `None` when the handle is unknown or already gone; both are
/// normal during churn and simply end that branch of the walk.
pub trait CapabilityLookup: Send + Sync {
    fn capabilities_of(&self, network: NetworkId) -> Option<NetworkCapabilities>;
}

/// Returns whether `target` appears in the underlying-network graph of
/// `caps`, directly or through further layers of underlying networks.
///
/// Depth is bounded by [`MAX_UNDERLYING_NETWORK_DEPTH`]; a deeper graph is
/// treated as malformed and reported as a non-match. A missing `lookup`
/// collaborator is an internal inconsistency and also degrades to a
/// non-match, never a panic.
pub(crate) fn underlying_network_matches(
    lookup: Option<&dyn CapabilityLookup>,
    caps: Option<&NetworkCapabilities>,
    target: Option<NetworkId>,
    depth: u32,
) -> bool {
    if depth > MAX_UNDERLYING_NETWORK_DEPTH {
        error!("underlying network depth greater than max depth of {MAX_UNDERLYING_NETWORK_DEPTH}");
        return false;
    }

    let Some(caps) = caps else {
        return false;
    };
    let Some(target) = target else {
        return false;
    };

    if caps.underlying.is_empty() {
        return false;
    }
    if caps.underlying.contains(&target) {
        return true;
    }

    // Check the underlying networks of the underlying networks.
    let Some(lookup) = lookup else {
        error!("capability lookup is unavailable, cannot match underlying networks");
        return false;
    };
    caps.underlying.iter().any(|&underlying| {
        underlying_network_matches(
            Some(lookup),
            lookup.capabilities_of(underlying).as_ref(),
            Some(target),
            depth + 1,
        )
    })
}
