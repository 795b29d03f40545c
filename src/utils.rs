//! Helpers for extracting display values from link properties.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::models::LinkProperties;

/// Derives a dotted-quad subnet mask from a prefix length.
///
/// Prefix lengths beyond 32 are clamped to a full mask.
pub(crate) fn mask_from_prefix_len(prefix_len: u8) -> Ipv4Addr {
    let bits = if prefix_len == 0 {
        0
    } else if prefix_len >= 32 {
        u32::MAX
    } else {
        u32::MAX << (32 - u32::from(prefix_len))
    };
    Ipv4Addr::from(bits)
}

/// Returns the first IPv4 address on the link together with its derived
/// subnet mask.
pub(crate) fn first_ipv4_address(props: &LinkProperties) -> Option<(Ipv4Addr, Ipv4Addr)> {
    props.addresses.iter().find_map(|addr| match addr.address {
        IpAddr::V4(v4) => Some((v4, mask_from_prefix_len(addr.prefix_len))),
        IpAddr::V6(_) => None,
    })
}

/// Returns every IPv6 address assigned to the link.
pub(crate) fn ipv6_addresses(props: &LinkProperties) -> Vec<Ipv6Addr> {
    props
        .addresses
        .iter()
        .filter_map(|addr| match addr.address {
            IpAddr::V6(v6) => Some(v6),
            IpAddr::V4(_) => None,
        })
        .collect()
}

/// Returns the gateway of the first IPv4 default route on the link.
pub(crate) fn first_ipv4_default_gateway(props: &LinkProperties) -> Option<Ipv4Addr> {
    props.routes.iter().find_map(|route| {
        if !route.is_default_route() || !route.destination.address.is_ipv4() {
            return None;
        }
        match route.gateway {
            Some(IpAddr::V4(gw)) => Some(gw),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LinkAddress, RouteInfo};

    fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    #[test]
    fn mask_from_common_prefixes() {
        assert_eq!(mask_from_prefix_len(0), Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(mask_from_prefix_len(8), Ipv4Addr::new(255, 0, 0, 0));
        assert_eq!(mask_from_prefix_len(16), Ipv4Addr::new(255, 255, 0, 0));
        assert_eq!(mask_from_prefix_len(24), Ipv4Addr::new(255, 255, 255, 0));
        assert_eq!(mask_from_prefix_len(25), Ipv4Addr::new(255, 255, 255, 128));
        assert_eq!(mask_from_prefix_len(32), Ipv4Addr::new(255, 255, 255, 255));
        assert_eq!(mask_from_prefix_len(64), Ipv4Addr::new(255, 255, 255, 255));
    }

    #[test]
    fn first_ipv4_wins_over_later_ones() {
        let props = LinkProperties {
            addresses: vec![
                LinkAddress {
                    address: "fe80::1".parse().unwrap(),
                    prefix_len: 64,
                },
                LinkAddress {
                    address: v4(192, 168, 1, 50),
                    prefix_len: 24,
                },
                LinkAddress {
                    address: v4(10, 0, 0, 2),
                    prefix_len: 8,
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            first_ipv4_address(&props),
            Some((
                Ipv4Addr::new(192, 168, 1, 50),
                Ipv4Addr::new(255, 255, 255, 0)
            ))
        );
    }

    #[test]
    fn no_ipv4_address_present() {
        let props = LinkProperties {
            addresses: vec![LinkAddress {
                address: "2001:db8::5".parse().unwrap(),
                prefix_len: 64,
            }],
            ..Default::default()
        };
        assert_eq!(first_ipv4_address(&props), None);
    }

    #[test]
    fn collects_all_ipv6_addresses() {
        let props = LinkProperties {
            addresses: vec![
                LinkAddress {
                    address: "fe80::1".parse().unwrap(),
                    prefix_len: 64,
                },
                LinkAddress {
                    address: v4(192, 168, 1, 50),
                    prefix_len: 24,
                },
                LinkAddress {
                    address: "2001:db8::5".parse().unwrap(),
                    prefix_len: 64,
                },
            ],
            ..Default::default()
        };
        let v6 = ipv6_addresses(&props);
        assert_eq!(v6.len(), 2);
        assert_eq!(v6[0], "fe80::1".parse::<Ipv6Addr>().unwrap());
        assert_eq!(v6[1], "2001:db8::5".parse::<Ipv6Addr>().unwrap());
    }

    #[test]
    fn picks_first_ipv4_default_gateway() {
        let props = LinkProperties {
            routes: vec![
                // Link-local route, not default.
                RouteInfo {
                    destination: LinkAddress {
                        address: v4(192, 168, 1, 0),
                        prefix_len: 24,
                    },
                    gateway: None,
                },
                // IPv6 default route, wrong family.
                RouteInfo {
                    destination: LinkAddress {
                        address: "::".parse().unwrap(),
                        prefix_len: 0,
                    },
                    gateway: Some("fe80::1".parse().unwrap()),
                },
                RouteInfo {
                    destination: LinkAddress {
                        address: v4(0, 0, 0, 0),
                        prefix_len: 0,
                    },
                    gateway: Some(v4(192, 168, 1, 1)),
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            first_ipv4_default_gateway(&props),
            Some(Ipv4Addr::new(192, 168, 1, 1))
        );
    }

    #[test]
    fn default_route_without_gateway_is_skipped() {
        let props = LinkProperties {
            routes: vec![RouteInfo {
                destination: LinkAddress {
                    address: v4(0, 0, 0, 0),
                    prefix_len: 0,
                },
                gateway: None,
            }],
            ..Default::default()
        };
        assert_eq!(first_ipv4_default_gateway(&props), None);
    }
}
