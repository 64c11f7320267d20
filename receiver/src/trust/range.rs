//! CIDR network ranges and membership tests.

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use crate::error::WebhookError;

/// A parsed network prefix such as `192.30.252.0/22` or `2a0a:a440::/29`.
///
/// The stored address is always the network address: host bits are masked
/// off at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustedRange {
    network: IpAddr,
    prefix: u8,
}

impl TrustedRange {
    /// Parse a CIDR string. A bare address without `/prefix` is rejected.
    pub fn parse(cidr: &str) -> Result<Self, WebhookError> {
        let invalid = || WebhookError::Configuration(format!("invalid CIDR range: {cidr:?}"));

        let (addr, prefix) = cidr.trim().split_once('/').ok_or_else(invalid)?;
        let addr: IpAddr = addr.parse().map_err(|_| invalid())?;
        let prefix: u8 = prefix.parse().map_err(|_| invalid())?;

        let network = match addr {
            IpAddr::V4(v4) => {
                if prefix > 32 {
                    return Err(invalid());
                }
                IpAddr::V4((u32::from(v4) & v4_mask(prefix)).into())
            }
            IpAddr::V6(v6) => {
                if prefix > 128 {
                    return Err(invalid());
                }
                IpAddr::V6((u128::from(v6) & v6_mask(prefix)).into())
            }
        };

        Ok(Self { network, prefix })
    }

    pub fn network(&self) -> IpAddr {
        self.network
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Whether `ip` falls inside this range. IPv4-mapped IPv6 addresses are
    /// compared as IPv4.
    pub fn contains(&self, ip: &IpAddr) -> bool {
        match (self.network, ip.to_canonical()) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                u32::from(ip) & v4_mask(self.prefix) == u32::from(net)
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                u128::from(ip) & v6_mask(self.prefix) == u128::from(net)
            }
            _ => false,
        }
    }
}

impl fmt::Display for TrustedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

fn v4_mask(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

fn v6_mask(prefix: u8) -> u128 {
    if prefix == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(prefix))
    }
}

/// Parse every CIDR string, failing on the first malformed entry.
pub fn parse_ranges<S: AsRef<str>>(cidrs: &[S]) -> Result<Vec<TrustedRange>, WebhookError> {
    cidrs.iter().map(|c| TrustedRange::parse(c.as_ref())).collect()
}

/// An immutable snapshot of the trusted ranges.
///
/// Cloning is cheap; every clone observes the same ranges even if the store
/// swaps in a newer set afterwards.
#[derive(Debug, Clone)]
pub struct TrustedSet {
    ranges: Arc<[TrustedRange]>,
}

impl Default for TrustedSet {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl TrustedSet {
    pub fn new(ranges: Vec<TrustedRange>) -> Self {
        Self {
            ranges: ranges.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.ranges.iter().any(|range| range.contains(ip))
    }

    pub fn ranges(&self) -> &[TrustedRange] {
        &self.ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_masks_host_bits() {
        let range = TrustedRange::parse("192.30.252.17/22").unwrap();
        assert_eq!(range.network(), ip("192.30.252.0"));
        assert_eq!(range.prefix(), 22);
        assert_eq!(range.to_string(), "192.30.252.0/22");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "1.2.3.4", "1.2.3.4/33", "1.2.3/24", "::1/129", "abc/8", "1.2.3.4/-1"] {
            assert!(
                matches!(TrustedRange::parse(bad), Err(WebhookError::Configuration(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_contains_v4() {
        let range = TrustedRange::parse("1.2.3.0/24").unwrap();
        assert!(range.contains(&ip("1.2.3.4")));
        assert!(range.contains(&ip("1.2.3.255")));
        assert!(!range.contains(&ip("1.2.4.1")));
        assert!(!range.contains(&ip("9.9.9.9")));
    }

    #[test]
    fn test_contains_v6_and_mapped() {
        let v6 = TrustedRange::parse("2a0a:a440::/29").unwrap();
        assert!(v6.contains(&ip("2a0a:a440::1")));
        assert!(!v6.contains(&ip("2001:db8::1")));
        assert!(!v6.contains(&ip("1.2.3.4")));

        let v4 = TrustedRange::parse("1.2.3.0/24").unwrap();
        assert!(v4.contains(&ip("::ffff:1.2.3.9")));
    }

    #[test]
    fn test_zero_prefix_matches_family() {
        let any_v4 = TrustedRange::parse("0.0.0.0/0").unwrap();
        assert!(any_v4.contains(&ip("8.8.8.8")));
        assert!(!any_v4.contains(&ip("::1")));
    }

    #[test]
    fn test_trusted_set() {
        let set = TrustedSet::new(parse_ranges(&["10.0.0.0/8", "192.168.1.0/24"]).unwrap());
        assert_eq!(set.len(), 2);
        assert!(set.contains(&ip("10.20.30.40")));
        assert!(set.contains(&ip("192.168.1.7")));
        assert!(!set.contains(&ip("192.168.2.7")));
        assert!(!TrustedSet::default().contains(&ip("10.0.0.1")));
    }
}
