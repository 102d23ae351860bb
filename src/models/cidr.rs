//! CIDR subnets.
//!
//! Provides [`Cidr`], a base address plus prefix length, and the derived
//! masks, usable range, broadcast address and network type.

use super::address::IpAddress;
use super::mask::{common_prefix_len, host_mask_from_mask, mask_to_prefix, prefix_to_mask};
use super::version::IpVersion;
use crate::error::IpError;
use crate::processing::{AddressTable, AddressType, DEFAULT_TABLE};
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Immutable subnet: base address, prefix length and the derived masks.
///
/// The base address is taken as given; it is assumed to be aligned to the
/// subnet boundary and is never masked.
#[derive(Eq, PartialEq, Debug, Copy, Clone, Hash)]
pub struct Cidr {
    base: IpAddress,
    prefix: u8,
    mask: u128,
    host_mask: u128,
}

impl Cidr {
    /// Create a [`Cidr`] from a combined token (e.g., "10.0.0.0/24").
    pub fn parse(token: &str) -> Result<Cidr, IpError> {
        let token = token.trim();
        let (addr, prefix) = token.split_once('/').ok_or_else(|| IpError::InvalidCidr {
            input: token.to_string(),
        })?;
        let base = IpAddress::parse(addr)?;
        let prefix = parse_prefix(prefix, base.version())?;
        Cidr::new(base, prefix)
    }

    /// Create a [`Cidr`] from an address and prefix length.
    pub fn new(base: IpAddress, prefix: u8) -> Result<Cidr, IpError> {
        let version = base.version();
        let mask = prefix_to_mask(prefix, version)?;
        let host_mask = host_mask_from_mask(mask, version);
        log::debug!("Cidr::new({base}/{prefix}) mask={mask:#x}");
        Ok(Cidr {
            base,
            prefix,
            mask,
            host_mask,
        })
    }

    /// Create a [`Cidr`] from an address and a mask address (e.g., 255.255.255.0).
    pub fn with_mask(base: IpAddress, mask: IpAddress) -> Result<Cidr, IpError> {
        if base.version() != mask.version() {
            return Err(IpError::VersionMismatch {
                first: base.version(),
                last: mask.version(),
            });
        }
        let prefix = mask_to_prefix(mask.to_int(), mask.version()).map_err(|_| {
            IpError::InvalidMask {
                mask: mask.to_string(),
            }
        })?;
        Cidr::new(base, prefix)
    }

    /// Create the smallest [`Cidr`] covering both boundary addresses.
    ///
    /// The prefix is the number of leading bits the two addresses share, over
    /// the bit width of their declared version. The base is the lower address
    /// aligned to that prefix, so the pair may be given in either order.
    pub fn from_range(first: IpAddress, last: IpAddress) -> Result<Cidr, IpError> {
        let version = first.version();
        if version != last.version() {
            return Err(IpError::VersionMismatch {
                first: version,
                last: last.version(),
            });
        }
        let prefix = common_prefix_len(first.to_int(), last.to_int(), version);
        let mask = prefix_to_mask(prefix, version)?;
        let lower = first.to_int().min(last.to_int());
        let base = IpAddress::from_numeric(lower & mask, version)?;
        log::debug!("Cidr::from_range({first}, {last}) -> {base}/{prefix}");
        Cidr::new(base, prefix)
    }

    pub fn version(&self) -> IpVersion {
        self.base.version()
    }

    pub fn prefix_length(&self) -> u8 {
        self.prefix
    }

    pub fn mask(&self) -> u128 {
        self.mask
    }

    pub fn host_mask(&self) -> u128 {
        self.host_mask
    }

    /// The base address, unchanged.
    pub fn network_address(&self) -> IpAddress {
        self.base
    }

    /// Highest address of the subnet. v4 only.
    pub fn broadcast_address(&self) -> Result<IpAddress, IpError> {
        match self.version() {
            IpVersion::V4 => Ok(self.address(self.upper_bound())),
            IpVersion::V6 => Err(IpError::UnsupportedForIpv6 {
                operation: "broadcast address",
            }),
        }
    }

    pub fn network_mask_address(&self) -> IpAddress {
        self.address(self.mask)
    }

    pub fn host_mask_address(&self) -> IpAddress {
        self.address(self.host_mask)
    }

    /// First host address.
    ///
    /// v4 skips the network address, except for a /32 single host.
    /// v6 has no such convention.
    pub fn first_usable_address(&self) -> IpAddress {
        let base = self.base.to_int();
        if self.excludes_network_and_broadcast() {
            self.address((base + 1).min(self.upper_bound()))
        } else {
            self.base
        }
    }

    /// Last host address.
    ///
    /// v4 skips the broadcast address, except for a /32 single host.
    /// v6 has no such convention.
    pub fn last_usable_address(&self) -> IpAddress {
        let upper = self.upper_bound();
        if self.excludes_network_and_broadcast() {
            self.address(upper.saturating_sub(1).max(self.base.to_int()))
        } else {
            self.address(upper)
        }
    }

    /// Address type shared by both ends of the subnet, using the built-in table.
    pub fn network_type(&self) -> Result<AddressType, IpError> {
        self.network_type_with(&DEFAULT_TABLE)
    }

    /// Address type shared by both ends of the subnet.
    ///
    /// v4 compares the base and broadcast addresses, v6 the base and last
    /// usable addresses.
    ///
    /// # Errors
    /// [`IpError::InconsistentSubnet`] if the two ends classify differently.
    pub fn network_type_with(&self, table: &AddressTable) -> Result<AddressType, IpError> {
        let version = self.version();
        let upper = match version {
            IpVersion::V4 => self.broadcast_address()?,
            IpVersion::V6 => self.last_usable_address(),
        };
        let first = table.classify(version, self.base.to_int());
        let last = table.classify(version, upper.to_int());
        if first != last {
            log::warn!("Subnet {self} spans {first} ({}) and {last} ({upper})", self.base);
            return Err(IpError::InconsistentSubnet {
                cidr: self.to_string(),
                first,
                last,
            });
        }
        Ok(first)
    }

    /// True if `addr` is the same version and shares the network bits.
    pub fn contains(&self, addr: &IpAddress) -> bool {
        addr.version() == self.version()
            && addr.to_int() & self.mask == self.base.to_int() & self.mask
    }

    fn upper_bound(&self) -> u128 {
        self.base.to_int() | self.host_mask
    }

    fn excludes_network_and_broadcast(&self) -> bool {
        self.version() == IpVersion::V4 && self.prefix < IpVersion::V4.bits()
    }

    /// Wrap a value already inside the version's width.
    fn address(&self, value: u128) -> IpAddress {
        match self.version() {
            IpVersion::V4 => IpAddress::from_u32(value as u32),
            IpVersion::V6 => IpAddress::from_u128(value),
        }
    }
}

/// Parse a decimal prefix length (no sign) bounded by the version's width.
fn parse_prefix(text: &str, version: IpVersion) -> Result<u8, IpError> {
    let invalid = || IpError::InvalidPrefixLength {
        input: text.to_string(),
        version,
        max: version.bits(),
    };
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let prefix: u32 = text.parse().map_err(|_| invalid())?;
    if prefix > version.bits() as u32 {
        return Err(invalid());
    }
    Ok(prefix as u8)
}

impl std::fmt::Display for Cidr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.prefix)
    }
}

impl FromStr for Cidr {
    type Err = IpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cidr::parse(s)
    }
}

impl Serialize for Cidr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Cidr {
    fn deserialize<D>(deserializer: D) -> Result<Cidr, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Cidr::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddress {
        IpAddress::parse(s).unwrap()
    }

    #[test]
    fn test_ipv4_subnet() {
        let cidr = Cidr::parse("10.0.10.0/24").unwrap();
        assert_eq!(cidr.prefix_length(), 24);
        assert_eq!(cidr.network_address(), ip("10.0.10.0"));
        assert_eq!(cidr.network_mask_address(), ip("255.255.255.0"));
        assert_eq!(cidr.host_mask_address(), ip("0.0.0.255"));
        assert_eq!(cidr.first_usable_address(), ip("10.0.10.1"));
        assert_eq!(cidr.last_usable_address(), ip("10.0.10.254"));
        assert_eq!(cidr.broadcast_address().unwrap(), ip("10.0.10.255"));
        assert_eq!(cidr.network_type().unwrap(), AddressType::Private);
    }

    #[test]
    fn test_ipv4_single_host() {
        let cidr = Cidr::parse("10.0.10.0/32").unwrap();
        assert_eq!(cidr.first_usable_address(), ip("10.0.10.0"));
        assert_eq!(cidr.last_usable_address(), ip("10.0.10.0"));
        assert_eq!(cidr.host_mask_address(), ip("0.0.0.0"));
        assert_eq!(cidr.network_mask_address(), ip("255.255.255.255"));
        assert_eq!(cidr.broadcast_address().unwrap(), ip("10.0.10.0"));
    }

    #[test]
    fn test_ipv4_point_to_point() {
        // /31 still skips network and broadcast, leaving the bounds crossed
        let cidr = Cidr::parse("10.0.10.0/31").unwrap();
        assert_eq!(cidr.first_usable_address(), ip("10.0.10.1"));
        assert_eq!(cidr.last_usable_address(), ip("10.0.10.0"));
        assert_eq!(cidr.broadcast_address().unwrap(), ip("10.0.10.1"));
    }

    #[test]
    fn test_ipv4_whole_space() {
        let cidr = Cidr::parse("0.0.0.0/0").unwrap();
        assert_eq!(cidr.network_mask_address(), ip("0.0.0.0"));
        assert_eq!(cidr.host_mask_address(), ip("255.255.255.255"));
        assert_eq!(cidr.broadcast_address().unwrap(), ip("255.255.255.255"));
        assert_eq!(cidr.last_usable_address(), ip("255.255.255.254"));
        assert!(matches!(
            cidr.network_type(),
            Err(IpError::InconsistentSubnet {
                first: AddressType::Software,
                last: AddressType::Broadcast,
                ..
            })
        ));
    }

    #[test]
    fn test_loopback_subnet() {
        let cidr = Cidr::parse("127.0.0.1/24").unwrap();
        assert_eq!(cidr.network_address().version(), IpVersion::V4);
        assert_eq!(cidr.network_type().unwrap(), AddressType::Loopback);
    }

    #[test]
    fn test_ipv6_subnet() {
        let cidr = Cidr::parse("2001:db8::/64").unwrap();
        assert_eq!(cidr.network_mask_address(), ip("ffff:ffff:ffff:ffff::"));
        assert_eq!(cidr.host_mask_address(), ip("::ffff:ffff:ffff:ffff"));
        assert_eq!(cidr.first_usable_address(), ip("2001:db8::"));
        assert_eq!(
            cidr.last_usable_address(),
            ip("2001:db8::ffff:ffff:ffff:ffff")
        );
        assert_eq!(cidr.network_type().unwrap(), AddressType::Documentation);
        assert_eq!(
            cidr.broadcast_address().unwrap_err(),
            IpError::UnsupportedForIpv6 {
                operation: "broadcast address"
            }
        );
    }

    #[test]
    fn test_ipv6_loopback_subnet() {
        let cidr = Cidr::parse("::1/128").unwrap();
        assert_eq!(cidr.network_address().version(), IpVersion::V6);
        assert_eq!(cidr.network_type().unwrap(), AddressType::Loopback);
    }

    #[test]
    fn test_inconsistent_subnet() {
        // 10.0.0.0/7 runs from 10.0.0.0 (private) to 11.255.255.255 (public)
        let cidr = Cidr::parse("10.0.0.0/7").unwrap();
        assert_eq!(
            cidr.network_type().unwrap_err(),
            IpError::InconsistentSubnet {
                cidr: "10.0.0.0/7".to_string(),
                first: AddressType::Private,
                last: AddressType::Public
            }
        );

        let cidr = Cidr::parse("fc00::/6").unwrap();
        assert!(matches!(
            cidr.network_type(),
            Err(IpError::InconsistentSubnet { .. })
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Cidr::parse("10.0.0.0").unwrap_err(),
            IpError::InvalidCidr {
                input: "10.0.0.0".to_string()
            }
        );
        assert_eq!(
            Cidr::parse("10.0.0.0/33").unwrap_err(),
            IpError::InvalidPrefixLength {
                input: "33".to_string(),
                version: IpVersion::V4,
                max: 32
            }
        );
        assert!(Cidr::parse("10.0.0.0/+8").is_err());
        assert!(Cidr::parse("10.0.0.0/-1").is_err());
        assert!(Cidr::parse("10.0.0.0/").is_err());
        assert!(Cidr::parse("10.0.0.0/99999999999").is_err());
        assert!(Cidr::parse("::/129").is_err());
        assert!(Cidr::parse("::/128").is_ok());
        assert!(matches!(
            Cidr::parse("10.0.0/8"),
            Err(IpError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_new() {
        let cidr = Cidr::new(ip("192.168.0.0"), 16).unwrap();
        assert_eq!(cidr.to_string(), "192.168.0.0/16");
        assert!(Cidr::new(ip("192.168.0.0"), 33).is_err());
        assert!(Cidr::new(ip("fe80::"), 128).is_ok());
    }

    #[test]
    fn test_with_mask() {
        let cidr = Cidr::with_mask(ip("10.0.10.0"), ip("255.255.255.0")).unwrap();
        assert_eq!(cidr.prefix_length(), 24);
        assert_eq!(
            Cidr::with_mask(ip("10.0.10.0"), ip("255.0.255.0")).unwrap_err(),
            IpError::InvalidMask {
                mask: "255.0.255.0".to_string()
            }
        );
        assert!(matches!(
            Cidr::with_mask(ip("10.0.10.0"), ip("ffff::")),
            Err(IpError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_from_range() {
        let cidr = Cidr::from_range(ip("10.0.10.0"), ip("10.0.10.255")).unwrap();
        assert_eq!(cidr.prefix_length(), 24);
        assert_eq!(cidr.network_address(), ip("10.0.10.0"));

        let cidr = Cidr::from_range(ip("10.0.10.7"), ip("10.0.10.7")).unwrap();
        assert_eq!(cidr.prefix_length(), 32);
        assert_eq!(cidr.network_address(), ip("10.0.10.7"));
    }

    #[test]
    fn test_from_range_unaligned() {
        let cidr = Cidr::from_range(ip("10.0.10.5"), ip("10.0.10.200")).unwrap();
        assert_eq!(cidr.to_string(), "10.0.10.0/24");
        assert_eq!(cidr.first_usable_address(), ip("10.0.10.1"));
        assert_eq!(cidr.last_usable_address(), ip("10.0.10.254"));
        assert!(cidr.contains(&ip("10.0.10.5")));
        assert!(cidr.contains(&ip("10.0.10.200")));

        let cidr = Cidr::from_range(ip("2001:db8::5"), ip("2001:db8::1:0")).unwrap();
        assert_eq!(cidr.to_string(), "2001:db8::/111");
    }

    #[test]
    fn test_from_range_reversed() {
        let cidr = Cidr::from_range(ip("10.0.10.255"), ip("10.0.10.0")).unwrap();
        assert_eq!(cidr.to_string(), "10.0.10.0/24");
        assert_eq!(cidr.first_usable_address(), ip("10.0.10.1"));
        assert_eq!(cidr.last_usable_address(), ip("10.0.10.254"));
        assert_eq!(cidr.broadcast_address().unwrap(), ip("10.0.10.255"));
    }

    #[test]
    fn test_from_range_small_ipv6() {
        // width comes from the version, not from the magnitude of the value
        let cidr = Cidr::from_range(ip("::"), ip("::ff")).unwrap();
        assert_eq!(cidr.prefix_length(), 120);
        assert_eq!(cidr.version(), IpVersion::V6);
    }

    #[test]
    fn test_from_range_version_mismatch() {
        assert_eq!(
            Cidr::from_range(ip("0.0.0.1"), ip("::1")).unwrap_err(),
            IpError::VersionMismatch {
                first: IpVersion::V4,
                last: IpVersion::V6
            }
        );
    }

    #[test]
    fn test_contains() {
        let cidr = Cidr::parse("10.0.10.0/24").unwrap();
        assert!(cidr.contains(&ip("10.0.10.200")));
        assert!(!cidr.contains(&ip("10.0.11.0")));
        assert!(!cidr.contains(&IpAddress::from_u128(0x0a000a01)));
    }

    #[test]
    fn test_serde() {
        let cidr = Cidr::parse("fe80::/10").unwrap();
        let json = serde_json::to_string(&cidr).unwrap();
        assert_eq!(json, "\"fe80::/10\"");
        assert_eq!(serde_json::from_str::<Cidr>(&json).unwrap(), cidr);
        assert!(serde_json::from_str::<Cidr>("\"fe80::\"").is_err());
    }
}
