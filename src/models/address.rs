//! IP address value object.
//!
//! Provides [`IpAddress`], a version-tagged unsigned integer with canonical text
//! and byte encodings for both address families.

use super::version::{check_ip_version, strip_brackets, IpVersion, IPV6_GROUPS};
use crate::error::IpError;
use crate::processing::{classify, AddressTable, AddressType};
use itertools::Itertools;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Immutable IP address: a declared version plus a numeric value that fits its width.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct IpAddress {
    version: IpVersion,
    value: u128,
}

/// Plain view of an address, handy for serialization.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AddressObject {
    /// Canonical text form.
    pub address: String,
    /// Address family.
    pub version: IpVersion,
    /// Numeric value, unsigned.
    pub numeric_ip: u128,
}

impl IpAddress {
    /// Parse a v4 or v6 literal (v6 optionally in `[...]`).
    ///
    /// # Examples
    /// ```
    /// use ipcidr::models::{IpAddress, IpVersion};
    /// let ip = IpAddress::parse("::1").unwrap();
    /// assert_eq!(ip.version(), IpVersion::V6);
    /// assert_eq!(ip.to_int(), 1);
    /// ```
    pub fn parse(text: &str) -> Result<IpAddress, IpError> {
        let invalid = || IpError::InvalidAddress {
            input: text.to_string(),
        };
        let version = check_ip_version(text).ok_or_else(invalid)?;
        let (inner, _) = strip_brackets(text);

        let value = match version {
            IpVersion::V4 => ipv4_to_int(inner).ok_or_else(invalid)? as u128,
            IpVersion::V6 => ipv6_to_int(inner).ok_or_else(invalid)?,
        };
        log::trace!("parse({text:?}) -> {version} {value:#x}");
        Ok(IpAddress { version, value })
    }

    /// Build an address from a numeric value and an explicit version.
    ///
    /// The version is never guessed from the magnitude of `value`.
    pub fn from_numeric(value: u128, version: IpVersion) -> Result<IpAddress, IpError> {
        if !version.fits(value) {
            return Err(IpError::ValueOutOfRange {
                value,
                version,
                bits: version.bits(),
            });
        }
        Ok(IpAddress { version, value })
    }

    /// A v4 address from its 32-bit value.
    pub const fn from_u32(value: u32) -> IpAddress {
        IpAddress {
            version: IpVersion::V4,
            value: value as u128,
        }
    }

    /// A v6 address from its 128-bit value.
    pub const fn from_u128(value: u128) -> IpAddress {
        IpAddress {
            version: IpVersion::V6,
            value,
        }
    }

    /// Decode big-endian bytes: 4 bytes is v4, 16 bytes is v6.
    pub fn from_byte_array(bytes: &[u8]) -> Result<IpAddress, IpError> {
        let version = match bytes.len() {
            4 => IpVersion::V4,
            16 => IpVersion::V6,
            len => return Err(IpError::InvalidByteArray { len }),
        };
        let value = bytes
            .iter()
            .fold(0u128, |acc, byte| (acc << 8) | *byte as u128);
        Ok(IpAddress { version, value })
    }

    /// Big-endian bytes, 4 for v4 and 16 for v6, zero-padded on the left.
    pub fn to_byte_array(&self) -> Vec<u8> {
        let len = self.byte_len();
        self.value.to_be_bytes()[16 - len..].to_vec()
    }

    fn byte_len(&self) -> usize {
        self.version.bits() as usize / 8
    }

    pub fn version(&self) -> IpVersion {
        self.version
    }

    /// The numeric value.
    pub fn to_int(&self) -> u128 {
        self.value
    }

    pub fn to_object(&self) -> AddressObject {
        AddressObject {
            address: self.to_string(),
            version: self.version,
            numeric_ip: self.value,
        }
    }

    /// Classify with the built-in address table.
    pub fn address_type(&self) -> AddressType {
        classify(self.version, self.value)
    }

    /// Classify with a caller-supplied address table.
    pub fn address_type_with(&self, table: &AddressTable) -> AddressType {
        table.classify(self.version, self.value)
    }
}

fn ipv4_to_int(text: &str) -> Option<u32> {
    let octets: Vec<u8> = text
        .split('.')
        .map(|octet| octet.parse::<u8>().ok())
        .collect::<Option<_>>()?;
    if octets.len() != 4 {
        return None;
    }
    Some(
        octets
            .iter()
            .fold(0u32, |acc, octet| (acc << 8) | *octet as u32),
    )
}

/// Expand a v6 literal (already grammar-checked) to its 128-bit value.
fn ipv6_to_int(text: &str) -> Option<u128> {
    let groups = match text.split_once("::") {
        Some((head, tail)) => {
            let head = hextets(head)?;
            let tail = hextets(tail)?;
            let omitted = IPV6_GROUPS.checked_sub(head.len() + tail.len())?;
            head.into_iter()
                .chain(std::iter::repeat(0).take(omitted))
                .chain(tail)
                .collect::<Vec<u16>>()
        }
        None => hextets(text)?,
    };
    if groups.len() != IPV6_GROUPS {
        return None;
    }
    Some(
        groups
            .iter()
            .fold(0u128, |acc, group| (acc << 16) | *group as u128),
    )
}

/// Hextets of a `:`-joined run; an embedded dotted quad becomes two groups.
fn hextets(run: &str) -> Option<Vec<u16>> {
    if run.is_empty() {
        return Some(Vec::new());
    }
    let mut groups = Vec::with_capacity(IPV6_GROUPS);
    for part in run.split(':') {
        if part.contains('.') {
            let quad = ipv4_to_int(part)?;
            groups.push((quad >> 16) as u16);
            groups.push(quad as u16);
        } else {
            groups.push(u16::from_str_radix(part, 16).ok()?);
        }
    }
    Some(groups)
}

/// Render eight hextets, collapsing the leftmost longest run (2+) of zero groups.
fn format_ipv6(value: u128) -> String {
    let groups: Vec<u16> = (0..IPV6_GROUPS)
        .rev()
        .map(|i| (value >> (i * 16)) as u16)
        .collect();

    // (start, len) of the best zero run
    let mut best: Option<(usize, usize)> = None;
    let mut i = 0;
    while i < groups.len() {
        if groups[i] != 0 {
            i += 1;
            continue;
        }
        let start = i;
        while i < groups.len() && groups[i] == 0 {
            i += 1;
        }
        let len = i - start;
        if len >= 2 && best.map_or(true, |(_, best_len)| len > best_len) {
            best = Some((start, len));
        }
    }

    let hex = |gs: &[u16]| gs.iter().map(|g| format!("{g:x}")).join(":");
    match best {
        Some((start, len)) => format!(
            "{}::{}",
            hex(&groups[..start]),
            hex(&groups[start + len..])
        ),
        None => hex(&groups),
    }
}

impl std::fmt::Display for IpAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.version {
            IpVersion::V4 => write!(f, "{}", Ipv4Addr::from(self.value as u32)),
            IpVersion::V6 => write!(f, "{}", format_ipv6(self.value)),
        }
    }
}

impl FromStr for IpAddress {
    type Err = IpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IpAddress::parse(s)
    }
}

impl Serialize for IpAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for IpAddress {
    fn deserialize<D>(deserializer: D) -> Result<IpAddress, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        IpAddress::parse(&s).map_err(de::Error::custom)
    }
}

impl From<Ipv4Addr> for IpAddress {
    fn from(addr: Ipv4Addr) -> Self {
        IpAddress::from_u32(u32::from(addr))
    }
}

impl From<Ipv6Addr> for IpAddress {
    fn from(addr: Ipv6Addr) -> Self {
        IpAddress::from_u128(u128::from(addr))
    }
}

impl From<IpAddr> for IpAddress {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4) => v4.into(),
            IpAddr::V6(v6) => v6.into(),
        }
    }
}

impl From<IpAddress> for IpAddr {
    fn from(addr: IpAddress) -> Self {
        match addr.version {
            IpVersion::V4 => IpAddr::V4(Ipv4Addr::from(addr.value as u32)),
            IpVersion::V6 => IpAddr::V6(Ipv6Addr::from(addr.value)),
        }
    }
}
