//! Error types for address parsing and subnet calculations.

use crate::models::IpVersion;
use crate::processing::AddressType;
use thiserror::Error;

/// Everything that can go wrong while parsing, converting or classifying addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IpError {
    /// Text matches neither the v4 nor the v6 grammar.
    #[error("Invalid IP address: {input:?} (expected dotted-quad v4 or colon-hex v6)")]
    InvalidAddress { input: String },

    /// Byte sequence is not 4 or 16 bytes long.
    #[error("Invalid byte array length {len} (expected 4 or 16)")]
    InvalidByteArray { len: usize },

    /// Two addresses of different families were combined.
    #[error("IP version mismatch: {first} and {last}")]
    VersionMismatch { first: IpVersion, last: IpVersion },

    /// The operation has no meaning for IPv6.
    #[error("IPv6 Error - {operation} is not supported for IPv6")]
    UnsupportedForIpv6 { operation: &'static str },

    /// The subnet boundaries classify into different address types.
    #[error("Subnet Error - {cidr} spans {first} and {last}")]
    InconsistentSubnet {
        cidr: String,
        first: AddressType,
        last: AddressType,
    },

    /// Prefix length is not a decimal integer in `0..=max`.
    #[error("Invalid prefix length {input:?} for {version} (expected 0..={max})")]
    InvalidPrefixLength {
        input: String,
        version: IpVersion,
        max: u8,
    },

    /// Numeric value does not fit the bit width of the declared version.
    #[error("Value {value:#x} does not fit in {version} ({bits} bits)")]
    ValueOutOfRange {
        value: u128,
        version: IpVersion,
        bits: u8,
    },

    /// Combined token is not of the form `address/prefix`.
    #[error("Invalid CIDR {input:?} (expected <address>/<prefix>)")]
    InvalidCidr { input: String },

    /// Mask address does not consist of contiguous leading ones.
    #[error("Invalid network mask {mask}")]
    InvalidMask { mask: String },

    /// Rule table failed to load or is inconsistent.
    #[error("Invalid address table at {path}: {message}")]
    InvalidTable { path: String, message: String },
}
