//! IPv4/IPv6 address parsing, formatting, classification and CIDR subnet math.
//!
//! Everything here is a pure computation over immutable values; nothing
//! performs I/O.

pub mod error;
pub mod models;
pub mod output;
pub mod processing;

pub use error::IpError;
pub use models::{check_ip_version, Cidr, IpAddress, IpVersion};
pub use processing::{classify, AddressTable, AddressType};
