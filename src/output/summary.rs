//! Serializable summaries of an address, a subnet or an address range.

use crate::error::IpError;
use crate::models::{Cidr, IpAddress, IpVersion};
use crate::processing::{AddressTable, AddressType};
use itertools::Itertools;
use serde::Serialize;

/// Everything known about a single address.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AddressSummary {
    pub address: String,
    pub version: IpVersion,
    pub numeric_ip: u128,
    /// Big-endian bytes as hex, e.g. "0a:00:00:01".
    pub bytes: String,
    pub address_type: AddressType,
}

/// Everything known about a subnet.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SubnetSummary {
    pub cidr: String,
    pub version: IpVersion,
    pub prefix_length: u8,
    pub network: String,
    pub netmask: String,
    pub hostmask: String,
    pub first_usable: String,
    pub last_usable: String,
    /// Only present for v4.
    pub broadcast: Option<String>,
    /// Missing when the subnet straddles two address types.
    pub network_type: Option<AddressType>,
    pub warning: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Summary {
    Address(AddressSummary),
    Subnet(SubnetSummary),
}

impl AddressSummary {
    pub fn new(addr: &IpAddress, table: &AddressTable) -> AddressSummary {
        AddressSummary {
            address: addr.to_string(),
            version: addr.version(),
            numeric_ip: addr.to_int(),
            bytes: addr
                .to_byte_array()
                .iter()
                .map(|b| format!("{b:02x}"))
                .join(":"),
            address_type: addr.address_type_with(table),
        }
    }
}

impl SubnetSummary {
    pub fn new(cidr: &Cidr, table: &AddressTable) -> SubnetSummary {
        let (network_type, warning) = match cidr.network_type_with(table) {
            Ok(t) => (Some(t), None),
            Err(e) => (None, Some(e.to_string())),
        };
        SubnetSummary {
            cidr: cidr.to_string(),
            version: cidr.version(),
            prefix_length: cidr.prefix_length(),
            network: cidr.network_address().to_string(),
            netmask: cidr.network_mask_address().to_string(),
            hostmask: cidr.host_mask_address().to_string(),
            first_usable: cidr.first_usable_address().to_string(),
            last_usable: cidr.last_usable_address().to_string(),
            broadcast: cidr.broadcast_address().ok().map(|b| b.to_string()),
            network_type,
            warning,
        }
    }
}

/// Summarize one token: `addr`, `addr/prefix` or `first-last`.
pub fn summarize(token: &str, table: &AddressTable) -> Result<Summary, IpError> {
    let token = token.trim();
    if token.contains('/') {
        let cidr = Cidr::parse(token)?;
        return Ok(Summary::Subnet(SubnetSummary::new(&cidr, table)));
    }
    if let Some((first, last)) = token.split_once('-') {
        let cidr = Cidr::from_range(IpAddress::parse(first)?, IpAddress::parse(last)?)?;
        return Ok(Summary::Subnet(SubnetSummary::new(&cidr, table)));
    }
    let addr = IpAddress::parse(token)?;
    Ok(Summary::Address(AddressSummary::new(&addr, table)))
}
