//! Built-in classification table.
//!
//! Policy data, not protocol. Rules are listed in evaluation order; a replacement
//! table can be loaded with [`AddressTable::from_json`](super::AddressTable::from_json).

use super::classifier::{AddressTable, AddressType, Matcher, Rule, RuleSet};
use crate::models::{Cidr, IpAddress};
use lazy_static::lazy_static;

/// v4 blocks in evaluation order.
const IPV4_PREFIXES: &[(&str, AddressType)] = &[
    ("10.0.0.0/8", AddressType::Private),
    ("172.16.0.0/12", AddressType::Private),
    ("192.168.0.0/16", AddressType::Private),
    ("192.0.2.0/24", AddressType::Documentation),
    ("198.51.100.0/24", AddressType::Documentation),
    ("203.0.113.0/24", AddressType::Documentation),
    ("233.252.0.0/24", AddressType::Documentation), // MCAST-TEST-NET
    ("100.64.0.0/10", AddressType::Other),
    ("192.0.0.0/24", AddressType::Other),
    ("192.88.99.0/24", AddressType::Other),
    ("198.18.0.0/15", AddressType::Other),
    ("169.254.0.0/16", AddressType::LinkLocal),
    ("127.0.0.0/8", AddressType::Loopback),
    ("0.0.0.0/8", AddressType::Software),
    ("224.0.0.0/4", AddressType::Multicast),
];

/// 240.0.0.0/4 minus the limited broadcast address.
const IPV4_FUTURE: (&str, &str) = ("240.0.0.0", "255.255.255.254");
const IPV4_BROADCAST: &str = "255.255.255.255/32";

/// v6 blocks in evaluation order. Narrow 2001: blocks precede 2000::/3.
const IPV6_PREFIXES: &[(&str, AddressType)] = &[
    ("::/128", AddressType::Software),
    ("::1/128", AddressType::Loopback),
    ("::ffff:0:0/96", AddressType::Ipv4Mapped),
    ("2001:db8::/32", AddressType::Documentation),
    ("2001:2::/48", AddressType::Benchmarking),
    ("2001:10::/28", AddressType::Orchid),
    ("2002::/16", AddressType::SixToFour),
    ("ff00::/8", AddressType::Multicast),
    ("2001::/32", AddressType::Teredo),
    ("2000::/3", AddressType::Public),
    ("fc00::/7", AddressType::Private),
    ("fe80::/10", AddressType::LinkLocal),
];

fn prefix_rule((cidr, label): &(&str, AddressType)) -> Rule {
    let cidr: Cidr = cidr.parse().expect("Invalid built-in CIDR?");
    Rule {
        label: *label,
        matcher: Matcher::Prefix(cidr),
    }
}

fn build_default_table() -> AddressTable {
    let (first, last) = IPV4_FUTURE;
    let mut v4: Vec<Rule> = IPV4_PREFIXES.iter().map(prefix_rule).collect();
    v4.push(Rule {
        label: AddressType::Future,
        matcher: Matcher::Range {
            first: IpAddress::parse(first).expect("Invalid built-in address?"),
            last: IpAddress::parse(last).expect("Invalid built-in address?"),
        },
    });
    v4.push(prefix_rule(&(IPV4_BROADCAST, AddressType::Broadcast)));

    AddressTable {
        v4: RuleSet {
            rules: v4,
            fallback: AddressType::Public,
        },
        v6: RuleSet {
            rules: IPV6_PREFIXES.iter().map(prefix_rule).collect(),
            fallback: AddressType::Future,
        },
    }
}

lazy_static! {
    pub(crate) static ref DEFAULT_TABLE: AddressTable = build_default_table();
}
