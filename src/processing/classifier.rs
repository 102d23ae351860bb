//! Address-type classification.
//!
//! Classification walks an ordered rule list per family and stops at the first
//! match. Later rules never override an earlier one, even where ranges nest.

use super::table::DEFAULT_TABLE;
use crate::error::IpError;
use crate::models::{Cidr, IpAddress, IpVersion};
use serde::{Deserialize, Serialize};

/// Semantic label for an address or subnet.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AddressType {
    Public,
    Private,
    Documentation,
    Other,
    #[serde(rename = "Link-Local")]
    LinkLocal,
    Loopback,
    Software,
    Multicast,
    Future,
    Broadcast,
    #[serde(rename = "IPV4-Mapped")]
    Ipv4Mapped,
    Benchmarking,
    Orchid,
    #[serde(rename = "6to4")]
    SixToFour,
    Teredo,
}

impl AddressType {
    pub fn label(&self) -> &'static str {
        match self {
            AddressType::Public => "Public",
            AddressType::Private => "Private",
            AddressType::Documentation => "Documentation",
            AddressType::Other => "Other",
            AddressType::LinkLocal => "Link-Local",
            AddressType::Loopback => "Loopback",
            AddressType::Software => "Software",
            AddressType::Multicast => "Multicast",
            AddressType::Future => "Future",
            AddressType::Broadcast => "Broadcast",
            AddressType::Ipv4Mapped => "IPV4-Mapped",
            AddressType::Benchmarking => "Benchmarking",
            AddressType::Orchid => "Orchid",
            AddressType::SixToFour => "6to4",
            AddressType::Teredo => "Teredo",
        }
    }
}

impl std::fmt::Display for AddressType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Which addresses a rule covers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Matcher {
    /// Every address sharing the block's leading bits.
    Prefix(Cidr),
    /// Inclusive numeric range.
    Range { first: IpAddress, last: IpAddress },
}

impl Matcher {
    pub fn version(&self) -> IpVersion {
        match self {
            Matcher::Prefix(cidr) => cidr.version(),
            Matcher::Range { first, .. } => first.version(),
        }
    }

    pub fn matches(&self, value: u128) -> bool {
        match self {
            Matcher::Prefix(cidr) => {
                let mask = cidr.mask();
                value & mask == cidr.network_address().to_int() & mask
            }
            Matcher::Range { first, last } => first.to_int() <= value && value <= last.to_int(),
        }
    }
}

/// One `(matcher, label)` entry of a rule list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    #[serde(rename = "type")]
    pub label: AddressType,
    #[serde(flatten)]
    pub matcher: Matcher,
}

/// Ordered rules for one family, plus the label used when nothing matches.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
    pub fallback: AddressType,
}

impl RuleSet {
    /// First matching rule's label, or the fallback.
    pub fn classify(&self, value: u128) -> AddressType {
        for rule in &self.rules {
            if rule.matcher.matches(value) {
                log::trace!("{value:#x} matched {:?} -> {}", rule.matcher, rule.label);
                return rule.label;
            }
        }
        self.fallback
    }
}

/// Classification rules for both families.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AddressTable {
    pub v4: RuleSet,
    pub v6: RuleSet,
}

impl AddressTable {
    pub fn rules(&self, version: IpVersion) -> &RuleSet {
        match version {
            IpVersion::V4 => &self.v4,
            IpVersion::V6 => &self.v6,
        }
    }

    pub fn classify(&self, version: IpVersion, value: u128) -> AddressType {
        self.rules(version).classify(value)
    }

    /// Load a table from JSON text and check every rule sits in its family's list.
    pub fn from_json(json: &str) -> Result<AddressTable, IpError> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let table: AddressTable =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
                IpError::InvalidTable {
                    path: e.path().to_string(),
                    message: e.inner().to_string(),
                }
            })?;
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), IpError> {
        for version in [IpVersion::V4, IpVersion::V6] {
            for (i, rule) in self.rules(version).rules.iter().enumerate() {
                let path = format!("{version}.rules[{i}]");
                if rule.matcher.version() != version {
                    return Err(IpError::InvalidTable {
                        path,
                        message: format!("{} rule in the {version} list", rule.matcher.version()),
                    });
                }
                if let Matcher::Range { first, last } = &rule.matcher {
                    if first.version() != last.version() {
                        return Err(IpError::InvalidTable {
                            path,
                            message: format!("range mixes {} and {}", first.version(), last.version()),
                        });
                    }
                    if first > last {
                        return Err(IpError::InvalidTable {
                            path,
                            message: format!("range {first}-{last} is reversed"),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for AddressTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}

/// Classify a value of the given version with the built-in table.
pub fn classify(version: IpVersion, value: u128) -> AddressType {
    DEFAULT_TABLE.classify(version, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_of(ip: &str) -> AddressType {
        let ip = IpAddress::parse(ip).unwrap();
        classify(ip.version(), ip.to_int())
    }

    #[test]
    fn test_ipv4_private() {
        for ip in [
            "192.168.0.1",
            "192.168.1.10",
            "192.168.255.255",
            "10.0.0.0",
            "10.10.10.10",
            "10.255.255.255",
            "172.16.0.1",
            "172.31.255.255",
        ] {
            assert_eq!(type_of(ip), AddressType::Private, "{ip}");
        }
        assert_eq!(type_of("172.32.0.1"), AddressType::Public);
    }

    #[test]
    fn test_ipv4_types() {
        assert_eq!(type_of("127.0.0.1"), AddressType::Loopback);
        assert_eq!(type_of("169.254.1.1"), AddressType::LinkLocal);
        assert_eq!(type_of("255.255.255.255"), AddressType::Broadcast);
        assert_eq!(type_of("8.8.8.8"), AddressType::Public);
        assert_eq!(type_of("192.0.2.10"), AddressType::Documentation);
        assert_eq!(type_of("198.51.100.1"), AddressType::Documentation);
        assert_eq!(type_of("203.0.113.254"), AddressType::Documentation);
        assert_eq!(type_of("233.252.0.1"), AddressType::Documentation);
        assert_eq!(type_of("100.64.0.1"), AddressType::Other);
        assert_eq!(type_of("192.0.0.8"), AddressType::Other);
        assert_eq!(type_of("192.88.99.1"), AddressType::Other);
        assert_eq!(type_of("198.19.255.255"), AddressType::Other);
        assert_eq!(type_of("0.0.0.0"), AddressType::Software);
        assert_eq!(type_of("224.0.0.1"), AddressType::Multicast);
        assert_eq!(type_of("240.0.0.1"), AddressType::Future);
        assert_eq!(type_of("255.255.255.254"), AddressType::Future);
    }

    #[test]
    fn test_ipv4_first_match_wins() {
        // 233.252.0.0/24 sits inside multicast but documentation is checked first
        assert_eq!(type_of("233.252.0.255"), AddressType::Documentation);
        assert_eq!(type_of("233.253.0.0"), AddressType::Multicast);
    }

    #[test]
    fn test_ipv6_types() {
        assert_eq!(type_of("::"), AddressType::Software);
        assert_eq!(type_of("::1"), AddressType::Loopback);
        assert_eq!(type_of("::2"), AddressType::Future);
        assert_eq!(type_of("::ffff:10.0.0.1"), AddressType::Ipv4Mapped);
        assert_eq!(type_of("2001:db8::1"), AddressType::Documentation);
        assert_eq!(type_of("2001:2::1"), AddressType::Benchmarking);
        assert_eq!(type_of("2001:1f::1"), AddressType::Orchid);
        assert_eq!(type_of("2002:c000:204::1"), AddressType::SixToFour);
        assert_eq!(type_of("ff02::1"), AddressType::Multicast);
        assert_eq!(type_of("2001:0:4136:e378::1"), AddressType::Teredo);
        assert_eq!(type_of("2606:4700::1111"), AddressType::Public);
        assert_eq!(type_of("3fff::1"), AddressType::Public);
        assert_eq!(type_of("fc00::1"), AddressType::Private);
        assert_eq!(type_of("fdff::1"), AddressType::Private);
        assert_eq!(type_of("fe80::1"), AddressType::LinkLocal);
        assert_eq!(type_of("febf::1"), AddressType::LinkLocal);
        assert_eq!(type_of("fec0::1"), AddressType::Future);
    }

    #[test]
    fn test_ipv6_nested_prefixes() {
        // inside 2001:db8::/32 but also inside 2000::/3
        assert_eq!(type_of("2001:db8:ffff::"), AddressType::Documentation);
        // outside 2001:2::/48 and 2001:10::/28, so only 2000::/3 applies
        assert_eq!(type_of("2001:2:1::"), AddressType::Public);
        assert_eq!(type_of("2001:20::1"), AddressType::Public);
        // teredo is listed after the narrower 2001: blocks
        assert_eq!(type_of("2001:0:ffff::"), AddressType::Teredo);
    }

    #[test]
    fn test_labels() {
        assert_eq!(AddressType::LinkLocal.to_string(), "Link-Local");
        assert_eq!(
            serde_json::to_string(&AddressType::SixToFour).unwrap(),
            "\"6to4\""
        );
        assert_eq!(
            serde_json::from_str::<AddressType>("\"IPV4-Mapped\"").unwrap(),
            AddressType::Ipv4Mapped
        );
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "v4": { "rules": [ { "type": "Private", "prefix": "100.64.0.0/10" } ], "fallback": "Public" },
            "v6": { "rules": [ { "type": "Loopback", "range": { "first": "::1", "last": "::1" } } ], "fallback": "Future" }
        }"#;
        let table = AddressTable::from_json(json).unwrap();
        assert_eq!(table.classify(IpVersion::V4, 0x64400001), AddressType::Private);
        assert_eq!(table.classify(IpVersion::V4, 0x0a000001), AddressType::Public);
        assert_eq!(table.classify(IpVersion::V6, 1), AddressType::Loopback);
        assert_eq!(table.classify(IpVersion::V6, 2), AddressType::Future);
    }

    #[test]
    fn test_from_json_errors() {
        let bad_label = r#"{
            "v4": { "rules": [ { "type": "Bogus", "prefix": "10.0.0.0/8" } ], "fallback": "Public" },
            "v6": { "rules": [], "fallback": "Future" }
        }"#;
        match AddressTable::from_json(bad_label).unwrap_err() {
            IpError::InvalidTable { path, .. } => assert!(path.starts_with("v4.rules[0]"), "{path}"),
            e => panic!("unexpected error {e}"),
        }

        let wrong_family = r#"{
            "v4": { "rules": [ { "type": "Private", "prefix": "fc00::/7" } ], "fallback": "Public" },
            "v6": { "rules": [], "fallback": "Future" }
        }"#;
        assert_eq!(
            AddressTable::from_json(wrong_family).unwrap_err(),
            IpError::InvalidTable {
                path: "v4.rules[0]".to_string(),
                message: "v6 rule in the v4 list".to_string()
            }
        );
    }

    #[test]
    fn test_default_table_round_trips_through_json() {
        let json = serde_json::to_string(&AddressTable::default()).unwrap();
        let table = AddressTable::from_json(&json).unwrap();
        assert_eq!(table, AddressTable::default());
    }
}
