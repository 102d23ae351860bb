//! IP version detection.
//!
//! Purely structural: decides whether a token *looks like* a v4 or v6 literal,
//! nothing more.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Number of hextets in a fully expanded v6 address.
pub const IPV6_GROUPS: usize = 8;

/// Address family.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// Bit width of an address in this family.
    pub const fn bits(self) -> u8 {
        match self {
            IpVersion::V4 => 32,
            IpVersion::V6 => 128,
        }
    }

    /// All bits of the family's width set.
    pub const fn all_ones(self) -> u128 {
        match self {
            IpVersion::V4 => u32::MAX as u128,
            IpVersion::V6 => u128::MAX,
        }
    }

    /// True if `value` fits in this family's bit width.
    pub const fn fits(self, value: u128) -> bool {
        value & !self.all_ones() == 0
    }
}

impl std::fmt::Display for IpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            IpVersion::V4 => write!(f, "v4"),
            IpVersion::V6 => write!(f, "v6"),
        }
    }
}

lazy_static! {
    static ref IPV4_RE: Regex = Regex::new(
        r"^(25[0-5]|2[0-4][0-9]|[01]?[0-9]{1,2})(\.(25[0-5]|2[0-4][0-9]|[01]?[0-9]{1,2})){3}$"
    )
    .expect("Invalid Regex?");
    static ref HEXTET_RE: Regex = Regex::new(r"^[0-9a-fA-F]{1,4}$").expect("Invalid Regex?");
}

/// Remove one pair of surrounding `[...]`, if present.
///
/// Returns the inner text and whether brackets were stripped.
pub fn strip_brackets(text: &str) -> (&str, bool) {
    match text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        Some(inner) => (inner, true),
        None => (text, false),
    }
}

/// True if `text` is a dotted-quad literal.
pub fn is_ipv4_literal(text: &str) -> bool {
    IPV4_RE.is_match(text)
}

/// True if `text` is a colon-hex literal, optionally compressed with one `::`
/// and optionally ending in an embedded dotted quad.
pub fn is_ipv6_literal(text: &str) -> bool {
    let (head, tail, compressed) = match text.split_once("::") {
        Some((head, tail)) => {
            if tail.contains("::") {
                return false;
            }
            (head, tail, true)
        }
        None => (text, "", false),
    };

    // A dotted quad may only close the address, never precede a `::`.
    let head_groups = match count_groups(head, !compressed) {
        Some(n) => n,
        None => return false,
    };
    let tail_groups = match count_groups(tail, true) {
        Some(n) => n,
        None => return false,
    };
    let explicit = head_groups + tail_groups;
    if compressed {
        explicit < IPV6_GROUPS
    } else {
        explicit == IPV6_GROUPS
    }
}

/// Count hextets in a `:`-joined run, with a dotted quad counting as two.
///
/// An empty run counts zero groups. `None` on any malformed group.
fn count_groups(run: &str, allow_quad: bool) -> Option<usize> {
    if run.is_empty() {
        return Some(0);
    }
    let parts: Vec<&str> = run.split(':').collect();
    let last = parts.len() - 1;
    let mut groups = 0;
    for (i, part) in parts.iter().enumerate() {
        if HEXTET_RE.is_match(part) {
            groups += 1;
        } else if allow_quad && i == last && is_ipv4_literal(part) {
            groups += 2;
        } else {
            return None;
        }
    }
    Some(groups)
}

/// Detect the version of an address literal.
///
/// Brackets are only accepted around v6 literals. `None` means the text is
/// neither a v4 nor a v6 literal.
pub fn check_ip_version(text: &str) -> Option<IpVersion> {
    let (inner, bracketed) = strip_brackets(text);
    if !bracketed && is_ipv4_literal(inner) {
        return Some(IpVersion::V4);
    }
    if is_ipv6_literal(inner) {
        return Some(IpVersion::V6);
    }
    log::trace!("check_ip_version({text:?}) -> invalid");
    None
}
