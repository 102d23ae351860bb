//! Address-type classification.
//!
//! - [`classifier`] - ordered first-match rule evaluation
//! - [`table`] - the built-in rule table

mod classifier;
mod table;

pub use classifier::{classify, AddressTable, AddressType, Matcher, Rule, RuleSet};
pub(crate) use table::DEFAULT_TABLE;
