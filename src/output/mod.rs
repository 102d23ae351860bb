//! Output formatting for address and subnet summaries.
//!
//! - [`summary`] - serializable summaries of a token
//! - [`terminal`] - colored terminal output

mod summary;
mod terminal;

pub use summary::{summarize, AddressSummary, SubnetSummary, Summary};
pub use terminal::{format_row, print_summary};
