//! Terminal output utilities.

use super::summary::Summary;
use colored::Colorize;

/// Format a `label: value` line with the label right-aligned to `width`.
///
/// # Arguments
/// * `label` - The field name
/// * `value` - The value to print after the label
/// * `width` - The minimum width of the label column
pub fn format_row<T: ToString>(label: &str, value: T, width: usize) -> String {
    let value_str = value.to_string();
    format!("{label:>width$}: {value_str}")
}

/// Print a summary to stdout with colors.
pub fn print_summary(summary: &Summary) {
    const WIDTH: usize = 14;
    match summary {
        Summary::Address(s) => {
            println!("{}", s.address.bold());
            println!("{}", format_row("version", s.version, WIDTH));
            println!("{}", format_row("numeric", s.numeric_ip, WIDTH));
            println!("{}", format_row("bytes", &s.bytes, WIDTH));
            println!("{}", format_row("type", s.address_type.to_string().green(), WIDTH));
        }
        Summary::Subnet(s) => {
            println!("{}", s.cidr.bold());
            println!("{}", format_row("network", &s.network, WIDTH));
            println!("{}", format_row("netmask", &s.netmask, WIDTH));
            println!("{}", format_row("hostmask", &s.hostmask, WIDTH));
            println!("{}", format_row("first usable", &s.first_usable, WIDTH));
            println!("{}", format_row("last usable", &s.last_usable, WIDTH));
            if let Some(broadcast) = &s.broadcast {
                println!("{}", format_row("broadcast", broadcast, WIDTH));
            }
            match (&s.network_type, &s.warning) {
                (Some(t), _) => println!("{}", format_row("type", t.to_string().green(), WIDTH)),
                (None, Some(w)) => println!("{}", format_row("type", w.on_red(), WIDTH)),
                (None, None) => {}
            }
        }
    }
}
