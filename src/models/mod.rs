//! Address and subnet value objects.
//!
//! - [`IpVersion`] and [`check_ip_version`] - version detection
//! - [`IpAddress`] - numeric address with canonical text and byte forms
//! - [`Cidr`] - subnet with masks, usable range and network type
//! - mask helpers shared by the above

mod address;
mod cidr;
mod mask;
mod version;

// Re-export public types
pub use address::{AddressObject, IpAddress};
pub use cidr::Cidr;
pub use mask::{common_prefix_len, host_mask_from_mask, mask_to_prefix, prefix_to_mask};
pub use version::{check_ip_version, is_ipv4_literal, is_ipv6_literal, IpVersion};
