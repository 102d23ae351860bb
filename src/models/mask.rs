//! Mask and prefix arithmetic for both address families.
//!
//! All values are `u128` and are kept inside the bit width of the version
//! they are computed for.

use super::version::IpVersion;
use crate::error::IpError;

/// Convert a prefix length to a network mask of the version's width.
///
/// # Examples
/// ```
/// use ipcidr::models::{prefix_to_mask, IpVersion};
/// assert_eq!(prefix_to_mask(24, IpVersion::V4).unwrap(), 0xFFFFFF00);
/// ```
pub fn prefix_to_mask(prefix: u8, version: IpVersion) -> Result<u128, IpError> {
    let bits = version.bits();
    if prefix > bits {
        return Err(IpError::InvalidPrefixLength {
            input: prefix.to_string(),
            version,
            max: bits,
        });
    }
    if prefix == 0 {
        return Ok(0);
    }
    let ones = version.all_ones();
    Ok((ones << (bits - prefix)) & ones)
}

/// Complement of `mask` within the version's width.
pub fn host_mask_from_mask(mask: u128, version: IpVersion) -> u128 {
    !mask & version.all_ones()
}

/// Convert a network mask back to its prefix length.
///
/// # Errors
/// If the mask is not a run of leading ones followed only by zeros.
pub fn mask_to_prefix(mask: u128, version: IpVersion) -> Result<u8, IpError> {
    let invalid = || IpError::InvalidMask {
        mask: format!("{mask:#x}"),
    };
    if !version.fits(mask) {
        return Err(invalid());
    }
    // left-align so the family's top bit is bit 127
    let aligned = mask << (128 - version.bits() as u32);
    let prefix = aligned.leading_ones();
    if aligned.checked_shl(prefix).unwrap_or(0) == 0 {
        Ok(prefix as u8)
    } else {
        Err(invalid())
    }
}

/// Number of identical leading bits of two values, scanned over the
/// version's width from the most significant bit.
pub fn common_prefix_len(first: u128, last: u128, version: IpVersion) -> u8 {
    let bits = version.bits();
    let diff = (first ^ last) & version.all_ones();
    if diff == 0 {
        return bits;
    }
    let unused = 128 - bits as u32;
    (diff.leading_zeros() - unused) as u8
}
