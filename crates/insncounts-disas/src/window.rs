//! Guest address filtering.

use crate::error::{DisasError, Result};

/// Inclusive guest virtual address range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressWindow {
    pub low: u64,
    pub high: u64,
}

impl AddressWindow {
    pub const FULL: Self = Self {
        low: 0,
        high: u64::MAX,
    };

    #[must_use]
    pub const fn new(low: u64, high: u64) -> Self {
        Self { low, high }
    }

    /// True if `vaddr` lies within `[low, high]`.
    #[inline]
    #[must_use]
    pub const fn contains(&self, vaddr: u64) -> bool {
        self.low <= vaddr && vaddr <= self.high
    }
}

impl Default for AddressWindow {
    fn default() -> Self {
        Self::FULL
    }
}

/// Parse a hexadecimal address, with or without a `0x` prefix.
///
/// # Errors
///
/// Returns `InvalidHex` on empty input, non-hex digits, or overflow.
pub fn parse_hex_u64(s: &str) -> Result<u64> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|_| DisasError::InvalidHex(s.to_string()))
}
