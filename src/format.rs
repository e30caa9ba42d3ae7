//! # Display formatting for node values.
//!
//! Pure helpers used when rendering configuration and telemetry. Decimal output follows
//! fixed-point rounding (nearest, ties away from zero on the exact binary value) followed
//! by stripping of trailing zeros and a dangling decimal point:
//!
//! ```text
//! 1500 MB                → "1.5 GB"
//! 31.25 MB               → "31.25 MB"
//! 0xde0b6b3a7640000 wei  → "1 ETH"
//! 0x8ab1c4d2…aa2b19a0    → "0x8ab1c4...2b19a0"
//! ```

use std::num::ParseIntError;

use crate::config::UNSET_ROOT;

const MB_PER_GB: f64 = 1000.0;
const WEI_PER_ETH: f64 = 1e18;

/// Shortens a hex block root to `0x` + first 3 bytes + `...` + last 3 bytes.
///
/// `None`, empty and the `"0x"` sentinel are returned unchanged.
///
/// # Example
/// ```
/// use trinvisor::format::format_block_root;
///
/// let root = "0x8ab1c4d2e3f40516273849aabbccddeeff00112233445566778899aa2b19a0";
/// assert_eq!(format_block_root(Some(root)).as_deref(), Some("0x8ab1c4...2b19a0"));
/// assert_eq!(format_block_root(Some("0x")).as_deref(), Some("0x"));
/// ```
pub fn format_block_root(root: Option<&str>) -> Option<String> {
    let root = root?;
    if root.is_empty() || root == UNSET_ROOT {
        return Some(root.to_string());
    }
    let head: String = root.chars().take(8).collect();
    let count = root.chars().count();
    let tail: String = root.chars().skip(count.saturating_sub(6)).collect();
    Some(format!("{head}...{tail}"))
}

/// Formats a size given in MB, switching to GB from 1000 MB on.
pub fn format_memory_size(mb: f64) -> String {
    if mb >= MB_PER_GB {
        format!("{} GB", decimal(mb / MB_PER_GB, 2))
    } else {
        format!("{} MB", decimal(mb, 2))
    }
}

/// Formats `used / total`, both in GB when `total` reaches 1000 MB, otherwise both in MB.
pub fn format_memory_ratio(used_mb: f64, total_mb: f64) -> String {
    if total_mb >= MB_PER_GB {
        format!(
            "{} / {} GB",
            decimal(used_mb / MB_PER_GB, 2),
            decimal(total_mb / MB_PER_GB, 2)
        )
    } else {
        format!("{} / {} MB", decimal(used_mb, 2), decimal(total_mb, 2))
    }
}

/// Converts a wei amount (`0x`-prefixed hex or decimal) into an ETH string with at most
/// 6 decimals.
///
/// A missing or empty balance reads as `0 ETH`.
///
/// # Example
/// ```
/// use trinvisor::format::format_eth_balance;
///
/// assert_eq!(format_eth_balance(Some("0xde0b6b3a7640000")).unwrap(), "1 ETH");
/// assert_eq!(format_eth_balance(None).unwrap(), "0 ETH");
/// assert!(format_eth_balance(Some("0xzz")).is_err());
/// ```
pub fn format_eth_balance(wei: Option<&str>) -> Result<String, ParseIntError> {
    let wei = match wei {
        None | Some("") => return Ok("0 ETH".to_string()),
        Some(w) => w,
    };
    let amount = match wei.strip_prefix("0x").or_else(|| wei.strip_prefix("0X")) {
        Some(hex) => u128::from_str_radix(hex, 16)?,
        None => wei.parse::<u128>()?,
    };
    let eth = amount as f64 / WEI_PER_ETH;
    Ok(format!("{} ETH", decimal(eth, 6)))
}

/// Fixed-point rendering with trailing zeros removed.
fn decimal(value: f64, digits: usize) -> String {
    strip_zeros(to_fixed(value, digits))
}

fn strip_zeros(mut s: String) -> String {
    if s.contains('.') {
        let keep = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(keep);
    }
    s
}

/// Renders `value` with exactly `digits` decimals.
///
/// Rounds on the exact binary value; an exact tie rounds away from zero. Rust's own
/// precision formatting breaks ties to even, so the rounding is done here on a wider
/// expansion instead.
fn to_fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let wide = format!("{:.*}", digits + 20, value.abs());
    let (int_part, frac_part) = wide.split_once('.').unwrap_or((wide.as_str(), ""));

    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(digits))
        .collect();
    if frac_part.as_bytes().get(digits).is_some_and(|&b| b >= b'5') {
        carry(&mut kept);
    }

    let int_len = kept.len() - digits;
    let mut out = String::with_capacity(kept.len() + 2);
    if value < 0.0 {
        out.push('-');
    }
    out.extend(kept[..int_len].iter().map(|&b| b as char));
    if digits > 0 {
        out.push('.');
        out.extend(kept[int_len..].iter().map(|&b| b as char));
    }
    out
}

/// Adds one unit in the last place of an ASCII digit string.
fn carry(digits: &mut Vec<u8>) {
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_fixed_rounds_ties_away_from_zero() {
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(9.999, 2), "10.00");
        assert_eq!(to_fixed(-1.5, 0), "-2");
        assert_eq!(to_fixed(0.0, 2), "0.00");
    }

    #[test]
    fn memory_size_switches_units_at_one_thousand() {
        assert_eq!(format_memory_size(0.0), "0 MB");
        assert_eq!(format_memory_size(31.25), "31.25 MB");
        assert_eq!(format_memory_size(12.5), "12.5 MB");
        assert_eq!(format_memory_size(999.999), "1000 MB");
        assert_eq!(format_memory_size(1000.0), "1 GB");
        assert_eq!(format_memory_size(1500.0), "1.5 GB");
        assert_eq!(format_memory_size(2048.0), "2.05 GB");
    }

    #[test]
    fn memory_ratio_uses_unit_of_total() {
        assert_eq!(format_memory_ratio(512.0, 2000.0), "0.51 / 2 GB");
        assert_eq!(format_memory_ratio(12.5, 500.0), "12.5 / 500 MB");
        assert_eq!(format_memory_ratio(1200.0, 999.0), "1200 / 999 MB");
    }

    #[test]
    fn eth_balance_keeps_six_decimals() {
        assert_eq!(format_eth_balance(Some("")).unwrap(), "0 ETH");
        assert_eq!(format_eth_balance(Some("0x0")).unwrap(), "0 ETH");
        assert_eq!(
            format_eth_balance(Some("0x22b1c8c1227a0000")).unwrap(),
            "2.5 ETH"
        );
        assert_eq!(
            format_eth_balance(Some("0x462d53c88d880")).unwrap(),
            "0.001235 ETH"
        );
        assert_eq!(
            format_eth_balance(Some("1000000000000")).unwrap(),
            "0.000001 ETH"
        );
        assert_eq!(format_eth_balance(Some("1")).unwrap(), "0 ETH");
    }

    #[test]
    fn block_root_keeps_sentinels() {
        assert_eq!(format_block_root(None), None);
        assert_eq!(format_block_root(Some("")).as_deref(), Some(""));
        assert_eq!(format_block_root(Some("0x")).as_deref(), Some("0x"));
        assert_eq!(
            format_block_root(Some("0x0123456789abcdef")).as_deref(),
            Some("0x012345...abcdef")
        );
    }
}
