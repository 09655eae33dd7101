//! Byte-size constants and formatting helpers

use num_format::{Locale, ToFormattedString};

/// One mebibyte, the block size used for fill writes
pub const MIB: u64 = 1024 * 1024;

/// One gibibyte
pub const GIB: u64 = 1024 * MIB;

/// Convert bytes to human-readable format (e.g., "1.50 GB")
pub fn bytes_to_pretty(bytes: u64, add_bytes: bool) -> String {
    let mut steps = 0;
    let mut val: f64 = bytes as f64;

    while val >= 1024. && steps < 6 {
        val /= 1024.;
        steps += 1;
    }

    let unit = match steps {
        0 => "B",
        1 => "KB",
        2 => "MB",
        3 => "GB",
        4 => "TB",
        5 => "PB",
        _ => "EB",
    };

    if add_bytes {
        let bytes_str = bytes.to_formatted_string(&Locale::en);
        format!("{:.2} {} ({} bytes)", val, unit, bytes_str)
    } else {
        format!("{:.2} {}", val, unit)
    }
}

/// Signed variant used for fill deltas, which may be negative
pub fn signed_bytes_to_pretty(bytes: i64, add_bytes: bool) -> String {
    if bytes < 0 {
        format!("-{}", bytes_to_pretty(bytes.unsigned_abs(), add_bytes))
    } else {
        bytes_to_pretty(bytes as u64, add_bytes)
    }
}

/// Percentage of `total` taken by `used`; zero when `total` is zero
pub fn percent_of(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    used as f64 / total as f64 * 100.0
}
