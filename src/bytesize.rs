//! Human-readable byte counts for logs and error messages.

const UNIT: u64 = 1024;
const UNITS: [&str; 6] = ["KB", "MB", "GB", "TB", "PB", "EB"];

/// Formats a byte count using binary (1024-based) units with one
/// decimal place above bytes, e.g. 10485760 -> "10.0 MB".
pub fn format_bytes(bytes: u64) -> String {
    if bytes < UNIT {
        return format!("{bytes} B");
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}", bytes as f64 / div as f64, UNITS[exp])
}

#[cfg(test)]
mod tests {
    use super::{UNITS, format_bytes};

    #[test]
    fn bytes_below_one_kilobyte_stay_integral() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1), "1 B");
        assert_eq!(format_bytes(1023), "1023 B");
    }

    #[test]
    fn unit_boundaries() {
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.0 MB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.0 GB");
        assert_eq!(format_bytes(1024u64.pow(4)), "1.0 TB");
        assert_eq!(format_bytes(1024u64.pow(5)), "1.0 PB");
        assert_eq!(format_bytes(1024u64.pow(6)), "1.0 EB");
    }

    #[test]
    fn fractional_values() {
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(10_485_760), "10.0 MB");
        assert_eq!(format_bytes(1_572_864), "1.5 MB");
    }

    #[test]
    fn output_parses_back_within_one_unit_step() {
        for &bytes in &[1024u64, 2048, 999_999, 1_048_576, 5_000_000_000] {
            let formatted = format_bytes(bytes);
            let mut parts = formatted.split(' ');
            let value: f64 = parts.next().expect("value").parse().expect("parse value");
            let unit = parts.next().expect("unit");
            let exp = 1 + UNITS.iter().position(|u| *u == unit).expect("unit known") as u32;
            let approx = value * 1024f64.powi(exp as i32);
            let step = 1024f64.powi(exp as i32);
            assert!((approx - bytes as f64).abs() <= step, "{formatted} vs {bytes}");
        }
    }
}
