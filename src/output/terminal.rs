//! Terminal output utilities.
//!
//! Provides formatting helpers for addresses, ranges and CSV fields.

use crate::models::{format_address, format_binary, Label};
use colored::{ColoredString, Colorize};

/// Format a value as a quoted, right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
///
/// # Returns
/// A quoted, right-aligned string
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let value_str = value.to_string().replace('"', "\"\"");
    let quoted = format!("\"{value_str}\"");
    let quoted_len = quoted.len();

    if quoted_len >= width {
        quoted
    } else {
        format!("{quoted:>width$}")
    }
}

/// Dotted-quad or dotted-binary address.
pub fn format_addr(addr: u32, binary: bool) -> String {
    if binary {
        format_binary(addr)
    } else {
        format_address(addr)
    }
}

/// `first - last`, or just `first` when both are the same address.
pub fn format_range(first: u32, last: u32, binary: bool) -> String {
    if first == last {
        format_addr(first, binary)
    } else {
        format!(
            "{} - {}",
            format_addr(first, binary),
            format_addr(last, binary)
        )
    }
}

/// Paint already padded text in the label's colour.
pub fn paint_label(text: &str, label: &Label) -> ColoredString {
    match label.rgb() {
        Some((r, g, b)) => text.on_truecolor(r, g, b).white().bold(),
        None => text.bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_field_short() {
        assert_eq!(format_field("test", 10), "    \"test\"");
    }

    #[test]
    fn test_format_field_long() {
        assert_eq!(format_field("10.0.0.0/24", 5), "\"10.0.0.0/24\"");
    }

    #[test]
    fn test_format_field_number() {
        assert_eq!(format_field(42, 6), "  \"42\"");
    }

    #[test]
    fn test_format_field_escapes_quotes() {
        assert_eq!(format_field("a\"b", 0), "\"a\"\"b\"");
    }

    #[test]
    fn test_format_range() {
        assert_eq!(format_range(1, 1, false), "0.0.0.1");
        assert_eq!(format_range(0, 255, false), "0.0.0.0 - 0.0.0.255");
        assert_eq!(
            format_range(1, 1, true),
            "00000000.00000000.00000000.00000001"
        );
    }
}
