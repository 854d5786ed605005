//! The utilities module provides general capabilities, that may span the
//! input modeling, output analysis, and simulator modules.  The utilities
//! are centered around error handling and random-digit formatting.

pub mod errors;

/// The function renders a random digit for tabular display, zero-padded to
/// the width of the digit scale.  A digit equal to the scale wraps to `0`
/// for display purposes only - comparisons continue to treat it as the
/// scale value.
pub fn format_digit(digit: u32, scale: u32) -> String {
    let width = scale.to_string().len() - 1;
    let wrapped = if digit == scale { 0 } else { digit };
    format!("{:0width$}", wrapped, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_are_zero_padded_to_scale_width() {
        assert_eq!["01", format_digit(1, 100)];
        assert_eq!["35", format_digit(35, 100)];
        assert_eq!["007", format_digit(7, 1000)];
    }

    #[test]
    fn scale_digit_wraps_to_zero_for_display() {
        assert_eq!["00", format_digit(100, 100)];
        assert_eq!["000", format_digit(1000, 1000)];
    }
}
