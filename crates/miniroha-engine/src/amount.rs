//! Decimal-string amount parsing (`spec.md` §4.3 "Amount semantics").

use miniroha_core::{Amount, MinirohaError};

fn is_decimal_shape(s: &str) -> bool {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match frac_part {
        Some(f) => !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()),
        None => true,
    }
}

/// Parse a decimal-string amount (`^\d+(\.\d+)?$`) into the asset's
/// smallest unit at the given `precision`. Rejects a fractional tail
/// longer than `precision`; right-pads a shorter tail with zeros.
pub fn parse_amount(amount_str: &str, precision: u8) -> Result<Amount, MinirohaError> {
    if !is_decimal_shape(amount_str) {
        return Err(MinirohaError::InvalidAmountFormat);
    }
    let (int_part, frac_part) = match amount_str.split_once('.') {
        Some((i, f)) => (i, f),
        None => (amount_str, ""),
    };
    if frac_part.len() > precision as usize {
        return Err(MinirohaError::PrecisionExceeded);
    }
    let padded_frac = format!("{frac_part:0<width$}", width = precision as usize);
    let digits = format!("{int_part}{padded_frac}");
    digits.parse::<Amount>().map_err(|_| MinirohaError::InvalidAmount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_number_scales_by_precision() {
        assert_eq!(parse_amount("1000", 2).unwrap().to_string(), "100000");
    }

    #[test]
    fn exact_precision_fraction_is_kept() {
        assert_eq!(parse_amount("1.00", 2).unwrap().to_string(), "100");
        assert_eq!(parse_amount("1.23", 2).unwrap().to_string(), "123");
    }

    #[test]
    fn short_fraction_is_right_padded() {
        assert_eq!(parse_amount("1.5", 2).unwrap().to_string(), "150");
    }

    #[test]
    fn zero_is_accepted() {
        assert_eq!(parse_amount("0", 2).unwrap().to_string(), "0");
    }

    #[test]
    fn excess_precision_is_rejected() {
        assert!(matches!(
            parse_amount("1.234", 2),
            Err(MinirohaError::PrecisionExceeded)
        ));
    }

    #[test]
    fn malformed_amount_is_rejected() {
        assert!(matches!(
            parse_amount("-1", 2),
            Err(MinirohaError::InvalidAmountFormat)
        ));
        assert!(matches!(
            parse_amount("1.", 2),
            Err(MinirohaError::InvalidAmountFormat)
        ));
        assert!(matches!(
            parse_amount(".5", 2),
            Err(MinirohaError::InvalidAmountFormat)
        ));
        assert!(matches!(
            parse_amount("", 2),
            Err(MinirohaError::InvalidAmountFormat)
        ));
    }
}
