//! Precision/scale analysis for decimal-like numeric inputs.
//!
//! The node's NUMERIC type carries explicit precision and scale metadata
//! on the wire. Both are derived from the value's decimal string
//! representation, never from floating-point bit patterns.

use crate::error::{KwilLinkError, Result};

/// Precision and scale of a decimal-like value.
///
/// Precision counts total significant digits (sign excluded), scale counts
/// digits after the decimal point: `123.456` has precision 6 and scale 3,
/// `42` has precision 2 and scale 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericMeta {
    pub precision: u16,
    pub scale: u16,
}

impl NumericMeta {
    pub fn new(precision: u16, scale: u16) -> Self {
        Self { precision, scale }
    }

    /// Digits available to the left of the decimal point.
    pub fn integer_digits(&self) -> u16 {
        self.precision.saturating_sub(self.scale)
    }
}

/// Analyze a number's decimal string form into precision and scale.
///
/// Accepts an optional leading sign, digits, and at most one decimal
/// point. Exponent notation is rejected: callers must pre-expand values
/// like `1e5` into plain decimal strings.
///
/// # Examples
///
/// ```rust
/// use kwil_link::numeric::analyze_number;
///
/// let meta = analyze_number("123.456").unwrap();
/// assert_eq!((meta.precision, meta.scale), (6, 3));
///
/// let meta = analyze_number("42").unwrap();
/// assert_eq!((meta.precision, meta.scale), (2, 0));
/// ```
pub fn analyze_number(repr: &str) -> Result<NumericMeta> {
    let unsigned = repr.strip_prefix('-').or_else(|| repr.strip_prefix('+')).unwrap_or(repr);

    if unsigned.is_empty() {
        return Err(KwilLinkError::CodecError(format!(
            "'{}' is not a decimal number",
            repr
        )));
    }

    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, f),
        None => (unsigned, ""),
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    // "1." and ".5" are not canonical decimal strings
    if !all_digits(int_part) || (!frac_part.is_empty() && !all_digits(frac_part)) {
        return Err(KwilLinkError::CodecError(format!(
            "'{}' is not a decimal number",
            repr
        )));
    }
    if unsigned.ends_with('.') {
        return Err(KwilLinkError::CodecError(format!(
            "'{}' is not a decimal number",
            repr
        )));
    }

    let precision = (int_part.len() + frac_part.len()) as u16;
    let scale = frac_part.len() as u16;

    Ok(NumericMeta { precision, scale })
}

/// Whether a string looks like a decimal-shaped number (contains a point).
///
/// Decimal-shaped values are encoded as their canonical string bytes to
/// avoid floating-point precision loss.
pub fn is_decimal_shaped(repr: &str) -> bool {
    repr.contains('.') && analyze_number(repr).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_fractional() {
        let meta = analyze_number("123.456").unwrap();
        assert_eq!(meta.precision, 6);
        assert_eq!(meta.scale, 3);
    }

    #[test]
    fn test_analyze_integer() {
        let meta = analyze_number("42").unwrap();
        assert_eq!(meta.precision, 2);
        assert_eq!(meta.scale, 0);
    }

    #[test]
    fn test_analyze_negative() {
        // Sign is excluded from precision
        let meta = analyze_number("-123.456").unwrap();
        assert_eq!(meta.precision, 6);
        assert_eq!(meta.scale, 3);
    }

    #[test]
    fn test_analyze_leading_zero() {
        let meta = analyze_number("0.5").unwrap();
        assert_eq!(meta.precision, 2);
        assert_eq!(meta.scale, 1);
    }

    #[test]
    fn test_analyze_rejects_garbage() {
        assert!(analyze_number("").is_err());
        assert!(analyze_number("abc").is_err());
        assert!(analyze_number("1.2.3").is_err());
        assert!(analyze_number("1e5").is_err());
        assert!(analyze_number("1.").is_err());
        assert!(analyze_number(".5").is_err());
    }

    #[test]
    fn test_integer_digits() {
        let meta = NumericMeta::new(10, 2);
        assert_eq!(meta.integer_digits(), 8);
    }

    #[test]
    fn test_is_decimal_shaped() {
        assert!(is_decimal_shaped("3.14"));
        assert!(!is_decimal_shaped("42"));
        assert!(!is_decimal_shaped("not.a.number"));
    }
}
