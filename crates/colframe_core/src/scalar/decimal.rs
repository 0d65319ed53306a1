use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

use colframe_error::{DbError, Result};
use num_traits::Zero;

/// Max number of digits after the decimal point.
pub const DECIMAL_MAX_SCALE: u8 = 38;

/// Fixed point decimal stored as an unscaled 128-bit integer.
///
/// The represented value is `value * 10^-scale`. Equality is structural, so
/// `1.0` and `1.00` are not equal. Use [`Decimal::cmp_numeric`] to compare
/// values independent of scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    value: i128,
    scale: u8,
}

impl Decimal {
    pub const ZERO: Decimal = Decimal { value: 0, scale: 0 };

    pub fn new(value: i128, scale: u8) -> Result<Self> {
        if scale > DECIMAL_MAX_SCALE {
            return Err(DbError::unsupported_conversion(format!(
                "Decimal scale {scale} exceeds max scale {DECIMAL_MAX_SCALE}"
            )));
        }
        Ok(Decimal { value, scale })
    }

    pub const fn from_i64(v: i64) -> Self {
        Decimal {
            value: v as i128,
            scale: 0,
        }
    }

    pub const fn unscaled(&self) -> i128 {
        self.value
    }

    pub const fn scale(&self) -> u8 {
        self.scale
    }

    /// Parse a plain decimal string such as `-12.50`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };

        let valid = !(int_part.is_empty() && frac_part.is_empty())
            && int_part.bytes().all(|b| b.is_ascii_digit())
            && frac_part.bytes().all(|b| b.is_ascii_digit());
        if !valid {
            return Err(DbError::unsupported_conversion(format!(
                "Cannot parse '{s}' as a decimal"
            )));
        }

        let scale = u8::try_from(frac_part.len())
            .ok()
            .filter(|scale| *scale <= DECIMAL_MAX_SCALE)
            .ok_or_else(|| {
                DbError::unsupported_conversion(format!("Too many fractional digits in '{s}'"))
            })?;

        let mut value: i128 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add((b - b'0') as i128))
                .ok_or_else(|| {
                    DbError::unsupported_conversion(format!("Decimal '{s}' out of range"))
                })?;
        }

        if negative {
            value = -value;
        }

        Ok(Decimal { value, scale })
    }

    /// Rescale to a larger scale. Saturates on overflow.
    fn upscale(&self, scale: u8) -> i128 {
        debug_assert!(scale >= self.scale);
        let factor = 10_i128.saturating_pow((scale - self.scale) as u32);
        self.value.saturating_mul(factor)
    }

    /// Compare two decimals by numeric value, ignoring scale.
    pub fn cmp_numeric(&self, other: &Decimal) -> Ordering {
        let scale = self.scale.max(other.scale);
        self.upscale(scale).cmp(&other.upscale(scale))
    }

    /// Divide by two, keeping this decimal's scale and rounding half away
    /// from zero (HALF_UP).
    pub fn half_round_half_up(&self) -> Decimal {
        let quot = self.value / 2;
        let rem = self.value % 2;
        let value = if rem == 0 {
            quot
        } else {
            quot + self.value.signum()
        };

        Decimal {
            value,
            scale: self.scale,
        }
    }

    pub fn to_f64(&self) -> f64 {
        self.value as f64 / 10_f64.powi(self.scale as i32)
    }
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Self) -> Self::Output {
        let scale = self.scale.max(rhs.scale);
        Decimal {
            value: self.upscale(scale).saturating_add(rhs.upscale(scale)),
            scale,
        }
    }
}

impl Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Self) -> Self::Output {
        let scale = self.scale.max(rhs.scale);
        Decimal {
            value: self.upscale(scale).saturating_sub(rhs.upscale(scale)),
            scale,
        }
    }
}

impl Zero for Decimal {
    fn zero() -> Self {
        Decimal::ZERO
    }

    fn is_zero(&self) -> bool {
        self.value == 0
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.value);
        }

        let digits = self.value.unsigned_abs().to_string();
        let scale = self.scale as usize;
        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale - digits.len() + 1), digits)
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        let sign = if self.value < 0 { "-" } else { "" };

        write!(f, "{sign}{int_part}.{frac_part}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let cases = ["0", "10", "-1.5", "0.05", "123.450", "-0.001"];
        for case in cases {
            let d = Decimal::parse(case).unwrap();
            assert_eq!(case, d.to_string());
        }

        assert_eq!(Decimal::new(150, 1).unwrap(), Decimal::parse("+15.0").unwrap());
    }

    #[test]
    fn parse_invalid() {
        for case in ["", ".", "1.2.3", "abc", "1e5", "--1"] {
            Decimal::parse(case).unwrap_err();
        }
    }

    #[test]
    fn add_aligns_scale() {
        let a = Decimal::parse("1.5").unwrap();
        let b = Decimal::parse("2.25").unwrap();
        assert_eq!("3.75", (a + b).to_string());
        assert_eq!("-0.75", (a - b).to_string());
    }

    #[test]
    fn half_up() {
        assert_eq!("5", Decimal::parse("10").unwrap().half_round_half_up().to_string());
        assert_eq!("1", Decimal::parse("1").unwrap().half_round_half_up().to_string());
        assert_eq!("-1", Decimal::parse("-1").unwrap().half_round_half_up().to_string());
        assert_eq!("0.8", Decimal::parse("1.5").unwrap().half_round_half_up().to_string());
    }

    #[test]
    fn numeric_ordering_ignores_scale() {
        let a = Decimal::parse("1.0").unwrap();
        let b = Decimal::parse("1").unwrap();
        assert_ne!(a, b);
        assert_eq!(Ordering::Equal, a.cmp_numeric(&b));
        assert_eq!(
            Ordering::Less,
            Decimal::parse("0.99").unwrap().cmp_numeric(&b)
        );
    }
}
