//! IEEE 754-2008 128-bit decimal (BID encoding)

use std::fmt;
use std::str::FromStr;

use crate::constants::DECIMAL128_LEN;
use crate::error::{DumpError, Result};

const EXPONENT_BIAS: i32 = 6176;
const EXPONENT_MAX: i32 = 6111;
const EXPONENT_MIN: i32 = -6176;
const MAX_DIGITS: usize = 34;
const MAX_COEFFICIENT: u128 = 9_999_999_999_999_999_999_999_999_999_999_999;

const COMBINATION_NAN: u64 = 0x1F;
const COMBINATION_INFINITY: u64 = 0x1E;
const SIGN_BIT: u64 = 1 << 63;
const NAN_HIGH: u64 = COMBINATION_NAN << 58;
const INFINITY_HIGH: u64 = COMBINATION_INFINITY << 58;
const COEFFICIENT_HIGH_MASK: u64 = (1 << 49) - 1;

/// 128-bit decimal, stored as its 16 little-endian wire bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal128 {
    bytes: [u8; DECIMAL128_LEN],
}

impl Decimal128 {
    /// Wrap 16 wire bytes
    pub const fn from_bytes(bytes: [u8; DECIMAL128_LEN]) -> Self {
        Self { bytes }
    }

    /// The 16 wire bytes
    pub fn bytes(&self) -> [u8; DECIMAL128_LEN] {
        self.bytes
    }

    /// Parse a decimal literal.
    ///
    /// Accepts an optional sign, digits with an optional fraction, and an
    /// optional exponent, plus `NaN`, `Inf` and `Infinity` in any case.
    /// Digits past the 34 that fit are dropped only when they are zeros.
    pub fn from_str_exact(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "nan" => return Ok(Self::from_halves(NAN_HIGH, 0)),
            "inf" | "infinity" => return Ok(Self::from_halves(INFINITY_HIGH, 0)),
            "-inf" | "-infinity" => return Ok(Self::from_halves(INFINITY_HIGH | SIGN_BIT, 0)),
            _ => {}
        }

        let (sign, body) = if let Some(stripped) = s.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = s.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, s)
        };

        // Parse scientific notation
        let (mantissa, exponent) = match body.find(['e', 'E']) {
            Some(e_pos) => {
                let exp_str = &body[e_pos + 1..];
                let exp: i32 = exp_str.parse().map_err(|_| invalid(s, "bad exponent"))?;
                (&body[..e_pos], exp)
            }
            None => (body, 0),
        };

        let (digits, decimal_places) = Self::parse_mantissa(mantissa).ok_or_else(|| invalid(s, "bad digits"))?;
        let mut exponent = i64::from(exponent) - decimal_places as i64;
        let mut digits = Self::remove_leading_zeros(digits);
        let is_zero = digits == [b'0'];

        // Drop excess precision, but only trailing zeros
        while digits.len() > MAX_DIGITS {
            if digits.last() != Some(&b'0') {
                return Err(invalid(s, "inexact rounding"));
            }
            digits.pop();
            exponent += 1;
        }

        if exponent > i64::from(EXPONENT_MAX) {
            if is_zero {
                exponent = i64::from(EXPONENT_MAX);
            } else {
                // Shift the excess into the coefficient while there is room
                while exponent > i64::from(EXPONENT_MAX) && digits.len() < MAX_DIGITS {
                    digits.push(b'0');
                    exponent -= 1;
                }
                if exponent > i64::from(EXPONENT_MAX) {
                    return Err(invalid(s, "exponent out of range"));
                }
            }
        }

        if exponent < i64::from(EXPONENT_MIN) {
            if is_zero {
                exponent = i64::from(EXPONENT_MIN);
            } else {
                while exponent < i64::from(EXPONENT_MIN) {
                    if digits.len() < 2 || digits.last() != Some(&b'0') {
                        return Err(invalid(s, "inexact rounding"));
                    }
                    digits.pop();
                    exponent += 1;
                }
            }
        }

        let coefficient = digits
            .iter()
            .fold(0u128, |acc, d| acc * 10 + u128::from(d - b'0'));
        Ok(Self::from_parts(sign, coefficient, exponent as i32))
    }

    /// Parse mantissa and return (digits, decimal_places)
    fn parse_mantissa(s: &str) -> Option<(Vec<u8>, usize)> {
        let mut digits = Vec::new();
        let mut decimal_places = 0;
        let mut found_dot = false;

        for ch in s.bytes() {
            match ch {
                b'0'..=b'9' => {
                    digits.push(ch);
                    if found_dot {
                        decimal_places += 1;
                    }
                }
                b'.' if !found_dot => found_dot = true,
                _ => return None,
            }
        }

        if digits.is_empty() {
            return None;
        }

        Some((digits, decimal_places))
    }

    /// Remove leading zeros (except for "0" itself)
    fn remove_leading_zeros(digits: Vec<u8>) -> Vec<u8> {
        let first_nonzero = digits.iter().position(|&d| d != b'0');
        match first_nonzero {
            Some(idx) => digits[idx..].to_vec(),
            None => vec![b'0'],
        }
    }

    fn from_parts(sign: bool, coefficient: u128, exponent: i32) -> Self {
        let biased = (exponent + EXPONENT_BIAS) as u64;
        let mut high = (biased << 49) | ((coefficient >> 64) as u64 & COEFFICIENT_HIGH_MASK);
        if sign {
            high |= SIGN_BIT;
        }
        Self::from_halves(high, coefficient as u64)
    }

    fn from_halves(high: u64, low: u64) -> Self {
        let mut bytes = [0u8; DECIMAL128_LEN];
        bytes[..8].copy_from_slice(&low.to_le_bytes());
        bytes[8..].copy_from_slice(&high.to_le_bytes());
        Self { bytes }
    }

    fn halves(&self) -> (u64, u64) {
        let mut low = [0u8; 8];
        let mut high = [0u8; 8];
        low.copy_from_slice(&self.bytes[..8]);
        high.copy_from_slice(&self.bytes[8..]);
        (u64::from_le_bytes(high), u64::from_le_bytes(low))
    }

    /// Whether the sign bit is set
    pub fn is_negative(&self) -> bool {
        self.halves().0 & SIGN_BIT != 0
    }

    /// Whether this is a NaN
    pub fn is_nan(&self) -> bool {
        (self.halves().0 >> 58) & 0x1F == COMBINATION_NAN
    }

    /// Whether this is positive or negative infinity
    pub fn is_infinite(&self) -> bool {
        (self.halves().0 >> 58) & 0x1F == COMBINATION_INFINITY
    }
}

fn invalid(input: &str, reason: &str) -> DumpError {
    DumpError::Encoding {
        key: "$numberDecimal",
        reason: format!("{reason} in {input:?}"),
    }
}

impl FromStr for Decimal128 {
    type Err = DumpError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_exact(s)
    }
}

impl fmt::Display for Decimal128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nan() {
            return f.write_str("NaN");
        }
        let (high, low) = self.halves();
        let sign = if high & SIGN_BIT != 0 { "-" } else { "" };
        if self.is_infinite() {
            return write!(f, "{sign}Infinity");
        }

        let (biased, coefficient) = if (high >> 61) & 0b11 == 0b11 {
            // Implicit 0b100 prefix: always above the largest coefficient
            ((high >> 47) & 0x3FFF, 0u128)
        } else {
            let coefficient = (u128::from(high & COEFFICIENT_HIGH_MASK) << 64) | u128::from(low);
            ((high >> 49) & 0x3FFF, coefficient)
        };
        let coefficient = if coefficient > MAX_COEFFICIENT { 0 } else { coefficient };
        let exponent = biased as i32 - EXPONENT_BIAS;

        let digits = coefficient.to_string();
        let adjusted = exponent + digits.len() as i32 - 1;

        f.write_str(sign)?;
        if exponent <= 0 && adjusted >= -6 {
            if exponent == 0 {
                return f.write_str(&digits);
            }
            let point = digits.len() as i32 + exponent;
            if point > 0 {
                let (int_part, frac_part) = digits.split_at(point as usize);
                write!(f, "{int_part}.{frac_part}")
            } else {
                write!(f, "0.{}{digits}", "0".repeat((-point) as usize))
            }
        } else {
            let (first, rest) = digits.split_at(1);
            f.write_str(first)?;
            if !rest.is_empty() {
                write!(f, ".{rest}")?;
            }
            if adjusted >= 0 {
                write!(f, "E+{adjusted}")
            } else {
                write!(f, "E{adjusted}")
            }
        }
    }
}
