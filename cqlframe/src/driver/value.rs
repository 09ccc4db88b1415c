// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Driver-native values

use chrono::{DateTime, Utc};
use num_bigint::{BigInt, Sign};
use std::fmt;
use uuid::Uuid;

/// A scalar value as a driver delivers it.
///
/// The set is closed: collections, user-defined types, and anything else
/// without a dedicated variant arrive as [`DriverValue::Structured`].
#[derive(Debug, Clone, PartialEq)]
pub enum DriverValue {
    Float(f32),
    Timestamp(DateTime<Utc>),
    Text(String),
    BigInt(i64),
    Double(f64),
    Boolean(bool),
    SmallInt(i16),
    TinyInt(i8),
    /// 128-bit unique identifier (`uuid` and `timeuuid`)
    Uuid(Uuid),
    /// Native-width integer (CQL `int`)
    Int(i32),
    /// Arbitrary-precision decimal
    Decimal(Decimal),
    /// Arbitrary-precision integer
    Varint(BigInt),
    /// Anything else, already in structured form
    Structured(serde_json::Value),
}

impl DriverValue {
    /// Variant name, for logs
    pub fn type_name(&self) -> &'static str {
        match self {
            DriverValue::Float(_) => "float",
            DriverValue::Timestamp(_) => "timestamp",
            DriverValue::Text(_) => "text",
            DriverValue::BigInt(_) => "bigint",
            DriverValue::Double(_) => "double",
            DriverValue::Boolean(_) => "boolean",
            DriverValue::SmallInt(_) => "smallint",
            DriverValue::TinyInt(_) => "tinyint",
            DriverValue::Uuid(_) => "uuid",
            DriverValue::Int(_) => "int",
            DriverValue::Decimal(_) => "decimal",
            DriverValue::Varint(_) => "varint",
            DriverValue::Structured(_) => "structured",
        }
    }
}

/// Zero padding beyond this switches [`Decimal`]'s display to exponent form.
/// Anything that small is far below the `f64` range already.
const MAX_PLAIN_ZERO_PADDING: usize = 400;

/// Arbitrary-precision decimal: `unscaled * 10^-scale`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    unscaled: BigInt,
    scale: i32,
}

impl Decimal {
    pub fn new(unscaled: BigInt, scale: i32) -> Self {
        Self { unscaled, scale }
    }

    /// Decode the CQL wire form: big-endian two's complement unscaled value
    pub fn from_signed_bytes_be(bytes: &[u8], scale: i32) -> Self {
        Self::new(BigInt::from_signed_bytes_be(bytes), scale)
    }

    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }
}

impl fmt::Display for Decimal {
    /// Plain decimal notation (`-12.345`, `0.001`). Negative scales, and
    /// positive scales needing more than a few hundred leading zeros, use an
    /// exponent instead of padding zeros, so the text stays proportional to
    /// the digit count.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.unscaled.sign() == Sign::Minus { "-" } else { "" };
        let digits = self.unscaled.magnitude().to_string();

        if self.scale <= 0 {
            if self.scale == 0 {
                return write!(f, "{}{}", sign, digits);
            }
            return write!(f, "{}{}e{}", sign, digits, -(self.scale as i64));
        }

        let scale = self.scale as usize;
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{}{}.{}", sign, int_part, frac_part)
        } else if scale - digits.len() > MAX_PLAIN_ZERO_PADDING {
            write!(f, "{}{}e-{}", sign, digits, scale)
        } else {
            write!(f, "{}0.{}{}", sign, "0".repeat(scale - digits.len()), digits)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(unscaled: i64, scale: i32) -> String {
        Decimal::new(BigInt::from(unscaled), scale).to_string()
    }

    #[test]
    fn test_decimal_display() {
        assert_eq!(dec(12345, 2), "123.45");
        assert_eq!(dec(-12345, 2), "-123.45");
        assert_eq!(dec(5, 3), "0.005");
        assert_eq!(dec(-5, 1), "-0.5");
        assert_eq!(dec(42, 0), "42");
        assert_eq!(dec(42, -3), "42e3");
    }

    #[test]
    fn test_huge_scale_uses_exponent_form() {
        assert_eq!(dec(1, i32::MAX), "1e-2147483647");
        assert_eq!(dec(-25, 1_000), "-25e-1000");
        assert_eq!(dec(1, 401).len(), "0.".len() + 401);
        assert_eq!(dec(1, 402), "1e-402");
        assert_eq!("1e-2147483647".parse::<f64>().unwrap(), 0.0);
    }

    #[test]
    fn test_decimal_from_wire_bytes() {
        // 0xFF85 == -123 in two's complement
        let decimal = Decimal::from_signed_bytes_be(&[0xFF, 0x85], 1);
        assert_eq!(decimal.to_string(), "-12.3");
        assert_eq!(decimal.scale(), 1);
    }
}
