//! Value coercion between field types.
//!
//! Every typed getter goes through one table: the source value is reduced to
//! an intermediate integer (`i128`, wide enough for both `i64` and `u64`) or
//! float, then narrowed to the target with an explicit range check.
//!
//! | source            | integer targets                 | `f64_value`          | `boolean_value`       |
//! |-------------------|---------------------------------|----------------------|-----------------------|
//! | I8..U64           | range-checked                   | widened              | `!= 0`                |
//! | F32 / F64         | truncated toward zero, checked  | F32 via decimal text | `!= 0.0`              |
//! | BOOL              | 1 / 0                           | 1.0 / 0.0            | value                 |
//! | CHAR              | code point                      | code point           | `!= '\0'`             |
//! | STRING            | always fails                    | always fails         | true/false/numeric    |
//! | BINARY            | big-endian if it fits the width | exactly 8 bytes bits | any non-zero byte     |

use crate::error::{C2msError, C2msResult};
use crate::field::{Field, FieldType, FieldValue};

// ── Integer targets ───────────────────────────────────────────────────────────

/// An integer type a field can be narrowed to.
pub trait IntTarget: TryFrom<i128> + Copy {
    const TYPE: FieldType;
    /// Width in bytes, used to bound BINARY decoding.
    const WIDTH: usize;
}

macro_rules! int_target {
    ($($t:ty => $ty:ident, $w:expr);* $(;)?) => {
        $(
            impl IntTarget for $t {
                const TYPE: FieldType = FieldType::$ty;
                const WIDTH: usize = $w;
            }
        )*
    };
}

int_target! {
    i8 => I8, 1;
    i16 => I16, 2;
    i32 => I32, 4;
    i64 => I64, 8;
    u8 => U8, 1;
    u16 => U16, 2;
    u32 => U32, 4;
    u64 => U64, 8;
}

/// Widen an `f32` through its minimal decimal text so that `1234.56f32`
/// becomes `1234.56f64` rather than `1234.5600585...`.
fn widen_f32(v: f32) -> f64 {
    v.to_string().parse::<f64>().unwrap_or(f64::from(v))
}

fn truncate(v: f64) -> Option<i128> {
    if !v.is_finite() {
        return None;
    }
    // `as` saturates at the i128 bounds; the caller's try_from rejects those.
    Some(v.trunc() as i128)
}

fn big_endian(bytes: &[u8]) -> i128 {
    bytes.iter().fold(0i128, |acc, b| (acc << 8) | i128::from(*b))
}

fn conversion_error(target: FieldType) -> C2msError {
    C2msError::conversion(format!("Field cannot be converted to a GMSEC_{target}"))
}

impl FieldValue {
    /// Reduce to an integer, bounded by the target width for BINARY sources.
    fn integral(&self, width: usize) -> Option<i128> {
        match self {
            FieldValue::Char(c) => Some(i128::from(u32::from(*c))),
            FieldValue::Bool(b) => Some(i128::from(*b)),
            FieldValue::I8(v) => Some(i128::from(*v)),
            FieldValue::I16(v) => Some(i128::from(*v)),
            FieldValue::I32(v) => Some(i128::from(*v)),
            FieldValue::I64(v) => Some(i128::from(*v)),
            FieldValue::U8(v) => Some(i128::from(*v)),
            FieldValue::U16(v) => Some(i128::from(*v)),
            FieldValue::U32(v) => Some(i128::from(*v)),
            FieldValue::U64(v) => Some(i128::from(*v)),
            FieldValue::F32(v) => truncate(widen_f32(*v)),
            FieldValue::F64(v) => truncate(*v),
            FieldValue::String(_) => None,
            FieldValue::Binary(b) if !b.is_empty() && b.len() <= width => Some(big_endian(b)),
            FieldValue::Binary(_) => None,
        }
    }

    /// Narrow to an integer type.  Out-of-range values fail; nothing wraps.
    pub fn to_integer<T: IntTarget>(&self) -> C2msResult<T> {
        self.integral(T::WIDTH)
            .and_then(|n| T::try_from(n).ok())
            .ok_or_else(|| conversion_error(T::TYPE))
    }

    pub fn to_f64(&self) -> C2msResult<f64> {
        let v = match self {
            FieldValue::Char(c) => Some(f64::from(u32::from(*c))),
            FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::I8(v) => Some(f64::from(*v)),
            FieldValue::I16(v) => Some(f64::from(*v)),
            FieldValue::I32(v) => Some(f64::from(*v)),
            FieldValue::I64(v) => Some(*v as f64),
            FieldValue::U8(v) => Some(f64::from(*v)),
            FieldValue::U16(v) => Some(f64::from(*v)),
            FieldValue::U32(v) => Some(f64::from(*v)),
            FieldValue::U64(v) => Some(*v as f64),
            FieldValue::F32(v) => Some(widen_f32(*v)),
            FieldValue::F64(v) => Some(*v),
            FieldValue::String(_) => None,
            FieldValue::Binary(b) => <[u8; 8]>::try_from(b.as_slice())
                .ok()
                .map(|bits| f64::from_bits(u64::from_be_bytes(bits))),
        };
        v.ok_or_else(|| conversion_error(FieldType::F64))
    }

    pub fn to_bool(&self) -> C2msResult<bool> {
        match self {
            FieldValue::Bool(b) => Ok(*b),
            FieldValue::Char(c) => Ok(*c != '\0'),
            FieldValue::F32(v) => Ok(*v != 0.0),
            FieldValue::F64(v) => Ok(*v != 0.0),
            FieldValue::Binary(b) => Ok(b.iter().any(|x| *x != 0)),
            FieldValue::String(s) => {
                let text = s.trim();
                if text.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if text.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    text.parse::<f64>()
                        .ok()
                        .filter(|n| !n.is_nan())
                        .map(|n| n != 0.0)
                        .ok_or_else(|| {
                            C2msError::conversion("Field cannot be represented as a boolean")
                        })
                }
            }
            other => other
                .integral(16)
                .map(|n| n != 0)
                .ok_or_else(|| C2msError::conversion("Field cannot be represented as a boolean")),
        }
    }

    /// Minimal decimal text for numbers, literal text for STRING and CHAR,
    /// `true`/`false` for BOOL and upper-case hex for BINARY.
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Char(c) => c.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::I8(v) => v.to_string(),
            FieldValue::I16(v) => v.to_string(),
            FieldValue::I32(v) => v.to_string(),
            FieldValue::I64(v) => v.to_string(),
            FieldValue::U8(v) => v.to_string(),
            FieldValue::U16(v) => v.to_string(),
            FieldValue::U32(v) => v.to_string(),
            FieldValue::U64(v) => v.to_string(),
            FieldValue::F32(v) => v.to_string(),
            FieldValue::F64(v) => v.to_string(),
            FieldValue::String(s) => s.clone(),
            FieldValue::Binary(b) => hex::encode_upper(b),
        }
    }

    /// Parse `text` as a value of type `ty`.
    ///
    /// Number parsing is locale independent.  BOOL accepts `true`/`false` in
    /// any case as well as numeric text; BINARY expects hex digits.
    pub fn parse_as(ty: FieldType, text: &str) -> C2msResult<FieldValue> {
        fn num<T: std::str::FromStr>(ty: FieldType, text: &str) -> C2msResult<T> {
            text.trim().parse::<T>().map_err(|_| {
                C2msError::conversion(format!("Unable to convert \"{text}\" to a {ty} value"))
            })
        }

        let value = match ty {
            FieldType::Char => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => FieldValue::Char(c),
                    _ => {
                        return Err(C2msError::conversion(format!(
                            "Unable to convert \"{text}\" to a CHAR value"
                        )))
                    }
                }
            }
            FieldType::Bool => FieldValue::Bool(FieldValue::String(text.to_string()).to_bool()?),
            FieldType::I8 => FieldValue::I8(num(ty, text)?),
            FieldType::I16 => FieldValue::I16(num(ty, text)?),
            FieldType::I32 => FieldValue::I32(num(ty, text)?),
            FieldType::I64 => FieldValue::I64(num(ty, text)?),
            FieldType::U8 => FieldValue::U8(num(ty, text)?),
            FieldType::U16 => FieldValue::U16(num(ty, text)?),
            FieldType::U32 => FieldValue::U32(num(ty, text)?),
            FieldType::U64 => FieldValue::U64(num(ty, text)?),
            FieldType::F32 => FieldValue::F32(num(ty, text)?),
            FieldType::F64 => FieldValue::F64(num(ty, text)?),
            FieldType::String => FieldValue::String(text.to_string()),
            FieldType::Binary => FieldValue::Binary(hex::decode(text.trim()).map_err(|e| {
                C2msError::conversion(format!("Unable to convert \"{text}\" to a BIN value: {e}"))
            })?),
        };
        Ok(value)
    }

    /// Rebuild a float value from its upper- or lower-case hex bit pattern.
    pub fn from_float_bits(ty: FieldType, bits: &str) -> C2msResult<FieldValue> {
        let bad = || C2msError::conversion(format!("Invalid BITS value \"{bits}\" for {ty}"));
        match ty {
            FieldType::F32 => u32::from_str_radix(bits.trim(), 16)
                .map(|b| FieldValue::F32(f32::from_bits(b)))
                .map_err(|_| bad()),
            FieldType::F64 => u64::from_str_radix(bits.trim(), 16)
                .map(|b| FieldValue::F64(f64::from_bits(b)))
                .map_err(|_| bad()),
            _ => Err(bad()),
        }
    }
}

// ── Field getters ─────────────────────────────────────────────────────────────

impl Field {
    pub fn string_value(&self) -> String {
        self.value().to_text()
    }

    pub fn boolean_value(&self) -> C2msResult<bool> {
        self.value().to_bool()
    }

    pub fn i16_value(&self) -> C2msResult<i16> {
        self.value().to_integer()
    }

    pub fn i32_value(&self) -> C2msResult<i32> {
        self.value().to_integer()
    }

    pub fn i64_value(&self) -> C2msResult<i64> {
        self.value().to_integer()
    }

    pub fn u16_value(&self) -> C2msResult<u16> {
        self.value().to_integer()
    }

    pub fn u32_value(&self) -> C2msResult<u32> {
        self.value().to_integer()
    }

    pub fn u64_value(&self) -> C2msResult<u64> {
        self.value().to_integer()
    }

    pub fn f64_value(&self) -> C2msResult<f64> {
        self.value().to_f64()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
