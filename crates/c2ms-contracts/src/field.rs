//! Field types and values.
//!
//! A `Field` is a named, immutable `FieldValue`.  Values are plain Rust data,
//! so a constructed field is `Send + Sync` and can be cloned freely between
//! threads.  Coercion between value types lives in [`crate::convert`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{C2msError, C2msResult};

// ── FieldType ─────────────────────────────────────────────────────────────────

/// The type tag of a field value, named as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    Char,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    Binary,
}

impl FieldType {
    pub const ALL: [FieldType; 14] = [
        FieldType::Char,
        FieldType::Bool,
        FieldType::I8,
        FieldType::I16,
        FieldType::I32,
        FieldType::I64,
        FieldType::U8,
        FieldType::U16,
        FieldType::U32,
        FieldType::U64,
        FieldType::F32,
        FieldType::F64,
        FieldType::String,
        FieldType::Binary,
    ];

    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Char => "CHAR",
            FieldType::Bool => "BOOL",
            FieldType::I8 => "I8",
            FieldType::I16 => "I16",
            FieldType::I32 => "I32",
            FieldType::I64 => "I64",
            FieldType::U8 => "U8",
            FieldType::U16 => "U16",
            FieldType::U32 => "U32",
            FieldType::U64 => "U64",
            FieldType::F32 => "F32",
            FieldType::F64 => "F64",
            FieldType::String => "STRING",
            FieldType::Binary => "BIN",
        }
    }

    /// Parse a type name case-insensitively.  `BINARY`, `BLOB` and `BOOLEAN`
    /// are accepted as aliases.
    pub fn parse(name: &str) -> Option<FieldType> {
        let upper = name.trim().to_ascii_uppercase();
        let ty = match upper.as_str() {
            "CHAR" => FieldType::Char,
            "BOOL" | "BOOLEAN" => FieldType::Bool,
            "I8" => FieldType::I8,
            "I16" => FieldType::I16,
            "I32" => FieldType::I32,
            "I64" => FieldType::I64,
            "U8" => FieldType::U8,
            "U16" => FieldType::U16,
            "U32" => FieldType::U32,
            "U64" => FieldType::U64,
            "F32" => FieldType::F32,
            "F64" => FieldType::F64,
            "STRING" => FieldType::String,
            "BIN" | "BINARY" | "BLOB" => FieldType::Binary,
            _ => return None,
        };
        Some(ty)
    }

    /// True for the floating point types, which carry a `BITS` attribute.
    pub fn is_float(&self) -> bool {
        matches!(self, FieldType::F32 | FieldType::F64)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = C2msError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::parse(s).ok_or_else(|| C2msError::parse(format!("unknown field type '{s}'")))
    }
}

impl TryFrom<String> for FieldType {
    type Error = C2msError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FieldType> for String {
    fn from(ty: FieldType) -> Self {
        ty.as_str().to_string()
    }
}

// ── FieldValue ────────────────────────────────────────────────────────────────

/// A tagged field value.
///
/// `U64` covers the full unsigned 64-bit range natively.  Float variants hold
/// the IEEE value; the decimal text and raw bit pattern are both derived from
/// it on demand (see `string_value` and `float_bits_hex`).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Char(char),
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Binary(Vec<u8>),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Char(_) => FieldType::Char,
            FieldValue::Bool(_) => FieldType::Bool,
            FieldValue::I8(_) => FieldType::I8,
            FieldValue::I16(_) => FieldType::I16,
            FieldValue::I32(_) => FieldType::I32,
            FieldValue::I64(_) => FieldType::I64,
            FieldValue::U8(_) => FieldType::U8,
            FieldValue::U16(_) => FieldType::U16,
            FieldValue::U32(_) => FieldType::U32,
            FieldValue::U64(_) => FieldType::U64,
            FieldValue::F32(_) => FieldType::F32,
            FieldValue::F64(_) => FieldType::F64,
            FieldValue::String(_) => FieldType::String,
            FieldValue::Binary(_) => FieldType::Binary,
        }
    }

    /// Upper-case hex of the IEEE bit pattern, for F32/F64 only.
    pub fn float_bits_hex(&self) -> Option<String> {
        match self {
            FieldValue::F32(v) => Some(format!("{:08X}", v.to_bits())),
            FieldValue::F64(v) => Some(format!("{:016X}", v.to_bits())),
            _ => None,
        }
    }
}

macro_rules! impl_from_value {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for FieldValue {
                fn from(v: $t) -> Self {
                    FieldValue::$variant(v)
                }
            }
        )*
    };
}

impl_from_value! {
    char => Char,
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    Vec<u8> => Binary,
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<&[u8]> for FieldValue {
    fn from(v: &[u8]) -> Self {
        FieldValue::Binary(v.to_vec())
    }
}

// ── Field ─────────────────────────────────────────────────────────────────────

/// A named field value.  Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    value: FieldValue,
}

impl Field {
    /// Build a field.  An empty (or all-whitespace) name is rejected.
    pub fn new(name: impl Into<String>, value: impl Into<FieldValue>) -> C2msResult<Self> {
        let name = name.into();
        check_field_name(&name)?;
        Ok(Self {
            name,
            value: value.into(),
        })
    }

    /// Build a field by parsing `text` as a value of type `ty`.
    pub fn from_text(name: impl Into<String>, ty: FieldType, text: &str) -> C2msResult<Self> {
        let value = FieldValue::parse_as(ty, text)?;
        Self::new(name, value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn field_type(&self) -> FieldType {
        self.value.field_type()
    }
}

/// Reject null-equivalent field names before any lookup or coercion.
pub fn check_field_name(name: &str) -> C2msResult<()> {
    if name.trim().is_empty() {
        return Err(C2msError::invalid_argument(
            "Field name cannot be NULL, nor an empty string",
        ));
    }
    Ok(())
}
