//! Dynamic engine values and type-directed conversion.
//!
//! The embedded engine stores every column value in one of five storage
//! classes. [`Value`] is the owned, engine-agnostic form of such a value;
//! [`FromValue`] converts it back into a typed Rust value when rows are
//! materialized, and `Into<Value>` converts typed values into bindable
//! parameters.

use std::fmt;

use uuid::Uuid;

// =============================================================================
// Storage classes
// =============================================================================

/// One of the engine's dynamic column value categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    Integer,
    Real,
    Text,
    Blob,
    Null,
}

impl StorageClass {
    /// The SQL type name used in DDL for columns of this class.
    pub fn sql_type(&self) -> &'static str {
        match self {
            StorageClass::Integer => "INTEGER",
            StorageClass::Real => "REAL",
            StorageClass::Text => "TEXT",
            StorageClass::Blob => "BLOB",
            StorageClass::Null => "NULL",
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}

// =============================================================================
// Value
// =============================================================================

/// An owned dynamic value, one variant per storage class.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn storage_class(&self) -> StorageClass {
        match self {
            Value::Null => StorageClass::Null,
            Value::Integer(_) => StorageClass::Integer,
            Value::Real(_) => StorageClass::Real,
            Value::Text(_) => StorageClass::Text,
            Value::Blob(_) => StorageClass::Blob,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// =============================================================================
// Conversion errors
// =============================================================================

/// Errors raised while converting a stored value to a typed one.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("cannot convert {found} value to {target}")]
    Mismatch {
        found: &'static str,
        target: &'static str,
    },

    #[error("integer {0} out of range for {1}")]
    OutOfRange(i64, &'static str),

    #[error("enum discriminant {0} has no matching variant")]
    EnumOutOfRange(i64),

    #[error("invalid UUID text: {0}")]
    BadUuid(String),

    #[error("unparseable timestamp text: {0}")]
    BadTimestamp(String),
}

fn mismatch(found: &Value, target: &'static str) -> ConvertError {
    ConvertError::Mismatch {
        found: found.storage_class().sql_type(),
        target,
    }
}

// =============================================================================
// FromValue
// =============================================================================

/// Conversion from a stored [`Value`] into a typed Rust value.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ConvertError>;
}

macro_rules! integral_from_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl FromValue for $t {
                fn from_value(value: &Value) -> Result<Self, ConvertError> {
                    match value {
                        Value::Integer(i) => <$t>::try_from(*i)
                            .map_err(|_| ConvertError::OutOfRange(*i, stringify!($t))),
                        other => Err(mismatch(other, stringify!($t))),
                    }
                }
            }
        )*
    };
}

integral_from_value!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        match value {
            Value::Integer(i) => Ok(*i != 0),
            other => Err(mismatch(other, "bool")),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        match value {
            Value::Real(f) => Ok(*f),
            Value::Integer(i) => Ok(*i as f64),
            other => Err(mismatch(other, "f64")),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            other => Err(mismatch(other, "String")),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        match value {
            Value::Blob(b) => Ok(b.clone()),
            other => Err(mismatch(other, "Vec<u8>")),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        match value {
            Value::Text(s) => Uuid::parse_str(s).map_err(|_| ConvertError::BadUuid(s.clone())),
            Value::Blob(b) => Uuid::from_slice(b)
                .map_err(|_| ConvertError::BadUuid(format!("{}-byte blob", b.len()))),
            other => Err(mismatch(other, "Uuid")),
        }
    }
}

/// `NULL` maps to `None`; an out-of-range enum discriminant also maps to
/// `None` rather than raising a conversion error.
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Ok(None),
            other => match T::from_value(other) {
                Ok(v) => Ok(Some(v)),
                Err(ConvertError::EnumOutOfRange(_)) => Ok(None),
                Err(e) => Err(e),
            },
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        Ok(value.clone())
    }
}

// =============================================================================
// Into<Value>
// =============================================================================

macro_rules! integral_into_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Integer(v as i64)
                }
            }
        )*
    };
}

integral_into_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Blob(v.to_vec())
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Text(v.hyphenated().to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

// =============================================================================
// Timestamp
// =============================================================================

const SECS_PER_DAY: i64 = 86_400;

/// A point in time, stored as whole seconds since the Unix epoch.
///
/// The text form is the fixed `YYYY-MM-DD HH:MM:SS` layout understood by the
/// engine's datetime functions, so temporal arithmetic in compiled SQL
/// composes with stored values. Reads accept either integer ticks or text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn to_text(self) -> String {
        let days = self.0.div_euclid(SECS_PER_DAY);
        let sod = self.0.rem_euclid(SECS_PER_DAY);
        let (y, m, d) = civil_from_days(days);
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            y,
            m,
            d,
            sod / 3600,
            (sod % 3600) / 60,
            sod % 60
        )
    }

    /// Parse the fixed `YYYY-MM-DD HH:MM:SS` layout (a `T` separator and a
    /// trailing fractional part are tolerated, the fraction is discarded).
    pub fn parse_text(s: &str) -> Option<Timestamp> {
        let b = s.as_bytes();
        if b.len() < 19 {
            return None;
        }
        let digits = |range: std::ops::Range<usize>| -> Option<i64> {
            let mut n = 0i64;
            for &c in &b[range] {
                if !c.is_ascii_digit() {
                    return None;
                }
                n = n * 10 + (c - b'0') as i64;
            }
            Some(n)
        };
        if b[4] != b'-' || b[7] != b'-' || (b[10] != b' ' && b[10] != b'T') {
            return None;
        }
        if b[13] != b':' || b[16] != b':' {
            return None;
        }
        let (y, m, d) = (digits(0..4)?, digits(5..7)?, digits(8..10)?);
        let (hh, mm, ss) = (digits(11..13)?, digits(14..16)?, digits(17..19)?);
        if !(1..=12).contains(&m) || !(1..=31).contains(&d) || hh > 23 || mm > 59 || ss > 59 {
            return None;
        }
        let days = days_from_civil(y, m, d);
        Some(Timestamp(days * SECS_PER_DAY + hh * 3600 + mm * 60 + ss))
    }
}

impl FromValue for Timestamp {
    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        match value {
            Value::Integer(i) => Ok(Timestamp(*i)),
            Value::Text(s) => {
                Timestamp::parse_text(s).ok_or_else(|| ConvertError::BadTimestamp(s.clone()))
            }
            other => Err(mismatch(other, "Timestamp")),
        }
    }
}

impl From<Timestamp> for Value {
    fn from(v: Timestamp) -> Self {
        Value::Text(v.to_text())
    }
}

// Days-to-date conversions on the proleptic Gregorian calendar.

fn civil_from_days(z: i64) -> (i64, i64, i64) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    (if m <= 2 { y + 1 } else { y }, m, d)
}

fn days_from_civil(y: i64, m: i64, d: i64) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = if m > 2 { m - 3 } else { m + 9 };
    let doy = (153 * mp + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

// =============================================================================
// Enum conversion helper
// =============================================================================

/// Implements [`FromValue`] and `Into<Value>` for a fieldless enum stored as
/// an integer discriminant.
///
/// An out-of-range stored discriminant raises
/// [`ConvertError::EnumOutOfRange`], which the `Option<T>` conversion maps to
/// `None` instead of an error.
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Genre { Fiction, Poetry }
///
/// quarry::impl_enum_value!(Genre { Fiction = 0, Poetry = 1 });
/// ```
#[macro_export]
macro_rules! impl_enum_value {
    ($ty:ty { $($variant:ident = $disc:literal),+ $(,)? }) => {
        impl $crate::value::FromValue for $ty {
            fn from_value(
                value: &$crate::value::Value,
            ) -> Result<Self, $crate::value::ConvertError> {
                match value {
                    $crate::value::Value::Integer(i) => match *i {
                        $($disc => Ok(<$ty>::$variant),)+
                        other => Err($crate::value::ConvertError::EnumOutOfRange(other)),
                    },
                    other => Err($crate::value::ConvertError::Mismatch {
                        found: other.storage_class().sql_type(),
                        target: stringify!($ty),
                    }),
                }
            }
        }

        impl From<$ty> for $crate::value::Value {
            fn from(v: $ty) -> Self {
                $crate::value::Value::Integer(match v {
                    $(<$ty>::$variant => $disc,)+
                })
            }
        }
    };
}
