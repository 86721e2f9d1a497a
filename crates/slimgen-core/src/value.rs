//! Dynamic SQL values.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, TypeError};

const MICROS_PER_SECOND: i64 = 1_000_000;

/// A dynamically-typed SQL value.
///
/// Property values are read out of entities as `Value`s for snapshotting,
/// dirty comparison and parameter binding, and written back from result rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// NULL value
    Null,

    /// Boolean value (BIT)
    Bool(bool),

    /// 8-bit unsigned integer (TINYINT)
    TinyInt(u8),

    /// 16-bit signed integer
    SmallInt(i16),

    /// 32-bit signed integer
    Int(i32),

    /// 64-bit signed integer
    BigInt(i64),

    /// 32-bit floating point
    Float(f32),

    /// 64-bit floating point
    Double(f64),

    /// Exact numeric (DECIMAL), as its canonical text
    Decimal(String),

    /// Text string
    Text(String),

    /// Binary data
    Bytes(Vec<u8>),

    /// UTC date and time (microseconds since epoch)
    DateTime(i64),

    /// Time of day (microseconds since midnight)
    Time(i64),

    /// UUID (as 16 bytes)
    Uuid([u8; 16]),

    /// JSON value
    Json(serde_json::Value),
}

impl Value {
    /// Check if this value is NULL.
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the type name of this value.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BIT",
            Value::TinyInt(_) => "TINYINT",
            Value::SmallInt(_) => "SMALLINT",
            Value::Int(_) => "INT",
            Value::BigInt(_) => "BIGINT",
            Value::Float(_) => "REAL",
            Value::Double(_) => "FLOAT",
            Value::Decimal(_) => "DECIMAL",
            Value::Text(_) => "NVARCHAR",
            Value::Bytes(_) => "BINARY",
            Value::DateTime(_) => "DATETIME",
            Value::Time(_) => "TIME",
            Value::Uuid(_) => "UNIQUEIDENTIFIER",
            Value::Json(_) => "JSON",
        }
    }

    /// Equality for change detection.
    ///
    /// Floats compare by bit pattern, so a NaN equals itself and a property
    /// holding one is not reported as changed after a reset.
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }

    fn mismatch(self, expected: &'static str) -> Error {
        Error::Type(TypeError {
            expected,
            actual: self.type_name().to_string(),
            column: None,
        })
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    u8 => TinyInt,
    i16 => SmallInt,
    i32 => Int,
    i64 => BigInt,
    f32 => Float,
    f64 => Double,
    String => Text,
    Vec<u8> => Bytes,
    serde_json::Value => Json,
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Text(c.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d.to_string())
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(*v.as_bytes())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v.timestamp_micros())
    }
}

/// Naive timestamps are taken to be UTC.
impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v.and_utc().timestamp_micros())
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        let seconds = i64::from(v.num_seconds_from_midnight());
        let micros = i64::from(v.nanosecond() / 1_000);
        Value::Time(seconds * MICROS_PER_SECOND + micros)
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::TinyInt(v) => Ok(v != 0),
            Value::SmallInt(v) => Ok(v != 0),
            Value::Int(v) => Ok(v != 0),
            Value::BigInt(v) => Ok(v != 0),
            other => Err(other.mismatch("BIT")),
        }
    }
}

impl TryFrom<Value> for u8 {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::TinyInt(v) => Ok(v),
            Value::SmallInt(v) => u8::try_from(v).map_err(|_| out_of_range("TINYINT", v)),
            Value::Int(v) => u8::try_from(v).map_err(|_| out_of_range("TINYINT", v)),
            Value::BigInt(v) => u8::try_from(v).map_err(|_| out_of_range("TINYINT", v)),
            other => Err(other.mismatch("TINYINT")),
        }
    }
}

/// Lossless widening only; narrowing reads fail.
macro_rules! widening_try_from {
    ($ty:ty, $sql:literal, [$($variant:ident),+]) => {
        impl TryFrom<Value> for $ty {
            type Error = Error;

            fn try_from(value: Value) -> Result<Self, Self::Error> {
                match value {
                    $(Value::$variant(v) => Ok(<$ty>::from(v)),)+
                    Value::Decimal(s) => parse_decimal_text(&s, $sql),
                    other => Err(other.mismatch($sql)),
                }
            }
        }
    };
}

widening_try_from!(i16, "SMALLINT", [TinyInt, SmallInt]);
widening_try_from!(i32, "INT", [TinyInt, SmallInt, Int]);
widening_try_from!(i64, "BIGINT", [TinyInt, SmallInt, Int, BigInt]);
widening_try_from!(f32, "REAL", [Float, TinyInt, SmallInt]);
widening_try_from!(f64, "FLOAT", [Double, Float, TinyInt, SmallInt, Int]);

impl TryFrom<Value> for Decimal {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Decimal(s) => parse_decimal_text(&s, "DECIMAL"),
            Value::TinyInt(v) => Ok(Decimal::from(v)),
            Value::SmallInt(v) => Ok(Decimal::from(v)),
            Value::Int(v) => Ok(Decimal::from(v)),
            Value::BigInt(v) => Ok(Decimal::from(v)),
            other => Err(other.mismatch("DECIMAL")),
        }
    }
}

impl TryFrom<Value> for char {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Text(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(Error::Type(TypeError {
                        expected: "CHAR(1)",
                        actual: format!("text of length {}", s.chars().count()),
                        column: None,
                    })),
                }
            }
            other => Err(other.mismatch("CHAR(1)")),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(other.mismatch("NVARCHAR")),
        }
    }
}

impl TryFrom<Value> for Vec<u8> {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bytes(b) => Ok(b),
            other => Err(other.mismatch("BINARY")),
        }
    }
}

impl TryFrom<Value> for Uuid {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Uuid(bytes) => Ok(Uuid::from_bytes(bytes)),
            Value::Text(s) => Uuid::parse_str(&s).map_err(|e| {
                Error::Type(TypeError {
                    expected: "UNIQUEIDENTIFIER",
                    actual: format!("unparseable text '{}': {}", s, e),
                    column: None,
                })
            }),
            other => Err(other.mismatch("UNIQUEIDENTIFIER")),
        }
    }
}

impl TryFrom<Value> for DateTime<Utc> {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::DateTime(micros) => DateTime::<Utc>::from_timestamp_micros(micros)
                .ok_or_else(|| out_of_range("DATETIME", micros)),
            other => Err(other.mismatch("DATETIME")),
        }
    }
}

impl TryFrom<Value> for NaiveDateTime {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        DateTime::<Utc>::try_from(value).map(|dt| dt.naive_utc())
    }
}

impl TryFrom<Value> for NaiveTime {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Time(micros) => {
                let seconds = u32::try_from(micros.div_euclid(MICROS_PER_SECOND))
                    .map_err(|_| out_of_range("TIME", micros))?;
                let nanos = u32::try_from(micros.rem_euclid(MICROS_PER_SECOND) * 1_000)
                    .map_err(|_| out_of_range("TIME", micros))?;
                NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos)
                    .ok_or_else(|| out_of_range("TIME", micros))
            }
            other => Err(other.mismatch("TIME")),
        }
    }
}

impl TryFrom<Value> for serde_json::Value {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Json(v) => Ok(v),
            Value::Text(s) => serde_json::from_str(&s).map_err(|e| {
                Error::Type(TypeError {
                    expected: "JSON",
                    actual: format!("invalid JSON text: {}", e),
                    column: None,
                })
            }),
            other => Err(other.mismatch("JSON")),
        }
    }
}

/// `Null` reads as `None`.
impl<T> TryFrom<Value> for Option<T>
where
    T: TryFrom<Value, Error = Error>,
{
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(None),
            v => T::try_from(v).map(Some),
        }
    }
}

/// Decimal text read as another numeric type, e.g. `SCOPE_IDENTITY()` as `i64`.
fn parse_decimal_text<T: FromStr>(s: &str, expected: &'static str) -> Result<T, Error> {
    s.parse().map_err(|_| {
        Error::Type(TypeError {
            expected,
            actual: format!("DECIMAL {}", s),
            column: None,
        })
    })
}

fn out_of_range(expected: &'static str, actual: impl std::fmt::Display) -> Error {
    Error::Type(TypeError {
        expected,
        actual: format!("out-of-range value {}", actual),
        column: None,
    })
}
