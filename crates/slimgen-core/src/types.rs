//! Value types and their SQL Server type mapping.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{Error, ShapeError, ShapeErrorKind};

/// The declared Rust value type of an entity property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    U8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Decimal,
    Char,
    String,
    Bytes,
    DateTime,
    Time,
    Uuid,
    Json,
    /// Any other type, by name. Never mapped to a SQL type.
    Other(&'static str),
}

impl ValueType {
    /// Types an `Id` property may have to be picked up as an implicit key.
    pub const fn is_key_type(self) -> bool {
        matches!(self, ValueType::I32 | ValueType::I64 | ValueType::Uuid)
    }

    /// Human-readable name used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::U8 => "u8",
            ValueType::I16 => "i16",
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::F32 => "f32",
            ValueType::F64 => "f64",
            ValueType::Decimal => "Decimal",
            ValueType::Char => "char",
            ValueType::String => "String",
            ValueType::Bytes => "Vec<u8>",
            ValueType::DateTime => "DateTime",
            ValueType::Time => "NaiveTime",
            ValueType::Uuid => "Uuid",
            ValueType::Json => "serde_json::Value",
            ValueType::Other(name) => name,
        }
    }
}

/// SQL Server data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Bit,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Real,
    Float,
    Decimal,
    NVarChar,
    Char,
    Binary,
    DateTime,
    Time,
    UniqueIdentifier,
}

impl SqlType {
    /// Look up the SQL Server type for a declared value type.
    ///
    /// Nullability does not change the mapping.
    pub fn for_value_type(value_type: ValueType) -> Option<SqlType> {
        let sql_type = match value_type {
            ValueType::Bool => SqlType::Bit,
            ValueType::U8 => SqlType::TinyInt,
            ValueType::I16 => SqlType::SmallInt,
            ValueType::I32 => SqlType::Int,
            ValueType::I64 => SqlType::BigInt,
            ValueType::F32 => SqlType::Real,
            ValueType::F64 => SqlType::Float,
            ValueType::Decimal => SqlType::Decimal,
            ValueType::Char => SqlType::Char,
            ValueType::String => SqlType::NVarChar,
            ValueType::Bytes => SqlType::Binary,
            ValueType::DateTime => SqlType::DateTime,
            ValueType::Time => SqlType::Time,
            ValueType::Uuid => SqlType::UniqueIdentifier,
            ValueType::Json | ValueType::Other(_) => return None,
        };
        Some(sql_type)
    }

    /// Like [`SqlType::for_value_type`], failing with `UnmappableType`.
    pub fn resolve(entity: &'static str, value_type: ValueType) -> Result<SqlType, Error> {
        Self::for_value_type(value_type).ok_or_else(|| {
            ShapeError::new(
                ShapeErrorKind::UnmappableType,
                entity,
                format!(
                    "Cannot convert a {} to a SQL data type",
                    value_type.name()
                ),
            )
            .into()
        })
    }

    /// Get the SQL type name for this type.
    pub const fn sql_name(self) -> &'static str {
        match self {
            SqlType::Bit => "BIT",
            SqlType::TinyInt => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Int => "INT",
            SqlType::BigInt => "BIGINT",
            SqlType::Real => "REAL",
            SqlType::Float => "FLOAT",
            SqlType::Decimal => "DECIMAL",
            SqlType::NVarChar => "NVARCHAR",
            SqlType::Char => "CHAR",
            SqlType::Binary => "BINARY",
            SqlType::DateTime => "DATETIME",
            SqlType::Time => "TIME",
            SqlType::UniqueIdentifier => "UNIQUEIDENTIFIER",
        }
    }

    /// Check if this type is text-based.
    pub const fn is_text(self) -> bool {
        matches!(self, SqlType::NVarChar)
    }
}

/// Trait for types that have a declared value type.
pub trait TypeInfo {
    /// The value type for this Rust type.
    const VALUE_TYPE: ValueType;

    /// Whether this type is nullable by default.
    const NULLABLE: bool = false;
}

impl TypeInfo for bool {
    const VALUE_TYPE: ValueType = ValueType::Bool;
}

impl TypeInfo for u8 {
    const VALUE_TYPE: ValueType = ValueType::U8;
}

impl TypeInfo for i16 {
    const VALUE_TYPE: ValueType = ValueType::I16;
}

impl TypeInfo for i32 {
    const VALUE_TYPE: ValueType = ValueType::I32;
}

impl TypeInfo for i64 {
    const VALUE_TYPE: ValueType = ValueType::I64;
}

impl TypeInfo for f32 {
    const VALUE_TYPE: ValueType = ValueType::F32;
}

impl TypeInfo for f64 {
    const VALUE_TYPE: ValueType = ValueType::F64;
}

impl TypeInfo for char {
    const VALUE_TYPE: ValueType = ValueType::Char;
}

impl TypeInfo for String {
    const VALUE_TYPE: ValueType = ValueType::String;
}

impl TypeInfo for &str {
    const VALUE_TYPE: ValueType = ValueType::String;
}

impl TypeInfo for Vec<u8> {
    const VALUE_TYPE: ValueType = ValueType::Bytes;
}

impl TypeInfo for Uuid {
    const VALUE_TYPE: ValueType = ValueType::Uuid;
}

impl TypeInfo for DateTime<Utc> {
    const VALUE_TYPE: ValueType = ValueType::DateTime;
}

impl TypeInfo for NaiveDateTime {
    const VALUE_TYPE: ValueType = ValueType::DateTime;
}

impl TypeInfo for NaiveTime {
    const VALUE_TYPE: ValueType = ValueType::Time;
}

impl TypeInfo for Decimal {
    const VALUE_TYPE: ValueType = ValueType::Decimal;
}

impl TypeInfo for serde_json::Value {
    const VALUE_TYPE: ValueType = ValueType::Json;
}

impl<T: TypeInfo> TypeInfo for Option<T> {
    const VALUE_TYPE: ValueType = T::VALUE_TYPE;
    const NULLABLE: bool = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_types() {
        assert_eq!(SqlType::for_value_type(ValueType::I32), Some(SqlType::Int));
        assert_eq!(
            SqlType::for_value_type(ValueType::Uuid),
            Some(SqlType::UniqueIdentifier)
        );
        assert_eq!(
            SqlType::for_value_type(<Option<String> as TypeInfo>::VALUE_TYPE),
            Some(SqlType::NVarChar)
        );
        assert!(<Option<String> as TypeInfo>::NULLABLE);
    }

    #[test]
    fn decimal_maps_to_decimal() {
        assert_eq!(
            SqlType::for_value_type(<Decimal as TypeInfo>::VALUE_TYPE),
            Some(SqlType::Decimal)
        );
        assert_eq!(SqlType::Decimal.sql_name(), "DECIMAL");
        assert!(!SqlType::Decimal.is_text());
    }

    #[test]
    fn unmapped_types_fail_with_unmappable_type() {
        let err = SqlType::resolve("Doc", ValueType::Json).unwrap_err();
        assert_eq!(err.shape_kind(), Some(ShapeErrorKind::UnmappableType));

        let err = SqlType::resolve("Doc", ValueType::Other("Money")).unwrap_err();
        assert!(err.to_string().contains("Cannot convert a Money"));
    }

    #[test]
    fn only_integers_and_uuid_are_key_types() {
        assert!(ValueType::I32.is_key_type());
        assert!(ValueType::I64.is_key_type());
        assert!(ValueType::Uuid.is_key_type());
        assert!(!ValueType::I16.is_key_type());
        assert!(!ValueType::String.is_key_type());
    }
}
