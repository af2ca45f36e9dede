//! Dynamic value model shared by cursors, parameters and record attributes.

mod convert;

pub use convert::{cast, coerce, conversion_policy, set_conversion_policy, ConversionPolicy};

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::BindError;

/// A database value in transit between a cursor, a parameter and a record
/// attribute. `Null` doubles as the database-null sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Guid(Uuid),
}

/// Discriminant-only form of [`Value`], used in metadata and compiled plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    I16,
    I32,
    I64,
    F32,
    F64,
    Decimal,
    String,
    Bytes,
    Date,
    Time,
    DateTime,
    Guid,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::I16 => "i16",
            ValueKind::I32 => "i32",
            ValueKind::I64 => "i64",
            ValueKind::F32 => "f32",
            ValueKind::F64 => "f64",
            ValueKind::Decimal => "decimal",
            ValueKind::String => "string",
            ValueKind::Bytes => "bytes",
            ValueKind::Date => "date",
            ValueKind::Time => "time",
            ValueKind::DateTime => "datetime",
            ValueKind::Guid => "guid",
        };
        f.write_str(name)
    }
}

macro_rules! value_extractor {
    ($fn_name:ident, $variant:ident, $ty:ty, $kind:expr) => {
        /// Consumes the value, returning the inner payload or a conversion
        /// error when the kind does not match.
        pub fn $fn_name(self) -> Result<$ty, BindError> {
            match self {
                Value::$variant(v) => Ok(v),
                other => Err(BindError::conversion(&other, $kind)),
            }
        }
    };
}

impl Value {
    /// The kind of this value; `Null` carries none.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::I16(_) => Some(ValueKind::I16),
            Value::I32(_) => Some(ValueKind::I32),
            Value::I64(_) => Some(ValueKind::I64),
            Value::F32(_) => Some(ValueKind::F32),
            Value::F64(_) => Some(ValueKind::F64),
            Value::Decimal(_) => Some(ValueKind::Decimal),
            Value::String(_) => Some(ValueKind::String),
            Value::Bytes(_) => Some(ValueKind::Bytes),
            Value::Date(_) => Some(ValueKind::Date),
            Value::Time(_) => Some(ValueKind::Time),
            Value::DateTime(_) => Some(ValueKind::DateTime),
            Value::Guid(_) => Some(ValueKind::Guid),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The zero/default value for a kind, assigned when a non-nullable
    /// attribute reads a null column.
    pub fn default_of(kind: ValueKind) -> Value {
        match kind {
            ValueKind::Bool => Value::Bool(false),
            ValueKind::I16 => Value::I16(0),
            ValueKind::I32 => Value::I32(0),
            ValueKind::I64 => Value::I64(0),
            ValueKind::F32 => Value::F32(0.0),
            ValueKind::F64 => Value::F64(0.0),
            ValueKind::Decimal => Value::Decimal(Decimal::ZERO),
            ValueKind::String => Value::String(String::new()),
            ValueKind::Bytes => Value::Bytes(Vec::new()),
            ValueKind::Date => Value::Date(NaiveDate::default()),
            ValueKind::Time => Value::Time(NaiveTime::default()),
            ValueKind::DateTime => Value::DateTime(NaiveDateTime::default()),
            ValueKind::Guid => Value::Guid(Uuid::nil()),
        }
    }

    value_extractor!(into_bool, Bool, bool, ValueKind::Bool);
    value_extractor!(into_i16, I16, i16, ValueKind::I16);
    value_extractor!(into_i32, I32, i32, ValueKind::I32);
    value_extractor!(into_i64, I64, i64, ValueKind::I64);
    value_extractor!(into_f32, F32, f32, ValueKind::F32);
    value_extractor!(into_f64, F64, f64, ValueKind::F64);
    value_extractor!(into_decimal, Decimal, Decimal, ValueKind::Decimal);
    value_extractor!(into_string, String, String, ValueKind::String);
    value_extractor!(into_bytes, Bytes, Vec<u8>, ValueKind::Bytes);
    value_extractor!(into_date, Date, NaiveDate, ValueKind::Date);
    value_extractor!(into_time, Time, NaiveTime, ValueKind::Time);
    value_extractor!(into_datetime, DateTime, NaiveDateTime, ValueKind::DateTime);
    value_extractor!(into_guid, Guid, Uuid, ValueKind::Guid);
}
