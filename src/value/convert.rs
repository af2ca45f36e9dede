//! Conversion policy and the strict/automatic value conversions.

use std::sync::atomic::{AtomicU8, Ordering};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{Value, ValueKind};
use crate::error::BindError;

/// Governs how aggressively plan builders insert cross-type conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionPolicy {
    /// Only direct casts; a kind mismatch at invocation time is an error.
    Strict,
    /// Standard widening/narrowing conversions plus `String`↔`Guid`,
    /// `String`↔`DateTime` and boolean↔integer coercions.
    Automatic,
}

static POLICY: AtomicU8 = AtomicU8::new(0);

/// The process-wide conversion policy. Plan builders sample it once at build
/// time; changing it later does not affect plans already compiled.
pub fn conversion_policy() -> ConversionPolicy {
    match POLICY.load(Ordering::Relaxed) {
        0 => ConversionPolicy::Strict,
        _ => ConversionPolicy::Automatic,
    }
}

pub fn set_conversion_policy(policy: ConversionPolicy) {
    let raw = match policy {
        ConversionPolicy::Strict => 0,
        ConversionPolicy::Automatic => 1,
    };
    POLICY.store(raw, Ordering::Relaxed);
}

/// Strict cast: identity on a matching kind, null passes through, anything
/// else fails at invocation time.
pub fn cast(value: Value, target: ValueKind) -> Result<Value, BindError> {
    match value.kind() {
        None => Ok(value),
        Some(kind) if kind == target => Ok(value),
        Some(_) => Err(BindError::conversion(&value, target)),
    }
}

/// Automatic conversion: the standard conversion family, falling back to a
/// direct cast when no conversion path exists for the pair.
pub fn coerce(value: Value, target: ValueKind) -> Result<Value, BindError> {
    if value.is_null() || value.kind() == Some(target) {
        return Ok(value);
    }
    let converted = match target {
        ValueKind::Bool => to_i64(&value).map(|v| Value::Bool(v != 0)),
        ValueKind::I16 => to_i64(&value)
            .and_then(|v| i16::try_from(v).ok())
            .map(Value::I16),
        ValueKind::I32 => to_i64(&value)
            .and_then(|v| i32::try_from(v).ok())
            .map(Value::I32),
        ValueKind::I64 => to_i64(&value).map(Value::I64),
        ValueKind::F32 => to_f64(&value).map(|v| Value::F32(v as f32)),
        ValueKind::F64 => to_f64(&value).map(Value::F64),
        ValueKind::Decimal => to_decimal(&value).map(Value::Decimal),
        ValueKind::String => stringify(&value),
        ValueKind::Guid => match &value {
            Value::String(s) => Uuid::parse_str(s.trim()).ok().map(Value::Guid),
            _ => None,
        },
        ValueKind::Date => match &value {
            Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .ok()
                .map(Value::Date),
            Value::DateTime(dt) => Some(Value::Date(dt.date())),
            _ => None,
        },
        ValueKind::Time => match &value {
            Value::String(s) => NaiveTime::parse_from_str(s.trim(), "%H:%M:%S%.f")
                .ok()
                .map(Value::Time),
            Value::DateTime(dt) => Some(Value::Time(dt.time())),
            _ => None,
        },
        ValueKind::DateTime => match &value {
            Value::String(s) => parse_datetime(s).map(Value::DateTime),
            Value::Date(d) => Some(Value::DateTime(d.and_time(NaiveTime::MIN))),
            _ => None,
        },
        ValueKind::Bytes => None,
    };
    match converted {
        Some(v) => Ok(v),
        None => cast(value, target),
    }
}

fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(v) => Some(*v as i64),
        Value::I16(v) => Some(*v as i64),
        Value::I32(v) => Some(*v as i64),
        Value::I64(v) => Some(*v),
        Value::F32(v) => float_to_i64(*v as f64),
        Value::F64(v) => float_to_i64(*v),
        Value::Decimal(d) => d.round().to_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// Midpoint rounding follows the round-half-to-even convention of the
// standard conversion family.
fn float_to_i64(v: f64) -> Option<i64> {
    let rounded = v.round_ties_even();
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded <= i64::MAX as f64 {
        Some(rounded as i64)
    } else {
        None
    }
}

fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(v) => Some(*v as u8 as f64),
        Value::I16(v) => Some(*v as f64),
        Value::I32(v) => Some(*v as f64),
        Value::I64(v) => Some(*v as f64),
        Value::F32(v) => Some(*v as f64),
        Value::F64(v) => Some(*v),
        Value::Decimal(d) => d.to_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Bool(v) => Some(Decimal::from(*v as u8)),
        Value::I16(v) => Some(Decimal::from(*v)),
        Value::I32(v) => Some(Decimal::from(*v)),
        Value::I64(v) => Some(Decimal::from(*v)),
        Value::F32(v) => Decimal::from_f32(*v),
        Value::F64(v) => Decimal::from_f64(*v),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn stringify(value: &Value) -> Option<Value> {
    let rendered = match value {
        Value::Bool(v) => v.to_string(),
        Value::I16(v) => v.to_string(),
        Value::I32(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::F32(v) => v.to_string(),
        Value::F64(v) => v.to_string(),
        Value::Decimal(d) => d.to_string(),
        Value::Guid(g) => g.to_string(),
        Value::Date(d) => d.to_string(),
        Value::Time(t) => t.to_string(),
        Value::DateTime(dt) => dt.to_string(),
        _ => return None,
    };
    Some(Value::String(rendered))
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}
