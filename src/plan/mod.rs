//! Compiled binding plans
//!
//! Plans are the data-driven substitute for reflective per-row binding: a
//! builder inspects metadata once per `(record type, shape)` and produces a
//! small vector of typed steps that the plan replays per row or record.

pub mod cache;
mod params;
mod row;

pub use params::{DynParamPlan, OutParamWriter, ParamPlan, ValueWriter};
pub use row::{DynRowPlan, RowPlan};

use uuid::Uuid;

use crate::cursor::RowCursor;
use crate::error::BindError;
use crate::value::{cast, coerce, Value, ValueKind};

/// How a compiled step reads a column from the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadOp {
    /// A typed accessor the cursor advertised at build time.
    Typed(ValueKind),
    /// The untyped fallback accessor; the yield is known only at runtime.
    Untyped,
}

impl ReadOp {
    pub(crate) fn read(self, cursor: &dyn RowCursor, ordinal: usize) -> Result<Value, BindError> {
        match self {
            ReadOp::Typed(kind) => cursor.get_typed(ordinal, kind).ok_or_else(|| {
                BindError::metadata(format!("cursor offers no `{kind}` accessor"))
            }),
            ReadOp::Untyped => Ok(cursor.get_value(ordinal)),
        }
    }
}

/// Conversion baked into a step at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Convert {
    Cast(ValueKind),
    Coerce(ValueKind),
    StringToGuid,
    GuidToString,
}

impl Convert {
    pub(crate) fn apply(self, value: Value) -> Result<Value, BindError> {
        match self {
            Convert::Cast(kind) => cast(value, kind),
            Convert::Coerce(kind) => coerce(value, kind),
            Convert::StringToGuid => match value {
                Value::Null => Ok(Value::Null),
                Value::String(s) => match Uuid::parse_str(s.trim()) {
                    Ok(g) => Ok(Value::Guid(g)),
                    Err(_) => Err(BindError::conversion(&Value::String(s), ValueKind::Guid)),
                },
                other => Err(BindError::conversion(&other, ValueKind::Guid)),
            },
            Convert::GuidToString => match value {
                Value::Null => Ok(Value::Null),
                Value::Guid(g) => Ok(Value::String(g.to_string())),
                other => Err(BindError::conversion(&other, ValueKind::String)),
            },
        }
    }
}

/// Parameter name for a batch slot: the 0-th slot is unsuffixed, later slots
/// carry `_<slot>` to match the SQL templating.
pub(crate) fn slot_name(base: &str, slot: usize) -> String {
    if slot == 0 {
        base.to_string()
    } else {
        format!("{base}_{slot}")
    }
}
