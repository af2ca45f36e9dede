//! Row cursor interface consumed by plan builders and compiled plans.

use crate::value::{Value, ValueKind};

/// A forward-only view over the current row of a result set.
///
/// Plan builders consult [`supports_typed`](RowCursor::supports_typed) once
/// at build time to discover which typed accessors the driver offers; the
/// compiled plan then calls either [`get_typed`](RowCursor::get_typed) or the
/// untyped [`get_value`](RowCursor::get_value) per row. Implementations that
/// advertise a kind must return `Some` from `get_typed` for non-null cells of
/// that kind.
pub trait RowCursor {
    fn field_count(&self) -> usize;

    /// Column name as returned by the driver, casing preserved.
    fn field_name(&self, ordinal: usize) -> &str;

    /// Source value kind of the column.
    fn field_kind(&self, ordinal: usize) -> ValueKind;

    fn is_null(&self, ordinal: usize) -> bool;

    /// Whether a typed accessor exists for `kind`.
    fn supports_typed(&self, _kind: ValueKind) -> bool {
        false
    }

    /// Typed accessor family; `None` when the driver has no accessor for
    /// `kind`.
    fn get_typed(&self, _ordinal: usize, _kind: ValueKind) -> Option<Value> {
        None
    }

    /// Untyped fallback accessor.
    fn get_value(&self, ordinal: usize) -> Value;
}
