//! Row-to-record and row-to-dynamic-record plans.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use log::debug;

use super::{Convert, ReadOp};
use crate::cursor::RowCursor;
use crate::error::BindError;
use crate::handler::{registry_effective, SharedHandler};
use crate::meta::{record_info, DynRecord, Record, RecordInfo};
use crate::schema::{DbField, ReaderField};
use crate::value::{conversion_policy, ConversionPolicy, Value, ValueKind};

/// Compiled projection of a row cursor into a populated `T`.
pub struct RowPlan<T: Record> {
    info: Arc<RecordInfo>,
    steps: Vec<BindStep>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> std::fmt::Debug for RowPlan<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowPlan")
            .field("info", &self.info)
            .field("steps", &self.steps)
            .finish()
    }
}

struct BindStep {
    attr: usize,
    ordinal: usize,
    read: ReadOp,
    convert: Option<Convert>,
    null_guard: bool,
    null_value: Value,
    handler: Option<SharedHandler>,
}

impl std::fmt::Debug for BindStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindStep")
            .field("attr", &self.attr)
            .field("ordinal", &self.ordinal)
            .field("read", &self.read)
            .field("convert", &self.convert)
            .field("null_guard", &self.null_guard)
            .field("null_value", &self.null_value)
            .field("handler", &self.handler.as_ref().map(|_| "SharedHandler"))
            .finish()
    }
}

impl<T: Record> RowPlan<T> {
    /// Builds a plan against the cursor's schema, sampling the process-wide
    /// conversion policy.
    pub fn build(cursor: &dyn RowCursor, db_fields: &[DbField]) -> Result<Self, BindError> {
        Self::build_with_policy(cursor, db_fields, conversion_policy())
    }

    pub fn build_with_policy(
        cursor: &dyn RowCursor,
        db_fields: &[DbField],
        policy: ConversionPolicy,
    ) -> Result<Self, BindError> {
        let info = record_info::<T>()?;
        let reader_fields = ReaderField::snapshot(cursor);
        let nullability = nullability_by_name(db_fields);

        let mut steps = Vec::new();
        for attr in info.attributes.iter().filter(|a| a.writable) {
            let Some(field) = reader_fields.iter().find(|f| f.name == attr.lookup_name) else {
                continue;
            };
            let (read, yields) = choose_reader(cursor, policy, field.kind, attr.kind);
            let convert = choose_convert(policy, yields, attr.kind);
            // Columns absent from the field list are treated as nullable.
            let column_nullable = nullability
                .get(field.name.as_str())
                .copied()
                .unwrap_or(true);
            steps.push(BindStep {
                attr: attr.index,
                ordinal: field.ordinal,
                read,
                convert,
                null_guard: column_nullable,
                null_value: if attr.nullable {
                    Value::Null
                } else {
                    Value::default_of(attr.kind)
                },
                handler: registry_effective::<T>(attr.name),
            });
        }
        if steps.is_empty() {
            return Err(BindError::NoMatchedFields {
                type_name: info.type_name,
            });
        }
        debug!(
            "compiled row plan for `{}`: {} of {} columns bound",
            info.type_name,
            steps.len(),
            reader_fields.len()
        );
        Ok(RowPlan {
            info,
            steps,
            _marker: PhantomData,
        })
    }

    /// Projects the cursor's current row into a new record.
    pub fn map_row(&self, cursor: &dyn RowCursor) -> Result<T, BindError> {
        let mut record = T::default();
        for step in &self.steps {
            let value = if step.null_guard && cursor.is_null(step.ordinal) {
                step.null_value.clone()
            } else {
                let raw = step.read.read(cursor, step.ordinal)?;
                let converted = match step.convert {
                    Some(convert) => convert.apply(raw)?,
                    None => raw,
                };
                match &step.handler {
                    Some(handler) => handler.incoming(converted, &self.info.attributes[step.attr]),
                    None => converted,
                }
            };
            record.set(step.attr, value)?;
        }
        Ok(record)
    }

    pub fn bound_columns(&self) -> usize {
        self.steps.len()
    }
}

/// Compiled projection of a row cursor into a [`DynRecord`]; every column
/// becomes a key, casing preserved as returned by the cursor.
#[derive(Debug)]
pub struct DynRowPlan {
    steps: Vec<DynStep>,
}

#[derive(Debug)]
struct DynStep {
    name: String,
    ordinal: usize,
    read: ReadOp,
    null_guard: bool,
}

impl DynRowPlan {
    pub fn build(cursor: &dyn RowCursor, db_fields: &[DbField]) -> Result<Self, BindError> {
        if cursor.field_count() == 0 {
            return Err(BindError::NoMatchedFields {
                type_name: "DynRecord",
            });
        }
        let nullability = nullability_by_name(db_fields);
        let steps = (0..cursor.field_count())
            .map(|ordinal| {
                let kind = cursor.field_kind(ordinal);
                let read = if cursor.supports_typed(kind) {
                    ReadOp::Typed(kind)
                } else {
                    ReadOp::Untyped
                };
                let name = cursor.field_name(ordinal).to_string();
                let column_nullable = nullability
                    .get(name.to_lowercase().as_str())
                    .copied()
                    .unwrap_or(true);
                DynStep {
                    name,
                    ordinal,
                    read,
                    null_guard: column_nullable,
                }
            })
            .collect();
        Ok(DynRowPlan { steps })
    }

    pub fn map_row(&self, cursor: &dyn RowCursor) -> Result<DynRecord, BindError> {
        let mut record = DynRecord::new();
        for step in &self.steps {
            let value = if step.null_guard && cursor.is_null(step.ordinal) {
                Value::Null
            } else {
                step.read.read(cursor, step.ordinal)?
            };
            record.insert(step.name.clone(), value);
        }
        Ok(record)
    }
}

/// Reader accessor choice: prefer the source-typed accessor; under `Strict`
/// fall back to the property-typed accessor when present, except for
/// single-precision float whose type-named accessor is unreliable; otherwise
/// use the untyped accessor, which forces a conversion.
fn choose_reader(
    cursor: &dyn RowCursor,
    policy: ConversionPolicy,
    source: ValueKind,
    target: ValueKind,
) -> (ReadOp, Option<ValueKind>) {
    if cursor.supports_typed(source) {
        (ReadOp::Typed(source), Some(source))
    } else if policy == ConversionPolicy::Strict
        && target != ValueKind::F32
        && cursor.supports_typed(target)
    {
        (ReadOp::Typed(target), Some(target))
    } else {
        (ReadOp::Untyped, None)
    }
}

/// Conversion decision; `yields` is the kind the chosen reader produces, or
/// `None` for the untyped accessor (conversion forced).
fn choose_convert(
    policy: ConversionPolicy,
    yields: Option<ValueKind>,
    target: ValueKind,
) -> Option<Convert> {
    if yields == Some(target) {
        return None;
    }
    let convert = match policy {
        ConversionPolicy::Strict => Convert::Cast(target),
        ConversionPolicy::Automatic => match (yields, target) {
            (Some(ValueKind::String), ValueKind::Guid) => Convert::StringToGuid,
            (Some(ValueKind::Guid), ValueKind::String) => Convert::GuidToString,
            _ => Convert::Coerce(target),
        },
    };
    Some(convert)
}

fn nullability_by_name(db_fields: &[DbField]) -> HashMap<String, bool> {
    db_fields
        .iter()
        .map(|f| (f.lookup_name(), f.nullable))
        .collect()
}
