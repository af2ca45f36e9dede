//! Row-to-record and row-to-dynamic-record plan behavior.

use std::sync::Arc;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use rowbind::handler::{self, PropertyHandler};
use rowbind::{
    AttributeDef, AttributeInfo, BindError, ConversionPolicy, DbField, DynRowPlan, Record,
    RowCursor, RowPlan, Value, ValueKind,
};

use crate::common::{Birth, Pair, Person, Stranger, TestCursor, HANDLER_LOCK};

#[derive(Debug, Default, Clone, PartialEq)]
struct IdName {
    id: i32,
    name: String,
}

impl Record for IdName {
    fn table_name() -> &'static str {
        "[dbo].[IdName]"
    }

    fn attributes() -> &'static [AttributeDef] {
        static ATTRS: &[AttributeDef] = &[
            AttributeDef::new("Id", ValueKind::I32),
            AttributeDef::new("Name", ValueKind::String),
        ];
        ATTRS
    }

    fn get(&self, attr: usize) -> Value {
        match attr {
            0 => Value::I32(self.id),
            1 => Value::String(self.name.clone()),
            _ => Value::Null,
        }
    }

    fn set(&mut self, attr: usize, value: Value) -> Result<(), BindError> {
        match attr {
            0 => self.id = value.into_i32()?,
            1 => self.name = value.into_string()?,
            _ => {}
        }
        Ok(())
    }
}

#[test]
fn test_unmatched_columns_are_ignored() {
    let cursor = TestCursor::new(&[
        ("Id", ValueKind::I32),
        ("Name", ValueKind::String),
        ("Age", ValueKind::I32),
    ])
    .with_row(vec![Value::I32(7), Value::String("ada".into()), Value::I32(30)]);

    let plan =
        RowPlan::<IdName>::build_with_policy(&cursor, &[], ConversionPolicy::Strict).unwrap();
    let record = plan.map_row(&cursor).unwrap();
    assert_eq!(
        record,
        IdName {
            id: 7,
            name: "ada".into()
        }
    );
    assert_eq!(plan.bound_columns(), 2);
}

#[test]
fn test_no_matching_attribute_fails() {
    let cursor = TestCursor::new(&[("X", ValueKind::I32)]).with_row(vec![Value::I32(1)]);
    let err =
        RowPlan::<Stranger>::build_with_policy(&cursor, &[], ConversionPolicy::Strict).unwrap_err();
    assert!(matches!(err, BindError::NoMatchedFields { .. }));
}

#[test]
fn test_null_column_yields_empty_nullable_without_conversion() {
    // DOB arrives as a nullable string column; a conversion to datetime
    // would fail under the strict policy, proving the null path skips it.
    let cursor = TestCursor::new(&[("DOB", ValueKind::String)]).with_row(vec![Value::Null]);
    let fields = [DbField::new("DOB", ValueKind::String).nullable()];

    let plan =
        RowPlan::<Birth>::build_with_policy(&cursor, &fields, ConversionPolicy::Strict).unwrap();
    let record = plan.map_row(&cursor).unwrap();
    assert_eq!(record, Birth { dob: None });
}

#[test]
fn test_null_column_yields_default_for_non_nullable_attribute() {
    let cursor = TestCursor::new(&[("A", ValueKind::I32)]).with_row(vec![Value::Null]);
    let fields = [DbField::new("A", ValueKind::I32).nullable()];

    let plan =
        RowPlan::<Pair>::build_with_policy(&cursor, &fields, ConversionPolicy::Strict).unwrap();
    let record = plan.map_row(&cursor).unwrap();
    assert_eq!(record.a, 0);
}

#[test]
fn test_missing_field_metadata_defaults_to_nullable() {
    // No DbField entry for the column at all; a null cell must still guard.
    let cursor = TestCursor::new(&[("Age", ValueKind::I32)]).with_row(vec![Value::Null]);
    let plan =
        RowPlan::<Person>::build_with_policy(&cursor, &[], ConversionPolicy::Strict).unwrap();
    let record = plan.map_row(&cursor).unwrap();
    assert_eq!(record.age, None);
}

#[test]
fn test_untyped_fallback_coerces_under_automatic() {
    let cursor = TestCursor::new(&[("A", ValueKind::I64)])
        .with_row(vec![Value::I64(9)])
        .untyped();

    let plan =
        RowPlan::<Pair>::build_with_policy(&cursor, &[], ConversionPolicy::Automatic).unwrap();
    let record = plan.map_row(&cursor).unwrap();
    assert_eq!(record.a, 9);
}

#[test]
fn test_untyped_fallback_casts_under_strict() {
    let cursor = TestCursor::new(&[("A", ValueKind::I64)])
        .with_row(vec![Value::I64(9)])
        .untyped();

    let plan = RowPlan::<Pair>::build_with_policy(&cursor, &[], ConversionPolicy::Strict).unwrap();
    let err = plan.map_row(&cursor).unwrap_err();
    assert!(matches!(err, BindError::Conversion { .. }));
}

#[test]
fn test_property_typed_accessor_under_strict() {
    // The driver has no i32 accessor but offers an i64 one matching the
    // attribute type; the strict policy falls through to it.
    let cursor = TestCursor::new(&[("Id", ValueKind::I32)])
        .with_row(vec![Value::I64(7)])
        .with_typed_kinds(&[ValueKind::I64]);

    let plan =
        RowPlan::<Person>::build_with_policy(&cursor, &[], ConversionPolicy::Strict).unwrap();
    let record = plan.map_row(&cursor).unwrap();
    assert_eq!(record.id, 7);
}

struct NoFloatAccessorCursor;

impl RowCursor for NoFloatAccessorCursor {
    fn field_count(&self) -> usize {
        1
    }

    fn field_name(&self, _ordinal: usize) -> &str {
        "Ratio"
    }

    fn field_kind(&self, _ordinal: usize) -> ValueKind {
        ValueKind::F64
    }

    fn is_null(&self, _ordinal: usize) -> bool {
        false
    }

    fn supports_typed(&self, kind: ValueKind) -> bool {
        kind == ValueKind::F32
    }

    fn get_typed(&self, _ordinal: usize, _kind: ValueKind) -> Option<Value> {
        panic!("the single-precision typed accessor must not be used");
    }

    fn get_value(&self, _ordinal: usize) -> Value {
        Value::F64(2.5)
    }
}

#[derive(Debug, Default)]
struct Ratio {
    ratio: f32,
}

impl Record for Ratio {
    fn table_name() -> &'static str {
        "[dbo].[Ratio]"
    }

    fn attributes() -> &'static [AttributeDef] {
        static ATTRS: &[AttributeDef] = &[AttributeDef::new("Ratio", ValueKind::F32)];
        ATTRS
    }

    fn get(&self, attr: usize) -> Value {
        match attr {
            0 => Value::F32(self.ratio),
            _ => Value::Null,
        }
    }

    fn set(&mut self, attr: usize, value: Value) -> Result<(), BindError> {
        if attr == 0 {
            self.ratio = value.into_f32()?;
        }
        Ok(())
    }
}

#[test]
fn test_single_precision_accessor_is_distrusted_under_strict() {
    let cursor = NoFloatAccessorCursor;
    let plan = RowPlan::<Ratio>::build_with_policy(&cursor, &[], ConversionPolicy::Strict).unwrap();
    // The untyped fallback yields an f64 the strict cast rejects; reaching
    // the typed accessor would have panicked instead.
    let err = plan.map_row(&cursor).unwrap_err();
    assert!(matches!(err, BindError::Conversion { .. }));
}

#[test]
fn test_rebuilding_yields_equivalent_plan() {
    let cursor = TestCursor::new(&[("Id", ValueKind::I64), ("Name", ValueKind::String)])
        .with_row(vec![Value::I64(3), Value::String("b".into())]);

    let first =
        RowPlan::<Person>::build_with_policy(&cursor, &[], ConversionPolicy::Strict).unwrap();
    let second =
        RowPlan::<Person>::build_with_policy(&cursor, &[], ConversionPolicy::Strict).unwrap();
    assert_eq!(
        first.map_row(&cursor).unwrap(),
        second.map_row(&cursor).unwrap()
    );
}

struct Uppercase;

impl PropertyHandler for Uppercase {
    fn incoming(&self, value: Value, _attribute: &AttributeInfo) -> Value {
        match value {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other,
        }
    }

    fn outgoing(&self, value: Value, _attribute: &AttributeInfo) -> Value {
        value
    }
}

#[test]
fn test_plans_keep_the_handler_snapshot() {
    let _guard = HANDLER_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    handler::remove_attribute::<Person>("Name");

    let cursor = TestCursor::new(&[("Name", ValueKind::String)])
        .with_row(vec![Value::String("ada".into())]);

    handler::register_attribute::<Person>("Name", Arc::new(Uppercase), false).unwrap();
    let with_handler =
        RowPlan::<Person>::build_with_policy(&cursor, &[], ConversionPolicy::Strict).unwrap();
    handler::remove_attribute::<Person>("Name");
    let without_handler =
        RowPlan::<Person>::build_with_policy(&cursor, &[], ConversionPolicy::Strict).unwrap();

    // The earlier plan keeps the handler it captured at build time.
    assert_eq!(with_handler.map_row(&cursor).unwrap().name, "ADA");
    assert_eq!(without_handler.map_row(&cursor).unwrap().name, "ada");
}

#[test]
fn test_dyn_plan_preserves_column_casing_and_order() {
    let cursor = TestCursor::new(&[
        ("CustomerId", ValueKind::I64),
        ("FullName", ValueKind::String),
    ])
    .with_row(vec![Value::I64(1), Value::String("ada".into())]);

    let plan = DynRowPlan::build(&cursor, &[]).unwrap();
    let record = plan.map_row(&cursor).unwrap();
    let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["CustomerId", "FullName"]);
    assert_eq!(record.get("CustomerId"), Some(&Value::I64(1)));
}

#[test]
fn test_dyn_plan_null_handling() {
    let cursor = TestCursor::new(&[("When", ValueKind::Date)]).with_row(vec![Value::Null]);
    let plan = DynRowPlan::build(&cursor, &[]).unwrap();
    let record = plan.map_row(&cursor).unwrap();
    assert_eq!(record.get("When"), Some(&Value::Null));
}

#[test]
fn test_dyn_plan_requires_columns() {
    let cursor = TestCursor::new(&[]);
    let err = DynRowPlan::build(&cursor, &[]).unwrap_err();
    assert!(matches!(err, BindError::NoMatchedFields { .. }));
}

#[test]
fn test_dyn_plan_reads_dates() {
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let cursor = TestCursor::new(&[("When", ValueKind::Date)]).with_row(vec![Value::Date(date)]);
    let plan = DynRowPlan::build(&cursor, &[]).unwrap();
    let record = plan.map_row(&cursor).unwrap();
    assert_eq!(record.get("When"), Some(&Value::Date(date)));
}
