//! Record metadata extraction and caching.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use rowbind::{record_info, AttributeDef, BindError, Record, Value, ValueKind};

use crate::common::Person;

#[derive(Debug, Default)]
struct Mapped {
    key: i64,
}

impl Record for Mapped {
    fn table_name() -> &'static str {
        "[dbo].[Mapped]"
    }

    fn attributes() -> &'static [AttributeDef] {
        static ATTRS: &[AttributeDef] = &[
            AttributeDef::new("Key", ValueKind::I64).mapped_to("[CustomerKey]"),
            AttributeDef::new("Hidden", ValueKind::I32).read_only(),
        ];
        ATTRS
    }

    fn get(&self, attr: usize) -> Value {
        match attr {
            0 => Value::I64(self.key),
            _ => Value::Null,
        }
    }

    fn set(&mut self, attr: usize, value: Value) -> Result<(), BindError> {
        if attr == 0 {
            self.key = value.into_i64()?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Duplicated;

impl Record for Duplicated {
    fn table_name() -> &'static str {
        "[dbo].[Duplicated]"
    }

    fn attributes() -> &'static [AttributeDef] {
        static ATTRS: &[AttributeDef] = &[
            AttributeDef::new("Id", ValueKind::I64),
            AttributeDef::new("Other", ValueKind::I64).mapped_to("[id]"),
        ];
        ATTRS
    }

    fn get(&self, _attr: usize) -> Value {
        Value::Null
    }

    fn set(&mut self, _attr: usize, _value: Value) -> Result<(), BindError> {
        Ok(())
    }
}

#[test]
fn test_record_info_is_cached() {
    let first = record_info::<Person>().unwrap();
    let second = record_info::<Person>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_attribute_resolution() {
    let info = record_info::<Person>().unwrap();
    assert_eq!(info.table, "[dbo].[Person]");
    assert_eq!(info.attributes.len(), 3);

    let age = &info.attributes[2];
    assert_eq!(age.name, "Age");
    assert_eq!(age.lookup_name, "age");
    assert!(age.nullable);
    assert!(age.writable);
}

#[test]
fn test_mapped_column_is_unquoted() {
    let info = record_info::<Mapped>().unwrap();
    let key = &info.attributes[0];
    assert_eq!(key.mapped_name, "CustomerKey");
    assert_eq!(key.lookup_name, "customerkey");

    let hidden = &info.attributes[1];
    assert!(!hidden.writable);
    assert!(hidden.readable);
}

#[test]
fn test_duplicate_mapped_name_fails() {
    let err = record_info::<Duplicated>().unwrap_err();
    assert!(matches!(err, BindError::Metadata { .. }));
}

#[test]
fn test_attribute_by_name_is_case_sensitive() {
    let info = record_info::<Person>().unwrap();
    assert!(info.attribute_by_name("Name").is_some());
    assert!(info.attribute_by_name("name").is_none());
}

#[test]
fn test_attribute_by_mapped_name_is_case_insensitive() {
    let info = record_info::<Mapped>().unwrap();
    assert!(info.attribute_by_mapped_name("CUSTOMERKEY").is_some());
    assert!(info.attribute_by_mapped_name("[CustomerKey]").is_some());
    assert!(info.attribute_by_mapped_name("missing").is_none());
}
