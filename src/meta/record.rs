//! The record trait and its resolved metadata.

use std::any::TypeId;

use crate::error::BindError;
use crate::schema::DbTypeCode;
use crate::util::{lookup_name, unquote_identifier};
use crate::value::{Value, ValueKind};

/// A user record type that maps to a table row.
///
/// Implementations declare their attributes once in a static slice and move
/// values in and out through indexed [`get`](Record::get)/[`set`](Record::set),
/// the stand-in for reflected property access. `set` performs the final typed
/// assignment; a kind mismatch surfaces as the conversion error of the
/// underlying cast. For `Option<_>` attributes, `set` receives `Value::Null`
/// for the empty case and the inner value otherwise.
pub trait Record: Default + 'static {
    /// Mapped table name, quoting preserved as declared.
    fn table_name() -> &'static str;

    /// Declared attributes, in a stable order. Indices into this slice are
    /// the attribute indices used by `get`/`set`.
    fn attributes() -> &'static [AttributeDef];

    fn get(&self, attr: usize) -> Value;

    fn set(&mut self, attr: usize, value: Value) -> Result<(), BindError>;
}

/// Declared facts about one attribute of a record type.
#[derive(Debug, Clone, Copy)]
pub struct AttributeDef {
    pub name: &'static str,
    /// Column name override; may carry SQL identifier quoting.
    pub column: Option<&'static str>,
    /// Underlying value kind (the inner kind for `Option<_>` attributes).
    pub kind: ValueKind,
    /// Whether the attribute is `Option<_>`.
    pub nullable: bool,
    pub readable: bool,
    pub writable: bool,
    /// Per-attribute parameter type override.
    pub db_type: Option<DbTypeCode>,
}

impl AttributeDef {
    pub const fn new(name: &'static str, kind: ValueKind) -> Self {
        AttributeDef {
            name,
            column: None,
            kind,
            nullable: false,
            readable: true,
            writable: true,
            db_type: None,
        }
    }

    pub const fn mapped_to(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    pub const fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }

    pub const fn with_db_type(mut self, db_type: DbTypeCode) -> Self {
        self.db_type = Some(db_type);
        self
    }
}

/// Resolved form of an [`AttributeDef`], owned by a [`RecordInfo`].
#[derive(Debug, Clone)]
pub struct AttributeInfo {
    pub index: usize,
    /// Canonical attribute name.
    pub name: &'static str,
    /// Mapped column name, identifier quoting stripped.
    pub mapped_name: String,
    /// Lowercased `mapped_name`, used for column matching.
    pub lookup_name: String,
    pub kind: ValueKind,
    pub nullable: bool,
    pub readable: bool,
    pub writable: bool,
    pub db_type: Option<DbTypeCode>,
}

/// Canonical metadata about a record type; built once per type and shared
/// process-wide.
#[derive(Debug)]
pub struct RecordInfo {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub table: &'static str,
    pub attributes: Vec<AttributeInfo>,
}

impl RecordInfo {
    pub(crate) fn build<T: Record>() -> Result<RecordInfo, BindError> {
        let type_name = std::any::type_name::<T>();
        let mut attributes: Vec<AttributeInfo> = Vec::with_capacity(T::attributes().len());
        for (index, def) in T::attributes().iter().enumerate() {
            let mapped = def.column.unwrap_or(def.name);
            let info = AttributeInfo {
                index,
                name: def.name,
                mapped_name: unquote_identifier(mapped).to_string(),
                lookup_name: lookup_name(mapped),
                kind: def.kind,
                nullable: def.nullable,
                readable: def.readable,
                writable: def.writable,
                db_type: def.db_type,
            };
            if attributes.iter().any(|a| a.lookup_name == info.lookup_name) {
                return Err(BindError::metadata(format!(
                    "two attributes of `{}` map to the column `{}`",
                    type_name, info.mapped_name
                )));
            }
            attributes.push(info);
        }
        Ok(RecordInfo {
            type_id: TypeId::of::<T>(),
            type_name,
            table: T::table_name(),
            attributes,
        })
    }

    /// Case-sensitive lookup by canonical attribute name.
    pub fn attribute_by_name(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Case-insensitive lookup by mapped column name; `name` may be quoted.
    pub fn attribute_by_mapped_name(&self, name: &str) -> Option<&AttributeInfo> {
        let key = lookup_name(name);
        self.attributes.iter().find(|a| a.lookup_name == key)
    }
}
