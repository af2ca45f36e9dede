//! Field descriptors and the parameter type resolver

mod db_type;

pub use db_type::{resolve_db_type, DbTypeCode};

use crate::cursor::RowCursor;
use crate::util::{lookup_name, unquote_identifier};
use crate::value::ValueKind;

/// Caller-supplied description of a database column.
#[derive(Debug, Clone, PartialEq)]
pub struct DbField {
    /// Column name; any identifier quoting is stripped on access.
    pub name: String,
    pub kind: ValueKind,
    pub nullable: bool,
    pub size: Option<u32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
    /// Vendor type string, e.g. `nvarchar` or `image`.
    pub vendor_type: String,
}

impl DbField {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        DbField {
            name: name.into(),
            kind,
            nullable: false,
            size: None,
            precision: None,
            scale: None,
            vendor_type: String::new(),
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_precision_scale(mut self, precision: u8, scale: u8) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    pub fn with_vendor_type(mut self, vendor_type: impl Into<String>) -> Self {
        self.vendor_type = vendor_type.into();
        self
    }

    /// Name with surrounding identifier quoting stripped.
    pub fn unquoted_name(&self) -> &str {
        unquote_identifier(&self.name)
    }

    /// Unquoted, lowercased name used for attribute matching.
    pub fn lookup_name(&self) -> String {
        lookup_name(&self.name)
    }
}

/// One column of a cursor's schema, snapshotted at plan build time.
#[derive(Debug, Clone)]
pub struct ReaderField {
    pub ordinal: usize,
    /// Lowercased column name.
    pub name: String,
    pub kind: ValueKind,
}

impl ReaderField {
    /// Snapshot the cursor's schema.
    pub fn snapshot(cursor: &dyn RowCursor) -> Vec<ReaderField> {
        (0..cursor.field_count())
            .map(|ordinal| ReaderField {
                ordinal,
                name: cursor.field_name(ordinal).to_lowercase(),
                kind: cursor.field_kind(ordinal),
            })
            .collect()
    }
}
