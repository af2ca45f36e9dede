//! rowbind: precompiled row and parameter binding for tabular databases
//!
//! Given a record type and a set of database fields, rowbind compiles a
//! binding plan once per `(record type, shape)` and executes it per row or
//! record with no further metadata work: a [`RowPlan`] projects a cursor row
//! into a populated record, a [`ParamPlan`] fills a command's parameter
//! collection from a record or an ordered batch, and [`OutParamWriter`] /
//! [`ValueWriter`] move single values between parameters and attributes.
//!
//! Record types participate through the [`Record`] trait; drivers plug in
//! through [`cursor::RowCursor`] and [`command::Command`]. User conversions
//! attach via the [`handler`] registry, and the process-wide
//! [`ConversionPolicy`] selects strict or automatic cross-type conversion.

pub mod command;
pub mod cursor;
pub mod error;
pub mod handler;
pub mod meta;
pub mod plan;
pub mod schema;
mod util;
pub mod value;

pub use command::{Command, Parameter, ParameterCollection, ParameterDirection};
pub use cursor::RowCursor;
pub use error::BindError;
pub use meta::{record_info, AttributeDef, AttributeInfo, DynRecord, Record, RecordInfo};
pub use plan::{DynParamPlan, DynRowPlan, OutParamWriter, ParamPlan, RowPlan, ValueWriter};
pub use schema::{resolve_db_type, DbField, DbTypeCode, ReaderField};
pub use value::{
    cast, coerce, conversion_policy, set_conversion_policy, ConversionPolicy, Value, ValueKind,
};
