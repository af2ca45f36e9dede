//! Record type metadata

mod cache;
mod dyn_record;
mod record;

pub use cache::record_info;
pub use dyn_record::DynRecord;
pub use record::{AttributeDef, AttributeInfo, Record, RecordInfo};
