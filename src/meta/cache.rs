//! Process-wide record metadata cache.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use super::{Record, RecordInfo};
use crate::error::BindError;

static RECORD_INFO: Lazy<RwLock<HashMap<TypeId, Arc<RecordInfo>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Metadata for `T`, built on first demand and shared for the life of the
/// process.
pub fn record_info<T: Record>() -> Result<Arc<RecordInfo>, BindError> {
    let type_id = TypeId::of::<T>();
    {
        let map = RECORD_INFO.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(info) = map.get(&type_id) {
            return Ok(Arc::clone(info));
        }
    }
    let mut map = RECORD_INFO.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(info) = map.get(&type_id) {
        return Ok(Arc::clone(info));
    }
    let info = Arc::new(RecordInfo::build::<T>()?);
    map.insert(type_id, Arc::clone(&info));
    Ok(info)
}
