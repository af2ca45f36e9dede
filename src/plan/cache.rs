//! Process-wide cache of compiled plans, keyed by record type and shape.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use log::trace;
use once_cell::sync::Lazy;

use super::{DynRowPlan, ParamPlan, RowPlan};
use crate::cursor::RowCursor;
use crate::error::BindError;
use crate::meta::{DynRecord, Record};
use crate::schema::DbField;
use crate::value::ValueKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PlanDiscriminant {
    Row,
    Params,
    BatchParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ShapeField {
    name: String,
    kind: ValueKind,
    nullable: bool,
    output: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PlanKey {
    type_id: TypeId,
    discriminant: PlanDiscriminant,
    shape: Vec<ShapeField>,
    batch_size: usize,
}

static PLANS: Lazy<RwLock<HashMap<PlanKey, Arc<dyn Any + Send + Sync>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Row-to-record plan for `T`, built on first demand per cursor shape.
/// Entries are immortal; the conversion policy and handlers sampled at the
/// first build stay baked in.
pub fn cached_row_plan<T: Record>(
    cursor: &dyn RowCursor,
    db_fields: &[DbField],
) -> Result<Arc<RowPlan<T>>, BindError> {
    let key = PlanKey {
        type_id: TypeId::of::<T>(),
        discriminant: PlanDiscriminant::Row,
        shape: row_shape(cursor, db_fields),
        batch_size: 1,
    };
    get_or_build(key, || RowPlan::<T>::build(cursor, db_fields))
}

/// Row-to-dynamic-record plan, cached per cursor shape.
pub fn cached_dyn_row_plan(
    cursor: &dyn RowCursor,
    db_fields: &[DbField],
) -> Result<Arc<DynRowPlan>, BindError> {
    let key = PlanKey {
        type_id: TypeId::of::<DynRecord>(),
        discriminant: PlanDiscriminant::Row,
        shape: row_shape(cursor, db_fields),
        batch_size: 1,
    };
    get_or_build(key, || DynRowPlan::build(cursor, db_fields))
}

/// Single-record parameter plan for `T` over the given input fields.
pub fn cached_param_plan<T: Record>(
    input_fields: &[DbField],
) -> Result<Arc<ParamPlan<T>>, BindError> {
    cached_batch_param_plan::<T>(input_fields, &[], 1)
}

/// Batched parameter plan for `T`.
pub fn cached_batch_param_plan<T: Record>(
    input_fields: &[DbField],
    output_fields: &[DbField],
    batch_size: usize,
) -> Result<Arc<ParamPlan<T>>, BindError> {
    let discriminant = if batch_size == 1 && output_fields.is_empty() {
        PlanDiscriminant::Params
    } else {
        PlanDiscriminant::BatchParams
    };
    let key = PlanKey {
        type_id: TypeId::of::<T>(),
        discriminant,
        shape: param_shape(input_fields, output_fields),
        batch_size,
    };
    get_or_build(key, || {
        ParamPlan::<T>::build_batch(input_fields, output_fields, batch_size)
    })
}

/// Number of cached plans; diagnostics and tests only.
pub fn len() -> usize {
    PLANS.read().unwrap_or_else(PoisonError::into_inner).len()
}

/// Drops every cached plan. Test isolation only; production entries are
/// meant to live for the process.
pub fn clear() {
    PLANS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}

fn get_or_build<P, F>(key: PlanKey, build: F) -> Result<Arc<P>, BindError>
where
    P: Any + Send + Sync,
    F: FnOnce() -> Result<P, BindError>,
{
    {
        let map = PLANS.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = map.get(&key) {
            trace!("plan cache hit");
            return downcast(Arc::clone(entry));
        }
    }
    let mut map = PLANS.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(entry) = map.get(&key) {
        return downcast(Arc::clone(entry));
    }
    let plan = Arc::new(build()?);
    map.insert(key, Arc::clone(&plan) as Arc<dyn Any + Send + Sync>);
    Ok(plan)
}

fn downcast<P: Any + Send + Sync>(entry: Arc<dyn Any + Send + Sync>) -> Result<Arc<P>, BindError> {
    entry
        .downcast::<P>()
        .map_err(|_| BindError::metadata("plan cache entry has an unexpected type"))
}

fn row_shape(cursor: &dyn RowCursor, db_fields: &[DbField]) -> Vec<ShapeField> {
    let nullability: HashMap<String, bool> = db_fields
        .iter()
        .map(|f| (f.lookup_name(), f.nullable))
        .collect();
    (0..cursor.field_count())
        .map(|ordinal| {
            let name = cursor.field_name(ordinal).to_lowercase();
            let nullable = nullability.get(&name).copied().unwrap_or(true);
            ShapeField {
                name,
                kind: cursor.field_kind(ordinal),
                nullable,
                output: false,
            }
        })
        .collect()
}

fn param_shape(input_fields: &[DbField], output_fields: &[DbField]) -> Vec<ShapeField> {
    input_fields
        .iter()
        .map(|f| (f, false))
        .chain(output_fields.iter().map(|f| (f, true)))
        .map(|(f, output)| ShapeField {
            name: f.lookup_name(),
            kind: f.kind,
            nullable: f.nullable,
            output,
        })
        .collect()
}
