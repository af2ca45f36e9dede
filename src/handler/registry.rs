//! Registration and lookup of property handlers.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use crate::error::BindError;
use crate::meta::{record_info, AttributeInfo, Record};
use crate::schema::DbField;
use crate::value::Value;

/// A pair of pure transforms applied when marshaling a value into or out of
/// a record attribute.
pub trait PropertyHandler: Send + Sync {
    /// Column value → attribute value, applied when reading rows.
    fn incoming(&self, value: Value, attribute: &AttributeInfo) -> Value;

    /// Attribute value → parameter value, applied when filling commands.
    fn outgoing(&self, value: Value, attribute: &AttributeInfo) -> Value;
}

pub type SharedHandler = Arc<dyn PropertyHandler>;

/// Addresses one attribute of a record type, either by its canonical name or
/// through a field descriptor resolved against the mapped column names.
#[derive(Debug, Clone, Copy)]
pub enum AttributeSelector<'a> {
    Name(&'a str),
    Field(&'a DbField),
}

impl<'a> From<&'a str> for AttributeSelector<'a> {
    fn from(name: &'a str) -> Self {
        AttributeSelector::Name(name)
    }
}

impl<'a> From<&'a DbField> for AttributeSelector<'a> {
    fn from(field: &'a DbField) -> Self {
        AttributeSelector::Field(field)
    }
}

static TYPE_HANDLERS: Lazy<RwLock<HashMap<TypeId, SharedHandler>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

static ATTRIBUTE_HANDLERS: Lazy<RwLock<HashMap<(TypeId, String), SharedHandler>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Registers a record-type-level handler. Fails with `MappingExists` when the
/// type already carries one, unless `force` is set.
pub fn register<T: Record>(handler: SharedHandler, force: bool) -> Result<(), BindError> {
    let mut map = TYPE_HANDLERS.write().unwrap_or_else(PoisonError::into_inner);
    let key = TypeId::of::<T>();
    if !force && map.contains_key(&key) {
        return Err(BindError::MappingExists {
            key: format!("type `{}`", std::any::type_name::<T>()),
        });
    }
    map.insert(key, handler);
    Ok(())
}

/// Registers an attribute-level handler. The selector must resolve to an
/// attribute of `T`; the stored key is the attribute's canonical name.
pub fn register_attribute<'a, T: Record>(
    selector: impl Into<AttributeSelector<'a>>,
    handler: SharedHandler,
    force: bool,
) -> Result<(), BindError> {
    let name = resolve_selector::<T>(selector.into())?;
    let mut map = ATTRIBUTE_HANDLERS
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    let key = (TypeId::of::<T>(), name);
    if !force && map.contains_key(&key) {
        return Err(BindError::MappingExists {
            key: format!("attribute `{}.{}`", std::any::type_name::<T>(), key.1),
        });
    }
    map.insert(key, handler);
    Ok(())
}

pub fn lookup<T: Record>() -> Option<SharedHandler> {
    TYPE_HANDLERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&TypeId::of::<T>())
        .cloned()
}

/// Attribute-level lookup; `name` matches the canonical attribute name
/// case-sensitively.
pub fn lookup_attribute<T: Record>(name: &str) -> Option<SharedHandler> {
    ATTRIBUTE_HANDLERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&(TypeId::of::<T>(), name.to_string()))
        .cloned()
}

/// Removes the type-level handler for `T`; a no-op when absent.
pub fn remove<T: Record>() {
    TYPE_HANDLERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&TypeId::of::<T>());
}

/// Removes an attribute-level handler; a no-op when absent.
pub fn remove_attribute<T: Record>(name: &str) {
    ATTRIBUTE_HANDLERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&(TypeId::of::<T>(), name.to_string()));
}

/// Drops every registered handler. Plans compiled earlier keep the handlers
/// they captured.
pub fn clear() {
    TYPE_HANDLERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
    ATTRIBUTE_HANDLERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}

/// The handler a plan captures for one attribute: attribute-level wins over
/// type-level.
pub(crate) fn effective<T: Record>(attribute_name: &str) -> Option<SharedHandler> {
    lookup_attribute::<T>(attribute_name).or_else(lookup::<T>)
}

fn resolve_selector<T: Record>(selector: AttributeSelector<'_>) -> Result<String, BindError> {
    let info = record_info::<T>()?;
    let attribute = match selector {
        AttributeSelector::Name(name) => info.attribute_by_name(name),
        AttributeSelector::Field(field) => info.attribute_by_mapped_name(field.unquoted_name()),
    };
    attribute
        .map(|a| a.name.to_string())
        .ok_or_else(|| {
            BindError::metadata(format!(
                "selector does not resolve to an attribute of `{}`",
                info.type_name
            ))
        })
}
