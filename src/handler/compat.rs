//! Deprecated alias of the handler registry surface, kept for callers of the
//! pre-0.1 API. Every function forwards one-to-one.

use super::{AttributeSelector, SharedHandler};
use crate::error::BindError;
use crate::meta::Record;

#[deprecated(note = "use `handler::register`")]
pub fn register<T: Record>(handler: SharedHandler, force: bool) -> Result<(), BindError> {
    super::register::<T>(handler, force)
}

#[deprecated(note = "use `handler::register_attribute`")]
pub fn register_attribute<'a, T: Record>(
    selector: impl Into<AttributeSelector<'a>>,
    handler: SharedHandler,
    force: bool,
) -> Result<(), BindError> {
    super::register_attribute::<T>(selector, handler, force)
}

#[deprecated(note = "use `handler::lookup`")]
pub fn lookup<T: Record>() -> Option<SharedHandler> {
    super::lookup::<T>()
}

#[deprecated(note = "use `handler::lookup_attribute`")]
pub fn lookup_attribute<T: Record>(name: &str) -> Option<SharedHandler> {
    super::lookup_attribute::<T>(name)
}

#[deprecated(note = "use `handler::remove`")]
pub fn remove<T: Record>() {
    super::remove::<T>()
}

#[deprecated(note = "use `handler::remove_attribute`")]
pub fn remove_attribute<T: Record>(name: &str) {
    super::remove_attribute::<T>(name)
}

#[deprecated(note = "use `handler::clear`")]
pub fn clear() {
    super::clear()
}
