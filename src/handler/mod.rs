//! Property handler registry

pub mod compat;
mod registry;

pub use registry::{
    clear, lookup, lookup_attribute, register, register_attribute, remove, remove_attribute,
    AttributeSelector, PropertyHandler, SharedHandler,
};

pub(crate) use registry::effective as registry_effective;
