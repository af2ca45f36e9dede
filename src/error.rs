//! Error types for rowbind

use thiserror::Error;

use crate::value::ValueKind;

/// Errors that can occur while compiling or executing binding plans
#[derive(Error, Debug)]
pub enum BindError {
    #[error("no attribute of `{type_name}` matches any of the supplied fields")]
    NoMatchedFields { type_name: &'static str },

    #[error("a handler is already registered for {key}")]
    MappingExists { key: String },

    #[error("metadata error: {message}")]
    Metadata { message: String },

    #[error("cannot convert {value} into {target}")]
    Conversion { value: String, target: ValueKind },
}

impl BindError {
    pub(crate) fn metadata(message: impl Into<String>) -> Self {
        BindError::Metadata {
            message: message.into(),
        }
    }

    pub(crate) fn conversion(value: &crate::value::Value, target: ValueKind) -> Self {
        BindError::Conversion {
            value: format!("{:?}", value),
            target,
        }
    }
}
