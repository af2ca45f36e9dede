//! Record-to-parameter plans and the two single-value writers.

use std::marker::PhantomData;
use std::sync::Arc;

use log::debug;

use super::{slot_name, Convert};
use crate::command::{Command, ParameterDirection};
use crate::error::BindError;
use crate::handler::{registry_effective, SharedHandler};
use crate::meta::{record_info, AttributeInfo, DynRecord, Record, RecordInfo};
use crate::schema::{resolve_db_type, DbField, DbTypeCode};
use crate::util::eq_ci;
use crate::value::{cast, conversion_policy, ConversionPolicy, Value, ValueKind};

/// Compiled filler of a command's parameter collection from one record or an
/// ordered batch of records.
pub struct ParamPlan<T: Record> {
    info: Arc<RecordInfo>,
    batch_size: usize,
    steps: Vec<ParamStep>,
    _marker: PhantomData<fn() -> T>,
}

struct ParamStep {
    name: String,
    slot: usize,
    source: Option<ParamSource>,
    direction: ParameterDirection,
    db_type: Option<DbTypeCode>,
    size: Option<u32>,
    precision: Option<u8>,
    scale: Option<u8>,
}

struct ParamSource {
    attr: usize,
    convert: Option<Convert>,
    handler: Option<SharedHandler>,
}

impl<T: Record> std::fmt::Debug for ParamPlan<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamPlan")
            .field("info", &self.info)
            .field("batch_size", &self.batch_size)
            .field("steps", &self.steps)
            .finish()
    }
}

impl std::fmt::Debug for ParamStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamStep")
            .field("name", &self.name)
            .field("slot", &self.slot)
            .field("source", &self.source)
            .field("direction", &self.direction)
            .field("db_type", &self.db_type)
            .field("size", &self.size)
            .field("precision", &self.precision)
            .field("scale", &self.scale)
            .finish()
    }
}

impl std::fmt::Debug for ParamSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamSource")
            .field("attr", &self.attr)
            .field("convert", &self.convert)
            .field("handler", &self.handler.as_ref().map(|_| "SharedHandler"))
            .finish()
    }
}

impl<T: Record> ParamPlan<T> {
    /// Single-record plan over the given input fields.
    pub fn build(input_fields: &[DbField]) -> Result<Self, BindError> {
        Self::build_batch(input_fields, &[], 1)
    }

    pub fn build_with_policy(
        input_fields: &[DbField],
        policy: ConversionPolicy,
    ) -> Result<Self, BindError> {
        Self::build_batch_with_policy(input_fields, &[], 1, policy)
    }

    /// Batched plan: `batch_size` slots of input parameters followed by
    /// `batch_size` slots of output parameters, names suffixed per slot.
    pub fn build_batch(
        input_fields: &[DbField],
        output_fields: &[DbField],
        batch_size: usize,
    ) -> Result<Self, BindError> {
        Self::build_batch_with_policy(input_fields, output_fields, batch_size, conversion_policy())
    }

    pub fn build_batch_with_policy(
        input_fields: &[DbField],
        output_fields: &[DbField],
        batch_size: usize,
        policy: ConversionPolicy,
    ) -> Result<Self, BindError> {
        if batch_size == 0 {
            return Err(BindError::metadata("batch size must be at least 1"));
        }
        let info = record_info::<T>()?;
        let mut steps = Vec::with_capacity(batch_size * (input_fields.len() + output_fields.len()));
        for slot in 0..batch_size {
            for field in input_fields {
                steps.push(input_step::<T>(&info, field, slot, policy)?);
            }
        }
        for slot in 0..batch_size {
            for field in output_fields {
                steps.push(output_step(&info, field, slot, policy)?);
            }
        }
        debug!(
            "compiled parameter plan for `{}`: {} parameters over {} slot(s)",
            info.type_name,
            steps.len(),
            batch_size
        );
        Ok(ParamPlan {
            info,
            batch_size,
            steps,
            _marker: PhantomData,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn fill(&self, record: &T, command: &mut dyn Command) -> Result<(), BindError> {
        self.fill_batch(std::slice::from_ref(record), command)
    }

    /// Clears the command's parameters, then emits one parameter per step.
    /// Exactly `batch_size` record slots are read; a shorter `records` slice
    /// is a caller error.
    pub fn fill_batch(&self, records: &[T], command: &mut dyn Command) -> Result<(), BindError> {
        command.parameters_mut().clear();
        for step in &self.steps {
            let mut parameter = command.create_parameter();
            parameter.name = step.name.clone();
            parameter.direction = step.direction;
            if let Some(source) = &step.source {
                let record = &records[step.slot];
                let attribute = &self.info.attributes[source.attr];
                let mut value = record.get(source.attr);
                if let Some(handler) = &source.handler {
                    value = handler.outgoing(value, attribute);
                }
                if let Some(convert) = source.convert {
                    value = convert.apply(value)?;
                }
                parameter.value = value;
            }
            parameter.db_type = step.db_type;
            parameter.size = step.size;
            parameter.precision = step.precision;
            parameter.scale = step.scale;
            command.parameters_mut().add(parameter);
        }
        Ok(())
    }
}

fn input_step<T: Record>(
    info: &RecordInfo,
    field: &DbField,
    slot: usize,
    policy: ConversionPolicy,
) -> Result<ParamStep, BindError> {
    let attribute = info
        .attribute_by_mapped_name(field.unquoted_name())
        .filter(|a| a.readable)
        .ok_or(BindError::NoMatchedFields {
            type_name: info.type_name,
        })?;
    let convert = if policy == ConversionPolicy::Automatic
        && attribute.kind == ValueKind::String
        && field.kind == ValueKind::Guid
    {
        Some(Convert::StringToGuid)
    } else {
        None
    };
    Ok(ParamStep {
        name: slot_name(field.unquoted_name(), slot),
        slot,
        source: Some(ParamSource {
            attr: attribute.index,
            convert,
            handler: registry_effective::<T>(attribute.name),
        }),
        direction: ParameterDirection::Input,
        db_type: parameter_db_type(policy, attribute, field),
        size: parameter_size(field),
        precision: field.precision,
        scale: field.scale,
    })
}

fn output_step(
    info: &RecordInfo,
    field: &DbField,
    slot: usize,
    policy: ConversionPolicy,
) -> Result<ParamStep, BindError> {
    let attribute =
        info.attribute_by_mapped_name(field.unquoted_name())
            .ok_or(BindError::NoMatchedFields {
                type_name: info.type_name,
            })?;
    Ok(ParamStep {
        name: slot_name(field.unquoted_name(), slot),
        slot,
        source: None,
        direction: ParameterDirection::Output,
        db_type: parameter_db_type(policy, attribute, field),
        size: parameter_size(field),
        precision: field.precision,
        scale: field.scale,
    })
}

/// Parameter type resolution. The attribute-level override wins; otherwise
/// the effective kind is the attribute's when an automatic coercion pair
/// applies, else the field's. The fixed-interval type is never set so the
/// driver infers it.
fn parameter_db_type(
    policy: ConversionPolicy,
    attribute: &AttributeInfo,
    field: &DbField,
) -> Option<DbTypeCode> {
    if let Some(code) = attribute.db_type {
        return (code != DbTypeCode::Time).then_some(code);
    }
    let kind = if policy == ConversionPolicy::Automatic
        && automatic_kind_override(attribute.kind, field.kind)
    {
        attribute.kind
    } else {
        field.kind
    };
    resolve_db_type(kind).filter(|code| *code != DbTypeCode::Time)
}

/// Coercion pairs for which the attribute's kind wins parameter type
/// resolution under the automatic policy.
fn automatic_kind_override(attribute: ValueKind, field: ValueKind) -> bool {
    use ValueKind::*;
    matches!(
        (attribute, field),
        (DateTime, String)
            | (String, DateTime)
            | (Decimal, F32)
            | (F32, Decimal)
            | (F64, I64)
            | (F64, I32)
            | (F64, I16)
            | (I64, F64)
            | (I32, F64)
            | (I16, F64)
            | (F32, I64)
            | (F32, I16)
            | (I64, F32)
            | (I16, F32)
            | (Guid, String)
            | (String, Guid)
    )
}

/// `size` is deliberately left unset for the `image` vendor type; the driver
/// default would truncate binary payloads otherwise.
fn parameter_size(field: &DbField) -> Option<u32> {
    if eq_ci(&field.vendor_type, "image") {
        None
    } else {
        field.size
    }
}

/// Dynamic-record variant of single parameter emission; attributes are
/// looked up by name at fill time, missing entries emit the null sentinel.
pub struct DynParamPlan {
    steps: Vec<DynParamStep>,
}

struct DynParamStep {
    name: String,
    lookup: String,
    db_type: Option<DbTypeCode>,
    size: Option<u32>,
    precision: Option<u8>,
    scale: Option<u8>,
}

impl DynParamPlan {
    pub fn build(input_fields: &[DbField]) -> Result<Self, BindError> {
        let steps = input_fields
            .iter()
            .map(|field| DynParamStep {
                name: field.unquoted_name().to_string(),
                lookup: field.unquoted_name().to_string(),
                db_type: resolve_db_type(field.kind).filter(|code| *code != DbTypeCode::Time),
                size: parameter_size(field),
                precision: field.precision,
                scale: field.scale,
            })
            .collect();
        Ok(DynParamPlan { steps })
    }

    pub fn fill(&self, record: &DynRecord, command: &mut dyn Command) -> Result<(), BindError> {
        command.parameters_mut().clear();
        for step in &self.steps {
            let mut parameter = command.create_parameter();
            parameter.name = step.name.clone();
            parameter.direction = ParameterDirection::Input;
            parameter.value = record.get(&step.lookup).cloned().unwrap_or(Value::Null);
            parameter.db_type = step.db_type;
            parameter.size = step.size;
            parameter.precision = step.precision;
            parameter.scale = step.scale;
            command.parameters_mut().add(parameter);
        }
        Ok(())
    }
}

/// Writes one named (and slot-suffixed) command parameter back into a record
/// attribute; used to propagate identity columns and other output parameters
/// after execution.
#[derive(Debug)]
pub struct OutParamWriter<T: Record> {
    name: String,
    attr: usize,
    kind: ValueKind,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> OutParamWriter<T> {
    pub fn build(field: &DbField, index: usize) -> Result<Self, BindError> {
        let info = record_info::<T>()?;
        let attribute = info
            .attribute_by_mapped_name(field.unquoted_name())
            .filter(|a| a.writable)
            .ok_or(BindError::NoMatchedFields {
                type_name: info.type_name,
            })?;
        Ok(OutParamWriter {
            name: slot_name(field.unquoted_name(), index),
            attr: attribute.index,
            kind: attribute.kind,
            _marker: PhantomData,
        })
    }

    pub fn apply(&self, record: &mut T, command: &dyn Command) -> Result<(), BindError> {
        let parameter = command.parameters().get(&self.name).ok_or_else(|| {
            BindError::metadata(format!("command has no parameter `{}`", self.name))
        })?;
        let value = cast(parameter.value.clone(), self.kind)?;
        record.set(self.attr, value)
    }
}

/// General-purpose setter: casts an arbitrary value to the field's declared
/// kind and assigns it to the corresponding attribute.
pub struct ValueWriter<T: Record> {
    attr: usize,
    kind: ValueKind,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> ValueWriter<T> {
    pub fn build(field: &DbField) -> Result<Self, BindError> {
        let info = record_info::<T>()?;
        let attribute = info
            .attribute_by_mapped_name(field.unquoted_name())
            .filter(|a| a.writable)
            .ok_or(BindError::NoMatchedFields {
                type_name: info.type_name,
            })?;
        Ok(ValueWriter {
            attr: attribute.index,
            kind: field.kind,
            _marker: PhantomData,
        })
    }

    pub fn apply(&self, record: &mut T, value: Value) -> Result<(), BindError> {
        record.set(self.attr, cast(value, self.kind)?)
    }
}
