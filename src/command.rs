//! Command and parameter interfaces consumed by emitted parameter plans.

use crate::schema::DbTypeCode;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterDirection {
    Input,
    Output,
}

/// A single command parameter.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub value: Value,
    pub db_type: Option<DbTypeCode>,
    pub direction: ParameterDirection,
    pub size: Option<u32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
}

impl Default for Parameter {
    fn default() -> Self {
        Parameter {
            name: String::new(),
            value: Value::Null,
            db_type: None,
            direction: ParameterDirection::Input,
            size: None,
            precision: None,
            scale: None,
        }
    }
}

/// Ordered parameter list with name lookup.
#[derive(Debug, Clone, Default)]
pub struct ParameterCollection {
    params: Vec<Parameter>,
}

impl ParameterCollection {
    pub fn add(&mut self, parameter: Parameter) {
        self.params.push(parameter);
    }

    pub fn clear(&mut self) {
        self.params.clear();
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.params.iter_mut().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }
}

/// The slice of a database command that parameter plans drive.
pub trait Command {
    fn parameters(&self) -> &ParameterCollection;

    fn parameters_mut(&mut self) -> &mut ParameterCollection;

    fn create_parameter(&self) -> Parameter {
        Parameter::default()
    }
}
