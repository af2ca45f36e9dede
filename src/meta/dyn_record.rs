//! Map-backed record for the dynamic binding path.

use indexmap::IndexMap;

use crate::value::Value;

/// A record whose attributes are known only at runtime. Keys keep the casing
/// they were inserted with; lookups fall back to a case-insensitive scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynRecord {
    values: IndexMap<String, Value>,
}

impl DynRecord {
    pub fn new() -> Self {
        DynRecord::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).or_else(|| {
            self.values
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for DynRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        DynRecord {
            values: iter.into_iter().collect(),
        }
    }
}
