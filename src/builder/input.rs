//! Named argument rows for action invocations.

use crate::error::{KwilLinkError, Result};
use crate::models::ParamValue;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// One row of named action arguments.
///
/// Parameter names carry the `$` prefix, matching the schema
/// declarations. Ordering is canonical (sorted by name) so validation
/// errors list parameters deterministically.
///
/// # Examples
///
/// ```rust
/// use kwil_link::ActionInput;
///
/// let input = ActionInput::new()
///     .put("$id", "123e4567-e89b-12d3-a456-426614174000")
///     .put("$user", "Luke");
/// assert_eq!(input.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionInput {
    values: BTreeMap<String, ParamValue>,
}

impl ActionInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a named parameter.
    pub fn put(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Build a row from a JSON object, e.g. the parsed body of a caller
    /// request.
    pub fn from_json(object: &JsonValue) -> Result<Self> {
        let map = object.as_object().ok_or_else(|| {
            KwilLinkError::InputValidation("action inputs must be a JSON object".to_string())
        })?;

        let mut values = BTreeMap::new();
        for (name, value) in map {
            values.insert(name.clone(), ParamValue::from_json(value)?);
        }
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// Parameter names in this row, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
