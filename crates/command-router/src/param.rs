//! Positional command parameters.

use std::collections::HashMap;

/// Declared type of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamType {
    /// Any word is accepted.
    #[default]
    Untyped,
    /// The word must parse as a signed integer.
    Int,
}

/// A positional parameter declaration.
///
/// Parameters only describe what a command expects. Values bound during a
/// match live in [`ParamBindings`], never on the declaration itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    id: String,
    description: String,
    param_type: ParamType,
    required: bool,
}

impl Parameter {
    /// Declare an optional, untyped parameter.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            param_type: ParamType::Untyped,
            required: false,
        }
    }

    /// Declare an optional integer parameter.
    pub fn int(id: impl Into<String>) -> Self {
        Self::new(id).with_type(ParamType::Int)
    }

    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = param_type;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn param_type(&self) -> ParamType {
        self.param_type
    }

    /// Whether a missing positional word is fatal for the match.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Check that `value` is well-formed for the declared type.
    pub fn validate_type(&self, value: &str) -> bool {
        match self.param_type {
            ParamType::Untyped => true,
            ParamType::Int => value.parse::<i64>().is_ok(),
        }
    }
}

/// Parameter values bound by a single match, keyed by parameter ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamBindings {
    values: HashMap<String, String>,
}

impl ParamBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `word` to the parameter, replacing any earlier value.
    pub fn bind(&mut self, param: &Parameter, word: &str) {
        self.values.insert(param.id.clone(), word.to_string());
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.values.get(id).map(String::as_str)
    }

    /// Value of an integer parameter, if bound and well-formed.
    pub fn get_int(&self, id: &str) -> Option<i64> {
        self.get(id).and_then(|v| v.parse().ok())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
