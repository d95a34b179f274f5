//! Declared parameter lists and argument binding.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::descriptor::TypeDescriptor;
use crate::error::{ToolError, ToolResult};
use crate::generator::SchemaError;

#[derive(Clone, Debug, PartialEq)]
enum DefaultValue {
    Json(Value),
    Unrepresentable(String),
}

/// A single declared parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    name: String,
    ty: TypeDescriptor,
    default: Option<DefaultValue>,
    description: Option<String>,
    receiver: bool,
}

impl Param {
    /// Declares a parameter of the given type.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            description: None,
            receiver: false,
        }
    }

    /// Declares the implicit receiver of a method. Receivers never appear in
    /// schemas and are never bound from arguments.
    #[must_use]
    pub fn receiver(name: impl Into<String>) -> Self {
        Self {
            receiver: true,
            ..Self::new(name, TypeDescriptor::Any)
        }
    }

    /// Attaches a default value, serializing it to JSON.
    ///
    /// A value that cannot be serialized is remembered as unrepresentable and
    /// surfaces later as a schema generation failure.
    #[must_use]
    pub fn with_default<T>(mut self, value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        self.default = Some(match serde_json::to_value(value) {
            Ok(json) => DefaultValue::Json(json),
            Err(err) => DefaultValue::Unrepresentable(err.to_string()),
        });
        self
    }

    /// Attaches an already encoded default value.
    #[must_use]
    pub fn with_default_value(mut self, value: Value) -> Self {
        self.default = Some(DefaultValue::Json(value));
        self
    }

    /// Sets the parameter description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    #[must_use]
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// Explicit description, if one was declared.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns `true` for the implicit receiver.
    #[must_use]
    pub fn is_receiver(&self) -> bool {
        self.receiver
    }

    /// Returns the encoded default value.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnrepresentableDefault`] when the declared default
    /// could not be encoded as JSON.
    pub fn default_value(&self) -> Result<Option<&Value>, SchemaError> {
        match &self.default {
            None => Ok(None),
            Some(DefaultValue::Json(value)) => Ok(Some(value)),
            Some(DefaultValue::Unrepresentable(reason)) => Err(SchemaError::UnrepresentableDefault {
                name: self.name.clone(),
                reason: reason.clone(),
            }),
        }
    }
}

/// Ordered parameter list of a callable plus its documentation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Signature {
    name: String,
    doc: Option<String>,
    params: Vec<Param>,
}

impl Signature {
    /// Starts a signature for the callable called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            params: Vec::new(),
        }
    }

    /// Attaches the callable's documentation block.
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Callable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Documentation block, if any.
    #[must_use]
    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Parameters supplied by callers, in declaration order.
    pub fn arguments(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(|param| !param.is_receiver())
    }

    /// Checks that the signature can be bound and invoked as declared.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Validation`] for empty or duplicate parameter names
    /// and for a receiver that is not the first parameter.
    pub fn validate(&self) -> ToolResult<()> {
        let mut seen = HashSet::new();
        for (index, param) in self.params.iter().enumerate() {
            if param.name.trim().is_empty() {
                return Err(ToolError::validation(format!(
                    "parameter #{index} of `{}` has an empty name",
                    self.name
                )));
            }
            if param.receiver && index != 0 {
                return Err(ToolError::validation(format!(
                    "receiver `{}` of `{}` must be the first parameter",
                    param.name, self.name
                )));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(ToolError::validation(format!(
                    "parameter `{}` of `{}` is declared more than once",
                    param.name, self.name
                )));
            }
        }
        Ok(())
    }

    /// Binds caller arguments against the declared parameters.
    ///
    /// Missing entries take their declared default. The returned map holds
    /// exactly one entry per argument parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] when a parameter without a
    /// usable default is missing or an argument matches no parameter.
    pub fn bind(&self, mut args: Map<String, Value>) -> ToolResult<Map<String, Value>> {
        let mut bound = Map::with_capacity(self.params.len());
        for param in self.arguments() {
            let value = match args.remove(&param.name) {
                Some(value) => value,
                None => match param.default_value() {
                    Ok(Some(default)) => default.clone(),
                    Ok(None) => {
                        return Err(ToolError::invalid_arguments(
                            &self.name,
                            format!("missing required argument `{}`", param.name),
                        ));
                    }
                    Err(err) => {
                        return Err(ToolError::invalid_arguments(&self.name, err.to_string()));
                    }
                },
            };
            bound.insert(param.name.clone(), value);
        }

        if let Some(unexpected) = args.keys().next() {
            return Err(ToolError::invalid_arguments(
                &self.name,
                format!("unexpected argument `{unexpected}`"),
            ));
        }

        Ok(bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn weather() -> Signature {
        Signature::new("get_weather")
            .param(Param::new("location", TypeDescriptor::text()))
            .param(Param::new("unit", TypeDescriptor::text()).with_default("fahrenheit"))
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test helper expects an object"),
        }
    }

    #[test]
    fn bind_applies_defaults() {
        let bound = weather().bind(object(json!({"location": "Paris"}))).unwrap();
        assert_eq!(Value::Object(bound), json!({"location": "Paris", "unit": "fahrenheit"}));
    }

    #[test]
    fn bind_keeps_explicit_values() {
        let bound = weather()
            .bind(object(json!({"location": "Oslo", "unit": "celsius"})))
            .unwrap();
        assert_eq!(bound["unit"], json!("celsius"));
    }

    #[test]
    fn bind_rejects_missing_and_unexpected() {
        let err = weather().bind(Map::new()).unwrap_err();
        assert!(matches!(
            err,
            ToolError::InvalidArguments { ref reason, .. } if reason.contains("location")
        ));

        let err = weather()
            .bind(object(json!({"location": "Rome", "extra": 1})))
            .unwrap_err();
        assert!(matches!(
            err,
            ToolError::InvalidArguments { ref reason, .. } if reason.contains("extra")
        ));
    }

    #[test]
    fn receiver_is_not_bound() {
        let signature = Signature::new("method")
            .param(Param::receiver("self"))
            .param(Param::new("value", TypeDescriptor::integer()));
        signature.validate().unwrap();

        let bound = signature.bind(object(json!({"value": 3}))).unwrap();
        assert_eq!(bound.len(), 1);
        assert_eq!(signature.arguments().count(), 1);
    }

    #[test]
    fn validate_rejects_structural_problems() {
        let duplicate = Signature::new("dup")
            .param(Param::new("a", TypeDescriptor::Any))
            .param(Param::new("a", TypeDescriptor::Any));
        assert!(matches!(duplicate.validate(), Err(ToolError::Validation { .. })));

        let empty = Signature::new("empty").param(Param::new(" ", TypeDescriptor::Any));
        assert!(matches!(empty.validate(), Err(ToolError::Validation { .. })));

        let late_receiver = Signature::new("late")
            .param(Param::new("a", TypeDescriptor::Any))
            .param(Param::receiver("self"));
        assert!(matches!(late_receiver.validate(), Err(ToolError::Validation { .. })));
    }

    #[test]
    fn unrepresentable_default_is_reported() {
        let mut keyed = std::collections::HashMap::new();
        keyed.insert((1, 2), "pair");
        let param = Param::new("lookup", TypeDescriptor::Any).with_default(&keyed);

        assert!(matches!(
            param.default_value(),
            Err(SchemaError::UnrepresentableDefault { ref name, .. }) if name == "lookup"
        ));
    }
}
