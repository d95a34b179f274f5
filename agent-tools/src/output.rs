//! Support code for bindings generated by `#[tool]`.
//!
//! Three probes pick behaviour from the traits a concrete type implements,
//! using method resolution through successive auto-references:
//!
//! * [`TypeProbe`] resolves a parameter type to its [`ToolParam`] descriptor,
//!   or to [`TypeDescriptor::Unknown`] when the type has none.
//! * [`OutcomeProbe`] splits a `Result` whose error is `Display` into its
//!   success value or a [`ToolError::Execution`]. Other values pass through.
//! * [`OutputProbe`] turns a return value into JSON. Serializable values are
//!   encoded with serde; anything else that is `Display` or `Debug` becomes
//!   its textual form. A serializable value serde rejects falls back to its
//!   `Debug` form when it has one.

use std::any::type_name;
use std::fmt::{Debug, Display};
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::descriptor::{ToolParam, TypeDescriptor};
use crate::error::{ToolError, ToolResult};

/// Removes and decodes the named argument from a bound argument map.
///
/// # Errors
///
/// Returns [`ToolError::InvalidArguments`] when the value does not decode into
/// `T`. A missing entry decodes from `null`.
pub fn take_argument<T>(args: &mut Map<String, Value>, tool: &str, name: &str) -> ToolResult<T>
where
    T: DeserializeOwned,
{
    let value = args.remove(name).unwrap_or(Value::Null);
    serde_json::from_value(value)
        .map_err(|err| ToolError::invalid_arguments(tool, format!("argument `{name}`: {err}")))
}

/// Encodes a JSON-safe value, failing only for values serde rejects.
///
/// # Errors
///
/// Returns [`ToolError::Execution`] when serialization fails.
pub fn canonicalize<T>(value: &T) -> ToolResult<Value>
where
    T: Serialize + ?Sized,
{
    serde_json::to_value(value)
        .map_err(|err| ToolError::execution(format!("tool output could not be encoded: {err}")))
}

/// Zero-sized marker used to resolve a parameter type's descriptor.
pub struct TypeProbe<T: ?Sized>(PhantomData<T>);

impl<T: ?Sized> TypeProbe<T> {
    /// Creates the probe.
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: ?Sized> Default for TypeProbe<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Descriptor lookup for types implementing [`ToolParam`].
pub trait ViaToolParam {
    /// Returns the type's declared descriptor.
    fn type_descriptor(&self) -> TypeDescriptor;
}

impl<T: ToolParam + ?Sized> ViaToolParam for &TypeProbe<T> {
    fn type_descriptor(&self) -> TypeDescriptor {
        T::type_descriptor()
    }
}

/// Fallback descriptor lookup for every other type.
pub trait ViaUnknownType {
    /// Returns [`TypeDescriptor::Unknown`] naming the type.
    fn type_descriptor(&self) -> TypeDescriptor;
}

impl<T: ?Sized> ViaUnknownType for TypeProbe<T> {
    fn type_descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::unknown(type_name::<T>())
    }
}

/// Borrowing wrapper used to separate a tool's failure from its output.
pub struct OutcomeProbe<'a, T: ?Sized>(pub &'a T);

/// Outcome of a `Result` with a displayable error.
pub trait ViaResult<'a> {
    /// Success type.
    type Output: ?Sized;

    /// Returns the success value.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Execution`] carrying the error's text.
    fn outcome(&self) -> ToolResult<&'a Self::Output>;
}

impl<'a, T, E: Display> ViaResult<'a> for &OutcomeProbe<'a, Result<T, E>> {
    type Output = T;

    fn outcome(&self) -> ToolResult<&'a T> {
        match self.0 {
            Ok(value) => Ok(value),
            Err(err) => Err(ToolError::execution(err.to_string())),
        }
    }
}

/// Outcome of every other value: the value itself.
pub trait ViaValue<'a> {
    /// Type of the value.
    type Output: ?Sized;

    /// Returns the wrapped value.
    ///
    /// # Errors
    ///
    /// Never fails; the signature matches [`ViaResult`].
    fn outcome(&self) -> ToolResult<&'a Self::Output>;
}

impl<'a, T: ?Sized> ViaValue<'a> for OutcomeProbe<'a, T> {
    type Output = T;

    fn outcome(&self) -> ToolResult<&'a T> {
        Ok(self.0)
    }
}

/// Borrowing wrapper used to canonicalize a tool's return value.
pub struct OutputProbe<'a, T: ?Sized>(pub &'a T);

/// Output encoding for values that serialize and debug.
pub trait ViaSerializeOrDebug {
    /// Encodes the value with serde, or renders it with [`Debug`] when serde
    /// rejects it.
    ///
    /// # Errors
    ///
    /// Never fails; the signature matches [`ViaSerialize`].
    fn canonicalize(&self) -> ToolResult<Value>;
}

impl<T: Serialize + Debug + ?Sized> ViaSerializeOrDebug for &&&OutputProbe<'_, T> {
    fn canonicalize(&self) -> ToolResult<Value> {
        Ok(serde_json::to_value(self.0).unwrap_or_else(|err| {
            debug!(error = %err, "tool output is not JSON-safe; returning its debug form");
            Value::String(format!("{:?}", self.0))
        }))
    }
}

/// Output encoding for serializable values.
pub trait ViaSerialize {
    /// Encodes the value with serde.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Execution`] when serialization fails.
    fn canonicalize(&self) -> ToolResult<Value>;
}

impl<T: Serialize + ?Sized> ViaSerialize for &&OutputProbe<'_, T> {
    fn canonicalize(&self) -> ToolResult<Value> {
        canonicalize(self.0)
    }
}

/// Output encoding for displayable values.
pub trait ViaDisplay {
    /// Renders the value with [`Display`].
    ///
    /// # Errors
    ///
    /// Never fails; the signature matches [`ViaSerialize`].
    fn canonicalize(&self) -> ToolResult<Value>;
}

impl<T: Display + ?Sized> ViaDisplay for &OutputProbe<'_, T> {
    fn canonicalize(&self) -> ToolResult<Value> {
        Ok(Value::String(self.0.to_string()))
    }
}

/// Output encoding for values that are only debuggable.
pub trait ViaDebug {
    /// Renders the value with [`Debug`].
    ///
    /// # Errors
    ///
    /// Never fails; the signature matches [`ViaSerialize`].
    fn canonicalize(&self) -> ToolResult<Value>;
}

impl<T: Debug + ?Sized> ViaDebug for OutputProbe<'_, T> {
    fn canonicalize(&self) -> ToolResult<Value> {
        Ok(Value::String(format!("{:?}", self.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Opaque;

    struct Celsius(f64);

    impl Display for Celsius {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:.1}°C", self.0)
        }
    }

    #[derive(Debug)]
    struct Handle {
        id: u32,
    }

    #[derive(Serialize)]
    struct Forecast {
        high: i32,
    }

    #[test]
    fn type_probe_prefers_tool_param() {
        assert_eq!(
            (&&TypeProbe::<Vec<String>>::new()).type_descriptor(),
            TypeDescriptor::sequence_of(TypeDescriptor::text())
        );
        assert_eq!(
            (&&TypeProbe::<Opaque>::new()).type_descriptor(),
            TypeDescriptor::unknown(type_name::<Opaque>())
        );
    }

    #[test]
    fn output_probe_falls_back_to_text() {
        let forecast = Forecast { high: 21 };
        assert_eq!((&&&&OutputProbe(&forecast)).canonicalize().unwrap(), json!({"high": 21}));

        let temperature = Celsius(21.04);
        assert_eq!((&&&&OutputProbe(&temperature)).canonicalize().unwrap(), json!("21.0°C"));

        let handle = Handle { id: 7 };
        assert_eq!(
            (&&&&OutputProbe(&handle)).canonicalize().unwrap(),
            json!("Handle { id: 7 }")
        );
    }

    #[test]
    fn output_probe_falls_back_to_debug_when_serde_rejects() {
        let mut pairs = std::collections::BTreeMap::new();
        pairs.insert((1, 2), "a");
        assert_eq!(
            (&&&&OutputProbe(&pairs)).canonicalize().unwrap(),
            json!("{(1, 2): \"a\"}")
        );
    }

    #[test]
    fn outcome_probe_splits_results_by_type() {
        let ok: Result<u8, std::io::Error> = Ok(3);
        assert_eq!((&&OutcomeProbe(&ok)).outcome().unwrap(), &3);

        let failed: Result<u8, String> = Err("disk full".to_owned());
        let err = (&&OutcomeProbe(&failed)).outcome().unwrap_err();
        assert!(matches!(err, ToolError::Execution { ref reason } if reason == "disk full"));

        let plain = Forecast { high: 4 };
        assert_eq!((&&OutcomeProbe(&plain)).outcome().unwrap().high, 4);
    }

    #[test]
    fn unit_output_is_null() {
        assert_eq!((&&&&OutputProbe(&())).canonicalize().unwrap(), Value::Null);
    }

    #[test]
    fn take_argument_decodes_and_reports() {
        let mut args = json!({"count": 3, "label": 5}).as_object().cloned().unwrap();
        let count: u32 = take_argument(&mut args, "demo", "count").unwrap();
        assert_eq!(count, 3);

        let missing: Option<String> = take_argument(&mut args, "demo", "absent").unwrap();
        assert_eq!(missing, None);

        let err = take_argument::<String>(&mut args, "demo", "label").unwrap_err();
        assert!(matches!(
            err,
            ToolError::InvalidArguments { ref reason, .. } if reason.contains("label")
        ));
    }
}
