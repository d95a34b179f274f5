//! Type descriptors bridging Rust parameter types to schema generation.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// Scalar families recognised by the schema generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Free-form text.
    Text,
    /// Whole numbers.
    Integer,
    /// Floating point numbers.
    Real,
    /// `true` or `false`.
    Boolean,
}

/// Description of a declared parameter type.
///
/// Descriptors are produced at compile time by `#[tool]` and
/// `#[derive(ToolParam)]`, or assembled by hand for tools registered at
/// runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeDescriptor {
    /// The unit type; only `null` is accepted.
    Null,
    /// A value that may also be absent.
    Optional(Box<TypeDescriptor>),
    /// One of several alternatives.
    Union(Vec<TypeDescriptor>),
    /// Homogeneous sequence with an optionally known element type.
    Sequence(Option<Box<TypeDescriptor>>),
    /// String-keyed map with an optionally known value type.
    Mapping(Option<Box<TypeDescriptor>>),
    /// A scalar value.
    Scalar(ScalarKind),
    /// A fixed, closed set of literal values.
    Literal(Vec<Value>),
    /// Any JSON value.
    Any,
    /// A type the generator knows nothing about, identified by name.
    Unknown(String),
}

impl TypeDescriptor {
    /// Text scalar.
    #[must_use]
    pub const fn text() -> Self {
        Self::Scalar(ScalarKind::Text)
    }

    /// Integer scalar.
    #[must_use]
    pub const fn integer() -> Self {
        Self::Scalar(ScalarKind::Integer)
    }

    /// Real scalar.
    #[must_use]
    pub const fn real() -> Self {
        Self::Scalar(ScalarKind::Real)
    }

    /// Boolean scalar.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::Scalar(ScalarKind::Boolean)
    }

    /// Wraps `inner` as optional.
    #[must_use]
    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Sequence of `items`.
    #[must_use]
    pub fn sequence_of(items: TypeDescriptor) -> Self {
        Self::Sequence(Some(Box::new(items)))
    }

    /// String-keyed map of `values`.
    #[must_use]
    pub fn mapping_of(values: TypeDescriptor) -> Self {
        Self::Mapping(Some(Box::new(values)))
    }

    /// Union over the supplied members.
    #[must_use]
    pub fn union(members: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        Self::Union(members.into_iter().collect())
    }

    /// Closed set of literal values.
    #[must_use]
    pub fn literal<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Literal(values.into_iter().map(Into::into).collect())
    }

    /// Unknown type identified by `name`.
    #[must_use]
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::Unknown(name.into())
    }
}

/// Rust types that can appear as tool parameters.
///
/// Implemented for the standard scalar, collection, and JSON types; derive it
/// for enums with `#[derive(ToolParam)]`.
pub trait ToolParam {
    /// Describes the type for schema generation.
    fn type_descriptor() -> TypeDescriptor;
}

macro_rules! scalar_params {
    ($kind:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl ToolParam for $ty {
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::Scalar($kind)
                }
            }
        )+
    };
}

scalar_params!(ScalarKind::Text => String, str, char, PathBuf, Path);
scalar_params!(
    ScalarKind::Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize
);
scalar_params!(ScalarKind::Real => f32, f64);
scalar_params!(ScalarKind::Boolean => bool);

impl ToolParam for Cow<'_, str> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::text()
    }
}

impl ToolParam for () {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Null
    }
}

impl ToolParam for Value {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::Any
    }
}

impl ToolParam for Map<String, Value> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::mapping_of(TypeDescriptor::Any)
    }
}

impl<T: ToolParam> ToolParam for Option<T> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::optional(T::type_descriptor())
    }
}

impl<T: ToolParam + ?Sized> ToolParam for Box<T> {
    fn type_descriptor() -> TypeDescriptor {
        T::type_descriptor()
    }
}

impl<T: ToolParam + ?Sized> ToolParam for &T {
    fn type_descriptor() -> TypeDescriptor {
        T::type_descriptor()
    }
}

macro_rules! sequence_params {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl<T: ToolParam> ToolParam for $ty<T> {
                fn type_descriptor() -> TypeDescriptor {
                    TypeDescriptor::sequence_of(T::type_descriptor())
                }
            }
        )+
    };
}

sequence_params!(Vec, VecDeque, BTreeSet);

impl<T: ToolParam, S> ToolParam for HashSet<T, S> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::sequence_of(T::type_descriptor())
    }
}

impl<T: ToolParam> ToolParam for [T] {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::sequence_of(T::type_descriptor())
    }
}

impl<T: ToolParam, const N: usize> ToolParam for [T; N] {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::sequence_of(T::type_descriptor())
    }
}

// JSON object keys are always strings, so the key type does not shape the schema.
impl<K, V: ToolParam, S> ToolParam for HashMap<K, V, S> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::mapping_of(V::type_descriptor())
    }
}

impl<K, V: ToolParam> ToolParam for BTreeMap<K, V> {
    fn type_descriptor() -> TypeDescriptor {
        TypeDescriptor::mapping_of(V::type_descriptor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_types_describe_themselves() {
        assert_eq!(String::type_descriptor(), TypeDescriptor::text());
        assert_eq!(u16::type_descriptor(), TypeDescriptor::integer());
        assert_eq!(f32::type_descriptor(), TypeDescriptor::real());
        assert_eq!(<()>::type_descriptor(), TypeDescriptor::Null);
        assert_eq!(
            Option::<Vec<bool>>::type_descriptor(),
            TypeDescriptor::optional(TypeDescriptor::sequence_of(TypeDescriptor::boolean()))
        );
        assert_eq!(
            HashMap::<String, f64>::type_descriptor(),
            TypeDescriptor::mapping_of(TypeDescriptor::real())
        );
        assert_eq!(<&str>::type_descriptor(), TypeDescriptor::text());
        assert_eq!(
            <[i64; 3]>::type_descriptor(),
            TypeDescriptor::sequence_of(TypeDescriptor::integer())
        );
    }
}
