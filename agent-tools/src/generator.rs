//! Derivation of parameter schemas from declared signatures.
//!
//! Generation is pure and stateless. [`generate_schema`] never fails: any
//! problem degrades the tool to the permissive schema so that metadata
//! derivation cannot break the program that declares the tool.

use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::descriptor::{ScalarKind, TypeDescriptor};
use crate::docs::DocComment;
use crate::schema::{SchemaKind, SchemaNode};
use crate::signature::Signature;

/// Recoverable failures while deriving a schema.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A parameter was declared without a name.
    #[error("parameter #{index} has an empty name")]
    EmptyParameterName {
        /// Position of the offending parameter.
        index: usize,
    },

    /// Two parameters share a name.
    #[error("parameter `{name}` is declared more than once")]
    DuplicateParameter {
        /// The repeated name.
        name: String,
    },

    /// A default value could not be encoded as JSON.
    #[error("default for parameter `{name}` cannot be encoded: {reason}")]
    UnrepresentableDefault {
        /// Parameter carrying the default.
        name: String,
        /// Encoder error message.
        reason: String,
    },
}

/// Derives the object schema for `signature`, degrading to
/// [`SchemaNode::permissive`] on failure.
#[must_use]
pub fn generate_schema(signature: &Signature) -> SchemaNode {
    match try_generate_schema(signature) {
        Ok(schema) => schema,
        Err(err) => {
            warn!(
                callable = signature.name(),
                error = %err,
                "schema generation failed; tool will accept any parameters"
            );
            SchemaNode::permissive()
        }
    }
}

/// Derives the object schema for `signature`.
///
/// Each argument becomes a property; it is required unless it declares a
/// default. The first non-blank doc line becomes the schema description.
///
/// # Errors
///
/// Returns a [`SchemaError`] for empty or duplicate parameter names and for
/// defaults that cannot be encoded.
pub fn try_generate_schema(signature: &Signature) -> Result<SchemaNode, SchemaError> {
    let docs = signature.doc().map(DocComment::parse).unwrap_or_default();
    let mut schema = SchemaNode::object();
    let mut seen = HashSet::new();

    for (index, param) in signature.arguments().enumerate() {
        let name = param.name();
        if name.trim().is_empty() {
            return Err(SchemaError::EmptyParameterName { index });
        }
        if !seen.insert(name) {
            return Err(SchemaError::DuplicateParameter {
                name: name.to_owned(),
            });
        }

        let mut property = type_to_schema(param.ty());
        if let Some(description) = param.description().or_else(|| docs.param(name)) {
            property = property.with_description(description);
        }

        let default = param.default_value()?;
        if let Some(default) = default {
            property = property.with_default(default.clone());
        }
        schema = schema.with_property(name, property, default.is_none());
    }

    if let Some(summary) = docs.summary() {
        schema = schema.with_description(summary);
    }
    Ok(schema)
}

/// Maps a type descriptor to its schema.
#[must_use]
pub fn type_to_schema(ty: &TypeDescriptor) -> SchemaNode {
    match ty {
        TypeDescriptor::Null => SchemaNode::null(),
        TypeDescriptor::Optional(inner) => type_to_schema(inner).into_nullable(),
        TypeDescriptor::Union(members) => union_schema(members),
        TypeDescriptor::Sequence(items) => {
            SchemaNode::array(items.as_deref().map_or_else(SchemaNode::any, type_to_schema))
        }
        TypeDescriptor::Mapping(values) => {
            SchemaNode::map(values.as_deref().map_or_else(SchemaNode::any, type_to_schema))
        }
        TypeDescriptor::Scalar(kind) => scalar_schema(*kind),
        TypeDescriptor::Literal(values) => literal_schema(values),
        TypeDescriptor::Any => SchemaNode::any(),
        TypeDescriptor::Unknown(name) => {
            warn!(type_name = %name, "unsupported parameter type; falling back to string schema");
            SchemaNode::string()
        }
    }
}

fn scalar_schema(kind: ScalarKind) -> SchemaNode {
    match kind {
        ScalarKind::Text => SchemaNode::string(),
        ScalarKind::Integer => SchemaNode::integer(),
        ScalarKind::Real => SchemaNode::number(),
        ScalarKind::Boolean => SchemaNode::boolean(),
    }
}

fn union_schema(members: &[TypeDescriptor]) -> SchemaNode {
    let non_null: Vec<&TypeDescriptor> = members
        .iter()
        .filter(|member| !matches!(member, TypeDescriptor::Null))
        .collect();
    let has_null = non_null.len() != members.len();

    match non_null.as_slice() {
        [] if has_null => SchemaNode::null(),
        [] => SchemaNode::any(),
        [only] if has_null => type_to_schema(only).into_nullable(),
        [only] => type_to_schema(only),
        _ => SchemaNode::union(members.iter().map(type_to_schema).collect()),
    }
}

fn literal_schema(values: &[Value]) -> SchemaNode {
    let kind = common_literal_kind(values).unwrap_or(SchemaKind::String);
    SchemaNode::enumeration(kind, values.to_vec())
}

fn common_literal_kind(values: &[Value]) -> Option<SchemaKind> {
    let mut kinds = values.iter().map(literal_kind);
    let first = kinds.next()??;
    kinds.try_fold(first, |common, kind| match (common, kind?) {
        (a, b) if a == b => Some(a),
        (SchemaKind::Integer | SchemaKind::Number, SchemaKind::Integer | SchemaKind::Number) => {
            Some(SchemaKind::Number)
        }
        _ => None,
    })
}

fn literal_kind(value: &Value) -> Option<SchemaKind> {
    match value {
        Value::String(_) => Some(SchemaKind::String),
        Value::Number(number) if number.is_i64() || number.is_u64() => Some(SchemaKind::Integer),
        Value::Number(_) => Some(SchemaKind::Number),
        Value::Bool(_) => Some(SchemaKind::Boolean),
        Value::Null => Some(SchemaKind::Null),
        Value::Array(_) | Value::Object(_) => None,
    }
}
