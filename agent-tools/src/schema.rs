//! JSON-Schema-like parameter descriptions surfaced to language models.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Structural kind of a [`SchemaNode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    /// A JSON object with named properties or free-form values.
    Object,
    /// A JSON array.
    Array,
    /// A JSON string.
    String,
    /// A JSON number without a fractional part.
    Integer,
    /// Any JSON number.
    Number,
    /// A JSON boolean.
    Boolean,
    /// The JSON `null` literal.
    Null,
    /// One of several alternatives listed under `anyOf`.
    Union,
}

/// Recursive schema tree describing the shape of a value.
///
/// A node's kind decides which of the optional fields carry meaning:
/// `properties`/`required` and `additionalProperties` only on objects, `items`
/// only on arrays, `anyOf` only on unions. A node without a kind accepts any
/// value and serializes as `{}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    #[serde(rename = "type", default, skip_serializing_if = "omit_kind")]
    kind: Option<SchemaKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    properties: Option<BTreeMap<String, SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    required: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    items: Option<Box<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    additional_properties: Option<Box<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    any_of: Option<Vec<SchemaNode>>,
    #[serde(
        rename = "enum",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    enum_values: Option<Vec<Value>>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nullable: Option<bool>,
}

// Unions are expressed through `anyOf` alone.
#[allow(clippy::ref_option)]
fn omit_kind(kind: &Option<SchemaKind>) -> bool {
    matches!(kind, None | Some(SchemaKind::Union))
}

// Keeps an explicit `"default": null` instead of collapsing it to "no default".
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl SchemaNode {
    /// Schema accepting any value.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    fn of_kind(kind: SchemaKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Schema for the `null` literal.
    #[must_use]
    pub fn null() -> Self {
        Self::of_kind(SchemaKind::Null)
    }

    /// Schema for strings.
    #[must_use]
    pub fn string() -> Self {
        Self::of_kind(SchemaKind::String)
    }

    /// Schema for integers.
    #[must_use]
    pub fn integer() -> Self {
        Self::of_kind(SchemaKind::Integer)
    }

    /// Schema for arbitrary numbers.
    #[must_use]
    pub fn number() -> Self {
        Self::of_kind(SchemaKind::Number)
    }

    /// Schema for booleans.
    #[must_use]
    pub fn boolean() -> Self {
        Self::of_kind(SchemaKind::Boolean)
    }

    /// Object schema with no properties yet.
    #[must_use]
    pub fn object() -> Self {
        Self {
            kind: Some(SchemaKind::Object),
            properties: Some(BTreeMap::new()),
            ..Self::default()
        }
    }

    /// Object schema accepting any parameters and requiring none.
    ///
    /// This is the fallback used whenever a schema cannot be derived.
    #[must_use]
    pub fn permissive() -> Self {
        Self::object()
    }

    /// Array schema whose elements match `items`.
    #[must_use]
    pub fn array(items: SchemaNode) -> Self {
        Self {
            kind: Some(SchemaKind::Array),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    /// String-keyed map schema whose values match `values`.
    #[must_use]
    pub fn map(values: SchemaNode) -> Self {
        Self {
            kind: Some(SchemaKind::Object),
            additional_properties: Some(Box::new(values)),
            ..Self::default()
        }
    }

    /// Union schema accepting any of the supplied members.
    #[must_use]
    pub fn union(members: Vec<SchemaNode>) -> Self {
        Self {
            kind: Some(SchemaKind::Union),
            any_of: Some(members),
            ..Self::default()
        }
    }

    /// Closed set of literal values sharing `kind`.
    #[must_use]
    pub fn enumeration(kind: SchemaKind, values: Vec<Value>) -> Self {
        Self {
            kind: Some(kind),
            enum_values: Some(values),
            ..Self::default()
        }
    }

    /// Adds a named property, marking it required when requested.
    ///
    /// Has no effect on the `required` list when the property is optional.
    #[must_use]
    pub fn with_property(
        mut self,
        name: impl Into<String>,
        schema: SchemaNode,
        required: bool,
    ) -> Self {
        let name = name.into();
        if required {
            let list = self.required.get_or_insert_with(Vec::new);
            if !list.contains(&name) {
                list.push(name.clone());
            }
        }
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(name, schema);
        self
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Marks the node as also accepting `null`.
    #[must_use]
    pub fn into_nullable(mut self) -> Self {
        self.nullable = Some(true);
        self
    }

    /// Returns the node kind, or `None` when the node accepts any value.
    #[must_use]
    pub fn kind(&self) -> Option<SchemaKind> {
        self.kind
            .or_else(|| self.any_of.as_ref().map(|_| SchemaKind::Union))
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the object properties, if this node declares any.
    #[must_use]
    pub fn properties(&self) -> Option<&BTreeMap<String, SchemaNode>> {
        self.properties.as_ref()
    }

    /// Looks up a single property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties.as_ref()?.get(name)
    }

    /// Returns the required property names in declaration order.
    #[must_use]
    pub fn required(&self) -> &[String] {
        self.required.as_deref().unwrap_or_default()
    }

    /// Returns the element schema of an array node.
    #[must_use]
    pub fn items(&self) -> Option<&SchemaNode> {
        self.items.as_deref()
    }

    /// Returns the value schema of a map node.
    #[must_use]
    pub fn additional_properties(&self) -> Option<&SchemaNode> {
        self.additional_properties.as_deref()
    }

    /// Returns the alternatives of a union node.
    #[must_use]
    pub fn any_of(&self) -> &[SchemaNode] {
        self.any_of.as_deref().unwrap_or_default()
    }

    /// Returns the literal values of an enumeration node.
    #[must_use]
    pub fn enum_values(&self) -> Option<&[Value]> {
        self.enum_values.as_deref()
    }

    /// Returns the default value, if any.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns `true` when the node also accepts `null`.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable.unwrap_or(false)
    }

    /// Returns `true` for the "anything goes" object schema.
    #[must_use]
    pub fn is_permissive(&self) -> bool {
        self.kind == Some(SchemaKind::Object)
            && self.properties.as_ref().is_some_and(BTreeMap::is_empty)
            && self.required().is_empty()
            && self.additional_properties.is_none()
    }

    /// Renders the node as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        // Only string-keyed maps and plain values are stored, so this cannot fail.
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
    }
}

impl From<SchemaNode> for Value {
    fn from(node: SchemaNode) -> Self {
        node.to_value()
    }
}
