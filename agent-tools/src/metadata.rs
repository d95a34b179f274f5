//! Tool metadata stored by the registry.

use std::panic::Location;

use serde::{Deserialize, Serialize};

use crate::error::{ToolError, ToolResult};
use crate::runtime::RuntimeRegistration;
use crate::schema::{SchemaKind, SchemaNode};
use crate::signature::Signature;
use crate::tool::ToolInvoker;

/// Category assigned when none is given.
pub const DEFAULT_CATEGORY: &str = "general";

/// Version assigned when none is given.
pub const DEFAULT_VERSION: &str = "1.0.0";

const MAX_NAME_LEN: usize = 64;

/// Source location a tool was declared at.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provenance {
    source_location: String,
    source_line: u32,
}

impl Provenance {
    /// Creates a provenance record.
    #[must_use]
    pub fn new(source_location: impl Into<String>, source_line: u32) -> Self {
        Self {
            source_location: source_location.into(),
            source_line,
        }
    }

    /// Records the location of the caller.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line())
    }

    /// Source file path.
    #[must_use]
    pub fn source_location(&self) -> &str {
        &self.source_location
    }

    /// One-based source line.
    #[must_use]
    pub const fn source_line(&self) -> u32 {
        self.source_line
    }
}

/// Payload surfaced to the language model for an enabled tool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Object schema of the tool parameters.
    pub parameters: SchemaNode,
}

/// Metadata describing a registered tool.
#[derive(Clone, Debug)]
pub struct ToolMetadata {
    name: String,
    description: String,
    parameters: SchemaNode,
    category: String,
    version: String,
    enabled: bool,
    auto_register: bool,
    invoker: ToolInvoker,
    provenance: Provenance,
}

impl ToolMetadata {
    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the parameter schema.
    #[must_use]
    pub fn parameters(&self) -> &SchemaNode {
        &self.parameters
    }

    /// Returns the category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the semantic version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns `true` when the tool is offered to the model.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns `true` when the tool is bridged into an attached runtime.
    #[must_use]
    pub const fn auto_register(&self) -> bool {
        self.auto_register
    }

    /// Returns the invoker bound to the tool body.
    #[must_use]
    pub fn invoker(&self) -> &ToolInvoker {
        &self.invoker
    }

    /// Returns the declared signature.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        self.invoker.signature()
    }

    /// Returns where the tool was declared.
    #[must_use]
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Builds the model-facing definition.
    #[must_use]
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
        }
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn runtime_registration(&self) -> RuntimeRegistration {
        RuntimeRegistration {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
            invoker: self.invoker.clone(),
            category: self.category.clone(),
            version: self.version.clone(),
            enabled: self.enabled,
        }
    }
}

/// Everything needed to register a tool.
#[derive(Clone, Debug)]
pub struct ToolRegistration {
    name: String,
    description: String,
    parameters: SchemaNode,
    category: String,
    version: String,
    enabled: bool,
    auto_register: bool,
    invoker: ToolInvoker,
    provenance: Provenance,
}

impl ToolRegistration {
    /// Starts a registration for `name` backed by `invoker`.
    ///
    /// Defaults: empty description, permissive parameters, the
    /// [`DEFAULT_CATEGORY`] and [`DEFAULT_VERSION`], enabled, bridged, and the
    /// caller's location as provenance.
    #[must_use]
    #[track_caller]
    pub fn new(name: impl Into<String>, invoker: ToolInvoker) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            parameters: SchemaNode::permissive(),
            category: DEFAULT_CATEGORY.to_owned(),
            version: DEFAULT_VERSION.to_owned(),
            enabled: true,
            auto_register: true,
            invoker,
            provenance: Provenance::caller(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the parameter schema.
    #[must_use]
    pub fn parameters(mut self, parameters: SchemaNode) -> Self {
        self.parameters = parameters;
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the initial enabled flag.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Controls bridging into an attached runtime.
    #[must_use]
    pub fn auto_register(mut self, auto_register: bool) -> Self {
        self.auto_register = auto_register;
        self
    }

    /// Overrides the recorded provenance.
    #[must_use]
    pub fn provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checks the registration for structural problems.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Validation`] when the name, version, or category is
    /// malformed, the parameter schema is not an object whose required names
    /// are declared properties, or the invoker signature is invalid.
    pub fn validate(&self) -> ToolResult<()> {
        validate_name(&self.name)?;
        if self.version.trim().is_empty() {
            return Err(ToolError::validation(format!(
                "tool `{}` has an empty version",
                self.name
            )));
        }
        if self.category.trim().is_empty() {
            return Err(ToolError::validation(format!(
                "tool `{}` has an empty category",
                self.name
            )));
        }
        if self.parameters.kind() != Some(SchemaKind::Object) {
            return Err(ToolError::validation(format!(
                "parameters of tool `{}` must be an object schema",
                self.name
            )));
        }
        if let Some(missing) = self
            .parameters
            .required()
            .iter()
            .find(|name| self.parameters.property(name).is_none())
        {
            return Err(ToolError::validation(format!(
                "tool `{}` requires undeclared parameter `{missing}`",
                self.name
            )));
        }
        self.invoker.signature().validate()
    }

    pub(crate) fn into_metadata(self) -> ToolMetadata {
        ToolMetadata {
            name: self.name,
            description: self.description,
            parameters: self.parameters,
            category: self.category,
            version: self.version,
            enabled: self.enabled,
            auto_register: self.auto_register,
            invoker: self.invoker,
            provenance: self.provenance,
        }
    }
}

fn validate_name(name: &str) -> ToolResult<()> {
    if name.is_empty() {
        return Err(ToolError::validation("tool name cannot be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ToolError::validation(format!(
            "tool name `{name}` must be at most {MAX_NAME_LEN} bytes"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(ToolError::validation(format!(
            "tool name `{name}` must contain only ASCII alphanumerics, dash, underscore, or dot"
        )));
    }
    Ok(())
}
