//! Builder-style registration facade.
//!
//! [`tool`] is the runtime counterpart of the `#[tool]` attribute: it collects
//! the same options, resolves a parameter schema, and registers an invoker in
//! a registry. [`ToolOptions::wrap`] also hands back the original callable in
//! a [`WrappedTool`] that exposes the resolved metadata.

use std::ops::Deref;

use crate::error::ToolResult;
use crate::generator::generate_schema;
use crate::global::default_registry;
use crate::metadata::{
    DEFAULT_CATEGORY, DEFAULT_VERSION, Provenance, ToolMetadata, ToolRegistration,
};
use crate::registry::ToolRegistry;
use crate::schema::SchemaNode;
use crate::signature::Signature;
use crate::tool::ToolInvoker;

/// Starts a tool declaration with the given description.
///
/// ```
/// use agent_tools::{Param, Signature, ToolInvoker, ToolRegistry, TypeDescriptor, tool};
/// use serde_json::json;
///
/// let registry = ToolRegistry::new();
/// let signature = Signature::new("shout").param(Param::new("text", TypeDescriptor::text()));
/// let invoker = ToolInvoker::from_sync(signature, |args| {
///     Ok(json!(args["text"].as_str().unwrap_or_default().to_uppercase()))
/// });
///
/// let metadata = tool("Upper-cases text")
///     .category("text")
///     .register_in(&registry, invoker)
///     .unwrap();
/// assert_eq!(metadata.name(), "shout");
/// assert_eq!(registry.list_tools(Some("text")), vec!["shout".to_owned()]);
/// ```
#[must_use]
pub fn tool(description: impl Into<String>) -> ToolOptions {
    ToolOptions::new(description)
}

/// Options accepted by the registration facade.
#[derive(Clone, Debug)]
pub struct ToolOptions {
    description: String,
    parameters: Option<SchemaNode>,
    name: Option<String>,
    category: String,
    version: String,
    enabled: bool,
    auto_schema: bool,
    auto_register: bool,
    provenance: Option<Provenance>,
}

impl ToolOptions {
    /// Creates options with defaults for everything but the description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            parameters: None,
            name: None,
            category: DEFAULT_CATEGORY.to_owned(),
            version: DEFAULT_VERSION.to_owned(),
            enabled: true,
            auto_schema: true,
            auto_register: true,
            provenance: None,
        }
    }

    /// Uses an explicit parameter schema instead of deriving one.
    #[must_use]
    pub fn parameters(mut self, parameters: SchemaNode) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Overrides the tool name, which otherwise comes from the signature.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
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

    /// Controls schema derivation when no explicit schema is given.
    #[must_use]
    pub fn auto_schema(mut self, auto_schema: bool) -> Self {
        self.auto_schema = auto_schema;
        self
    }

    /// Controls bridging into an attached runtime.
    #[must_use]
    pub fn auto_register(mut self, auto_register: bool) -> Self {
        self.auto_register = auto_register;
        self
    }

    /// Records where the tool was declared. Defaults to the caller of the
    /// registering method.
    #[must_use]
    pub fn provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }

    /// Resolves the parameter schema: explicit, then derived, then permissive.
    #[must_use]
    pub fn resolve_schema(&self, signature: &Signature) -> SchemaNode {
        match &self.parameters {
            Some(parameters) => parameters.clone(),
            None if self.auto_schema => generate_schema(signature),
            None => SchemaNode::permissive(),
        }
    }

    /// Builds the registration without submitting it.
    #[must_use]
    #[track_caller]
    pub fn into_registration(self, invoker: ToolInvoker) -> ToolRegistration {
        let provenance = match self.provenance.clone() {
            Some(provenance) => provenance,
            None => Provenance::caller(),
        };
        let parameters = self.resolve_schema(invoker.signature());
        let name = self
            .name
            .unwrap_or_else(|| invoker.signature().name().to_owned());
        ToolRegistration::new(name, invoker)
            .description(self.description)
            .parameters(parameters)
            .category(self.category)
            .version(self.version)
            .enabled(self.enabled)
            .auto_register(self.auto_register)
            .provenance(provenance)
    }

    /// Registers `invoker` in `registry` and returns the stored metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Validation`](crate::ToolError::Validation) when
    /// the explicit options or the signature are structurally invalid.
    #[track_caller]
    pub fn register_in(
        self,
        registry: &ToolRegistry,
        invoker: ToolInvoker,
    ) -> ToolResult<ToolMetadata> {
        registry.register(self.into_registration(invoker))
    }

    /// Registers `invoker` in the default registry.
    ///
    /// # Errors
    ///
    /// See [`ToolOptions::register_in`].
    #[track_caller]
    pub fn register(self, invoker: ToolInvoker) -> ToolResult<ToolMetadata> {
        self.register_in(default_registry(), invoker)
    }

    /// Registers `invoker` in `registry` and wraps `callable` with the
    /// resulting metadata.
    ///
    /// # Errors
    ///
    /// See [`ToolOptions::register_in`].
    #[track_caller]
    pub fn wrap_in<F>(
        self,
        registry: &ToolRegistry,
        callable: F,
        invoker: ToolInvoker,
    ) -> ToolResult<WrappedTool<F>> {
        let metadata = self.register_in(registry, invoker)?;
        Ok(WrappedTool { callable, metadata })
    }

    /// Like [`ToolOptions::wrap_in`], against the default registry.
    ///
    /// # Errors
    ///
    /// See [`ToolOptions::register_in`].
    #[track_caller]
    pub fn wrap<F>(self, callable: F, invoker: ToolInvoker) -> ToolResult<WrappedTool<F>> {
        self.wrap_in(default_registry(), callable, invoker)
    }
}

/// A callable paired with the metadata it was registered under.
///
/// Dereferences to the callable, so `(*wrapped)(args)` calls it unchanged.
#[derive(Clone, Debug)]
pub struct WrappedTool<F> {
    callable: F,
    metadata: ToolMetadata,
}

impl<F> WrappedTool<F> {
    /// Registered tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.metadata.description()
    }

    /// Resolved parameter schema.
    #[must_use]
    pub fn parameters(&self) -> &SchemaNode {
        self.metadata.parameters()
    }

    /// Category.
    #[must_use]
    pub fn category(&self) -> &str {
        self.metadata.category()
    }

    /// Version.
    #[must_use]
    pub fn version(&self) -> &str {
        self.metadata.version()
    }

    /// Enabled flag at registration time.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.metadata.enabled()
    }

    /// Full metadata snapshot taken at registration time.
    #[must_use]
    pub fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    /// Returns the callable.
    pub fn into_inner(self) -> F {
        self.callable
    }
}

impl<F> Deref for WrappedTool<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.callable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;
    use crate::error::ToolError;
    use crate::schema::SchemaKind;
    use crate::signature::Param;
    use serde_json::json;

    fn add(a: i64, b: i64) -> i64 {
        a + b
    }

    fn add_invoker() -> ToolInvoker {
        let signature = Signature::new("add")
            .with_doc("Adds two integers.")
            .param(Param::new("a", TypeDescriptor::integer()))
            .param(Param::new("b", TypeDescriptor::integer()).with_default(&0));
        ToolInvoker::from_sync(signature, |args| {
            let a = args["a"].as_i64().unwrap_or_default();
            let b = args["b"].as_i64().unwrap_or_default();
            Ok(json!(add(a, b)))
        })
    }

    #[test]
    fn defaults_come_from_signature() {
        let registry = ToolRegistry::new();
        let metadata = tool("Adds").register_in(&registry, add_invoker()).unwrap();

        assert_eq!(metadata.name(), "add");
        assert_eq!(metadata.category(), DEFAULT_CATEGORY);
        assert_eq!(metadata.version(), DEFAULT_VERSION);
        assert_eq!(metadata.parameters().required(), ["a".to_owned()]);
        assert!(metadata.provenance().source_location().ends_with("facade.rs"));
    }

    #[test]
    fn schema_resolution_order() {
        let signature = add_invoker().signature().clone();
        let explicit = SchemaNode::object().with_property("x", SchemaNode::string(), true);

        assert_eq!(tool("d").parameters(explicit.clone()).resolve_schema(&signature), explicit);
        assert_eq!(
            tool("d").resolve_schema(&signature).property("a"),
            Some(&SchemaNode::integer())
        );
        assert!(tool("d").auto_schema(false).resolve_schema(&signature).is_permissive());
    }

    #[test]
    fn wrapper_is_transparent() {
        let registry = ToolRegistry::new();
        let wrapped = tool("Adds two integers")
            .name("sum")
            .category("math")
            .version("2.0.0")
            .wrap_in(&registry, add, add_invoker())
            .unwrap();

        assert_eq!((*wrapped)(2, 3), 5);
        assert_eq!(wrapped.name(), "sum");
        assert_eq!(wrapped.category(), "math");
        assert_eq!(wrapped.version(), "2.0.0");
        assert!(wrapped.enabled());
        assert_eq!(wrapped.parameters().kind(), Some(SchemaKind::Object));
        assert!(registry.contains("sum"));
    }

    #[test]
    fn invalid_explicit_input_is_rejected() {
        let registry = ToolRegistry::new();
        let err = tool("bad")
            .parameters(SchemaNode::string())
            .register_in(&registry, add_invoker())
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn unresolvable_types_still_register() {
        let registry = ToolRegistry::new();
        let signature = Signature::new("opaque")
            .param(Param::new("handle", TypeDescriptor::unknown("my_crate::Handle")));
        let invoker = ToolInvoker::from_sync(signature, |_| Ok(json!(null)));

        let metadata = tool("Opaque").register_in(&registry, invoker).unwrap();
        assert_eq!(metadata.parameters().property("handle"), Some(&SchemaNode::string()));
    }
}
