//! Compile-time tool declarations produced by `#[tool]`.
//!
//! Every annotated function contributes one [`ToolDeclaration`] to a
//! link-time collection and gets a companion unit struct implementing
//! [`DeclaredTool`].

use serde_json::{Map, Value};

use crate::error::ToolResult;
use crate::facade::ToolOptions;
use crate::global::default_registry;
use crate::metadata::{Provenance, ToolMetadata};
use crate::registry::ToolRegistry;
use crate::schema::SchemaNode;
use crate::signature::Signature;
use crate::tool::{ToolFuture, ToolInvoker};

pub use agent_tools_macros::{ToolParam, tool};

/// Static description of a `#[tool]` function.
///
/// Values are built by the attribute macro; the fields are public so the
/// generated code can construct them in a `const` context.
#[derive(Clone, Copy, Debug)]
pub struct ToolDeclaration {
    /// Tool name.
    pub name: &'static str,
    /// Description, taken from the attribute or the doc summary.
    pub description: &'static str,
    /// Category label.
    pub category: &'static str,
    /// Version string.
    pub version: &'static str,
    /// Initial enabled flag.
    pub enabled: bool,
    /// Whether the schema is derived from the signature.
    pub auto_schema: bool,
    /// Whether the tool is bridged into an attached runtime.
    pub auto_register: bool,
    /// Explicit schema provider, overriding derivation.
    pub parameters: Option<fn() -> SchemaNode>,
    /// Builds the declared signature.
    pub signature: fn() -> Signature,
    /// Decodes bound arguments, calls the function, and encodes its output.
    pub invoke: fn(Map<String, Value>) -> ToolFuture,
    /// File the function is declared in.
    pub source_file: &'static str,
    /// Line of the function name.
    pub source_line: u32,
    /// Module path of the declaration.
    pub module_path: &'static str,
}

inventory::collect!(ToolDeclaration);

impl ToolDeclaration {
    /// Every declaration linked into the current binary, in no particular order.
    pub fn all() -> impl Iterator<Item = &'static ToolDeclaration> {
        inventory::iter::<ToolDeclaration>.into_iter()
    }

    /// Builds the declared signature.
    #[must_use]
    pub fn signature(&self) -> Signature {
        (self.signature)()
    }

    /// Builds an invoker over the generated binding.
    #[must_use]
    pub fn invoker(&self) -> ToolInvoker {
        ToolInvoker::new(self.signature(), self.invoke)
    }

    /// Declaration site.
    #[must_use]
    pub fn provenance(&self) -> Provenance {
        Provenance::new(self.source_file, self.source_line)
    }

    /// Facade options equivalent to the attribute arguments.
    #[must_use]
    pub fn options(&self) -> ToolOptions {
        let mut options = ToolOptions::new(self.description)
            .name(self.name)
            .category(self.category)
            .version(self.version)
            .enabled(self.enabled)
            .auto_schema(self.auto_schema)
            .auto_register(self.auto_register)
            .provenance(self.provenance());
        if let Some(parameters) = self.parameters {
            options = options.parameters(parameters());
        }
        options
    }

    /// Resolved parameter schema.
    #[must_use]
    pub fn parameters(&self) -> SchemaNode {
        self.options().resolve_schema(&self.signature())
    }

    /// Registers the tool in `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Validation`](crate::ToolError::Validation) when
    /// the declaration is structurally invalid, for example an explicit
    /// schema that is not an object.
    pub fn register_in(&self, registry: &ToolRegistry) -> ToolResult<ToolMetadata> {
        self.options().register_in(registry, self.invoker())
    }
}

/// Implemented by the companion struct `#[tool]` emits next to each function.
///
/// For `fn get_weather(..)` the companion is `GetWeatherTool`.
pub trait DeclaredTool {
    /// The static declaration.
    fn declaration() -> &'static ToolDeclaration;

    /// Tool name.
    #[must_use]
    fn name() -> &'static str {
        Self::declaration().name
    }

    /// Description.
    #[must_use]
    fn description() -> &'static str {
        Self::declaration().description
    }

    /// Category.
    #[must_use]
    fn category() -> &'static str {
        Self::declaration().category
    }

    /// Version.
    #[must_use]
    fn version() -> &'static str {
        Self::declaration().version
    }

    /// Initial enabled flag.
    #[must_use]
    fn enabled() -> bool {
        Self::declaration().enabled
    }

    /// Resolved parameter schema.
    #[must_use]
    fn parameters() -> SchemaNode {
        Self::declaration().parameters()
    }

    /// Declared signature.
    #[must_use]
    fn signature() -> Signature {
        Self::declaration().signature()
    }

    /// Invoker over the generated binding.
    #[must_use]
    fn invoker() -> ToolInvoker {
        Self::declaration().invoker()
    }

    /// Registers the tool in `registry`.
    ///
    /// # Errors
    ///
    /// See [`ToolDeclaration::register_in`].
    fn register_in(registry: &ToolRegistry) -> ToolResult<ToolMetadata> {
        Self::declaration().register_in(registry)
    }

    /// Registers the tool in the default registry.
    ///
    /// # Errors
    ///
    /// See [`ToolDeclaration::register_in`].
    fn register() -> ToolResult<ToolMetadata> {
        Self::declaration().register_in(default_registry())
    }
}
