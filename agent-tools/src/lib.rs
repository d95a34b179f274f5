//! Tool declaration, schema derivation, and registry utilities.
//!
//! Functions become tools either with the `#[tool]` attribute, which derives
//! the parameter schema from the signature at compile time, or with the
//! [`tool`] builder for callables assembled at runtime. Registered tools are
//! catalogued by a [`ToolRegistry`], surfaced to language models through
//! [`ToolRegistry::get_tool_definitions`], and optionally bridged into an
//! external [`ToolRuntime`].
//!
//! ```
//! use agent_tools::{DeclaredTool, ToolRegistry, tool};
//! use serde_json::json;
//!
//! #[tool(description = "Get the current weather for a location")]
//! fn get_weather(
//!     location: String,
//!     #[param(default = "fahrenheit")] unit: String,
//! ) -> serde_json::Value {
//!     json!({ "location": location, "unit": unit })
//! }
//!
//! # fn main() {
//! let registry = ToolRegistry::new();
//! GetWeatherTool::register_in(&registry).unwrap();
//!
//! let definitions = registry.get_tool_definitions();
//! assert_eq!(definitions[0].name, "get_weather");
//! assert_eq!(
//!     serde_json::to_value(&definitions[0].parameters).unwrap(),
//!     json!({
//!         "type": "object",
//!         "properties": {
//!             "location": {"type": "string"},
//!             "unit": {"type": "string", "default": "fahrenheit"}
//!         },
//!         "required": ["location"]
//!     })
//! );
//! # }
//! ```

#![warn(missing_docs, clippy::pedantic)]

pub mod config;
pub mod descriptor;
pub mod docs;
pub mod error;
pub mod facade;
pub mod generator;
pub mod global;
pub mod macros;
pub mod metadata;
mod output;
pub mod registry;
pub mod runtime;
pub mod schema;
pub mod signature;
pub mod tool;

pub use config::RegistryConfig;
pub use descriptor::{ScalarKind, ToolParam, TypeDescriptor};
pub use docs::DocComment;
pub use error::{ToolError, ToolResult};
pub use facade::{ToolOptions, WrappedTool, tool};
pub use generator::{SchemaError, generate_schema, try_generate_schema, type_to_schema};
pub use global::{
    clear_tools, default_registry, disable_tool, enable_tool, get_tool, get_tool_definitions,
    init_default_registry, list_categories, list_tools, register_tool, unregister_tool,
};
pub use macros::{DeclaredTool, ToolDeclaration, ToolParam, tool};
pub use metadata::{
    DEFAULT_CATEGORY, DEFAULT_VERSION, Provenance, ToolDefinition, ToolMetadata, ToolRegistration,
};
pub use registry::ToolRegistry;
pub use runtime::{RuntimeRegistration, ToolRuntime};
pub use schema::{SchemaKind, SchemaNode};
pub use signature::{Param, Signature};
pub use tool::{Tool, ToolFuture, ToolInvoker};

#[doc(hidden)]
pub mod __private {
    pub use crate::output::{
        OutcomeProbe, OutputProbe, TypeProbe, ViaDebug, ViaDisplay, ViaResult, ViaSerialize,
        ViaSerializeOrDebug, ViaToolParam, ViaUnknownType, ViaValue, take_argument,
    };
    pub use inventory;
    pub use serde_json::{Map, Value};
}
