//! Adapter boundary towards an external tool execution runtime.
//!
//! The runtime owns dispatch, timeouts, retries, and circuit breaking. The
//! registry only hands it registrations; failures there never undo a local
//! registration.

use crate::error::ToolResult;
use crate::schema::SchemaNode;
use crate::tool::ToolInvoker;

/// Registration payload handed to an external execution runtime.
#[derive(Clone, Debug)]
pub struct RuntimeRegistration {
    /// Tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Object schema of the tool parameters.
    pub parameters: SchemaNode,
    /// Invoker that binds named arguments, applies defaults, calls the tool
    /// body, and returns canonical JSON.
    pub invoker: ToolInvoker,
    /// Category label.
    pub category: String,
    /// Semantic version string.
    pub version: String,
    /// Enabled flag at the time of bridging.
    pub enabled: bool,
}

/// Trait implemented by execution runtimes that accept bridged tools.
pub trait ToolRuntime: Send + Sync {
    /// Registers a tool with the runtime.
    ///
    /// # Errors
    ///
    /// Implementations return
    /// [`ToolError::BridgingUnavailable`](crate::ToolError::BridgingUnavailable)
    /// when they are unreachable or misconfigured.
    fn register_tool(&self, registration: RuntimeRegistration) -> ToolResult<()>;
}
