//! Process-wide default registry.
//!
//! The registry is created on first use. Unless configured otherwise, every
//! `#[tool]` declaration linked into the binary is registered at that point.

use std::sync::OnceLock;

use tracing::debug;

use crate::config::RegistryConfig;
use crate::error::{ToolError, ToolResult};
use crate::metadata::{ToolDefinition, ToolMetadata, ToolRegistration};
use crate::registry::ToolRegistry;

static DEFAULT_REGISTRY: OnceLock<ToolRegistry> = OnceLock::new();

fn build(config: RegistryConfig) -> ToolRegistry {
    let registry = ToolRegistry::with_config(config);
    if config.collect_declared() {
        let count = registry.register_declared();
        debug!(count, "collected declared tools into default registry");
    }
    registry
}

/// Returns the default registry, creating it with [`RegistryConfig::default`]
/// on first use.
pub fn default_registry() -> &'static ToolRegistry {
    DEFAULT_REGISTRY.get_or_init(|| build(RegistryConfig::default()))
}

/// Creates the default registry with `config`.
///
/// # Errors
///
/// Returns [`ToolError::InvalidConfig`] when the default registry already
/// exists.
pub fn init_default_registry(config: RegistryConfig) -> ToolResult<&'static ToolRegistry> {
    let mut installed = false;
    let registry = DEFAULT_REGISTRY.get_or_init(|| {
        installed = true;
        build(config)
    });
    if installed {
        Ok(registry)
    } else {
        Err(ToolError::InvalidConfig(
            "default tool registry is already initialized",
        ))
    }
}

/// Registers a tool in the default registry.
///
/// # Errors
///
/// See [`ToolRegistry::register`].
pub fn register_tool(registration: ToolRegistration) -> ToolResult<ToolMetadata> {
    default_registry().register(registration)
}

/// Removes a tool from the default registry.
pub fn unregister_tool(name: &str) -> bool {
    default_registry().unregister(name)
}

/// Looks a tool up in the default registry.
#[must_use]
pub fn get_tool(name: &str) -> Option<ToolMetadata> {
    default_registry().get_tool(name)
}

/// Lists tools in the default registry.
#[must_use]
pub fn list_tools(category: Option<&str>) -> Vec<String> {
    default_registry().list_tools(category)
}

/// Lists categories in the default registry.
#[must_use]
pub fn list_categories() -> Vec<String> {
    default_registry().list_categories()
}

/// Enables a tool in the default registry.
pub fn enable_tool(name: &str) -> bool {
    default_registry().enable(name)
}

/// Disables a tool in the default registry.
pub fn disable_tool(name: &str) -> bool {
    default_registry().disable(name)
}

/// Definitions of every enabled tool in the default registry.
#[must_use]
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    default_registry().get_tool_definitions()
}

/// Empties the default registry.
pub fn clear_tools() {
    default_registry().clear();
}
