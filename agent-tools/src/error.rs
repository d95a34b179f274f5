//! Error definitions shared by the registry, facade, and invocation layers.

use thiserror::Error;

/// Result alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors produced by tool registration and invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A registration failed structural validation.
    #[error("invalid tool registration: {reason}")]
    Validation {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Requested tool does not exist.
    #[error("tool `{name}` is not registered")]
    UnknownTool {
        /// Name of the missing tool.
        name: String,
    },

    /// Requested tool exists but is currently disabled.
    #[error("tool `{name}` is disabled")]
    DisabledTool {
        /// Name of the disabled tool.
        name: String,
    },

    /// Supplied arguments could not be bound to the tool signature.
    #[error("invalid arguments for tool `{tool}`: {reason}")]
    InvalidArguments {
        /// Name of the tool being invoked.
        tool: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Tool execution failed.
    #[error("tool execution failed: {reason}")]
    Execution {
        /// Human-readable error returned by the tool implementation.
        reason: String,
    },

    /// The external execution runtime is missing or refused the tool.
    #[error("tool runtime unavailable: {reason}")]
    BridgingUnavailable {
        /// Human-readable context provided by the runtime.
        reason: String,
    },

    /// Registry configuration was invalid or applied too late.
    #[error("invalid registry configuration: {0}")]
    InvalidConfig(&'static str),
}

impl ToolError {
    /// Creates a validation error from the supplied reason.
    #[must_use]
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Creates an execution error from the supplied reason.
    #[must_use]
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }

    /// Creates an argument binding error for the named tool.
    #[must_use]
    pub fn invalid_arguments(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Creates a bridging error from the supplied reason.
    #[must_use]
    pub fn bridging_unavailable(reason: impl Into<String>) -> Self {
        Self::BridgingUnavailable {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err =
            ToolError::invalid_arguments("get_weather", "missing required argument `location`");
        let rendered = err.to_string();
        assert!(rendered.contains("get_weather"));
        assert!(rendered.contains("location"));

        let err = ToolError::UnknownTool {
            name: "missing".into(),
        };
        assert_eq!(err.to_string(), "tool `missing` is not registered");
    }
}
