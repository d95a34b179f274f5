//! Registry configuration.

use serde::{Deserialize, Serialize};

/// Settings controlling registry behaviour.
///
/// Deserializes with defaults for missing fields, so it can be embedded in a
/// host application's own configuration file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    collect_declared: bool,
    warn_without_runtime: bool,
}

impl RegistryConfig {
    /// Creates the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            collect_declared: true,
            warn_without_runtime: true,
        }
    }

    /// Controls whether the default registry registers every `#[tool]`
    /// declaration on first use.
    #[must_use]
    pub const fn with_collect_declared(mut self, collect_declared: bool) -> Self {
        self.collect_declared = collect_declared;
        self
    }

    /// Controls whether bridging without an attached runtime logs a warning
    /// (`true`) or a debug event (`false`).
    #[must_use]
    pub const fn with_warn_without_runtime(mut self, warn_without_runtime: bool) -> Self {
        self.warn_without_runtime = warn_without_runtime;
        self
    }

    /// Returns whether declarations are collected on first use.
    #[must_use]
    pub const fn collect_declared(self) -> bool {
        self.collect_declared
    }

    /// Returns whether a missing runtime is reported as a warning.
    #[must_use]
    pub const fn warn_without_runtime(self) -> bool {
        self.warn_without_runtime
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new()
    }
}
