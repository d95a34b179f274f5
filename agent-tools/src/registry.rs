//! Runtime registry for tool metadata, categories, and invocation.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::error::{ToolError, ToolResult};
use crate::macros::ToolDeclaration;
use crate::metadata::{ToolDefinition, ToolMetadata, ToolRegistration};
use crate::runtime::{RuntimeRegistration, ToolRuntime};
use crate::tool::Tool;

#[derive(Debug, Default)]
struct Catalogue {
    tools: HashMap<String, ToolMetadata>,
    categories: HashMap<String, BTreeSet<String>>,
}

impl Catalogue {
    fn insert(&mut self, metadata: ToolMetadata) -> Option<ToolMetadata> {
        let name = metadata.name().to_owned();
        let category = metadata.category().to_owned();
        let previous = self.tools.insert(name.clone(), metadata);
        if let Some(previous) = &previous {
            self.forget_category(previous.category(), &name);
        }
        self.categories.entry(category).or_default().insert(name);
        previous
    }

    fn remove(&mut self, name: &str) -> Option<ToolMetadata> {
        let removed = self.tools.remove(name)?;
        self.forget_category(removed.category(), name);
        Some(removed)
    }

    fn forget_category(&mut self, category: &str, name: &str) {
        if let Some(names) = self.categories.get_mut(category) {
            names.remove(name);
            if names.is_empty() {
                self.categories.remove(category);
            }
        }
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        for (category, names) in &self.categories {
            assert!(!names.is_empty(), "empty category `{category}` retained");
            for name in names {
                let tool = self.tools.get(name).expect("indexed tool exists");
                assert_eq!(tool.category(), category);
            }
        }
        for tool in self.tools.values() {
            assert!(self.categories[tool.category()].contains(tool.name()));
        }
    }
}

/// Catalogue of tools indexed by name and by category.
///
/// All mutations take a single write lock, so the name and category indices
/// are never observed out of step. Bridging into an attached
/// [`ToolRuntime`] happens after the lock is released.
pub struct ToolRegistry {
    inner: RwLock<Catalogue>,
    runtime: RwLock<Option<Arc<dyn ToolRuntime>>>,
    config: RegistryConfig,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("registered", &self.list_tools(None))
            .field("categories", &self.list_categories())
            .field("runtime", &self.current_runtime().is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_config(RegistryConfig::default())
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the supplied configuration.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            inner: RwLock::new(Catalogue::default()),
            runtime: RwLock::new(None),
            config,
        }
    }

    /// Attaches a runtime at construction time.
    #[must_use]
    pub fn with_runtime(self, runtime: Arc<dyn ToolRuntime>) -> Self {
        *self.runtime.write().unwrap_or_else(PoisonError::into_inner) = Some(runtime);
        self
    }

    /// Returns the registry configuration.
    #[must_use]
    pub const fn config(&self) -> RegistryConfig {
        self.config
    }

    fn read(&self) -> RwLockReadGuard<'_, Catalogue> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Catalogue> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_runtime(&self) -> Option<Arc<dyn ToolRuntime>> {
        self.runtime
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Registers a tool, replacing any tool with the same name, and returns
    /// the metadata as stored.
    ///
    /// When the registration asks for it, the tool is then bridged into the
    /// attached runtime. Bridging problems are logged and never fail the call.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Validation`] if the registration is structurally
    /// invalid; the registry is left untouched in that case.
    pub fn register(&self, registration: ToolRegistration) -> ToolResult<ToolMetadata> {
        registration.validate()?;
        let metadata = registration.into_metadata();
        let bridge = metadata
            .auto_register()
            .then(|| metadata.runtime_registration());
        let name = metadata.name().to_owned();
        let category = metadata.category().to_owned();

        let previous = self.write().insert(metadata.clone());
        match previous {
            Some(previous) => info!(
                tool = %name,
                category = %category,
                previous_category = %previous.category(),
                "tool re-registered"
            ),
            None => info!(tool = %name, category = %category, "tool registered"),
        }

        if let Some(registration) = bridge {
            self.bridge(registration);
        }
        Ok(metadata)
    }

    fn bridge(&self, registration: RuntimeRegistration) {
        let name = registration.name.clone();
        let Some(runtime) = self.current_runtime() else {
            let err = ToolError::bridging_unavailable("no execution runtime attached");
            if self.config.warn_without_runtime() {
                warn!(tool = %name, error = %err, "tool registered locally only");
            } else {
                debug!(tool = %name, error = %err, "tool registered locally only");
            }
            return;
        };

        match runtime.register_tool(registration) {
            Ok(()) => debug!(tool = %name, "tool bridged into execution runtime"),
            Err(err) => warn!(
                tool = %name,
                error = %err,
                "failed to bridge tool into execution runtime; keeping local registration"
            ),
        }
    }

    /// Attaches `runtime` and bridges every registered tool that asked for it.
    ///
    /// Returns the number of tools handed to the runtime.
    pub fn attach_runtime(&self, runtime: Arc<dyn ToolRuntime>) -> usize {
        *self.runtime.write().unwrap_or_else(PoisonError::into_inner) = Some(runtime);

        let pending: Vec<RuntimeRegistration> = self
            .read()
            .tools
            .values()
            .filter(|tool| tool.auto_register())
            .map(ToolMetadata::runtime_registration)
            .collect();
        let count = pending.len();
        for registration in pending {
            self.bridge(registration);
        }
        count
    }

    /// Detaches the current runtime, if any.
    pub fn detach_runtime(&self) -> Option<Arc<dyn ToolRuntime>> {
        self.runtime
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Registers every `#[tool]` declaration linked into the binary.
    ///
    /// Declarations that fail validation are logged and skipped. Returns the
    /// number registered.
    pub fn register_declared(&self) -> usize {
        let mut registered = 0;
        for declaration in ToolDeclaration::all() {
            match declaration.register_in(self) {
                Ok(_) => registered += 1,
                Err(err) => warn!(
                    tool = declaration.name,
                    source_file = declaration.source_file,
                    source_line = declaration.source_line,
                    error = %err,
                    "skipping invalid tool declaration"
                ),
            }
        }
        registered
    }

    /// Removes a tool. Returns `false` when no tool has that name.
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self.write().remove(name).is_some();
        if removed {
            info!(tool = %name, "tool unregistered");
        }
        removed
    }

    /// Returns a snapshot of the tool's metadata.
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<ToolMetadata> {
        self.read().tools.get(name).cloned()
    }

    /// Returns `true` when a tool with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.read().tools.contains_key(name)
    }

    /// Lists tool names in ascending order, optionally restricted to a category.
    #[must_use]
    pub fn list_tools(&self, category: Option<&str>) -> Vec<String> {
        let catalogue = self.read();
        match category {
            Some(category) => catalogue
                .categories
                .get(category)
                .map(|names| names.iter().cloned().collect())
                .unwrap_or_default(),
            None => {
                let mut names: Vec<String> = catalogue.tools.keys().cloned().collect();
                names.sort_unstable();
                names
            }
        }
    }

    /// Lists categories in ascending order.
    #[must_use]
    pub fn list_categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self.read().categories.keys().cloned().collect();
        categories.sort_unstable();
        categories
    }

    /// Enables a tool. Returns `false` when no tool has that name.
    pub fn enable(&self, name: &str) -> bool {
        self.set_enabled(name, true)
    }

    /// Disables a tool. Returns `false` when no tool has that name.
    pub fn disable(&self, name: &str) -> bool {
        self.set_enabled(name, false)
    }

    fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        let mut catalogue = self.write();
        let Some(tool) = catalogue.tools.get_mut(name) else {
            return false;
        };
        tool.set_enabled(enabled);
        debug!(tool = %name, enabled, "tool enablement changed");
        true
    }

    /// Definitions of every enabled tool, sorted by name.
    #[must_use]
    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .read()
            .tools
            .values()
            .filter(|tool| tool.enabled())
            .map(ToolMetadata::definition)
            .collect();
        definitions.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Removes every tool and category.
    pub fn clear(&self) {
        let mut catalogue = self.write();
        let count = catalogue.tools.len();
        catalogue.tools.clear();
        catalogue.categories.clear();
        info!(count, "tool registry cleared");
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().tools.len()
    }

    /// Returns `true` when no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().tools.is_empty()
    }

    /// Invokes an enabled tool with a JSON object of named arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] or [`ToolError::DisabledTool`] when
    /// the tool cannot be called, and propagates binding and execution errors.
    pub async fn invoke(&self, name: &str, input: Value) -> ToolResult<Value> {
        let invoker = {
            let catalogue = self.read();
            let tool = catalogue.tools.get(name).ok_or_else(|| ToolError::UnknownTool {
                name: name.to_owned(),
            })?;
            if !tool.enabled() {
                return Err(ToolError::DisabledTool {
                    name: name.to_owned(),
                });
            }
            tool.invoker().clone()
        };
        invoker.invoke(input).await
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        self.read().assert_consistent();
    }
}
