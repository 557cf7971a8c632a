//! Component registry — the declared components and their load state.
//!
//! The registry preserves declaration order, which is the order
//! [`Loader::initialize_all`](crate::Loader::initialize_all) walks it in.

use std::collections::HashMap;

use crate::config::ComponentEntry;
use crate::error::RegistryError;

/// Where a component is in its load lifecycle.
///
/// Transitions only move forward: `Declared -> Requested -> Loaded`, or
/// straight to `Loaded` if a component announces itself unrequested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadState {
    /// Known, never requested.
    Declared,
    /// A script has been injected but the component has not announced itself.
    Requested,
    /// The component called back.
    Loaded,
}

/// A declared component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
    name: String,
    source: String,
    state: LoadState,
}

impl ComponentDescriptor {
    /// Create an unrequested descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            state: LoadState::Declared,
        }
    }

    /// Registry key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source location relative to the base path.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Returns `true` once the component has announced itself.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    pub(crate) fn mark_requested(&mut self) {
        if self.state == LoadState::Declared {
            self.state = LoadState::Requested;
        }
    }

    /// Returns `true` if this call performed the transition.
    pub(crate) fn mark_loaded(&mut self) -> bool {
        let changed = self.state != LoadState::Loaded;
        self.state = LoadState::Loaded;
        changed
    }
}

/// All components known to the loader.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    /// Descriptors in declaration order.
    components: Vec<ComponentDescriptor>,
    /// Name to position in `components`.
    index: HashMap<String, usize>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configuration entries, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] on an empty or duplicate name.
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = &'a ComponentEntry>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for entry in entries {
            registry.register(entry.name.clone(), entry.file.clone())?;
        }
        Ok(registry)
    }

    /// Declare a new component.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the name is taken, or
    /// [`RegistryError::EmptyName`] for an empty name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.index.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.index.insert(name.clone(), self.components.len());
        self.components.push(ComponentDescriptor::new(name, source));
        Ok(())
    }

    /// Look a component up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ComponentDescriptor> {
        self.index.get(name).map(|&i| &self.components[i])
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut ComponentDescriptor> {
        self.index.get(name).map(|&i| &mut self.components[i])
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.components.iter()
    }

    /// Names in declaration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.components.iter().map(|c| c.name.clone()).collect()
    }

    /// Components that were requested but never announced themselves.
    pub fn pending(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.components
            .iter()
            .filter(|c| c.state == LoadState::Requested)
    }

    /// Number of components that have announced themselves.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.components.iter().filter(|c| c.is_loaded()).count()
    }

    /// Number of declared components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
