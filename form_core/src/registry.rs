//! # Component Registry
//!
//! Maps a control `type` string to the code that implements it. Two
//! independent namespaces live in one [`ComponentStore`]:
//!
//! - **components** - data-entry controls ([`ControlFactory`])
//! - **designer components** - drag-and-drop editable variants
//!   ([`DesignerDescriptor`])
//!
//! A type may be registered in either, both or neither. A lookup miss is an
//! ordinary `None`: callers render nothing in its place, so an unknown or
//! removed type leaves an empty slot instead of failing the whole form.
//!
//! ## Lifecycle
//!
//! The process-wide store returned by [`component_store`] is populated with
//! the built-in controls on first access. Registering or deregistering types
//! belongs to application bootstrap and test setup/teardown; doing it while a
//! tree is being built is a caller error. The lock exists so the store can be
//! a `static`, not to make concurrent mutation meaningful.
//!
//! ## Example
//!
//! ```rust
//! use form_core::registry::ComponentStore;
//!
//! let store = ComponentStore::with_defaults();
//! assert!(store.get_component("obsGroupControl").is_some());
//! assert!(store.get_component("noSuchType").is_none());
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::controls::{self, ControlFactory};
use crate::designer::{self, DesignerDescriptor};

// ============================================================================
// Generic registry
// ============================================================================

/// A string-keyed table of implementations. Later registrations overwrite.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    entries: BTreeMap<String, T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Registry {
            entries: BTreeMap::new(),
        }
    }
}

impl<T: Clone> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, type_name: impl Into<String>, implementation: T) {
        self.entries.insert(type_name.into(), implementation);
    }

    pub fn deregister(&mut self, type_name: &str) -> Option<T> {
        self.entries.remove(type_name)
    }

    pub fn get(&self, type_name: &str) -> Option<T> {
        self.entries.get(type_name).cloned()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    /// Registered type names in sorted order.
    pub fn types(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn entries(&self) -> Vec<(String, T)> {
        self.entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

// ============================================================================
// Component store
// ============================================================================

/// Both registry namespaces.
#[derive(Debug, Default)]
pub struct ComponentStore {
    components: RwLock<Registry<ControlFactory>>,
    designer_components: RwLock<Registry<DesignerDescriptor>>,
}

impl ComponentStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding every built-in data-entry and designer control.
    pub fn with_defaults() -> Self {
        let store = Self::new();
        controls::register_defaults(&store);
        designer::register_defaults(&store);
        store
    }

    pub fn register_component(&self, type_name: impl Into<String>, factory: ControlFactory) {
        self.components
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(type_name, factory);
    }

    pub fn deregister_component(&self, type_name: &str) {
        self.components
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .deregister(type_name);
    }

    pub fn get_component(&self, type_name: &str) -> Option<ControlFactory> {
        let found = self
            .components
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_name);
        if found.is_none() {
            debug!(type_name, "no component registered");
        }
        found
    }

    pub fn register_designer_component(&self, type_name: impl Into<String>, descriptor: DesignerDescriptor) {
        self.designer_components
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(type_name, descriptor);
    }

    pub fn deregister_designer_component(&self, type_name: &str) {
        self.designer_components
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .deregister(type_name);
    }

    pub fn get_designer_component(&self, type_name: &str) -> Option<DesignerDescriptor> {
        let found = self
            .designer_components
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_name);
        if found.is_none() {
            debug!(type_name, "no designer component registered");
        }
        found
    }

    /// Every designer descriptor, sorted by type name (the designer palette).
    pub fn all_designer_components(&self) -> Vec<(String, DesignerDescriptor)> {
        self.designer_components
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries()
    }
}

static COMPONENT_STORE: Lazy<Arc<ComponentStore>> = Lazy::new(|| Arc::new(ComponentStore::with_defaults()));

/// The process-wide store, populated with the built-in controls.
pub fn component_store() -> Arc<ComponentStore> {
    Arc::clone(&COMPONENT_STORE)
}
