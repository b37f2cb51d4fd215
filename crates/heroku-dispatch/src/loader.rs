//! Lazy loading of command modules.
//!
//! Commands register as a side effect of loading their module. The loader
//! keeps a catalog of the modules that exist, so the parser can recognize a
//! namespace before anything from it has been registered, and runs each
//! module's registration at most once.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::SetupError;
use crate::registry::Registry;

/// Registration function of a command module.
pub type RegisterFn = fn(&mut Registry);

/// Catalog of command modules, by namespace.
#[derive(Default)]
pub struct ModuleLoader {
    modules: BTreeMap<String, RegisterFn>,
    loaded: BTreeSet<String>,
}

impl fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .field("loaded", &self.loaded)
            .finish()
    }
}

impl ModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the module providing `namespace`.
    pub fn declare(&mut self, namespace: &str, register: RegisterFn) -> Result<(), SetupError> {
        if self.modules.contains_key(namespace) {
            return Err(SetupError::DuplicateModule(namespace.to_string()));
        }
        self.modules.insert(namespace.to_string(), register);
        Ok(())
    }

    /// Returns true if a module provides `namespace`.
    pub fn contains(&self, namespace: &str) -> bool {
        self.modules.contains_key(namespace)
    }

    /// Declared namespaces, ordered by name.
    pub fn available(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn is_loaded(&self, namespace: &str) -> bool {
        self.loaded.contains(namespace)
    }

    /// Loads the module for `namespace` into `registry`.
    ///
    /// Returns true if registration ran. Repeated loads and unknown
    /// namespaces are no-ops.
    pub fn load(&mut self, namespace: &str, registry: &mut Registry) -> bool {
        if self.loaded.contains(namespace) {
            return false;
        }
        let Some(&register) = self.modules.get(namespace) else {
            return false;
        };

        tracing::debug!(namespace, "loading command module");
        register(registry);
        self.loaded.insert(namespace.to_string());
        true
    }

    /// Loads every declared module.
    pub fn load_all(&mut self, registry: &mut Registry) {
        let pending: Vec<String> = self
            .modules
            .keys()
            .filter(|name| !self.loaded.contains(*name))
            .cloned()
            .collect();
        for namespace in pending {
            self.load(&namespace, registry);
        }
    }
}
