//! Factory Registry - Static name → factory table.
//!
//! One registry value is built at startup and shared (by `Rc`) with every
//! bridge. After `build()` the table is immutable: lookups only, no runtime
//! registration, so the set of mountable components stays auditable.
//!
//! # Example
//!
//! ```ignore
//! use weld_ui::registry::{FactoryDescriptor, FactoryRegistry};
//! use weld_ui::toolkit::FnFactory;
//! use std::rc::Rc;
//!
//! let registry = Rc::new(
//!     FactoryRegistry::builder()
//!         .register(FactoryDescriptor::new("Button", || {
//!             Rc::new(FnFactory::new(|cfg| Ok(build_button(cfg))))
//!         }))
//!         .build(),
//! );
//!
//! assert_eq!(registry.available(), vec!["Button"]);
//! ```

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::BridgeError;
use crate::toolkit::RawFactory;

// =============================================================================
// Descriptor
// =============================================================================

/// One logical component: a unique name plus a thunk yielding its raw
/// factory.
///
/// The thunk defers touching the toolkit until a mount actually needs the
/// factory, so registering a component stays side-effect free.
#[derive(Clone)]
pub struct FactoryDescriptor {
    name: String,
    resolve: Rc<dyn Fn() -> Rc<dyn RawFactory>>,
}

impl std::fmt::Debug for FactoryDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl FactoryDescriptor {
    pub fn new(
        name: &str,
        resolve: impl Fn() -> Rc<dyn RawFactory> + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            resolve: Rc::new(resolve),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Yield the raw factory. Lookup-free and side-effect free from the
    /// registry's point of view; cost is whatever the thunk does.
    pub fn resolve(&self) -> Rc<dyn RawFactory> {
        (self.resolve)()
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Immutable name → descriptor table.
pub struct FactoryRegistry {
    entries: HashMap<String, FactoryDescriptor>,
}

/// Accumulates descriptors before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: HashMap<String, FactoryDescriptor>,
}

impl RegistryBuilder {
    /// Add a descriptor. A duplicate name is a registration bug: the first
    /// entry wins and the duplicate is logged and dropped.
    pub fn register(mut self, descriptor: FactoryDescriptor) -> Self {
        let name = descriptor.name().to_string();
        if self.entries.contains_key(&name) {
            log::warn!("duplicate factory registration for \"{name}\"; keeping the first");
            return self;
        }
        self.entries.insert(name, descriptor);
        self
    }

    /// Freeze the table.
    pub fn build(self) -> FactoryRegistry {
        FactoryRegistry { entries: self.entries }
    }
}

impl FactoryRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Look up a descriptor by logical name.
    ///
    /// A miss is an error, never a silent default component.
    pub fn resolve(&self, name: &str) -> Result<&FactoryDescriptor, BridgeError> {
        self.entries
            .get(name)
            .ok_or_else(|| BridgeError::FactoryNotFound { name: name.to_string() })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names, sorted, for introspection and tooling.
    pub fn available(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::toolkit::FnFactory;

    fn descriptor(name: &str) -> FactoryDescriptor {
        FactoryDescriptor::new(name, || {
            Rc::new(FnFactory::new(|_| Ok(Node::element("button"))))
        })
    }

    #[test]
    fn test_resolve_known_name() {
        let registry = FactoryRegistry::builder()
            .register(descriptor("Button"))
            .build();

        let found = registry.resolve("Button").unwrap();
        assert_eq!(found.name(), "Button");
        assert!(found.resolve().callable().is_some());
    }

    #[test]
    fn test_resolve_unknown_name() {
        let registry = FactoryRegistry::builder().build();
        let err = registry.resolve("DoesNotExist").unwrap_err();
        assert!(matches!(err, BridgeError::FactoryNotFound { ref name } if name == "DoesNotExist"));
    }

    #[test]
    fn test_available_is_sorted() {
        let registry = FactoryRegistry::builder()
            .register(descriptor("Card"))
            .register(descriptor("ActionBar"))
            .register(descriptor("Button"))
            .build();

        assert_eq!(registry.available(), vec!["ActionBar", "Button", "Card"]);
        assert_eq!(registry.len(), 3);
        assert!(registry.contains("Card"));
        assert!(!registry.contains("card"));
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let registry = FactoryRegistry::builder()
            .register(FactoryDescriptor::new("Button", || {
                Rc::new(FnFactory::new(|_| Ok(Node::element("first"))))
            }))
            .register(FactoryDescriptor::new("Button", || {
                Rc::new(FnFactory::new(|_| Ok(Node::element("second"))))
            }))
            .build();

        assert_eq!(registry.len(), 1);
        let raw = registry.resolve("Button").unwrap().resolve();
        let node = raw.callable().unwrap()(&crate::types::empty_config()).unwrap();
        assert_eq!(node.tag().as_deref(), Some("first"));
    }
}
