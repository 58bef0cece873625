//! Toolkit surface - The contract a wrapped widget toolkit exposes.
//!
//! Vanilla widget toolkits are inconsistent about construction: some exports
//! are class-like and must be instantiated before anything can be created,
//! some are plain creation functions, and some are ready-made singletons
//! carrying one or more named create methods (`create`, `create_primary`,
//! `create_ghost`, ...). [`RawFactory`] captures all three conventions as
//! probes; the normalizer decides which one to bind.
//!
//! A single export may answer more than one probe. That ambiguity is real in
//! the wild and is resolved in exactly one place (`normalize`), not here.

use std::collections::HashMap;
use std::rc::Rc;

use crate::node::Node;
use crate::types::Config;

// =============================================================================
// Core contract
// =============================================================================

/// Error surfaced by a toolkit creation call.
pub type WidgetError = Box<dyn std::error::Error + Send + Sync>;

/// A bound creation entry point: config in, node out.
///
/// Failures come back as `Err`; a toolkit that panics across this boundary
/// is violating its contract.
pub type CreateFn = Rc<dyn Fn(&Config) -> Result<Node, WidgetError>>;

/// An object exposing named creation methods.
pub trait WidgetSource {
    /// Look up a creation method by name. `None` when this source does not
    /// expose it.
    fn method(&self, name: &str) -> Option<CreateFn>;
}

/// An un-normalized creation entry point exported by a wrapped toolkit.
///
/// Implementations answer the probes matching their construction
/// convention(s) and leave the rest defaulted to `None`:
///
/// - [`construct`](RawFactory::construct): class convention — a fresh
///   [`WidgetSource`] must be instantiated before methods can be bound.
/// - [`callable`](RawFactory::callable): function convention — the export
///   itself creates.
/// - [`source`](RawFactory::source): instance convention — a ready object
///   with named create methods.
pub trait RawFactory {
    /// Instantiate the class-shaped export. Each call yields a fresh source.
    fn construct(&self) -> Option<Rc<dyn WidgetSource>> {
        None
    }

    /// The directly callable creation entry point, when the export is one.
    fn callable(&self) -> Option<CreateFn> {
        None
    }

    /// The already-instantiated source, when the export is a singleton.
    fn source(&self) -> Option<Rc<dyn WidgetSource>> {
        None
    }
}

// =============================================================================
// Shape adapters
// =============================================================================

/// Function-shaped export: wraps a bare creation closure.
pub struct FnFactory {
    create: CreateFn,
}

impl FnFactory {
    pub fn new(
        create: impl Fn(&Config) -> Result<Node, WidgetError> + 'static,
    ) -> Self {
        Self { create: Rc::new(create) }
    }
}

impl RawFactory for FnFactory {
    fn callable(&self) -> Option<CreateFn> {
        Some(self.create.clone())
    }
}

/// Class-shaped export: wraps a constructor closure. Every probe yields a
/// fresh instance, matching toolkits whose exports must be `new`-ed.
pub struct ClassFactory {
    instantiate: Rc<dyn Fn() -> Rc<dyn WidgetSource>>,
}

impl ClassFactory {
    pub fn new(instantiate: impl Fn() -> Rc<dyn WidgetSource> + 'static) -> Self {
        Self { instantiate: Rc::new(instantiate) }
    }
}

impl RawFactory for ClassFactory {
    fn construct(&self) -> Option<Rc<dyn WidgetSource>> {
        Some((self.instantiate)())
    }
}

/// Instance-shaped export: wraps a singleton source.
pub struct SourceFactory {
    instance: Rc<dyn WidgetSource>,
}

impl SourceFactory {
    pub fn new(instance: Rc<dyn WidgetSource>) -> Self {
        Self { instance }
    }
}

impl RawFactory for SourceFactory {
    fn source(&self) -> Option<Rc<dyn WidgetSource>> {
        Some(self.instance.clone())
    }
}

// =============================================================================
// Method table
// =============================================================================

/// A [`WidgetSource`] backed by a name → method map.
///
/// The common building block for toolkit adapters:
///
/// ```ignore
/// let source = MethodTable::new()
///     .with("create", |cfg| Ok(build_card(cfg, Style::Default)))
///     .with("create_ghost", |cfg| Ok(build_card(cfg, Style::Ghost)));
/// ```
#[derive(Clone, Default)]
pub struct MethodTable {
    methods: HashMap<String, CreateFn>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named creation method.
    pub fn with(
        mut self,
        name: &str,
        create: impl Fn(&Config) -> Result<Node, WidgetError> + 'static,
    ) -> Self {
        self.methods.insert(name.to_string(), Rc::new(create));
        self
    }
}

impl WidgetSource for MethodTable {
    fn method(&self, name: &str) -> Option<CreateFn> {
        self.methods.get(name).cloned()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::empty_config;

    struct Inert;
    impl RawFactory for Inert {}

    #[test]
    fn test_probes_default_to_none() {
        let raw = Inert;
        assert!(raw.construct().is_none());
        assert!(raw.callable().is_none());
        assert!(raw.source().is_none());
    }

    #[test]
    fn test_fn_factory_answers_callable() {
        let raw = FnFactory::new(|_cfg| Ok(Node::element("button")));
        assert!(raw.construct().is_none());
        let create = raw.callable().unwrap();
        let node = create(&empty_config()).unwrap();
        assert_eq!(node.tag().as_deref(), Some("button"));
    }

    #[test]
    fn test_class_factory_instantiates_fresh_sources() {
        let raw = ClassFactory::new(|| {
            Rc::new(MethodTable::new().with("create", |_| Ok(Node::element("panel"))))
        });
        let a = raw.construct().unwrap();
        let b = raw.construct().unwrap();
        assert!(!Rc::ptr_eq(&a, &b));
        assert!(a.method("create").is_some());
        assert!(a.method("create_ghost").is_none());
    }

    #[test]
    fn test_source_factory_shares_one_instance() {
        let table: Rc<dyn WidgetSource> =
            Rc::new(MethodTable::new().with("create", |_| Ok(Node::element("badge"))));
        let raw = SourceFactory::new(table.clone());
        let probed = raw.source().unwrap();
        assert!(Rc::ptr_eq(&probed, &table));
    }

    #[test]
    fn test_method_table_lookup() {
        let table = MethodTable::new()
            .with("create", |_| Ok(Node::element("card")))
            .with("create_ghost", |_| Ok(Node::element("card-ghost")));

        let ghost = table.method("create_ghost").unwrap();
        let node = ghost(&empty_config()).unwrap();
        assert_eq!(node.tag().as_deref(), Some("card-ghost"));
        assert!(table.method("create_primary").is_none());
    }
}
