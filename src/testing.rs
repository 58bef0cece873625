//! Test support - Canonical factories and recording callbacks.
//!
//! Everything an embedder needs to test a registry without a real toolkit:
//! one factory per construction convention, a factory that fails, a factory
//! whose node refuses listeners, and callback recorders for mount/unmount
//! and event assertions. Used by this crate's own tests for the same
//! purpose.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::events::{EventCallback, EventDetail, EventKind, MountCallback, UnmountCallback};
use crate::mount::BridgeCallbacks;
use crate::node::{Capabilities, Node};
use crate::registry::{FactoryDescriptor, FactoryRegistry};
use crate::toolkit::{
    ClassFactory, FnFactory, MethodTable, RawFactory, SourceFactory, WidgetError,
};
use crate::types::Config;

// =============================================================================
// Sample widgets
// =============================================================================

fn build_widget(tag: &str, cfg: &Config) -> Result<Node, WidgetError> {
    let node = Node::element(tag);
    if let Some(label) = cfg.get("label").and_then(|v| v.as_str()) {
        node.append_child(&Node::text(label))?;
    }
    if let Some(variant) = cfg.get("variant").and_then(|v| v.as_str()) {
        node.set_attr("variant", variant);
    }
    Ok(node)
}

/// Function-shaped factory producing a `<button>`.
pub fn button_factory() -> Rc<dyn RawFactory> {
    Rc::new(FnFactory::new(|cfg| build_widget("button", cfg)))
}

/// Class-shaped factory producing a `<panel>` through `create`.
pub fn panel_factory() -> Rc<dyn RawFactory> {
    Rc::new(ClassFactory::new(|| {
        Rc::new(MethodTable::new().with("create", |cfg| build_widget("panel", cfg)))
    }))
}

/// Instance-shaped factory producing a `<badge>`, with a `create_primary`
/// variant that stamps `variant="primary"`.
pub fn badge_factory() -> Rc<dyn RawFactory> {
    Rc::new(SourceFactory::new(Rc::new(
        MethodTable::new()
            .with("create", |cfg| build_widget("badge", cfg))
            .with("create_primary", |cfg| {
                let node = build_widget("badge", cfg)?;
                node.set_attr("variant", "primary");
                Ok(node)
            }),
    )))
}

/// Factory whose creation call always fails with `message`.
pub fn failing_factory(message: &'static str) -> Rc<dyn RawFactory> {
    Rc::new(FnFactory::new(move |_| Err(message.into())))
}

/// Factory producing a node that refuses listeners (container only).
pub fn silent_factory() -> Rc<dyn RawFactory> {
    Rc::new(FnFactory::new(|_| {
        Ok(Node::element_with("figure", Capabilities::CONTAINER))
    }))
}

/// A registry covering all the shapes above:
/// `Button` (function), `Panel` (class), `Badge` (instance),
/// `Broken` (fails with "boom"), `Figure` (no event target).
pub fn sample_registry() -> FactoryRegistry {
    FactoryRegistry::builder()
        .register(FactoryDescriptor::new("Button", button_factory))
        .register(FactoryDescriptor::new("Panel", panel_factory))
        .register(FactoryDescriptor::new("Badge", badge_factory))
        .register(FactoryDescriptor::new("Broken", || failing_factory("boom")))
        .register(FactoryDescriptor::new("Figure", silent_factory))
        .build()
}

// =============================================================================
// Recording callbacks
// =============================================================================

/// Records every forwarded event for assertions.
#[derive(Clone, Default)]
pub struct EventLog {
    records: Rc<RefCell<Vec<(EventKind, EventDetail)>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback that appends to this log.
    pub fn callback(&self) -> EventCallback {
        let records = self.records.clone();
        Rc::new(move |kind, detail| {
            records.borrow_mut().push((kind, detail.clone()));
        })
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Kinds in arrival order.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.records.borrow().iter().map(|(kind, _)| *kind).collect()
    }

    /// Full records in arrival order.
    pub fn records(&self) -> Vec<(EventKind, EventDetail)> {
        self.records.borrow().clone()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

/// Counts mounts/unmounts and keeps every mounted node.
#[derive(Clone, Default)]
pub struct MountLog {
    nodes: Rc<RefCell<Vec<Node>>>,
    unmounts: Rc<Cell<usize>>,
}

impl MountLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_mount(&self) -> MountCallback {
        let nodes = self.nodes.clone();
        Rc::new(move |node| {
            nodes.borrow_mut().push(node.clone());
        })
    }

    pub fn on_unmount(&self) -> UnmountCallback {
        let unmounts = self.unmounts.clone();
        Rc::new(move || {
            unmounts.set(unmounts.get() + 1);
        })
    }

    /// Mount/unmount callbacks wired to this log, no event forwarding.
    pub fn callbacks(&self) -> BridgeCallbacks {
        BridgeCallbacks {
            on_mount: Some(self.on_mount()),
            on_unmount: Some(self.on_unmount()),
            on_event: None,
        }
    }

    /// Like [`callbacks`](Self::callbacks), plus event forwarding into `events`.
    pub fn callbacks_with(&self, events: &EventLog) -> BridgeCallbacks {
        BridgeCallbacks {
            on_mount: Some(self.on_mount()),
            on_unmount: Some(self.on_unmount()),
            on_event: Some(events.callback()),
        }
    }

    pub fn mounts(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn unmounts(&self) -> usize {
        self.unmounts.get()
    }

    pub fn last_node(&self) -> Option<Node> {
        self.nodes.borrow().last().cloned()
    }
}

// =============================================================================
// Tests
// =============================================================================
