//! Mount Controller - Lifecycle state machine for one bridged container.
//!
//! Owns exactly one container node and drives it through
//! `Idle -> Mounting -> Mounted -> Unmounting -> Idle`, with `Errored`
//! reachable from `Mounting`. Transitions are synchronous: a remount always
//! finishes the previous teardown (listeners off, container cleared,
//! `on_unmount`) before the next factory runs.
//!
//! Invariants enforced here:
//! - at most one node is attached inside the container at any time
//! - every listener attached during a mount is removed before that node is
//!   detached
//! - a failure becomes a visible fallback node plus a log record, never a
//!   blank container and never an escaping error
//!
//! Remount keying uses config handle identity (`Rc` pointer), not deep
//! equality: swapping in a freshly built config is a new key.

use std::rc::Rc;

use log::{debug, error, warn};

use crate::error::BridgeError;
use crate::events::{EventCallback, EventKind, MountCallback, UnmountCallback};
use crate::node::{ListenerId, Node};
use crate::normalize::normalize;
use crate::registry::FactoryRegistry;
use crate::types::Config;

// =============================================================================
// State & inputs
// =============================================================================

/// Lifecycle states of one bridged container.
///
/// `Mounting` and `Unmounting` are observable from inside callbacks even
/// though every transition completes synchronously.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MountState {
    Idle,
    Mounting,
    Mounted,
    Unmounting,
    Errored,
}

/// What to mount: logical name, optional create-method variant, config.
#[derive(Clone)]
pub struct MountSpec {
    pub name: String,
    pub method: Option<String>,
    pub config: Config,
}

impl MountSpec {
    pub fn new(name: &str, config: Config) -> Self {
        Self {
            name: name.to_string(),
            method: None,
            config,
        }
    }

    pub fn with_method(name: &str, method: &str, config: Config) -> Self {
        Self {
            name: name.to_string(),
            method: Some(method.to_string()),
            config,
        }
    }

    /// Remount key comparison: name and method by value, config by handle
    /// identity.
    fn same_key(&self, other: &MountSpec) -> bool {
        self.name == other.name
            && self.method == other.method
            && Rc::ptr_eq(&self.config, &other.config)
    }
}

/// Caller-supplied lifecycle and event callbacks.
#[derive(Clone, Default)]
pub struct BridgeCallbacks {
    /// Called once per successful mount with the attached node.
    pub on_mount: Option<MountCallback>,
    /// Called once per teardown of a successfully mounted node.
    pub on_unmount: Option<UnmountCallback>,
    /// Receives `(kind, detail)` for every wired event that fires while
    /// mounted.
    pub on_event: Option<EventCallback>,
}

// =============================================================================
// Controller
// =============================================================================

/// Drives mount/remount/unmount for one container.
pub struct MountController {
    container: Node,
    state: MountState,
    mounted: Option<Node>,
    listeners: Vec<ListenerId>,
    last_spec: Option<MountSpec>,
    generation: u64,
}

impl MountController {
    pub fn new(container: Node) -> Self {
        Self {
            container,
            state: MountState::Idle,
            mounted: None,
            listeners: Vec::new(),
            last_spec: None,
            generation: 0,
        }
    }

    pub fn container(&self) -> &Node {
        &self.container
    }

    pub fn state(&self) -> MountState {
        self.state
    }

    /// Monotonic count of transitions out of rest. Deferred toolkit work
    /// that captured an older generation must discard its result.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The node currently attached: the widget while `Mounted`, the fallback
    /// while `Errored`, `None` while `Idle`.
    pub fn mounted_node(&self) -> Option<Node> {
        self.mounted.clone()
    }

    /// Mount `spec`, tearing down whatever the container held first.
    ///
    /// A spec with an unchanged key is a no-op, including after a failed
    /// mount: retrying the same key would just rebuild the same fallback.
    pub fn apply(
        &mut self,
        registry: &FactoryRegistry,
        spec: MountSpec,
        callbacks: &BridgeCallbacks,
    ) {
        if self.state != MountState::Idle {
            if let Some(last) = &self.last_spec {
                if last.same_key(&spec) {
                    return;
                }
            }
        }

        self.teardown(callbacks);
        self.generation += 1;
        self.state = MountState::Mounting;
        debug!("mounting \"{}\" (generation {})", spec.name, self.generation);

        if let Err(err) = self.mount_widget(registry, &spec, callbacks) {
            error!("mount of \"{}\" failed: {err}", spec.name);
            self.show_fallback(&spec.name, &err);
            self.state = MountState::Errored;
        }
        self.last_spec = Some(spec);
    }

    /// Tear down and return to `Idle`. Idempotent.
    pub fn unmount(&mut self, callbacks: &BridgeCallbacks) {
        if self.teardown(callbacks) {
            self.generation += 1;
            debug!("container unmounted");
        }
        self.last_spec = None;
    }

    fn mount_widget(
        &mut self,
        registry: &FactoryRegistry,
        spec: &MountSpec,
        callbacks: &BridgeCallbacks,
    ) -> Result<(), BridgeError> {
        let descriptor = registry.resolve(&spec.name)?;
        let factory = normalize(descriptor, spec.method.as_deref())?;
        let node = factory.invoke(&spec.config)?;

        self.container.clear_children();
        self.container
            .append_child(&node)
            .map_err(|err| BridgeError::Invocation {
                name: spec.name.clone(),
                detail: err.to_string(),
                source: None,
            })?;

        if let Some(on_event) = &callbacks.on_event {
            self.wire_events(&spec.name, &node, on_event);
        }

        self.mounted = Some(node.clone());
        self.state = MountState::Mounted;
        debug!("mounted \"{}\"", spec.name);

        if let Some(on_mount) = &callbacks.on_mount {
            on_mount(&node);
        }
        Ok(())
    }

    /// Attach one dispatcher per event kind.
    ///
    /// A node that refuses listeners degrades the mount instead of failing
    /// it: the widget stays up, events are not forwarded.
    fn wire_events(&mut self, name: &str, node: &Node, on_event: &EventCallback) {
        for kind in EventKind::ALL {
            let forward = on_event.clone();
            match node.add_listener(kind, Rc::new(move |detail| forward(kind, detail))) {
                Ok(id) => self.listeners.push(id),
                Err(_) => {
                    let err = BridgeError::ListenerAttach {
                        name: name.to_string(),
                        event: kind,
                    };
                    warn!("{err}");
                    break;
                }
            }
        }
    }

    /// Complete the unmount half of the cycle. Returns whether anything was
    /// actually torn down.
    fn teardown(&mut self, callbacks: &BridgeCallbacks) -> bool {
        if self.state == MountState::Idle {
            return false;
        }
        let was_live = self.state == MountState::Mounted;
        self.state = MountState::Unmounting;

        if let Some(node) = self.mounted.take() {
            // Listeners come off before the node leaves the tree, so nothing
            // can fire into a callback mid-teardown.
            for id in self.listeners.drain(..) {
                node.remove_listener(id);
            }
        }
        self.container.clear_children();

        if was_live {
            if let Some(on_unmount) = &callbacks.on_unmount {
                on_unmount();
            }
        }
        self.state = MountState::Idle;
        true
    }

    fn show_fallback(&mut self, name: &str, error: &BridgeError) {
        let fallback = fallback_node(name, error);
        self.container.clear_children();
        let _ = self.container.append_child(&fallback);
        self.mounted = Some(fallback);
    }
}

// =============================================================================
// Fallback
// =============================================================================

/// Visible error placeholder: component name plus error text, marked with a
/// distinguishable class. A failed widget must be discoverable in the UI,
/// not a blank region.
pub fn fallback_node(name: &str, error: &BridgeError) -> Node {
    let node = Node::element("fallback");
    node.set_attr("class", "weld-fallback");
    node.set_attr("data-component", name);
    let _ = node.append_child(&Node::text(&format!("{name}: {error}")));
    node
}

// =============================================================================
// Tests
// =============================================================================
