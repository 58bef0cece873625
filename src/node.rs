//! Node model - The tree handle wrapped toolkits produce and the bridge mounts.
//!
//! A [`Node`] is a cheaply cloneable shared handle (identity is pointer
//! identity, see [`Node::same`]). Element nodes carry a tag, attributes,
//! children, and a listener table; text nodes carry content only.
//!
//! Structural invariants enforced here:
//! - a node has at most one parent; attaching an attached node is an error
//! - only nodes with [`Capabilities::CONTAINER`] accept children
//! - only nodes with [`Capabilities::EVENT_TARGET`] accept listeners
//!
//! Dispatch is synchronous and reaches only listeners still registered at
//! call time; removing a listener takes effect immediately.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use bitflags::bitflags;

use crate::events::{EventDetail, EventHandler, EventKind};

// =============================================================================
// Capabilities
// =============================================================================

bitflags! {
    /// What a node supports. Declared by the toolkit at creation time,
    /// immutable afterwards.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Capabilities: u8 {
        /// Listeners can be attached; events can be dispatched to them.
        const EVENT_TARGET = 1 << 0;
        /// Children can be attached.
        const CONTAINER    = 1 << 1;
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Structural violations reported by node operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NodeError {
    /// Target node does not accept children.
    #[error("node <{tag}> is not a container")]
    NotAContainer { tag: String },

    /// The child already has a parent; detach it first.
    #[error("node <{tag}> is already attached to a parent")]
    AlreadyAttached { tag: String },

    /// Target node does not accept listeners.
    #[error("node <{tag}> is not an event target")]
    NotAnEventTarget { tag: String },
}

// =============================================================================
// Node
// =============================================================================

enum NodeKind {
    Element { tag: String },
    Text,
}

struct ListenerEntry {
    id: u64,
    kind: EventKind,
    handler: EventHandler,
}

/// Identifies one attached listener for later removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerId(u64);

struct NodeInner {
    kind: NodeKind,
    caps: Capabilities,
    content: RefCell<String>,
    attrs: RefCell<BTreeMap<String, String>>,
    parent: RefCell<Weak<NodeInner>>,
    children: RefCell<Vec<Node>>,
    listeners: RefCell<Vec<ListenerEntry>>,
    next_listener_id: Cell<u64>,
}

/// Shared handle to one tree node.
#[derive(Clone)]
pub struct Node(Rc<NodeInner>);

impl Node {
    fn new(kind: NodeKind, caps: Capabilities, content: String) -> Self {
        Node(Rc::new(NodeInner {
            kind,
            caps,
            content: RefCell::new(content),
            attrs: RefCell::new(BTreeMap::new()),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            next_listener_id: Cell::new(0),
        }))
    }

    /// Create an element node with the default capabilities
    /// (event target + container).
    pub fn element(tag: &str) -> Self {
        Self::element_with(tag, Capabilities::EVENT_TARGET | Capabilities::CONTAINER)
    }

    /// Create an element node with explicit capabilities.
    pub fn element_with(tag: &str, caps: Capabilities) -> Self {
        Self::new(
            NodeKind::Element { tag: tag.to_string() },
            caps,
            String::new(),
        )
    }

    /// Create a text node. Text nodes have no capabilities.
    pub fn text(content: &str) -> Self {
        Self::new(NodeKind::Text, Capabilities::empty(), content.to_string())
    }

    // =========================================================================
    // Identity & inspection
    // =========================================================================

    /// Pointer identity: true when both handles refer to the same node.
    pub fn same(a: &Node, b: &Node) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// Element tag, or `None` for text nodes.
    pub fn tag(&self) -> Option<String> {
        match &self.0.kind {
            NodeKind::Element { tag } => Some(tag.clone()),
            NodeKind::Text => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.kind, NodeKind::Text)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.0.caps
    }

    fn tag_for_errors(&self) -> String {
        self.tag().unwrap_or_else(|| "#text".to_string())
    }

    /// Text nodes: own content. Elements: concatenated content of children.
    pub fn text_content(&self) -> String {
        match &self.0.kind {
            NodeKind::Text => self.0.content.borrow().clone(),
            NodeKind::Element { .. } => self
                .0
                .children
                .borrow()
                .iter()
                .map(|c| c.text_content())
                .collect(),
        }
    }

    /// Replace a text node's content. No effect on elements.
    pub fn set_text(&self, content: &str) {
        if self.is_text() {
            *self.0.content.borrow_mut() = content.to_string();
        }
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    pub fn set_attr(&self, name: &str, value: &str) {
        self.0
            .attrs
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.0.attrs.borrow().get(name).cloned()
    }

    // =========================================================================
    // Tree structure
    // =========================================================================

    pub fn parent(&self) -> Option<Node> {
        self.0.parent.borrow().upgrade().map(Node)
    }

    pub fn child_count(&self) -> usize {
        self.0.children.borrow().len()
    }

    pub fn child(&self, index: usize) -> Option<Node> {
        self.0.children.borrow().get(index).cloned()
    }

    pub fn children(&self) -> Vec<Node> {
        self.0.children.borrow().clone()
    }

    /// Attach `child` as the last child of this node.
    ///
    /// Fails when this node is not a container or when `child` already has a
    /// parent (a node is never silently re-parented).
    pub fn append_child(&self, child: &Node) -> Result<(), NodeError> {
        if !self.0.caps.contains(Capabilities::CONTAINER) {
            return Err(NodeError::NotAContainer { tag: self.tag_for_errors() });
        }
        if child.parent().is_some() {
            return Err(NodeError::AlreadyAttached { tag: child.tag_for_errors() });
        }
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(child.clone());
        Ok(())
    }

    /// Remove `child` from this node. Returns whether it was a child.
    pub fn remove_child(&self, child: &Node) -> bool {
        let mut children = self.0.children.borrow_mut();
        let before = children.len();
        children.retain(|c| !Node::same(c, child));
        let removed = children.len() != before;
        if removed {
            *child.0.parent.borrow_mut() = Weak::new();
        }
        removed
    }

    /// Detach every child, clearing their parent links.
    pub fn clear_children(&self) {
        let children = std::mem::take(&mut *self.0.children.borrow_mut());
        for child in &children {
            *child.0.parent.borrow_mut() = Weak::new();
        }
    }

    /// Remove this node from its parent, if any.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        }
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Attach a handler for one event kind. Returns an id for removal.
    pub fn add_listener(
        &self,
        kind: EventKind,
        handler: EventHandler,
    ) -> Result<ListenerId, NodeError> {
        if !self.0.caps.contains(Capabilities::EVENT_TARGET) {
            return Err(NodeError::NotAnEventTarget { tag: self.tag_for_errors() });
        }
        let id = self.0.next_listener_id.get();
        self.0.next_listener_id.set(id + 1);
        self.0.listeners.borrow_mut().push(ListenerEntry {
            id,
            kind,
            handler,
        });
        Ok(ListenerId(id))
    }

    /// Remove a previously attached listener. Returns whether it existed.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.0.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|entry| entry.id != id.0);
        listeners.len() != before
    }

    /// Number of listeners currently attached (all kinds).
    pub fn listener_count(&self) -> usize {
        self.0.listeners.borrow().len()
    }

    /// Synchronously invoke every listener registered for `kind`.
    ///
    /// Handlers are snapshotted before the first call, so a handler that
    /// mutates the listener table does not affect this dispatch.
    /// Returns the number of handlers invoked.
    pub fn dispatch(&self, kind: EventKind, detail: &EventDetail) -> usize {
        let handlers: Vec<EventHandler> = self
            .0
            .listeners
            .borrow()
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.handler.clone())
            .collect();
        for handler in &handlers {
            handler(detail);
        }
        handlers.len()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.kind {
            NodeKind::Element { tag } => f
                .debug_struct("Node")
                .field("tag", tag)
                .field("children", &self.child_count())
                .field("listeners", &self.listener_count())
                .finish(),
            NodeKind::Text => f
                .debug_struct("Node")
                .field("text", &*self.0.content.borrow())
                .finish(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use serde_json::json;

    #[test]
    fn test_element_defaults() {
        let node = Node::element("button");
        assert_eq!(node.tag().as_deref(), Some("button"));
        assert!(node.capabilities().contains(Capabilities::EVENT_TARGET));
        assert!(node.capabilities().contains(Capabilities::CONTAINER));
        assert!(!node.is_text());
    }

    #[test]
    fn test_text_node_has_no_capabilities() {
        let node = Node::text("hello");
        assert!(node.is_text());
        assert_eq!(node.capabilities(), Capabilities::empty());
        assert_eq!(node.text_content(), "hello");
    }

    #[test]
    fn test_append_and_detach() {
        let parent = Node::element("panel");
        let child = Node::element("button");

        parent.append_child(&child).unwrap();
        assert_eq!(parent.child_count(), 1);
        assert!(Node::same(&child.parent().unwrap(), &parent));

        child.detach();
        assert_eq!(parent.child_count(), 0);
        assert!(child.parent().is_none());
    }

    #[test]
    fn test_double_attach_rejected() {
        let a = Node::element("panel");
        let b = Node::element("panel");
        let child = Node::element("button");

        a.append_child(&child).unwrap();
        let err = b.append_child(&child).unwrap_err();
        assert_eq!(err, NodeError::AlreadyAttached { tag: "button".into() });

        // Still attached to the first parent.
        assert!(Node::same(&child.parent().unwrap(), &a));
    }

    #[test]
    fn test_text_node_rejects_children() {
        let text = Node::text("hi");
        let child = Node::element("button");
        assert!(matches!(
            text.append_child(&child),
            Err(NodeError::NotAContainer { .. })
        ));
    }

    #[test]
    fn test_clear_children_resets_parents() {
        let parent = Node::element("panel");
        let a = Node::element("button");
        let b = Node::text("label");
        parent.append_child(&a).unwrap();
        parent.append_child(&b).unwrap();

        parent.clear_children();
        assert_eq!(parent.child_count(), 0);
        assert!(a.parent().is_none());
        assert!(b.parent().is_none());
    }

    #[test]
    fn test_text_content_recurses() {
        let parent = Node::element("panel");
        let inner = Node::element("badge");
        inner.append_child(&Node::text("boom")).unwrap();
        parent.append_child(&Node::text("Card: ")).unwrap();
        parent.append_child(&inner).unwrap();

        assert_eq!(parent.text_content(), "Card: boom");
    }

    #[test]
    fn test_listener_dispatch_and_removal() {
        let node = Node::element("button");
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();

        let id = node
            .add_listener(EventKind::Click, Rc::new(move |_| {
                hits_clone.set(hits_clone.get() + 1);
            }))
            .unwrap();

        let detail = json!({ "x": 1 });
        assert_eq!(node.dispatch(EventKind::Click, &detail), 1);
        assert_eq!(hits.get(), 1);

        // Other kinds do not reach this handler.
        assert_eq!(node.dispatch(EventKind::Change, &detail), 0);
        assert_eq!(hits.get(), 1);

        assert!(node.remove_listener(id));
        assert_eq!(node.listener_count(), 0);
        assert_eq!(node.dispatch(EventKind::Click, &detail), 0);
        assert_eq!(hits.get(), 1);

        // Removing twice reports false.
        assert!(!node.remove_listener(id));
    }

    #[test]
    fn test_text_node_rejects_listeners() {
        let text = Node::text("hi");
        assert!(matches!(
            text.add_listener(EventKind::Click, Rc::new(|_| {})),
            Err(NodeError::NotAnEventTarget { .. })
        ));
    }

    #[test]
    fn test_opted_out_element_rejects_listeners() {
        let node = Node::element_with("figure", Capabilities::CONTAINER);
        assert!(matches!(
            node.add_listener(EventKind::Click, Rc::new(|_| {})),
            Err(NodeError::NotAnEventTarget { .. })
        ));
    }

    #[test]
    fn test_dispatch_snapshot_survives_mutation() {
        let node = Node::element("button");
        let node_inner = node.clone();
        let fired = Rc::new(Cell::new(0));
        let fired_clone = fired.clone();

        // Handler removes every listener while dispatch is in flight.
        let id = Rc::new(Cell::new(None));
        let id_clone = id.clone();
        let registered = node
            .add_listener(EventKind::Click, Rc::new(move |_| {
                fired_clone.set(fired_clone.get() + 1);
                if let Some(own) = id_clone.get() {
                    node_inner.remove_listener(own);
                }
            }))
            .unwrap();
        id.set(Some(registered));

        assert_eq!(node.dispatch(EventKind::Click, &json!({})), 1);
        assert_eq!(fired.get(), 1);
        assert_eq!(node.listener_count(), 0);
    }
}
