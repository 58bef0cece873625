//! Event surface - The fixed interaction event set and callback types.
//!
//! The mount layer wires one dispatcher per event kind onto each mounted
//! widget node. The set is the union of interaction patterns across wrapped
//! widget kinds, so every toolkit widget reports through the same nine kinds.
//!
//! # Example
//!
//! ```ignore
//! use weld_ui::events::{EventKind, EventCallback};
//! use std::rc::Rc;
//!
//! let on_event: EventCallback = Rc::new(|kind, detail| {
//!     println!("{kind}: {detail}");
//! });
//! ```

use std::fmt;
use std::rc::Rc;

use crate::node::Node;

// =============================================================================
// Event Kind
// =============================================================================

/// Interaction event kinds forwarded from mounted widget nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Change,
    Input,
    Focus,
    Blur,
    Submit,
    Search,
    Select,
    Action,
}

impl EventKind {
    /// Every kind the mount layer wires, in dispatch-registration order.
    pub const ALL: [EventKind; 9] = [
        EventKind::Click,
        EventKind::Change,
        EventKind::Input,
        EventKind::Focus,
        EventKind::Blur,
        EventKind::Submit,
        EventKind::Search,
        EventKind::Select,
        EventKind::Action,
    ];

    /// Wire-format name, matching the toolkit's event naming.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::Change => "change",
            EventKind::Input => "input",
            EventKind::Focus => "focus",
            EventKind::Blur => "blur",
            EventKind::Submit => "submit",
            EventKind::Search => "search",
            EventKind::Select => "select",
            EventKind::Action => "action",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Event Detail
// =============================================================================

/// Payload a widget attaches to an emitted event.
///
/// Widgets decide the shape; the bridge passes it through untouched.
pub type EventDetail = serde_json::Value;

// =============================================================================
// Callback Types
// =============================================================================

/// Handler registered on a node for one event kind (Rc for shared ownership
/// in closures).
pub type EventHandler = Rc<dyn Fn(&EventDetail)>;

/// Caller-facing event callback: receives the kind and the widget's detail.
pub type EventCallback = Rc<dyn Fn(EventKind, &EventDetail)>;

/// Called once per successful mount with the node that was attached.
pub type MountCallback = Rc<dyn Fn(&Node)>;

/// Called once per teardown of a successfully mounted node.
pub type UnmountCallback = Rc<dyn Fn()>;

// =============================================================================
// Tests
// =============================================================================
