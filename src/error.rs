//! Error taxonomy for the factory bridge.
//!
//! Everything that can go wrong between "caller asked for a logical name"
//! and "a widget node is live in the container" lands in [`BridgeError`].
//! The mount layer converts these into a visible fallback plus a log record;
//! they never cross into the host tree.

use crate::events::EventKind;
use crate::toolkit::WidgetError;

/// Unified error type for registry lookup, factory normalization, and
/// mounting.
///
/// `FactoryNotFound` and `FactoryShape` indicate misconfiguration and are
/// raised synchronously, before any widget code runs. `Invocation` is a
/// per-mount failure. `ListenerAttach` is the one degradable condition: the
/// mount survives it, minus event forwarding.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The logical name has no registered factory.
    #[error(
        "no factory registered under \"{name}\"; check FactoryRegistry::available() for known names"
    )]
    FactoryNotFound {
        /// The name that was requested.
        name: String,
    },

    /// The raw factory answered none of the supported construction
    /// conventions for the requested method.
    #[error(
        "factory \"{name}\" matched no supported shape for method \"{method}\" (probed: {attempted:?}); \
         the toolkit export and the registry entry disagree"
    )]
    FactoryShape {
        /// The logical name whose factory was probed.
        name: String,
        /// The creation method that was being bound.
        method: String,
        /// Human-readable trail of the probes that were attempted.
        attempted: Vec<String>,
    },

    /// The factory ran but failed to produce a mountable node.
    #[error("factory \"{name}\" failed to produce a mountable node: {detail}")]
    Invocation {
        /// The logical name whose factory was invoked.
        name: String,
        /// What went wrong.
        detail: String,
        /// The toolkit's own error, when it surfaced one.
        #[source]
        source: Option<WidgetError>,
    },

    /// The produced node does not accept listeners; forwarding is skipped.
    #[error(
        "node produced by \"{name}\" is not an event target; \"{event}\" events will not be forwarded"
    )]
    ListenerAttach {
        /// The logical name whose node refused the listener.
        name: String,
        /// The first event kind that failed to attach.
        event: EventKind,
    },
}

impl BridgeError {
    /// The logical component name this error is about.
    pub fn component(&self) -> &str {
        match self {
            BridgeError::FactoryNotFound { name }
            | BridgeError::FactoryShape { name, .. }
            | BridgeError::Invocation { name, .. }
            | BridgeError::ListenerAttach { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_component() {
        let err = BridgeError::FactoryNotFound { name: "Card".into() };
        assert!(err.to_string().contains("Card"));
        assert_eq!(err.component(), "Card");

        let err = BridgeError::FactoryShape {
            name: "Card".into(),
            method: "create_ghost".into(),
            attempted: vec!["class (no such method)".into()],
        };
        let text = err.to_string();
        assert!(text.contains("Card"));
        assert!(text.contains("create_ghost"));
        assert!(text.contains("no such method"));
    }

    #[test]
    fn test_invocation_carries_source() {
        use std::error::Error;

        let source: WidgetError = "widget exploded".into();
        let err = BridgeError::Invocation {
            name: "Card".into(),
            detail: "widget exploded".into(),
            source: Some(source),
        };
        assert!(err.source().is_some());
    }
}
