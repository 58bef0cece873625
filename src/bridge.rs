//! Bridge - Public component mounting one logical widget in one container.
//!
//! A bridge owns exactly one container element for its whole life. Reactive
//! `name`/`config` props re-key the mount through a single effect; the
//! previous widget is always fully torn down before the next factory runs.
//! All side effects stay inside the owned container subtree.
//!
//! # Example
//!
//! ```ignore
//! use weld_ui::bridge::{bridge, BridgeProps};
//! use weld_ui::types::config;
//! use serde_json::json;
//! use spark_signals::signal;
//! use std::rc::Rc;
//!
//! let name = signal("Button".to_string());
//!
//! let handle = bridge(registry.clone(), BridgeProps {
//!     name: name.clone().into(),
//!     config: config(json!({ "label": "Save" })).into(),
//!     ..Default::default()
//! })?;
//!
//! host_tree.attach(handle.container());
//!
//! // Swap the widget - old one unmounts, new one mounts.
//! name.set("Card".to_string());
//!
//! handle.unmount();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::{effect, effect_scope, on_scope_dispose};

use crate::error::BridgeError;
use crate::events::{EventCallback, MountCallback, UnmountCallback};
use crate::mount::{BridgeCallbacks, MountController, MountSpec, MountState};
use crate::node::Node;
use crate::registry::FactoryRegistry;
use crate::types::{Config, PropValue};

// =============================================================================
// Props
// =============================================================================

/// What to do when the requested name has no registered factory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LookupPolicy {
    /// Render the error placeholder and log (production default).
    #[default]
    Fallback,
    /// Fail `bridge()` for an unknown initial name (development builds).
    /// Reactive name changes after creation always fall back.
    Strict,
}

/// Properties for one bridge instance.
#[derive(Default)]
pub struct BridgeProps {
    /// Logical component name, resolved through the registry.
    pub name: PropValue<String>,
    /// Passed through to the factory unmodified. A new handle is a new
    /// remount key, even with equal contents.
    pub config: PropValue<Config>,
    /// Create-method variant; `None` binds "create".
    pub method: Option<String>,
    /// Called once per successful mount with the attached node.
    pub on_mount: Option<MountCallback>,
    /// Called once per teardown of a successfully mounted node.
    pub on_unmount: Option<UnmountCallback>,
    /// Receives `(kind, detail)` for wired events while mounted.
    pub on_event: Option<EventCallback>,
    /// `class` attribute for the container element.
    pub class_name: Option<String>,
    /// `style` attribute for the container element.
    pub style: Option<String>,
    /// Unknown-name behavior.
    pub lookup: LookupPolicy,
}

// =============================================================================
// Handle
// =============================================================================

/// Handle returned by [`bridge`] that allows unmounting.
///
/// Dropping the handle also unmounts, so a bridge cannot leak its widget;
/// keep the handle alive for as long as the container is in the host tree.
pub struct BridgeHandle {
    container: Node,
    controller: Rc<RefCell<MountController>>,
    stop: Option<Box<dyn FnOnce()>>,
}

impl std::fmt::Debug for BridgeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeHandle").finish_non_exhaustive()
}

impl BridgeHandle {
    /// The container element, the only node the host tree sees.
    pub fn container(&self) -> Node {
        self.container.clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MountState {
        self.controller.borrow().state()
    }

    /// The node currently attached inside the container, if any.
    pub fn mounted_node(&self) -> Option<Node> {
        self.controller.borrow().mounted_node()
    }

    /// Tear down the mounted widget and stop reacting to prop changes.
    pub fn unmount(mut self) {
        if let Some(stop) = self.stop.take() {
            stop();
        }
    }
}

impl Drop for BridgeHandle {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop();
        }
    }
}

// =============================================================================
// Bridge
// =============================================================================

/// Create a bridge: resolve `name`, mount its widget into an owned
/// container, keep it in sync with reactive props.
///
/// The initial mount happens synchronously before this returns. With
/// [`LookupPolicy::Strict`], an unknown initial name is an `Err` instead of
/// a fallback render.
pub fn bridge(
    registry: Rc<FactoryRegistry>,
    props: BridgeProps,
) -> Result<BridgeHandle, BridgeError> {
    if props.lookup == LookupPolicy::Strict {
        registry.resolve(&props.name.get())?;
    }

    let container = Node::element("host");
    if let Some(class_name) = &props.class_name {
        container.set_attr("class", class_name);
    }
    if let Some(style) = &props.style {
        container.set_attr("style", style);
    }

    let callbacks = BridgeCallbacks {
        on_mount: props.on_mount.clone(),
        on_unmount: props.on_unmount.clone(),
        on_event: props.on_event.clone(),
    };

    let controller = Rc::new(RefCell::new(MountController::new(container.clone())));

    let name_prop = props.name.clone();
    let config_prop = props.config.clone();
    let method = props.method.clone();

    let controller_effect = controller.clone();
    let callbacks_effect = callbacks.clone();
    let controller_dispose = controller.clone();
    let callbacks_dispose = callbacks;

    let scope = effect_scope(false);
    scope.run(move || {
        // Reading the props inside the effect establishes the reactive
        // dependencies; the initial mount is the first effect run.
        let _effect_cleanup = effect(move || {
            let spec = match &method {
                Some(method) => {
                    MountSpec::with_method(&name_prop.get(), method, config_prop.get())
                }
                None => MountSpec::new(&name_prop.get(), config_prop.get()),
            };
            controller_effect
                .borrow_mut()
                .apply(&registry, spec, &callbacks_effect);
        });

        on_scope_dispose(move || {
            controller_dispose
                .borrow_mut()
                .unmount(&callbacks_dispose);
        });
    });

    Ok(BridgeHandle {
        container,
        controller,
        stop: Some(Box::new(move || scope.stop())),
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::testing::{sample_registry, EventLog, MountLog};
    use crate::types::{config, empty_config};
    use serde_json::json;
    use spark_signals::signal;

    fn registry() -> Rc<FactoryRegistry> {
        Rc::new(sample_registry())
    }

    #[test]
    fn test_initial_mount_is_synchronous() {
        let handle = bridge(
            registry(),
            BridgeProps {
                name: "Button".into(),
                config: config(json!({ "label": "Save" })).into(),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(handle.state(), MountState::Mounted);
        let container = handle.container();
        assert_eq!(container.child_count(), 1);
        let child = container.child(0).unwrap();
        assert_eq!(child.tag().as_deref(), Some("button"));
        assert_eq!(child.text_content(), "Save");
    }

    #[test]
    fn test_container_styling_passthrough() {
        let handle = bridge(
            registry(),
            BridgeProps {
                name: "Button".into(),
                class_name: Some("toolbar-slot".to_string()),
                style: Some("flex: 1".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let container = handle.container();
        assert_eq!(container.attr("class").as_deref(), Some("toolbar-slot"));
        assert_eq!(container.attr("style").as_deref(), Some("flex: 1"));
    }

    #[test]
    fn test_reactive_name_swaps_the_widget() {
        let log = MountLog::new();
        let name = signal("Button".to_string());

        let handle = bridge(
            registry(),
            BridgeProps {
                name: name.clone().into(),
                on_mount: Some(log.on_mount()),
                on_unmount: Some(log.on_unmount()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(log.mounts(), 1);
        name.set("Panel".to_string());

        assert_eq!(log.mounts(), 2);
        assert_eq!(log.unmounts(), 1);
        let container = handle.container();
        assert_eq!(container.child_count(), 1);
        assert_eq!(
            container.child(0).unwrap().tag().as_deref(),
            Some("panel")
        );
    }

    #[test]
    fn test_reactive_config_rekeys_the_mount() {
        let log = MountLog::new();
        let cfg = signal(config(json!({ "label": "A" })));

        let handle = bridge(
            registry(),
            BridgeProps {
                name: "Button".into(),
                config: cfg.clone().into(),
                on_mount: Some(log.on_mount()),
                on_unmount: Some(log.on_unmount()),
                ..Default::default()
            },
        )
        .unwrap();

        cfg.set(config(json!({ "label": "B" })));

        assert_eq!(log.mounts(), 2);
        assert_eq!(log.unmounts(), 1);
        assert_eq!(handle.container().child(0).unwrap().text_content(), "B");
    }

    #[test]
    fn test_method_variant_prop() {
        let handle = bridge(
            registry(),
            BridgeProps {
                name: "Badge".into(),
                method: Some("create_primary".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let node = handle.mounted_node().unwrap();
        assert_eq!(node.attr("variant").as_deref(), Some("primary"));
    }

    #[test]
    fn test_events_flow_to_the_caller() {
        let events = EventLog::new();
        let handle = bridge(
            registry(),
            BridgeProps {
                name: "Button".into(),
                on_event: Some(events.callback()),
                ..Default::default()
            },
        )
        .unwrap();

        let node = handle.mounted_node().unwrap();
        node.dispatch(EventKind::Click, &json!({ "button": 0 }));
        node.dispatch(EventKind::Blur, &json!({}));

        assert_eq!(events.kinds(), vec![EventKind::Click, EventKind::Blur]);
    }

    #[test]
    fn test_unmount_clears_and_stops_reacting() {
        let log = MountLog::new();
        let name = signal("Button".to_string());

        let handle = bridge(
            registry(),
            BridgeProps {
                name: name.clone().into(),
                on_mount: Some(log.on_mount()),
                on_unmount: Some(log.on_unmount()),
                ..Default::default()
            },
        )
        .unwrap();

        let container = handle.container();
        let widget = handle.mounted_node().unwrap();
        handle.unmount();

        assert_eq!(container.child_count(), 0);
        assert_eq!(widget.listener_count(), 0);
        assert_eq!(log.unmounts(), 1);

        // The effect is stopped: prop changes no longer remount.
        name.set("Panel".to_string());
        assert_eq!(log.mounts(), 1);
        assert_eq!(container.child_count(), 0);
    }

    #[test]
    fn test_drop_unmounts() {
        let log = MountLog::new();
        let container;
        {
            let handle = bridge(
                registry(),
                BridgeProps {
                    name: "Button".into(),
                    on_mount: Some(log.on_mount()),
                    on_unmount: Some(log.on_unmount()),
                    ..Default::default()
                },
            )
            .unwrap();
            container = handle.container();
        }

        assert_eq!(container.child_count(), 0);
        assert_eq!(log.unmounts(), 1);
    }

    #[test]
    fn test_strict_lookup_rejects_unknown_initial_name() {
        let err = bridge(
            registry(),
            BridgeProps {
                name: "DoesNotExist".into(),
                lookup: LookupPolicy::Strict,
                ..Default::default()
            },
        )
        .unwrap_err();

        assert!(matches!(err, BridgeError::FactoryNotFound { ref name } if name == "DoesNotExist"));
    }

    #[test]
    fn test_fallback_lookup_renders_placeholder() {
        let handle = bridge(
            registry(),
            BridgeProps {
                name: "DoesNotExist".into(),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(handle.state(), MountState::Errored);
        let text = handle.container().child(0).unwrap().text_content();
        assert!(text.contains("DoesNotExist"));
    }

    #[test]
    fn test_failed_widget_does_not_poison_neighbors() {
        let events = EventLog::new();
        let registry = registry();

        let broken = bridge(
            registry.clone(),
            BridgeProps {
                name: "Broken".into(),
                ..Default::default()
            },
        )
        .unwrap();

        let healthy = bridge(
            registry,
            BridgeProps {
                name: "Button".into(),
                on_event: Some(events.callback()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(broken.state(), MountState::Errored);
        assert!(broken
            .container()
            .child(0)
            .unwrap()
            .text_content()
            .contains("boom"));

        assert_eq!(healthy.state(), MountState::Mounted);
        healthy
            .mounted_node()
            .unwrap()
            .dispatch(EventKind::Click, &json!({}));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_static_config_never_remounts_on_unrelated_signal() {
        let log = MountLog::new();
        let cfg = empty_config();

        let _handle = bridge(
            registry(),
            BridgeProps {
                name: "Button".into(),
                config: cfg.into(),
                on_mount: Some(log.on_mount()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(log.mounts(), 1);
    }
}
