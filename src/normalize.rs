//! Factory Normalizer - One invocation interface over three conventions.
//!
//! Wrapped toolkits mix construction conventions per export; re-detecting
//! them at every call site is how near-identical adapters drift apart. All
//! shape probing lives here, in one function, probed in one fixed order:
//!
//! 1. class convention, only when the export is not itself callable —
//!    instantiate once, bind the named method on the instance
//! 2. function convention — bind the export as-is
//! 3. instance convention — bind the named method on the singleton
//!
//! A factory that answers no probe (or answers one without the requested
//! method) fails normalization synchronously with the probe trail; by the
//! time [`NormalizedFactory::invoke`] runs, shape questions are settled.

use crate::error::BridgeError;
use crate::node::Node;
use crate::registry::FactoryDescriptor;
use crate::toolkit::CreateFn;
use crate::types::Config;

/// Method bound when the caller does not name one.
pub const DEFAULT_METHOD: &str = "create";

// =============================================================================
// Normalized Factory
// =============================================================================

/// A factory reduced to one entry point: `invoke(config) -> Node`.
///
/// Derived per mount from `(descriptor, method)`; cheap enough that caching
/// across mounts is not worth the staleness risk.
pub struct NormalizedFactory {
    name: String,
    method: String,
    create: CreateFn,
}

impl std::fmt::Debug for NormalizedFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizedFactory")
            .field("name", &self.name)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

impl NormalizedFactory {
    fn new(name: &str, method: &str, create: CreateFn) -> Self {
        Self {
            name: name.to_string(),
            method: method.to_string(),
            create,
        }
    }

    /// Logical component name this factory was normalized for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The creation method that was bound.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Run the bound creation entry point.
    ///
    /// Toolkit failures and un-mountable results come back as
    /// [`BridgeError::Invocation`]; shape problems cannot occur here.
    pub fn invoke(&self, config: &Config) -> Result<Node, BridgeError> {
        match (self.create)(config) {
            Ok(node) => {
                if node.parent().is_some() {
                    return Err(BridgeError::Invocation {
                        name: self.name.clone(),
                        detail: "produced node is already attached to a parent".to_string(),
                        source: None,
                    });
                }
                Ok(node)
            }
            Err(source) => Err(BridgeError::Invocation {
                name: self.name.clone(),
                detail: source.to_string(),
                source: Some(source),
            }),
        }
    }
}

// =============================================================================
// Shape detection
// =============================================================================

/// Reduce a descriptor's raw factory to a [`NormalizedFactory`].
///
/// `method` defaults to [`DEFAULT_METHOD`]. Probe order is fixed (see module
/// docs); an export answering both the class and function probes binds as a
/// function, matching how such exports behave when called directly.
pub fn normalize(
    descriptor: &FactoryDescriptor,
    method: Option<&str>,
) -> Result<NormalizedFactory, BridgeError> {
    let method = method.unwrap_or(DEFAULT_METHOD);
    let raw = descriptor.resolve();
    let callable = raw.callable();

    if callable.is_none() {
        if let Some(instance) = raw.construct() {
            return match instance.method(method) {
                Some(create) => Ok(NormalizedFactory::new(descriptor.name(), method, create)),
                None => Err(BridgeError::FactoryShape {
                    name: descriptor.name().to_string(),
                    method: method.to_string(),
                    attempted: vec![format!(
                        "class: instantiated, no \"{method}\" method"
                    )],
                }),
            };
        }
    }

    if let Some(create) = callable {
        return Ok(NormalizedFactory::new(descriptor.name(), method, create));
    }

    if let Some(instance) = raw.source() {
        return match instance.method(method) {
            Some(create) => Ok(NormalizedFactory::new(descriptor.name(), method, create)),
            None => Err(BridgeError::FactoryShape {
                name: descriptor.name().to_string(),
                method: method.to_string(),
                attempted: vec![format!("instance: no \"{method}\" method")],
            }),
        };
    }

    Err(BridgeError::FactoryShape {
        name: descriptor.name().to_string(),
        method: method.to_string(),
        attempted: vec![
            "class: no constructor".to_string(),
            "function: not callable".to_string(),
            "instance: no source".to_string(),
        ],
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::node::Node;
    use crate::toolkit::{
        ClassFactory, CreateFn, FnFactory, MethodTable, RawFactory, SourceFactory, WidgetSource,
    };
    use crate::types::{config, empty_config};
    use serde_json::json;

    fn descriptor_of(
        name: &str,
        raw: impl Fn() -> Rc<dyn RawFactory> + 'static,
    ) -> FactoryDescriptor {
        FactoryDescriptor::new(name, raw)
    }

    #[test]
    fn test_function_shape() {
        let descriptor = descriptor_of("Button", || {
            Rc::new(FnFactory::new(|cfg| {
                let node = Node::element("button");
                if let Some(label) = cfg.get("label").and_then(|v| v.as_str()) {
                    node.append_child(&Node::text(label))?;
                }
                Ok(node)
            }))
        });

        let factory = normalize(&descriptor, None).unwrap();
        assert_eq!(factory.name(), "Button");
        assert_eq!(factory.method(), DEFAULT_METHOD);

        let node = factory.invoke(&config(json!({ "label": "Save" }))).unwrap();
        assert_eq!(node.tag().as_deref(), Some("button"));
        assert_eq!(node.text_content(), "Save");
    }

    #[test]
    fn test_class_shape() {
        let descriptor = descriptor_of("Panel", || {
            Rc::new(ClassFactory::new(|| {
                Rc::new(MethodTable::new().with("create", |_| Ok(Node::element("panel"))))
            }))
        });

        let factory = normalize(&descriptor, None).unwrap();
        let node = factory.invoke(&empty_config()).unwrap();
        assert_eq!(node.tag().as_deref(), Some("panel"));
    }

    #[test]
    fn test_instance_shape_with_method_variant() {
        let descriptor = descriptor_of("Card", || {
            Rc::new(SourceFactory::new(Rc::new(
                MethodTable::new()
                    .with("create", |_| Ok(Node::element("card")))
                    .with("create_ghost", |_| Ok(Node::element("card-ghost"))),
            )))
        });

        let factory = normalize(&descriptor, Some("create_ghost")).unwrap();
        assert_eq!(factory.method(), "create_ghost");
        let node = factory.invoke(&empty_config()).unwrap();
        assert_eq!(node.tag().as_deref(), Some("card-ghost"));
    }

    #[test]
    fn test_callable_wins_over_class() {
        // An export that is both callable and constructible behaves as a
        // function when called directly; normalization matches that.
        struct Both;
        impl RawFactory for Both {
            fn construct(&self) -> Option<Rc<dyn WidgetSource>> {
                Some(Rc::new(
                    MethodTable::new().with("create", |_| Ok(Node::element("from-class"))),
                ))
            }
            fn callable(&self) -> Option<CreateFn> {
                Some(Rc::new(|_| Ok(Node::element("from-call"))))
            }
        }

        let descriptor = descriptor_of("Both", || Rc::new(Both));
        let factory = normalize(&descriptor, None).unwrap();
        let node = factory.invoke(&empty_config()).unwrap();
        assert_eq!(node.tag().as_deref(), Some("from-call"));
    }

    #[test]
    fn test_class_missing_method_is_shape_error() {
        let descriptor = descriptor_of("Panel", || {
            Rc::new(ClassFactory::new(|| {
                Rc::new(MethodTable::new().with("create", |_| Ok(Node::element("panel"))))
            }))
        });

        let err = normalize(&descriptor, Some("create_primary")).unwrap_err();
        match err {
            BridgeError::FactoryShape { name, method, attempted } => {
                assert_eq!(name, "Panel");
                assert_eq!(method, "create_primary");
                assert!(attempted[0].starts_with("class"));
            }
            other => panic!("expected FactoryShape, got {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized_shape_lists_probes() {
        struct Opaque;
        impl RawFactory for Opaque {}

        let descriptor = descriptor_of("Mystery", || Rc::new(Opaque));
        let err = normalize(&descriptor, None).unwrap_err();
        match err {
            BridgeError::FactoryShape { attempted, .. } => {
                assert_eq!(attempted.len(), 3);
            }
            other => panic!("expected FactoryShape, got {other:?}"),
        }
    }

    #[test]
    fn test_invoke_maps_toolkit_error() {
        let descriptor = descriptor_of("Broken", || {
            Rc::new(FnFactory::new(|_| Err("boom".into())))
        });

        let factory = normalize(&descriptor, None).unwrap();
        let err = factory.invoke(&empty_config()).unwrap_err();
        match err {
            BridgeError::Invocation { name, detail, source } => {
                assert_eq!(name, "Broken");
                assert_eq!(detail, "boom");
                assert!(source.is_some());
            }
            other => panic!("expected Invocation, got {other:?}"),
        }
    }

    #[test]
    fn test_invoke_rejects_attached_node() {
        let holder = Node::element("holder");
        let holder_for_factory = holder.clone();
        let descriptor = descriptor_of("Pinned", move || {
            let holder = holder_for_factory.clone();
            Rc::new(FnFactory::new(move |_| {
                let node = Node::element("badge");
                holder.append_child(&node)?;
                Ok(node)
            }))
        });

        let factory = normalize(&descriptor, None).unwrap();
        let err = factory.invoke(&empty_config()).unwrap_err();
        assert!(matches!(err, BridgeError::Invocation { .. }));
    }
}
