//! Shared types - Reactive props and factory configuration.
//!
//! Props support static values, signals, and getters so a bridge can be
//! re-keyed reactively without the caller managing effects by hand.

use std::rc::Rc;

use spark_signals::Signal;

// =============================================================================
// Config
// =============================================================================

/// Caller-controlled configuration passed through to widget factories
/// unmodified.
///
/// The bridge never inspects config contents; it only tracks the handle for
/// remount keying. Two handles with equal contents are still two keys, so
/// swapping in a freshly built config forces a remount even when nothing in
/// it changed.
pub type Config = Rc<serde_json::Map<String, serde_json::Value>>;

/// Build a [`Config`] from a JSON value.
///
/// Non-object values yield an empty config; factories that want positional
/// or scalar input should take it under a named key.
pub fn config(value: serde_json::Value) -> Config {
    Rc::new(value.as_object().cloned().unwrap_or_default())
}

/// An empty [`Config`].
pub fn empty_config() -> Config {
    Rc::new(serde_json::Map::new())
}

// =============================================================================
// Prop Value - Reactive property wrapper
// =============================================================================

/// A property value that can be static, a signal, or a getter.
///
/// This enables reactive props while maintaining type safety. Reading through
/// [`PropValue::get`] inside an effect establishes the reactive dependency.
#[derive(Clone)]
pub enum PropValue<T: Clone + PartialEq + 'static> {
    /// Static value (not reactive).
    Static(T),
    /// Reactive signal (changes propagate automatically).
    Signal(Signal<T>),
    /// Getter function (called each time value is needed).
    Getter(Rc<dyn Fn() -> T>),
}

impl<T: Clone + PartialEq + 'static> PropValue<T> {
    /// Get the current value (for immediate reads).
    pub fn get(&self) -> T {
        match self {
            PropValue::Static(v) => v.clone(),
            PropValue::Signal(s) => s.get(),
            PropValue::Getter(f) => f(),
        }
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for PropValue<T> {
    fn default() -> Self {
        PropValue::Static(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> From<T> for PropValue<T> {
    fn from(value: T) -> Self {
        PropValue::Static(value)
    }
}

impl<T: Clone + PartialEq + 'static> From<Signal<T>> for PropValue<T> {
    fn from(signal: Signal<T>) -> Self {
        PropValue::Signal(signal)
    }
}

impl From<&str> for PropValue<String> {
    fn from(value: &str) -> Self {
        PropValue::Static(value.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use spark_signals::signal;

    #[test]
    fn test_config_from_object() {
        let cfg = config(json!({ "label": "Save", "variant": "primary" }));
        assert_eq!(cfg.get("label").and_then(|v| v.as_str()), Some("Save"));
        assert_eq!(cfg.len(), 2);
    }

    #[test]
    fn test_config_from_non_object() {
        let cfg = config(json!("just a string"));
        assert!(cfg.is_empty());
    }

    #[test]
    fn test_config_identity_vs_equality() {
        let a = config(json!({ "label": "Save" }));
        let b = config(json!({ "label": "Save" }));
        assert_eq!(a, b);
        assert!(!Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_prop_value_static() {
        let prop: PropValue<String> = "Button".into();
        assert_eq!(prop.get(), "Button");
    }

    #[test]
    fn test_prop_value_signal() {
        let name = signal("Button".to_string());
        let prop: PropValue<String> = name.clone().into();
        assert_eq!(prop.get(), "Button");

        name.set("Card".to_string());
        assert_eq!(prop.get(), "Card");
    }

    #[test]
    fn test_prop_value_getter() {
        let prop = PropValue::Getter(Rc::new(|| 42));
        assert_eq!(prop.get(), 42);
    }
}
