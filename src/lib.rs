//! # weld-ui
//!
//! Factory bridge for mounting vanilla widget toolkits in reactive Rust UIs.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! fine-grained reactivity.
//!
//! ## Architecture
//!
//! Vanilla widget toolkits expose creation entry points in three competing
//! conventions (class-like, plain function, singleton with named methods).
//! weld-ui normalizes all of them behind one `invoke(config) -> Node`
//! interface and mounts the result in a container the host tree renders:
//!
//! ```text
//! name ── FactoryRegistry ── normalize ── MountController ── container node
//!                                              │
//!                                       events back to the caller
//! ```
//!
//! Failures never cross into the host tree: a failed widget becomes a
//! visible placeholder in its own container, and nothing else.
//!
//! ## Modules
//!
//! - [`types`] - Reactive props and factory configuration
//! - [`node`] - The tree handle toolkits produce and the bridge mounts
//! - [`toolkit`] - Contract a wrapped widget toolkit exposes
//! - [`registry`] - Static name → factory table
//! - [`normalize`] - One invocation interface over three conventions
//! - [`mount`] - Lifecycle state machine for one bridged container
//! - [`bridge`] - The public component
//! - [`testing`] - Sample factories and recording callbacks

pub mod bridge;
pub mod error;
pub mod events;
pub mod mount;
pub mod node;
pub mod normalize;
pub mod registry;
pub mod testing;
pub mod toolkit;
pub mod types;

// Re-export commonly used items
pub use types::{config, empty_config, Config, PropValue};

pub use error::BridgeError;

pub use events::{
    EventCallback, EventDetail, EventHandler, EventKind, MountCallback, UnmountCallback,
};

pub use node::{Capabilities, ListenerId, Node, NodeError};

pub use toolkit::{
    ClassFactory, CreateFn, FnFactory, MethodTable, RawFactory, SourceFactory, WidgetError,
    WidgetSource,
};

pub use registry::{FactoryDescriptor, FactoryRegistry, RegistryBuilder};

pub use normalize::{normalize, NormalizedFactory, DEFAULT_METHOD};

pub use mount::{fallback_node, BridgeCallbacks, MountController, MountSpec, MountState};

pub use bridge::{bridge, BridgeHandle, BridgeProps, LookupPolicy};
