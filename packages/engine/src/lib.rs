//! # Element Adapter Engine
//!
//! Container-relative behaviors for elements of any tree implementing
//! [`Host`].
//!
//! ```text
//! attach(host, options)
//!   ├─ validate target, queries, watched properties
//!   ├─ compile queries            (element-adapter-query)
//!   ├─ measure each element       (initial snapshot)
//!   ├─ wire resize / input / mutation sources as needed
//!   └─ apply every behavior once
//! ```
//!
//! The returned [`Adapter`] receives the host's notifications and keeps
//! labels, callbacks and `--ea-*` custom properties in sync until
//! [`Adapter::detach`].

pub mod adapter;
pub mod applier;
pub mod behavior;
pub mod cache;
pub mod config;
pub mod error;
pub mod host;
pub mod measure;
pub mod memory;
pub mod params;
pub mod snapshot;
pub mod watched;

#[cfg(test)]
mod tests_adapter;

pub use adapter::{Adapter, AdapterState};
pub use behavior::{Behavior, Callback};
pub use config::{AdapterConfig, DEFAULT_CONFIG_NAME};
pub use error::{AttachError, AttachResult, ConfigError, ConfigResult};
pub use host::{
    Editing, Host, MutationKind, MutationRecord, MutationScope, NodeKind, ObserverId, ResizeEntry,
    Size,
};
pub use memory::{MemoryHost, NodeId};
pub use params::{AttachOptions, Target};
pub use snapshot::Snapshot;
pub use watched::{Listeners, WatchedProperties};

/// Attaches `options` to elements of `host`. See [`Adapter::attach`].
pub fn attach<H: Host>(host: &mut H, options: AttachOptions<H::Node>) -> AttachResult<Adapter<H::Node>> {
    Adapter::attach(host, options)
}
