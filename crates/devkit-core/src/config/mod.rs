//! Persisted configuration
//!
//! - `document`: canonical in-memory shape of the stored configuration
//! - `normalize`: reduction of historical stored shapes to property bags
//! - `mapper`: pure transforms to invocation flags and from setup results
//! - `store`: discovery, caching and persistence

pub mod document;
pub mod mapper;
pub mod normalize;
pub mod store;

pub use document::{deep_merge, ConfigDocument, ModuleConfig};
pub use mapper::{from_setup_results, to_invocation_flags, InvocationFlags};
pub use normalize::{normalize, PropertySchema, Properties, ENABLED_KEY};
pub use store::{ConfigLocations, ConfigSource, ConfigStore, Format};
