//! # supervisor-engine::node
//!
//! The client-side mirror of remote scene-graph nodes: the `Node` record
//! (§3) and the `NodeRegistry` that owns the collection of them (§4.1).

pub mod model;
pub mod registry;

pub use model::Node;
pub use registry::NodeRegistry;
