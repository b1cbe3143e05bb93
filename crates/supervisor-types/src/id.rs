//! # supervisor-types::id
//!
//! Defines the core identifier types used throughout the engine.
//! Using distinct type aliases for different kinds of IDs helps prevent bugs
//! where, for example, a `FieldId` might be accidentally used as a `NodeId`.

/// A unique identifier for a node, assigned by the remote simulator.
/// Id 0 is reserved for the implicit scene-graph root synthesized locally
/// at engine initialization.
pub type NodeId = u32;

/// The id reserved for the client-side scene-graph root, synthesized
/// locally and never deleted.
pub const ROOT_NODE_ID: NodeId = 0;

/// Sentinel meaning "no parent" (an orphaned node).
pub const NO_PARENT: i64 = -1;

/// A unique identifier for a field, assigned by the remote simulator.
pub type FieldId = u32;

/// A device tag; 0 means "not a device".
pub type DeviceTag = i32;

/// No device tag.
pub const NO_TAG: DeviceTag = 0;
