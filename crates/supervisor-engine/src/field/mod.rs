//! # supervisor-engine::field
//!
//! The client-side mirror of remote node fields: the `Field` record (§3)
//! and the `FieldRegistry` that owns the collection of them (§4.2).

pub mod model;
pub mod registry;

pub use model::Field;
pub use registry::FieldRegistry;
