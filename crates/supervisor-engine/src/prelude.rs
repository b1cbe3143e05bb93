//! # supervisor-engine::prelude
//!
//! A convenience module that re-exports the most commonly used types from
//! the engine and its dependencies, so host controllers need only
//! `use supervisor_engine::prelude::*;`.

pub use crate::{
    api::SupervisorEngine,
    commands::CommandSlots,
    diagnostics::{CapturingSink, DiagnosticSink, StderrSink},
    field::{Field, FieldRegistry},
    node::{Node, NodeRegistry},
    queue::{PendingKind, PendingRequest, PendingQueue},
};

pub use supervisor_types::{
    self,
    config::EngineConfig,
    errors::*,
    field_type::{FieldType, ScalarKind, MF_BIT},
    id::*,
    node_type::NodeType,
    time::*,
    value::FieldValue,
};

pub use supervisor_transport::{self, mock::InMemoryTransport, opcode, ReplyReader, RequestWriter, Transport};
