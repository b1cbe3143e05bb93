//! # supervisor-engine::field::model
//!
//! Defines `Field`, the client-side cache record for a remote node field
//! (spec §3). String-typed field values are owned `String`s inside
//! `FieldValue`; Rust's ownership model retires the original's "the
//! string-typed field must free its cached string on destruction" concern
//! automatically (see `DESIGN.md`).

use supervisor_types::field_type::FieldType;
use supervisor_types::id::{FieldId, NodeId};
use supervisor_types::value::FieldValue;

/// The client-side cache record for a field owned by a node.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub node_id: NodeId,
    pub id: FieldId,
    pub field_type: FieldType,
    /// Element count for MF fields; `-1` for SF.
    pub count: i32,
    pub is_proto_internal: bool,
    /// Last-known value (SF) or last-queried element (MF, at the index most
    /// recently GET-ed).
    pub data: Option<FieldValue>,
}

impl Field {
    pub fn new(
        node_id: NodeId,
        name: String,
        id: FieldId,
        field_type: FieldType,
        count: i32,
        is_proto_internal: bool,
    ) -> Self {
        Self { name, node_id, id, field_type, count, is_proto_internal, data: None }
    }

    pub fn is_multi(&self) -> bool {
        self.field_type.multi
    }
}
