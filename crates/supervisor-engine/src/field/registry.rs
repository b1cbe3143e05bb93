//! # supervisor-engine::field::registry
//!
//! `FieldRegistry`: the in-memory table of known field handles keyed by
//! (node-id, field-name), per spec §4.2.

use supervisor_types::field_type::FieldType;
use supervisor_types::id::{FieldId, NodeId};

use super::model::Field;

pub struct FieldRegistry {
    fields: Vec<Field>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// §4.2: exact match on `(name, node_id)`.
    pub fn find(&self, name: &str, node_id: NodeId) -> Option<&Field> {
        self.fields.iter().find(|f| f.node_id == node_id && f.name == name)
    }

    pub fn find_mut(&mut self, name: &str, node_id: NodeId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.node_id == node_id && f.name == name)
    }

    pub fn find_by_id(&self, node_id: NodeId, field_id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.node_id == node_id && f.id == field_id)
    }

    pub fn find_by_id_mut(&mut self, node_id: NodeId, field_id: FieldId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.node_id == node_id && f.id == field_id)
    }

    /// §4.2: inserted at head of registry. If a record for the same
    /// `(node_id, name)` already exists it is replaced, since a fresh
    /// `FIELD_GET_FROM_NAME` reply supersedes any stale cached record.
    #[allow(clippy::too_many_arguments)]
    pub fn create_from_reply(
        &mut self,
        node_id: NodeId,
        name: String,
        id: FieldId,
        field_type: FieldType,
        count: i32,
        is_proto_internal: bool,
    ) -> FieldId {
        self.fields.retain(|f| !(f.node_id == node_id && f.name == name));
        self.fields.insert(0, Field::new(node_id, name, id, field_type, count, is_proto_internal));
        id
    }

    /// §4.2/§8 invariant 4: delete every field with `is_proto_internal`.
    pub fn purge_proto_internal(&mut self) {
        self.fields.retain(|f| !f.is_proto_internal);
    }

    /// Drops every field owned by `node_id`, used when a node is removed
    /// so stale field handles don't outlive their owner.
    pub fn purge_owned_by(&mut self, node_id: NodeId) {
        self.fields.retain(|f| f.node_id != node_id);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supervisor_types::field_type::ScalarKind;

    #[test]
    fn create_from_reply_replaces_stale_entry() {
        let mut reg = FieldRegistry::new();
        reg.create_from_reply(1, "translation".into(), 10, FieldType::sf(ScalarKind::Vec3f), -1, false);
        reg.create_from_reply(1, "translation".into(), 11, FieldType::sf(ScalarKind::Vec3f), -1, false);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.find("translation", 1).unwrap().id, 11);
    }

    #[test]
    fn purge_proto_internal_removes_only_flagged_fields() {
        let mut reg = FieldRegistry::new();
        reg.create_from_reply(1, "a".into(), 1, FieldType::sf(ScalarKind::Bool), -1, false);
        reg.create_from_reply(1, "b".into(), 2, FieldType::sf(ScalarKind::Bool), -1, true);
        reg.purge_proto_internal();
        assert!(reg.find("a", 1).is_some());
        assert!(reg.find("b", 1).is_none());
    }

    #[test]
    fn purge_owned_by_drops_all_fields_of_a_node() {
        let mut reg = FieldRegistry::new();
        reg.create_from_reply(1, "a".into(), 1, FieldType::sf(ScalarKind::Bool), -1, false);
        reg.create_from_reply(2, "a".into(), 2, FieldType::sf(ScalarKind::Bool), -1, false);
        reg.purge_owned_by(1);
        assert!(reg.find("a", 1).is_none());
        assert!(reg.find("a", 2).is_some());
    }
}
