//! # supervisor-engine::node::registry
//!
//! `NodeRegistry`: the in-memory table of known remote node handles
//! (spec §4.1). Backed by a linearly-scanned `Vec`, per §4.1's explicit
//! note that the reference implementation has no secondary index and the
//! expected cardinality (dozens of nodes) doesn't need one — mirrors the
//! teacher's `World::nodes: Vec<Node>`.

use supervisor_types::id::{NodeId, NO_PARENT, ROOT_NODE_ID};
use supervisor_types::node_type::NodeType;

use super::model::{strip_def_suffix, Node};

/// The client-side mirror of the remote scene graph's node set.
pub struct NodeRegistry {
    nodes: Vec<Node>,
}

impl NodeRegistry {
    /// Synthesizes the id-0 scene-graph root, per §3/§4.1.
    pub fn new() -> Self {
        Self { nodes: vec![Node::root()] }
    }

    pub fn find_by_id(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn find_by_id_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// §4.1: exact `def_name` match. When `within_proto` is `None`, nodes
    /// with `is_proto_internal` set are skipped; otherwise the match must
    /// also have `parent_proto == within_proto`.
    pub fn find_by_def(&self, def: &str, within_proto: Option<NodeId>) -> Option<&Node> {
        self.nodes.iter().find(|n| {
            if n.def_name.as_deref() != Some(def) {
                return false;
            }
            match within_proto {
                None => !n.is_proto_internal,
                Some(proto_id) => n.parent_proto == Some(proto_id),
            }
        })
    }

    pub fn find_by_tag(&self, tag: i32) -> Option<&Node> {
        self.nodes.iter().find(|n| n.tag == tag)
    }

    /// §4.1: if the id exists, refresh `def_name` if it changed; otherwise
    /// insert at head. Returns the final node id (always `id`, kept for
    /// symmetry with the original's return-the-handle convention).
    #[allow(clippy::too_many_arguments)]
    pub fn upsert(
        &mut self,
        id: NodeId,
        node_type: NodeType,
        model_name: Option<String>,
        def_name: Option<String>,
        tag: i32,
        parent_id: i64,
        is_proto: bool,
    ) -> NodeId {
        if let Some(existing) = self.find_by_id_mut(id) {
            if let Some(new_def) = &def_name {
                let stripped = strip_def_suffix(new_def);
                if existing.def_name.as_deref() != Some(stripped.as_str()) {
                    existing.def_name = Some(stripped);
                }
            }
            existing.node_type = node_type;
            existing.model_name = model_name;
            existing.tag = tag;
            existing.parent_id = parent_id;
            existing.is_proto = is_proto;
        } else {
            let node = Node::new(id, node_type, model_name, def_name, tag, parent_id, is_proto);
            self.nodes.insert(0, node);
        }
        id
    }

    /// §4.1: unlink and free `id`; every other node whose parent was `id`
    /// becomes orphaned (`parent_id = NO_PARENT`). The root (id 0) is never
    /// removed.
    pub fn remove(&mut self, id: NodeId) {
        if id == ROOT_NODE_ID {
            return;
        }
        self.nodes.retain(|n| n.id != id);
        for n in &mut self.nodes {
            if n.parent_id == id as i64 {
                n.parent_id = NO_PARENT;
            }
        }
    }

    /// §4.1/§8 invariant 4: delete every node with `is_proto_internal`.
    pub fn purge_proto_internal(&mut self) {
        self.nodes.retain(|n| !n.is_proto_internal);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_exists_on_construction_and_cannot_be_removed() {
        let mut reg = NodeRegistry::new();
        assert!(reg.find_by_id(ROOT_NODE_ID).is_some());
        reg.remove(ROOT_NODE_ID);
        assert!(reg.find_by_id(ROOT_NODE_ID).is_some());
    }

    #[test]
    fn upsert_inserts_then_refreshes_def_name() {
        let mut reg = NodeRegistry::new();
        reg.upsert(7, NodeType::Robot, None, Some("A.B.ROBOT1".into()), 0, 0, false);
        assert_eq!(reg.find_by_id(7).unwrap().def_name.as_deref(), Some("ROBOT1"));

        reg.upsert(7, NodeType::Robot, None, Some("X.ROBOT1RENAMED".into()), 0, 0, false);
        assert_eq!(reg.find_by_id(7).unwrap().def_name.as_deref(), Some("ROBOT1RENAMED"));
    }

    #[test]
    fn find_by_def_skips_proto_internal_unless_scoped() {
        let mut reg = NodeRegistry::new();
        reg.upsert(3, NodeType::Solid, None, Some("INNER".into()), 0, 1, false);
        reg.find_by_id_mut(3).unwrap().is_proto_internal = true;
        reg.find_by_id_mut(3).unwrap().parent_proto = Some(1);

        assert!(reg.find_by_def("INNER", None).is_none());
        assert!(reg.find_by_def("INNER", Some(1)).is_some());
        assert!(reg.find_by_def("INNER", Some(99)).is_none());
    }

    #[test]
    fn remove_orphans_children() {
        let mut reg = NodeRegistry::new();
        reg.upsert(1, NodeType::Group, None, None, 0, 0, false);
        reg.upsert(2, NodeType::Solid, None, None, 0, 1, false);
        reg.remove(1);
        assert!(reg.find_by_id(1).is_none());
        assert_eq!(reg.find_by_id(2).unwrap().parent_id, NO_PARENT);
    }

    #[test]
    fn purge_proto_internal_removes_only_flagged_nodes() {
        let mut reg = NodeRegistry::new();
        reg.upsert(1, NodeType::Group, None, None, 0, 0, false);
        reg.upsert(2, NodeType::Solid, None, None, 0, 1, false);
        reg.find_by_id_mut(2).unwrap().is_proto_internal = true;
        reg.purge_proto_internal();
        assert!(reg.find_by_id(1).is_some());
        assert!(reg.find_by_id(2).is_none());
    }
}
