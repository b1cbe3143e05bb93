//! # supervisor-engine::node::model
//!
//! Defines `Node`, the client-side cache record for a remote scene-graph
//! node (spec §3). Cyclic structure (node ↔ parent ↔ children, node ↔
//! parent_proto) is modeled as plain ids into `NodeRegistry`'s backing
//! `Vec`, per design note §9 — no raw pointers or back-references.

use supervisor_types::id::{DeviceTag, NodeId, NO_PARENT};
use supervisor_types::node_type::NodeType;
use supervisor_types::time::SimTime;

/// A contact point as reported by `NODE_GET_CONTACT_POINTS`: the point's
/// coordinates and the id of the solid it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    pub position: [f64; 3],
    pub node_id: i32,
}

/// The client-side cache record for a node in the remote scene graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub node_type: NodeType,
    /// Present only when the node's prototype differs from its base type name.
    pub model_name: Option<String>,
    /// The last path segment after `.` in the simulator-reported DEF expression.
    pub def_name: Option<String>,
    /// Id of the structural parent, or `NO_PARENT` if orphaned.
    pub parent_id: i64,
    pub tag: DeviceTag,
    /// "This node is an instantiated prototype."
    pub is_proto: bool,
    /// "This handle was obtained by drilling into a prototype's private
    /// subtree and is therefore read-only from the client's perspective."
    pub is_proto_internal: bool,
    /// The enclosing prototype node, present only when `is_proto_internal`.
    pub parent_proto: Option<NodeId>,

    pub position: Option<[f64; 3]>,
    pub orientation: Option<[f64; 9]>,
    pub center_of_mass: Option<[f64; 3]>,
    pub contact_points: Option<Vec<ContactPoint>>,
    /// Simulation time at which `contact_points` was last refreshed; used by
    /// the §5 freshness rule (refresh only if `current > cached`).
    pub contact_points_time_stamp: SimTime,
    pub static_balance: Option<bool>,
    /// `[linear; 3] ++ [angular; 3]`.
    pub solid_velocity: Option<[f64; 6]>,
}

impl Node {
    /// Creates a fresh node record with no cached attributes populated.
    pub fn new(
        id: NodeId,
        node_type: NodeType,
        model_name: Option<String>,
        def_name: Option<String>,
        tag: DeviceTag,
        parent_id: i64,
        is_proto: bool,
    ) -> Self {
        Self {
            id,
            node_type,
            model_name,
            def_name: def_name.map(|d| strip_def_suffix(&d)),
            parent_id,
            tag,
            is_proto,
            is_proto_internal: false,
            parent_proto: None,
            position: None,
            orientation: None,
            center_of_mass: None,
            contact_points: None,
            contact_points_time_stamp: supervisor_types::time::SIM_EPOCH,
            static_balance: None,
            solid_velocity: None,
        }
    }

    /// The client-synthesized scene-graph root, id 0, with no parent.
    pub fn root() -> Self {
        Self::new(
            supervisor_types::id::ROOT_NODE_ID,
            NodeType::Group,
            None,
            None,
            supervisor_types::id::NO_TAG,
            NO_PARENT,
            false,
        )
    }
}

/// §4.1 upsert: "refresh `def_name` (with dot-suffix stripping) if it has
/// changed". The simulator reports the full DEF path; only the segment
/// after the last `.` is kept.
pub fn strip_def_suffix(def: &str) -> String {
    def.rsplit('.').next().unwrap_or(def).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_no_parent_and_is_not_proto() {
        let root = Node::root();
        assert_eq!(root.id, 0);
        assert_eq!(root.parent_id, NO_PARENT);
        assert!(!root.is_proto);
        assert!(!root.is_proto_internal);
    }

    #[test]
    fn def_suffix_is_stripped() {
        assert_eq!(strip_def_suffix("OUTER.INNER.ROBOT1"), "ROBOT1");
        assert_eq!(strip_def_suffix("ROBOT1"), "ROBOT1");
    }
}
