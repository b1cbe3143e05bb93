//! # supervisor-types::node_type
//!
//! Enumerates the node kinds reported by the remote scene graph. The wire
//! protocol transmits these as a `u32`; this type models the common kinds
//! by name and falls back to `Other` for anything the engine doesn't need
//! to special-case, since the full catalog of node kinds is large and
//! simulator-version-dependent.

/// The kind of a node in the remote scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Robot,
    Group,
    Solid,
    Viewpoint,
    Camera,
    Lidar,
    RangeFinder,
    WorldInfo,
    /// Any node kind the engine has no dedicated handling for. Carries the
    /// raw wire discriminant so callers can still compare/log it.
    Other(u32),
}

impl NodeType {
    /// Decodes the wire `u32` type tag into a `NodeType`.
    pub fn from_wire(tag: u32) -> Self {
        match tag {
            WIRE_ROBOT => NodeType::Robot,
            WIRE_GROUP => NodeType::Group,
            WIRE_SOLID => NodeType::Solid,
            WIRE_VIEWPOINT => NodeType::Viewpoint,
            WIRE_CAMERA => NodeType::Camera,
            WIRE_LIDAR => NodeType::Lidar,
            WIRE_RANGE_FINDER => NodeType::RangeFinder,
            WIRE_WORLD_INFO => NodeType::WorldInfo,
            other => NodeType::Other(other),
        }
    }

    /// Encodes back into the wire `u32` type tag.
    pub fn to_wire(self) -> u32 {
        match self {
            NodeType::Robot => WIRE_ROBOT,
            NodeType::Group => WIRE_GROUP,
            NodeType::Solid => WIRE_SOLID,
            NodeType::Viewpoint => WIRE_VIEWPOINT,
            NodeType::Camera => WIRE_CAMERA,
            NodeType::Lidar => WIRE_LIDAR,
            NodeType::RangeFinder => WIRE_RANGE_FINDER,
            NodeType::WorldInfo => WIRE_WORLD_INFO,
            NodeType::Other(tag) => tag,
        }
    }

    /// A human-readable name, mirroring the original's node-type name table.
    pub fn name(&self) -> &'static str {
        match self {
            NodeType::Robot => "Robot",
            NodeType::Group => "Group",
            NodeType::Solid => "Solid",
            NodeType::Viewpoint => "Viewpoint",
            NodeType::Camera => "Camera",
            NodeType::Lidar => "Lidar",
            NodeType::RangeFinder => "RangeFinder",
            NodeType::WorldInfo => "WorldInfo",
            NodeType::Other(_) => "Unknown",
        }
    }

    /// §4.1: removal of viewpoint or world-info nodes is locally rejected.
    pub fn is_removal_protected(&self) -> bool {
        matches!(self, NodeType::Viewpoint | NodeType::WorldInfo)
    }
}

const WIRE_GROUP: u32 = 1;
const WIRE_ROBOT: u32 = 2;
const WIRE_SOLID: u32 = 3;
const WIRE_VIEWPOINT: u32 = 4;
const WIRE_CAMERA: u32 = 5;
const WIRE_LIDAR: u32 = 6;
const WIRE_RANGE_FINDER: u32 = 7;
const WIRE_WORLD_INFO: u32 = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_known_kinds() {
        for kind in [
            NodeType::Robot,
            NodeType::Group,
            NodeType::Solid,
            NodeType::Viewpoint,
            NodeType::Camera,
            NodeType::Lidar,
            NodeType::RangeFinder,
            NodeType::WorldInfo,
        ] {
            assert_eq!(NodeType::from_wire(kind.to_wire()), kind);
        }
    }

    #[test]
    fn unknown_tag_falls_back_to_other() {
        assert_eq!(NodeType::from_wire(9999), NodeType::Other(9999));
    }

    #[test]
    fn viewpoint_and_world_info_are_removal_protected() {
        assert!(NodeType::Viewpoint.is_removal_protected());
        assert!(NodeType::WorldInfo.is_removal_protected());
        assert!(!NodeType::Solid.is_removal_protected());
    }
}
