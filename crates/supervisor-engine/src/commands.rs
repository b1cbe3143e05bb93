//! # supervisor-engine::commands
//!
//! `CommandSlots`: the fixed set of single-shot outgoing commands, per spec
//! §4.4. Collapses the "dozens of module-level sentinels steering the
//! serializer" that design note §9 calls out into `Option<T>` fields on one
//! struct, the same way the teacher collapsed scattered simulation globals
//! into the single `Simulation` struct (`sim.rs`).

use supervisor_types::id::NodeId;

/// Phase-1 step-global commands: mutually exclusive, at most one pending
/// per step. If the same class of command is requested twice before a
/// flush, the second invocation replaces the first.
#[derive(Debug, Clone, PartialEq)]
pub enum StepGlobalCommand {
    ChangeSimulationMode(i32),
    Quit(i32),
    Reset,
    ReloadWorld,
    ResetPhysics,
    LoadWorld(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetVelocity {
    pub node_id: NodeId,
    /// `[linear; 3] ++ [angular; 3]`.
    pub velocity: [f64; 6],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetVisibility {
    pub node_id: NodeId,
    pub from_node_id: NodeId,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AddForce {
    pub node_id: NodeId,
    pub force: [f64; 3],
    pub relative: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AddForceWithOffset {
    pub node_id: NodeId,
    pub force: [f64; 3],
    pub offset: [f64; 3],
    pub relative: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportImage {
    pub filename: String,
    pub quality: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartMovie {
    pub filename: String,
    pub width: i32,
    pub height: i32,
    pub codec: i32,
    pub quality: i32,
    pub acceleration: f64,
    pub caption: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelCommand {
    pub id: i32,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: u32,
    pub transparency: f64,
    pub font: String,
}

/// The full set of single-shot command slots accumulated within one step.
#[derive(Default)]
pub struct CommandSlots {
    // --- phase 1: mutually exclusive step-global ---
    pub step_global: Option<StepGlobalCommand>,

    // --- phase 4: screen overlay labels ---
    pub labels: Vec<LabelCommand>,

    // --- phase 5: node remove + per-node attributes ---
    pub node_remove: Option<NodeId>,
    pub get_position: Option<NodeId>,
    pub get_orientation: Option<NodeId>,
    pub get_center_of_mass: Option<NodeId>,
    /// Node id plus the "include descendants" flag.
    pub get_contact_points: Option<(NodeId, bool)>,
    pub get_static_balance: Option<NodeId>,
    pub get_velocity: Option<NodeId>,
    pub set_velocity: Option<SetVelocity>,
    pub reset_physics: Option<NodeId>,
    pub restart_controller: Option<NodeId>,
    pub set_visibility: Option<SetVisibility>,
    pub move_viewpoint: Option<NodeId>,
    pub add_force: Option<AddForce>,
    pub add_force_with_offset: Option<AddForceWithOffset>,
    pub add_torque: Option<AddForce>,

    // --- phase 6: media ---
    pub export_image: Option<ExportImage>,
    pub start_movie: Option<StartMovie>,
    pub stop_movie: bool,
    pub start_animation: Option<String>,
    pub stop_animation: bool,
    pub save_world: Option<Option<String>>,

    // --- phase 7: VR headset ---
    pub vr_headset_is_used: bool,
    pub vr_headset_get_position: bool,
    pub vr_headset_get_orientation: bool,

    // --- cached scalar replies, supplemented from original_source/ so a
    // caller can poll status without re-flushing ---
    pub movie_status: Option<u8>,
    pub animation_start_status: Option<u8>,
    pub animation_stop_status: Option<u8>,
    pub save_world_status: Option<bool>,
    pub vr_headset_in_use: Option<bool>,
    pub vr_headset_position: Option<[f64; 3]>,
    pub vr_headset_orientation: Option<[f64; 9]>,
    /// §4.6 `FIELD_INSERT_VALUE` reply: count of nodes imported by the last
    /// `FIELD_IMPORT_NODE_FROM_STRING`/scene-file insert.
    pub imported_nodes_number: Option<i32>,
}

impl CommandSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// §4.5: after writing, step-global slots are cleared; node-targeted
    /// slots are cleared by the API wrapper after the post-flush read (so
    /// this does not clear `get_*`/query slots — callers clear those
    /// explicitly once they've consumed the dispatched reply).
    pub fn clear_step_global(&mut self) {
        self.step_global = None;
        self.labels.clear();
        self.export_image = None;
        self.start_movie = None;
        self.stop_movie = false;
        self.start_animation = None;
        self.stop_animation = false;
        self.save_world = None;
        self.vr_headset_is_used = false;
        self.vr_headset_get_position = false;
        self.vr_headset_get_orientation = false;
    }

    /// Clears the node-targeted slots, called by the API wrapper once the
    /// post-flush reply has been consumed.
    #[allow(clippy::too_many_arguments)]
    pub fn clear_node_targeted(&mut self) {
        self.node_remove = None;
        self.get_position = None;
        self.get_orientation = None;
        self.get_center_of_mass = None;
        self.get_contact_points = None;
        self.get_static_balance = None;
        self.get_velocity = None;
        self.set_velocity = None;
        self.reset_physics = None;
        self.restart_controller = None;
        self.set_visibility = None;
        self.move_viewpoint = None;
        self.add_force = None;
        self.add_force_with_offset = None;
        self.add_torque = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_step_global_request_replaces_the_first() {
        let mut slots = CommandSlots::new();
        slots.step_global = Some(StepGlobalCommand::Reset);
        slots.step_global = Some(StepGlobalCommand::ReloadWorld);
        assert_eq!(slots.step_global, Some(StepGlobalCommand::ReloadWorld));
    }

    #[test]
    fn clear_step_global_leaves_node_targeted_slots_alone() {
        let mut slots = CommandSlots::new();
        slots.step_global = Some(StepGlobalCommand::Reset);
        slots.get_position = Some(5);
        slots.clear_step_global();
        assert_eq!(slots.step_global, None);
        assert_eq!(slots.get_position, Some(5));
    }
}
