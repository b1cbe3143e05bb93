//! # supervisor-engine::serializer
//!
//! Walks the command slots and pending queue and writes one step's outgoing
//! frame, in the fixed order from spec §4.5. Ownership of consumed,
//! non-GET requests moves into a garbage list retained until the reply
//! dispatcher has run for that step (§5) — in Rust this is just moving
//! owned `PendingRequest` values into a `Vec`, not reasoning about raw
//! pointers into an outgoing byte buffer.

use supervisor_transport::opcode;
use supervisor_types::value::FieldValue;

use crate::commands::{CommandSlots, StepGlobalCommand};
use crate::field::FieldRegistry;
use crate::queue::{PendingKind, PendingQueue, PendingRequest};

/// The result of serializing one step: the garbage list of consumed,
/// non-GET requests (freed by the caller only after `dispatch_reply` has
/// run) and the single GET moved out of the queue into the "sent" slot,
/// if any.
#[derive(Default)]
pub struct SerializeOutcome {
    pub garbage: Vec<PendingRequest>,
    pub sent_get: Option<PendingRequest>,
}

/// Writes one step's outgoing frame. `w` is the transport's `RequestWriter`;
/// the base-controller portion of the frame is assumed already written by
/// the caller, per §4.5's "the outgoing frame begins with whatever the base
/// controller layer writes (unrelated)".
pub fn serialize_step(
    w: &mut dyn supervisor_transport::RequestWriter,
    commands: &mut CommandSlots,
    queue: &mut PendingQueue,
    fields: &FieldRegistry,
) -> SerializeOutcome {
    let mut outcome = SerializeOutcome::default();

    write_step_global(w, commands);
    write_handle_resolution(commands);
    drain_pending_queue(w, queue, fields, &mut outcome);
    write_labels(w, commands);
    write_node_targeted(w, commands);
    write_media(w, commands);
    write_vr_headset(w, commands);

    commands.clear_step_global();
    outcome
}

/// Phase 1: mutually exclusive step-global commands.
fn write_step_global(w: &mut dyn supervisor_transport::RequestWriter, commands: &CommandSlots) {
    match &commands.step_global {
        Some(StepGlobalCommand::ChangeSimulationMode(mode)) => {
            w.write_opcode(opcode::SIMULATION_CHANGE_MODE);
            w.write_i32(*mode);
        }
        Some(StepGlobalCommand::Quit(status)) => {
            w.write_opcode(opcode::SIMULATION_QUIT);
            w.write_i32(*status);
        }
        Some(StepGlobalCommand::Reset) => w.write_opcode(opcode::SIMULATION_RESET),
        Some(StepGlobalCommand::ReloadWorld) => w.write_opcode(opcode::RELOAD_WORLD),
        Some(StepGlobalCommand::ResetPhysics) => w.write_opcode(opcode::SIMULATION_RESET_PHYSICS),
        Some(StepGlobalCommand::LoadWorld(filename)) => {
            w.write_opcode(opcode::LOAD_WORLD);
            w.write_str(filename);
        }
        None => {}
    }
}

/// Phase 2: handle resolution is driven directly by the API surface's
/// dedicated request methods (`node_get_from_def`, etc.), which write their
/// single opcode immediately before flushing rather than going through a
/// command slot — §4.5 describes it as "at most one" per step, which the
/// step mutex in `api.rs` already enforces by flushing synchronously.
fn write_handle_resolution(_commands: &CommandSlots) {}

/// Phase 3: drains the pending queue, enforcing the single-in-flight-GET
/// rule. The first queued GET is moved into `outcome.sent_get`; later GETs
/// are left queued for the next step, matching §4.5's "asserts this".
fn drain_pending_queue(
    w: &mut dyn supervisor_transport::RequestWriter,
    queue: &mut PendingQueue,
    fields: &FieldRegistry,
    outcome: &mut SerializeOutcome,
) {
    let mut get_already_sent = false;
    let mut remaining = Vec::new();

    while let Some(req) = queue.pop_front() {
        if req.kind == PendingKind::Get {
            if get_already_sent {
                remaining.push(req);
                continue;
            }
            get_already_sent = true;
            write_field_request(w, &req, fields);
            outcome.sent_get = Some(req);
            continue;
        }
        write_field_request(w, &req, fields);
        outcome.garbage.push(req);
    }

    for req in remaining {
        queue.push(req);
    }
}

fn write_field_request(
    w: &mut dyn supervisor_transport::RequestWriter,
    req: &PendingRequest,
    fields: &FieldRegistry,
) {
    let field_type = fields
        .find_by_id(req.node_id, req.field_id)
        .map(|f| f.field_type)
        .unwrap_or(supervisor_types::field_type::FieldType::sf(
            supervisor_types::field_type::ScalarKind::Bool,
        ));

    match req.kind {
        PendingKind::Get => {
            w.write_opcode(opcode::FIELD_GET_VALUE);
            w.write_u32(req.node_id);
            w.write_u32(req.field_id);
            w.write_i32(req.index);
        }
        PendingKind::Set => {
            w.write_opcode(opcode::FIELD_SET_VALUE);
            w.write_u32(req.node_id);
            w.write_u32(req.field_id);
            w.write_u32(field_type.to_wire());
            w.write_i32(req.index);
            write_value_payload(w, req.data.as_ref());
        }
        PendingKind::Insert => {
            w.write_opcode(opcode::FIELD_INSERT_VALUE);
            w.write_u32(req.node_id);
            w.write_u32(req.field_id);
            w.write_u32(field_type.to_wire());
            w.write_i32(req.index);
            write_value_payload(w, req.data.as_ref());
        }
        PendingKind::InsertFromString => {
            w.write_opcode(opcode::FIELD_IMPORT_NODE_FROM_STRING);
            w.write_u32(req.node_id);
            w.write_u32(req.field_id);
            w.write_i32(req.index);
            if let Some(FieldValue::String(s)) = &req.data {
                w.write_str(s);
            } else {
                w.write_str("");
            }
        }
        PendingKind::Remove => {
            w.write_opcode(opcode::FIELD_REMOVE_VALUE);
            w.write_u32(req.node_id);
            w.write_u32(req.field_id);
            w.write_i32(req.index);
        }
    }
}

fn write_value_payload(w: &mut dyn supervisor_transport::RequestWriter, value: Option<&FieldValue>) {
    match value {
        Some(FieldValue::Bool(v)) => w.write_u8(*v as u8),
        Some(FieldValue::Int32(v)) => w.write_i32(*v),
        Some(FieldValue::Float(v)) => w.write_f64(*v),
        Some(FieldValue::Vec2f(v)) => v.iter().for_each(|c| w.write_f64(*c)),
        Some(FieldValue::Vec3f(v)) | Some(FieldValue::Color(v)) => v.iter().for_each(|c| w.write_f64(*c)),
        Some(FieldValue::Rotation(v)) => v.iter().for_each(|c| w.write_f64(*c)),
        Some(FieldValue::String(s)) => w.write_str(s),
        Some(FieldValue::Node(id)) => w.write_u32(id.unwrap_or(u32::MAX)),
        None => {}
    }
}

/// Phase 4: accumulated labels, in a single pass.
fn write_labels(w: &mut dyn supervisor_transport::RequestWriter, commands: &CommandSlots) {
    for label in &commands.labels {
        w.write_opcode(opcode::SET_LABEL);
        w.write_i32(label.id);
        w.write_f64(label.x);
        w.write_f64(label.y);
        w.write_f64(label.size);
        w.write_u32(label.color);
        w.write_f64(label.transparency);
        w.write_str(&label.font);
        w.write_str(&label.text);
    }
}

/// Phase 5: node remove, then per-node attribute requests, in the fixed
/// order from §4.5.
fn write_node_targeted(w: &mut dyn supervisor_transport::RequestWriter, commands: &CommandSlots) {
    if let Some(node_id) = commands.node_remove {
        w.write_opcode(opcode::NODE_REMOVE_NODE);
        w.write_u32(node_id);
    }
    if let Some(node_id) = commands.get_position {
        w.write_opcode(opcode::NODE_GET_POSITION);
        w.write_u32(node_id);
    }
    if let Some(node_id) = commands.get_orientation {
        w.write_opcode(opcode::NODE_GET_ORIENTATION);
        w.write_u32(node_id);
    }
    if let Some(node_id) = commands.get_center_of_mass {
        w.write_opcode(opcode::NODE_GET_CENTER_OF_MASS);
        w.write_u32(node_id);
    }
    if let Some((node_id, include_descendants)) = commands.get_contact_points {
        w.write_opcode(opcode::NODE_GET_CONTACT_POINTS);
        w.write_u32(node_id);
        w.write_u8(include_descendants as u8);
    }
    if let Some(node_id) = commands.get_static_balance {
        w.write_opcode(opcode::NODE_GET_STATIC_BALANCE);
        w.write_u32(node_id);
    }
    if let Some(node_id) = commands.get_velocity {
        w.write_opcode(opcode::NODE_GET_VELOCITY);
        w.write_u32(node_id);
    }
    if let Some(sv) = &commands.set_velocity {
        w.write_opcode(opcode::NODE_SET_VELOCITY);
        w.write_u32(sv.node_id);
        sv.velocity.iter().for_each(|c| w.write_f64(*c));
    }
    if let Some(node_id) = commands.reset_physics {
        w.write_opcode(opcode::NODE_RESET_PHYSICS);
        w.write_u32(node_id);
    }
    if let Some(node_id) = commands.restart_controller {
        w.write_opcode(opcode::NODE_RESTART_CONTROLLER);
        w.write_u32(node_id);
    }
    if let Some(sv) = &commands.set_visibility {
        w.write_opcode(opcode::NODE_SET_VISIBILITY);
        w.write_u32(sv.node_id);
        w.write_u32(sv.from_node_id);
        w.write_u8(sv.visible as u8);
    }
    if let Some(node_id) = commands.move_viewpoint {
        w.write_opcode(opcode::NODE_MOVE_VIEWPOINT);
        w.write_u32(node_id);
    }
    if let Some(f) = &commands.add_force {
        w.write_opcode(opcode::NODE_ADD_FORCE);
        w.write_u32(f.node_id);
        f.force.iter().for_each(|c| w.write_f64(*c));
        w.write_u8(f.relative as u8);
    }
    if let Some(f) = &commands.add_force_with_offset {
        w.write_opcode(opcode::NODE_ADD_FORCE_WITH_OFFSET);
        w.write_u32(f.node_id);
        f.force.iter().for_each(|c| w.write_f64(*c));
        f.offset.iter().for_each(|c| w.write_f64(*c));
        w.write_u8(f.relative as u8);
    }
    if let Some(t) = &commands.add_torque {
        w.write_opcode(opcode::NODE_ADD_TORQUE);
        w.write_u32(t.node_id);
        t.force.iter().for_each(|c| w.write_f64(*c));
        w.write_u8(t.relative as u8);
    }
}

/// Phase 6: media (export image, movie, animation, world save).
fn write_media(w: &mut dyn supervisor_transport::RequestWriter, commands: &CommandSlots) {
    if let Some(img) = &commands.export_image {
        w.write_opcode(opcode::EXPORT_IMAGE);
        w.write_str(&img.filename);
        w.write_i32(img.quality);
    }
    if let Some(movie) = &commands.start_movie {
        w.write_opcode(opcode::START_MOVIE);
        w.write_str(&movie.filename);
        w.write_i32(movie.width);
        w.write_i32(movie.height);
        w.write_i32(movie.codec);
        w.write_i32(movie.quality);
        w.write_f64(movie.acceleration);
        w.write_u8(movie.caption as u8);
    }
    if commands.stop_movie {
        w.write_opcode(opcode::STOP_MOVIE);
    }
    if let Some(filename) = &commands.start_animation {
        w.write_opcode(opcode::START_ANIMATION);
        w.write_str(filename);
    }
    if commands.stop_animation {
        w.write_opcode(opcode::STOP_ANIMATION);
    }
    if let Some(filename) = &commands.save_world {
        w.write_opcode(opcode::SAVE_WORLD);
        w.write_str(filename.as_deref().unwrap_or(""));
    }
}

/// Phase 7: VR headset one-shot queries.
fn write_vr_headset(w: &mut dyn supervisor_transport::RequestWriter, commands: &CommandSlots) {
    if commands.vr_headset_is_used {
        w.write_opcode(opcode::VIRTUAL_REALITY_HEADSET_IS_USED);
    }
    if commands.vr_headset_get_position {
        w.write_opcode(opcode::VIRTUAL_REALITY_HEADSET_GET_POSITION);
    }
    if commands.vr_headset_get_orientation {
        w.write_opcode(opcode::VIRTUAL_REALITY_HEADSET_GET_ORIENTATION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{PendingKind, PendingRequest};

    #[test]
    fn only_one_get_is_sent_per_step_the_rest_stay_queued() {
        let mut commands = CommandSlots::new();
        let mut queue = PendingQueue::new();
        let fields = FieldRegistry::new();
        queue.push(PendingRequest { kind: PendingKind::Get, node_id: 1, field_id: 10, index: -1, data: None });
        queue.push(PendingRequest { kind: PendingKind::Get, node_id: 1, field_id: 11, index: -1, data: None });

        let mut out = Vec::new();
        let outcome = serialize_step(&mut out, &mut commands, &mut queue, &fields);

        assert!(outcome.sent_get.is_some());
        assert_eq!(outcome.sent_get.unwrap().field_id, 10);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.front().unwrap().field_id, 11);
    }

    #[test]
    fn non_get_requests_are_moved_to_the_garbage_list() {
        let mut commands = CommandSlots::new();
        let mut queue = PendingQueue::new();
        let fields = FieldRegistry::new();
        queue.push(PendingRequest {
            kind: PendingKind::Set,
            node_id: 1,
            field_id: 10,
            index: -1,
            data: Some(FieldValue::Float(3.14)),
        });

        let mut out = Vec::new();
        let outcome = serialize_step(&mut out, &mut commands, &mut queue, &fields);

        assert_eq!(outcome.garbage.len(), 1);
        assert!(queue.is_empty());
        assert!(!out.is_empty());
    }

    #[test]
    fn step_global_is_cleared_after_serialization() {
        let mut commands = CommandSlots::new();
        commands.step_global = Some(StepGlobalCommand::Reset);
        let mut queue = PendingQueue::new();
        let fields = FieldRegistry::new();
        let mut out = Vec::new();
        serialize_step(&mut out, &mut commands, &mut queue, &fields);
        assert_eq!(commands.step_global, None);
        assert_eq!(out, vec![opcode::SIMULATION_RESET]);
    }
}
