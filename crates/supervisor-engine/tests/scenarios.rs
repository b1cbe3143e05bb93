//! Cross-module scenario tests (S1-S6), matching the teacher's
//! `tests/integration.rs`-per-crate convention for multi-component flows
//! that don't fit naturally inside a single module's `#[cfg(test)]` block.
//! Each scenario drives the engine purely through its public API and a
//! scripted `InMemoryTransport`, the same way a host controller would.

use supervisor_engine::api::SupervisorEngine;
use supervisor_transport::mock::InMemoryTransport;
use supervisor_transport::{opcode, RequestWriter};
use supervisor_types::field_type::{FieldType, ScalarKind};
use supervisor_types::node_type::NodeType;

fn reply_configure(self_uid: u32, model: &str) -> Vec<u8> {
    let mut b = Vec::new();
    b.write_u8(opcode::REPLY_CONFIGURE);
    b.write_u32(self_uid);
    b.write_u8(0);
    b.write_u8(0);
    b.write_str(model);
    b.write_str("");
    b
}

#[allow(clippy::too_many_arguments)]
fn reply_full_node(uid: u32, node_type: NodeType, tag: i32, parent_uid: u32, is_proto: bool, model: &str, def: &str) -> Vec<u8> {
    let mut b = Vec::new();
    b.write_u8(opcode::REPLY_NODE_GET_BY_ID);
    b.write_u32(uid);
    b.write_u32(node_type.to_wire());
    b.write_i32(tag);
    b.write_u32(parent_uid);
    b.write_u8(is_proto as u8);
    b.write_u8(0);
    b.write_str(model);
    b.write_str(def);
    b
}

fn reply_node_from_def(uid: u32, node_type: NodeType, parent_uid: u32, model: &str) -> Vec<u8> {
    let mut b = Vec::new();
    b.write_u8(opcode::REPLY_NODE_GET_FROM_DEF);
    b.write_u32(uid);
    b.write_u32(node_type.to_wire());
    b.write_i32(0);
    b.write_u32(parent_uid);
    b.write_u8(0);
    b.write_str(model);
    b
}

fn reply_field_from_name(field_ref: i32, field_type: FieldType, is_proto_internal: bool, count: Option<i32>) -> Vec<u8> {
    let mut b = Vec::new();
    b.write_u8(opcode::REPLY_FIELD_GET_FROM_NAME);
    b.write_i32(field_ref);
    b.write_i32(field_type.to_wire() as i32);
    b.write_u8(is_proto_internal as u8);
    if let Some(c) = count {
        b.write_i32(c);
    }
    b
}

fn reply_node_remove(removed_uid: u32, parent_uid: i32, parent_field_name: &str, new_count: i32) -> Vec<u8> {
    let mut b = Vec::new();
    b.write_u8(opcode::REPLY_NODE_REMOVE_NODE);
    b.write_u32(removed_uid);
    b.write_i32(parent_uid);
    b.write_str(parent_field_name);
    b.write_i32(new_count);
    b
}

fn reply_contact_points(points: &[([f64; 3], i32)]) -> Vec<u8> {
    let mut b = Vec::new();
    b.write_u8(opcode::REPLY_NODE_GET_CONTACT_POINTS);
    b.write_i32(points.len() as i32);
    for (pos, node_id) in points {
        pos.iter().for_each(|c| b.write_f64(*c));
        b.write_i32(*node_id);
    }
    b
}

fn configured_engine() -> SupervisorEngine<InMemoryTransport> {
    let mut t = InMemoryTransport::new();
    t.queue_reply(reply_configure(1, "Robot"));
    let mut engine = SupervisorEngine::new(t);
    engine.configure().unwrap();
    engine
}

/// S1: the second `node_get_from_def` for the same DEF name returns the
/// cached handle without touching the wire.
#[test]
fn s1_handle_caching_avoids_a_second_flush() {
    let mut engine = configured_engine();
    engine.transport_mut().queue_reply(reply_node_from_def(5, NodeType::Robot, 1, "Robot"));

    let first = engine.node_get_from_def("ROBOT1", None);
    assert_eq!(first, Some(5));
    let flushes_after_first = engine.transport().flush_count();
    assert_eq!(engine.transport().last_request()[0], opcode::NODE_GET_FROM_DEF);

    let second = engine.node_get_from_def("ROBOT1", None);
    assert_eq!(second, first);
    assert_eq!(engine.transport().flush_count(), flushes_after_first);
}

/// S2: a SET followed immediately by a GET on the same field is served
/// from the pending queue's coalesced value, with zero wire traffic.
#[test]
fn s2_write_then_read_coalesces_without_a_flush() {
    let mut engine = configured_engine();
    engine.transport_mut().queue_reply(reply_field_from_name(9, FieldType::sf(ScalarKind::Float), false, None));
    let field = engine.field_get_from_name(1, "translation", None).unwrap();

    let flushes_before = engine.transport().flush_count();
    assert!(engine.sf_set_float(1, field, 3.14));
    assert_eq!(engine.sf_get_float(1, field), 3.14);
    assert_eq!(engine.transport().flush_count(), flushes_before);
}

/// S3: a zero rotation axis is rejected locally (no wire traffic, no
/// mutation); a valid axis enqueues a coalesced SET readable without a flush.
#[test]
fn s3_rotation_validation() {
    let mut engine = configured_engine();
    engine.transport_mut().queue_reply(reply_field_from_name(11, FieldType::sf(ScalarKind::Rotation), false, None));
    let field = engine.field_get_from_name(1, "rotation", None).unwrap();
    let flushes_before = engine.transport().flush_count();

    assert!(!engine.sf_set_rotation(1, field, [0.0, 0.0, 0.0], 1.0));
    assert_eq!(engine.transport().flush_count(), flushes_before);

    assert!(engine.sf_set_rotation(1, field, [0.0, 1.0, 0.0], 1.57));
    assert_eq!(engine.transport().flush_count(), flushes_before);
    assert_eq!(engine.sf_get_rotation(1, field), [0.0, 1.0, 0.0, 1.57]);
    assert_eq!(engine.transport().flush_count(), flushes_before);
}

/// S4: removing a child refreshes the parent field's count from the wire
/// reply, and the removed child's handle stops resolving.
#[test]
fn s4_node_removal_refreshes_parent_field_count() {
    let mut engine = configured_engine();

    engine.transport_mut().queue_reply(reply_full_node(2, NodeType::Solid, 0, 1, false, "Solid", "P"));
    let parent = engine.node_get_from_id(2).unwrap();

    engine
        .transport_mut()
        .queue_reply(reply_field_from_name(10, FieldType::mf(ScalarKind::Node), false, Some(3)));
    let children_field = engine.field_get_from_name(parent, "children", None).unwrap();

    engine.transport_mut().queue_reply(reply_full_node(3, NodeType::Solid, 0, 2, false, "Solid", "C"));
    let child = engine.node_get_from_id(3).unwrap();

    engine.transport_mut().queue_reply(reply_node_remove(3, parent as i32, "children", 2));
    assert!(engine.node_remove(child));

    assert_eq!(engine.field_get_count(parent, children_field), 2);
    assert!(!engine.is_node_ref_valid(child));
}

/// S5: after drilling into a prototype's internal DEF table and fetching an
/// internal field, a `NODE_REGENERATED` reply purges both, while the
/// enclosing prototype handle keeps resolving.
#[test]
fn s5_node_regenerated_purges_proto_internal_state() {
    let mut engine = configured_engine();

    engine.transport_mut().queue_reply(reply_full_node(2, NodeType::Solid, 0, 1, true, "MyProto", "P"));
    let proto = engine.node_get_from_id(2).unwrap();

    engine.transport_mut().queue_reply(reply_node_from_def(7, NodeType::Solid, 2, "Solid"));
    let inner = engine.node_get_from_proto_def(proto, "INNER").unwrap();

    engine
        .transport_mut()
        .queue_reply(reply_field_from_name(20, FieldType::sf(ScalarKind::Bool), true, None));
    engine.field_get_from_name(inner, "enabled", Some(true)).unwrap();

    engine.transport_mut().queue_reply({
        let mut b = Vec::new();
        b.write_u8(opcode::REPLY_NODE_REGENERATED);
        b
    });
    engine.step().unwrap();

    assert!(!engine.is_node_ref_valid(inner));
    assert!(engine.is_node_ref_valid(proto));
}

/// S6: a contact-point query only hits the wire when simulation time has
/// strictly advanced since the cache was last refreshed.
#[test]
fn s6_contact_point_freshness() {
    let mut engine = configured_engine();
    engine.transport_mut().queue_reply(reply_full_node(4, NodeType::Solid, 0, 1, false, "Solid", "N"));
    let node = engine.node_get_from_id(4).unwrap();

    engine.transport_mut().queue_reply(reply_contact_points(&[([1.0, 2.0, 3.0], 9)]));
    let flushes_before = engine.transport().flush_count();
    let first = engine.node_get_contact_points(node, false, 1.0);
    assert_eq!(engine.transport().flush_count(), flushes_before + 1);
    assert_eq!(first.len(), 1);

    let second = engine.node_get_contact_points(node, false, 1.0);
    assert_eq!(engine.transport().flush_count(), flushes_before + 1);
    assert_eq!(second.len(), first.len());

    engine.transport_mut().queue_reply(reply_contact_points(&[]));
    let third = engine.node_get_contact_points(node, false, 1.032);
    assert_eq!(engine.transport().flush_count(), flushes_before + 2);
    assert!(third.is_empty());
}
