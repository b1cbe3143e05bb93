//! # supervisor-engine::dispatcher
//!
//! The reply dispatcher, per spec §4.6: reads one opcode byte and the
//! payload appropriate for it, updating registries and command slots in
//! place. The default arm rewinds the opcode byte and reports
//! `DispatchOutcome::Unhandled` so a host embedding this engine alongside
//! the base-controller reply loop can chain dispatch without this crate
//! owning that loop.
//!
//! Handle-resolution replies (`NODE_GET_FROM_DEF`, `FIELD_GET_FROM_NAME`)
//! are deliberately NOT handled here: their payload omits the string the
//! caller asked with (the client already holds it), so only the API
//! surface — which still has that string in scope — can interpret them.
//! `api.rs` reads those two opcodes directly instead of going through
//! `dispatch_all`. Everything else either carries its own context in the
//! payload (`NODE_GET_SELECTED`/`BY_ID`/`BY_TAG`) or gets its context from
//! the command slots the API populated before flushing
//! (`FIELD_GET_VALUE` from the "sent GET", attribute queries from
//! `CommandSlots`).

use supervisor_transport::opcode;
use supervisor_types::errors::CodecError;
use supervisor_types::field_type::{FieldType, ScalarKind};
use supervisor_types::node_type::NodeType;
use supervisor_types::time::SimTime;
use supervisor_types::value::FieldValue;

use crate::commands::CommandSlots;
use crate::field::FieldRegistry;
use crate::node::model::ContactPoint;
use crate::node::NodeRegistry;
use crate::queue::PendingRequest;

/// What happened to the byte the dispatcher consumed.
pub enum DispatchOutcome {
    /// The opcode was recognized and handled; registries/slots were updated.
    Handled,
    /// The opcode byte was rewound; a caller embedding the base controller's
    /// reply loop should take over from the reader's current position.
    Unhandled,
}

/// Reads and applies reply frames for one step.
pub struct ReplyDispatcher<'a> {
    pub nodes: &'a mut NodeRegistry,
    pub fields: &'a mut FieldRegistry,
    pub commands: &'a mut CommandSlots,
    pub allows_contact_point_internal_node: bool,
}

impl<'a> ReplyDispatcher<'a> {
    pub fn new(nodes: &'a mut NodeRegistry, fields: &'a mut FieldRegistry, commands: &'a mut CommandSlots) -> Self {
        Self { nodes, fields, commands, allows_contact_point_internal_node: false }
    }

    /// Dispatches every reply opcode in `r` until the reader is empty or an
    /// unrecognized opcode is hit (at which point it rewinds and returns).
    ///
    /// `sent_get` is the field request the serializer moved out of the
    /// pending queue for this step (§4.5); `FIELD_GET_VALUE` updates its
    /// cached value against that field.
    pub fn dispatch_all(
        &mut self,
        r: &mut dyn supervisor_transport::ReplyReader,
        sent_get: Option<&PendingRequest>,
    ) -> Result<(), CodecError> {
        while !r.is_empty() {
            if let DispatchOutcome::Unhandled = self.dispatch_one(r, sent_get)? {
                break;
            }
        }
        Ok(())
    }

    fn dispatch_one(
        &mut self,
        r: &mut dyn supervisor_transport::ReplyReader,
        sent_get: Option<&PendingRequest>,
    ) -> Result<DispatchOutcome, CodecError> {
        let op = r.read_u8()?;
        match op {
            opcode::REPLY_CONFIGURE => {
                let self_uid = r.read_u32()?;
                let is_proto = r.read_u8()? != 0;
                let _is_proto_internal = r.read_u8()? != 0;
                let model = r.read_str()?;
                let _def = r.read_str()?;
                self.nodes.upsert(self_uid, NodeType::Robot, Some(model), None, 0, -1, is_proto);
            }
            opcode::REPLY_NODE_GET_SELECTED | opcode::REPLY_NODE_GET_BY_ID | opcode::REPLY_NODE_GET_BY_TAG => {
                let uid = r.read_u32()?;
                let node_type = NodeType::from_wire(r.read_u32()?);
                let tag = r.read_i32()?;
                let parent_uid = r.read_u32()?;
                let is_proto = r.read_u8()? != 0;
                let is_proto_internal = r.read_u8()? != 0;
                let model = r.read_str()?;
                let def = r.read_str()?;
                if is_proto_internal && !self.allows_contact_point_internal_node {
                    // §4.6: skip unless the simulator explicitly flagged this
                    // handle as visible despite being proto-internal.
                } else {
                    self.nodes.upsert(uid, node_type, Some(model), Some(def), tag, parent_uid as i64, is_proto);
                    if let Some(n) = self.nodes.find_by_id_mut(uid) {
                        n.is_proto_internal = is_proto_internal;
                    }
                }
            }
            opcode::REPLY_FIELD_GET_VALUE => {
                let field_type_tag = r.read_i32()?;
                if field_type_tag == 0 {
                    // §7: the remote object vanished; the caller gets the
                    // sentinel and the pending slot is already clear since
                    // the serializer moved it into `sent_get`, not the queue.
                    return Ok(DispatchOutcome::Handled);
                }
                let field_type = FieldType::from_wire(field_type_tag as u32)
                    .ok_or(CodecError::UnknownFieldType(field_type_tag as u32))?;
                let value = read_value(r, field_type)?;
                if let Some(req) = sent_get {
                    if let FieldValue::Node(Some(id)) = &value {
                        self.nodes.upsert(*id, NodeType::Group, None, None, 0, req.node_id as i64, false);
                    }
                    if let Some(f) = self.fields.find_by_id_mut(req.node_id, req.field_id) {
                        if field_type.multi {
                            f.count = f.count.max(req.index + 1);
                        }
                        f.data = Some(value);
                    }
                }
            }
            opcode::REPLY_NODE_REGENERATED => {
                self.nodes.purge_proto_internal();
                self.fields.purge_proto_internal();
            }
            opcode::REPLY_FIELD_INSERT_VALUE => {
                self.commands.imported_nodes_number = Some(r.read_i32()?);
            }
            opcode::REPLY_NODE_REMOVE_NODE => {
                let removed_uid = r.read_u32()?;
                let parent_uid = r.read_i32()?;
                let parent_field_name = r.read_str()?;
                let new_count = r.read_i32()?;
                self.nodes.remove(removed_uid);
                self.fields.purge_owned_by(removed_uid);
                if parent_uid >= 0 {
                    if let Some(f) = self.fields.find_mut(&parent_field_name, parent_uid as u32) {
                        f.count = new_count;
                    }
                }
            }
            opcode::REPLY_NODE_GET_POSITION => {
                let pos = [r.read_f64()?, r.read_f64()?, r.read_f64()?];
                if let Some(n) = self.commands.get_position.and_then(|id| self.nodes.find_by_id_mut(id)) {
                    n.position = Some(pos);
                }
            }
            opcode::REPLY_NODE_GET_ORIENTATION => {
                let mut m = [0.0; 9];
                for slot in &mut m {
                    *slot = r.read_f64()?;
                }
                if let Some(n) = self.commands.get_orientation.and_then(|id| self.nodes.find_by_id_mut(id)) {
                    n.orientation = Some(m);
                }
            }
            opcode::REPLY_NODE_GET_CENTER_OF_MASS => {
                let com = [r.read_f64()?, r.read_f64()?, r.read_f64()?];
                if let Some(n) = self.commands.get_center_of_mass.and_then(|id| self.nodes.find_by_id_mut(id)) {
                    n.center_of_mass = Some(com);
                }
            }
            opcode::REPLY_NODE_GET_CONTACT_POINTS => {
                let n_points = r.read_i32()?;
                let mut points = Vec::with_capacity(n_points.max(0) as usize);
                for _ in 0..n_points.max(0) {
                    let position = [r.read_f64()?, r.read_f64()?, r.read_f64()?];
                    let node_id = r.read_i32()?;
                    points.push(ContactPoint { position, node_id });
                }
                if let Some((target, _)) = self.commands.get_contact_points {
                    if let Some(n) = self.nodes.find_by_id_mut(target) {
                        n.contact_points = Some(points);
                    }
                }
            }
            opcode::REPLY_NODE_GET_STATIC_BALANCE => {
                let balanced = r.read_u8()? != 0;
                if let Some(n) = self.commands.get_static_balance.and_then(|id| self.nodes.find_by_id_mut(id)) {
                    n.static_balance = Some(balanced);
                }
            }
            opcode::REPLY_NODE_GET_VELOCITY => {
                let mut v = [0.0; 6];
                for slot in &mut v {
                    *slot = r.read_f64()?;
                }
                if let Some(n) = self.commands.get_velocity.and_then(|id| self.nodes.find_by_id_mut(id)) {
                    n.solid_velocity = Some(v);
                }
            }
            opcode::REPLY_MOVIE_STATUS => self.commands.movie_status = Some(r.read_u8()?),
            opcode::REPLY_ANIMATION_START_STATUS => self.commands.animation_start_status = Some(r.read_u8()?),
            opcode::REPLY_ANIMATION_STOP_STATUS => self.commands.animation_stop_status = Some(r.read_u8()?),
            opcode::REPLY_SAVE_WORLD => self.commands.save_world_status = Some(r.read_u8()? != 0),
            opcode::REPLY_VR_HEADSET_IS_USED => self.commands.vr_headset_in_use = Some(r.read_u8()? != 0),
            opcode::REPLY_VR_HEADSET_GET_POSITION => {
                self.commands.vr_headset_position = Some([r.read_f64()?, r.read_f64()?, r.read_f64()?]);
            }
            opcode::REPLY_VR_HEADSET_GET_ORIENTATION => {
                let mut m = [0.0; 9];
                for slot in &mut m {
                    *slot = r.read_f64()?;
                }
                self.commands.vr_headset_orientation = Some(m);
            }
            _ => {
                r.rewind_opcode();
                return Ok(DispatchOutcome::Unhandled);
            }
        }
        Ok(DispatchOutcome::Handled)
    }
}

fn read_value(
    r: &mut dyn supervisor_transport::ReplyReader,
    field_type: FieldType,
) -> Result<FieldValue, CodecError> {
    Ok(match field_type.scalar {
        ScalarKind::Bool => FieldValue::Bool(r.read_u8()? != 0),
        ScalarKind::Int32 => FieldValue::Int32(r.read_i32()?),
        ScalarKind::Float => FieldValue::Float(r.read_f64()?),
        ScalarKind::Vec2f => FieldValue::Vec2f([r.read_f64()?, r.read_f64()?]),
        ScalarKind::Vec3f => FieldValue::Vec3f([r.read_f64()?, r.read_f64()?, r.read_f64()?]),
        ScalarKind::Color => FieldValue::Color([r.read_f64()?, r.read_f64()?, r.read_f64()?]),
        ScalarKind::Rotation => {
            FieldValue::Rotation([r.read_f64()?, r.read_f64()?, r.read_f64()?, r.read_f64()?])
        }
        ScalarKind::String => FieldValue::String(r.read_str()?),
        ScalarKind::Node => {
            let id = r.read_u32()?;
            FieldValue::Node(if id == u32::MAX { None } else { Some(id) })
        }
    })
}

/// §5, §8 invariant 9: a contact-point query refreshes the cache only if
/// simulation time has strictly advanced since the cached timestamp.
pub fn contact_points_need_refresh(cached: SimTime, current: SimTime) -> bool {
    supervisor_types::time::is_stale(cached, current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::PendingKind;
    use supervisor_transport::mock::ByteReader;
    use supervisor_transport::RequestWriter;

    #[test]
    fn node_regenerated_purges_proto_internal_nodes_and_fields() {
        let mut nodes = NodeRegistry::new();
        let mut fields = FieldRegistry::new();
        let mut commands = CommandSlots::new();
        nodes.upsert(5, NodeType::Solid, None, None, 0, 0, false);
        nodes.find_by_id_mut(5).unwrap().is_proto_internal = true;
        fields.create_from_reply(5, "x".into(), 1, FieldType::sf(ScalarKind::Bool), -1, true);

        let mut buf: Vec<u8> = Vec::new();
        buf.write_u8(opcode::REPLY_NODE_REGENERATED);

        let mut dispatcher = ReplyDispatcher::new(&mut nodes, &mut fields, &mut commands);
        let mut reader = ByteReader::new(buf);
        dispatcher.dispatch_all(&mut reader, None).unwrap();

        assert!(nodes.find_by_id(5).is_none());
        assert!(fields.is_empty());
    }

    #[test]
    fn field_get_value_updates_the_sent_gets_field() {
        let mut nodes = NodeRegistry::new();
        let mut fields = FieldRegistry::new();
        let mut commands = CommandSlots::new();
        fields.create_from_reply(1, "translation".into(), 9, FieldType::sf(ScalarKind::Float), -1, false);

        let mut buf: Vec<u8> = Vec::new();
        buf.write_opcode(opcode::REPLY_FIELD_GET_VALUE);
        buf.write_i32(FieldType::sf(ScalarKind::Float).to_wire() as i32);
        buf.write_f64(3.14);

        let sent = PendingRequest { kind: PendingKind::Get, node_id: 1, field_id: 9, index: -1, data: None };
        let mut dispatcher = ReplyDispatcher::new(&mut nodes, &mut fields, &mut commands);
        let mut reader = ByteReader::new(buf);
        dispatcher.dispatch_all(&mut reader, Some(&sent)).unwrap();

        assert_eq!(fields.find_by_id(1, 9).unwrap().data, Some(FieldValue::Float(3.14)));
    }

    #[test]
    fn node_get_position_reply_is_stored_against_the_commands_target() {
        let mut nodes = NodeRegistry::new();
        let mut fields = FieldRegistry::new();
        let mut commands = CommandSlots::new();
        nodes.upsert(4, NodeType::Solid, None, None, 0, 0, false);
        commands.get_position = Some(4);

        let mut buf: Vec<u8> = Vec::new();
        buf.write_opcode(opcode::REPLY_NODE_GET_POSITION);
        buf.write_f64(1.0);
        buf.write_f64(2.0);
        buf.write_f64(3.0);

        let mut dispatcher = ReplyDispatcher::new(&mut nodes, &mut fields, &mut commands);
        let mut reader = ByteReader::new(buf);
        dispatcher.dispatch_all(&mut reader, None).unwrap();

        assert_eq!(nodes.find_by_id(4).unwrap().position, Some([1.0, 2.0, 3.0]));
    }

    #[test]
    fn unrecognized_opcode_is_rewound_and_reported_unhandled() {
        let mut nodes = NodeRegistry::new();
        let mut fields = FieldRegistry::new();
        let mut commands = CommandSlots::new();
        let mut buf: Vec<u8> = Vec::new();
        buf.write_u8(0xFF);
        buf.write_u32(42);

        let mut dispatcher = ReplyDispatcher::new(&mut nodes, &mut fields, &mut commands);
        let mut reader = ByteReader::new(buf);
        let outcome = dispatcher.dispatch_one(&mut reader, None).unwrap();
        assert!(matches!(outcome, DispatchOutcome::Unhandled));
        assert_eq!(reader.read_u8().unwrap(), 0xFF);
    }
}
