//! # supervisor-engine::api
//!
//! `SupervisorEngine<T>`, the public surface per spec §4.7. Every method
//! follows the same six-step shape: check `is_supervisor`, validate
//! arguments locally, acquire the step lock, mutate a command slot or
//! enqueue a field request (coalescing where §4.3 calls for it), flush and
//! dispatch when the operation is synchronous, release the lock.
//!
//! Handle-resolution opcodes whose wire payload omits the caller's string
//! context (`NODE_GET_FROM_DEF`, `FIELD_GET_FROM_NAME`) are read directly
//! here rather than through `ReplyDispatcher` — see `dispatcher.rs`'s module
//! doc comment for why.

use supervisor_types::errors::{EngineError, ValidationError};
use supervisor_types::field_type::{FieldType, ScalarKind};
use supervisor_types::id::{FieldId, NodeId, ROOT_NODE_ID};
use supervisor_types::node_type::NodeType;
use supervisor_types::time::SimTime;
use supervisor_types::value::FieldValue;
use supervisor_types::config::EngineConfig;

use supervisor_transport::opcode;
use supervisor_transport::transport::Transport;
use supervisor_transport::{ReplyReader, RequestWriter};

use crate::commands::{
    AddForce, AddForceWithOffset, CommandSlots, ExportImage, LabelCommand, SetVelocity, SetVisibility,
    StartMovie, StepGlobalCommand,
};
use crate::diagnostics::{Diagnostic, DiagnosticSink, StderrSink};
use crate::dispatcher::{contact_points_need_refresh, ReplyDispatcher};
use crate::field::FieldRegistry;
use crate::node::model::ContactPoint;
use crate::node::NodeRegistry;
use crate::queue::{PendingKind, PendingQueue, PendingRequest};
use crate::validation;

/// Depth-counter reentrancy guard for the "one step mutex" model from
/// §4.7/§9 (an explicit Non-goal of full thread safety; this only catches a
/// caller re-entering the engine from within its own callback).
#[derive(Default)]
struct StepLock {
    depth: u32,
}

impl StepLock {
    fn enter(&mut self) {
        assert_eq!(self.depth, 0, "supervisor engine re-entered while a step was already in progress");
        self.depth += 1;
    }

    fn exit(&mut self) {
        self.depth -= 1;
    }
}

/// The stateful core: registries mirroring the remote scene graph, the
/// pending-operations queue, this step's command slots, and the transport
/// the serializer/dispatcher read and write through.
pub struct SupervisorEngine<T: Transport> {
    nodes: NodeRegistry,
    fields: FieldRegistry,
    queue: PendingQueue,
    commands: CommandSlots,
    garbage: Vec<PendingRequest>,
    transport: T,
    sink: Box<dyn DiagnosticSink>,
    config: EngineConfig,
    step_lock: StepLock,
    is_supervisor: bool,
    is_quitting: bool,
    self_node_id: Option<NodeId>,
}

impl<T: Transport> SupervisorEngine<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, EngineConfig::default())
    }

    pub fn with_config(transport: T, config: EngineConfig) -> Self {
        Self {
            nodes: NodeRegistry::new(),
            fields: FieldRegistry::new(),
            queue: PendingQueue::new(),
            commands: CommandSlots::new(),
            garbage: Vec::new(),
            transport,
            sink: Box::new(StderrSink),
            config,
            step_lock: StepLock::default(),
            is_supervisor: false,
            is_quitting: false,
            self_node_id: None,
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn is_supervisor(&self) -> bool {
        self.is_supervisor
    }

    pub fn self_node(&self) -> Option<NodeId> {
        self.self_node_id
    }

    pub fn set_quitting(&mut self, quitting: bool) {
        self.is_quitting = quitting;
    }

    pub fn is_quitting(&self) -> bool {
        self.is_quitting
    }

    /// Garbage retained from the last flush, freed by the next one (§5).
    /// Exposed for tests asserting the garbage list doesn't grow unbounded.
    pub fn garbage_len(&self) -> usize {
        self.garbage.len()
    }

    // ---- internal helpers -------------------------------------------------

    fn with_step<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.step_lock.enter();
        let result = f(self);
        self.step_lock.exit();
        result
    }

    fn reject(&self, function: &'static str, err: impl std::fmt::Display) {
        if self.is_quitting && self.config.suppress_diagnostics_when_quitting {
            return;
        }
        let message = err.to_string();
        tracing::warn!(function, %message, "supervisor call rejected");
        self.sink.emit(&Diagnostic { function, message });
    }

    fn require_supervisor(&mut self, function: &'static str) -> bool {
        if self.is_supervisor {
            true
        } else {
            self.reject(function, ValidationError::NotASupervisor);
            false
        }
    }

    /// Serializes, flushes, and dispatches one step's frame. Swaps the
    /// garbage list only after dispatch completes, per §4.6's "free the
    /// prior step's garbage after the reply for this step has been read".
    fn flush_and_dispatch(&mut self, function: &'static str) -> Result<(), EngineError> {
        let outcome =
            crate::serializer::serialize_step(&mut self.transport, &mut self.commands, &mut self.queue, &self.fields);
        if let Err(e) = self.transport.flush() {
            self.reject(function, &e);
            return Err(EngineError::Transport(e));
        }
        let mut dispatcher = ReplyDispatcher::new(&mut self.nodes, &mut self.fields, &mut self.commands);
        dispatcher.allows_contact_point_internal_node = self.config.contact_point_internal_nodes_visible;
        let result = dispatcher.dispatch_all(&mut self.transport, outcome.sent_get.as_ref());
        self.garbage = outcome.garbage;
        if let Err(e) = &result {
            self.reject(function, e);
        }
        result.map_err(EngineError::from)
    }

    /// Reads a `NODE_GET_SELECTED`/`BY_ID`/`BY_TAG` reply, which is always
    /// fully self-contained (no caller-context needed to interpret it).
    fn read_full_node_reply(&mut self) -> Option<NodeId> {
        let op = self.transport.read_u8().ok()?;
        if !matches!(op, opcode::REPLY_NODE_GET_SELECTED | opcode::REPLY_NODE_GET_BY_ID | opcode::REPLY_NODE_GET_BY_TAG) {
            self.transport.rewind_opcode();
            return None;
        }
        let uid = self.transport.read_u32().ok()?;
        if uid == u32::MAX {
            return None;
        }
        let node_type = NodeType::from_wire(self.transport.read_u32().ok()?);
        let tag = self.transport.read_i32().ok()?;
        let parent_uid = self.transport.read_u32().ok()?;
        let is_proto = self.transport.read_u8().ok()? != 0;
        let is_proto_internal = self.transport.read_u8().ok()? != 0;
        let model = self.transport.read_str().ok()?;
        let def = self.transport.read_str().ok()?;
        if is_proto_internal && !self.config.contact_point_internal_nodes_visible {
            return None;
        }
        let id = self.nodes.upsert(uid, node_type, Some(model), Some(def), tag, parent_uid as i64, is_proto);
        if let Some(n) = self.nodes.find_by_id_mut(id) {
            n.is_proto_internal = is_proto_internal;
        }
        Some(id)
    }

    // ---- startup ------------------------------------------------------

    /// Reads the `CONFIGURE` reply the simulator sends on process startup,
    /// registering the self node and marking the process as a supervisor.
    /// Must be called once before any other method.
    pub fn configure(&mut self) -> Result<(), EngineError> {
        self.with_step(|eng| {
            let mut dispatcher = ReplyDispatcher::new(&mut eng.nodes, &mut eng.fields, &mut eng.commands);
            dispatcher.dispatch_all(&mut eng.transport, None)?;
            eng.is_supervisor = true;
            eng.self_node_id = eng.nodes.iter().map(|n| n.id).find(|id| *id != ROOT_NODE_ID);
            Ok(())
        })
    }

    /// The per-tick entry point a host controller calls even when no
    /// synchronous call forced a flush this tick, so queued SETs and
    /// accumulated command slots are still shipped every simulation step.
    pub fn step(&mut self) -> Result<(), EngineError> {
        self.with_step(|eng| eng.flush_and_dispatch("step"))
    }

    // ---- handle resolution (§4.5 phase 2) -----------------------------

    pub fn node_get_from_id(&mut self, id: NodeId) -> Option<NodeId> {
        if !self.require_supervisor("wb_supervisor_node_get_from_id") {
            return None;
        }
        if self.nodes.find_by_id(id).is_some() {
            return Some(id);
        }
        self.with_step(|eng| {
            eng.transport.write_opcode(opcode::NODE_GET_FROM_ID);
            eng.transport.write_u32(id);
            if eng.transport.flush().is_err() {
                return None;
            }
            eng.read_full_node_reply()
        })
    }

    pub fn node_get_from_tag(&mut self, tag: i32) -> Option<NodeId> {
        if !self.require_supervisor("wb_supervisor_node_get_from_tag") {
            return None;
        }
        if let Some(n) = self.nodes.find_by_tag(tag) {
            return Some(n.id);
        }
        self.with_step(|eng| {
            eng.transport.write_opcode(opcode::NODE_GET_FROM_TAG);
            eng.transport.write_i32(tag);
            if eng.transport.flush().is_err() {
                return None;
            }
            eng.read_full_node_reply()
        })
    }

    pub fn node_get_selected(&mut self) -> Option<NodeId> {
        if !self.require_supervisor("wb_supervisor_node_get_selected") {
            return None;
        }
        self.with_step(|eng| {
            eng.transport.write_opcode(opcode::NODE_GET_SELECTED);
            if eng.transport.flush().is_err() {
                return None;
            }
            eng.read_full_node_reply()
        })
    }

    /// `within_proto` scopes the search to a PROTO's internal DEF table
    /// (§4.1); pass `None` to search the regular, non-internal namespace.
    pub fn node_get_from_def(&mut self, def: &str, within_proto: Option<NodeId>) -> Option<NodeId> {
        if !self.require_supervisor("wb_supervisor_node_get_from_def") {
            return None;
        }
        if let Some(n) = self.nodes.find_by_def(def, within_proto) {
            return Some(n.id);
        }
        self.with_step(|eng| {
            eng.transport.write_opcode(opcode::NODE_GET_FROM_DEF);
            eng.transport.write_u32(within_proto.unwrap_or(ROOT_NODE_ID));
            eng.transport.write_str(def);
            if eng.transport.flush().is_err() {
                return None;
            }
            let op = eng.transport.read_u8().ok()?;
            if op != opcode::REPLY_NODE_GET_FROM_DEF {
                eng.transport.rewind_opcode();
                return None;
            }
            let uid = eng.transport.read_u32().ok()?;
            if uid == u32::MAX {
                return None;
            }
            let node_type = NodeType::from_wire(eng.transport.read_u32().ok()?);
            let tag = eng.transport.read_i32().ok()?;
            let parent_uid = eng.transport.read_u32().ok()?;
            let is_proto = eng.transport.read_u8().ok()? != 0;
            let model = eng.transport.read_str().ok()?;
            Some(eng.nodes.upsert(uid, node_type, Some(model), Some(def.to_string()), tag, parent_uid as i64, is_proto))
        })
    }

    /// Supplemented accessor (scenario S5): resolves a DEF name nested
    /// inside `proto_id`'s private subtree, stamping the returned handle as
    /// proto-internal since that flag isn't carried on the wire for this
    /// particular reply (only the `SELECTED`/`BY_ID`/`BY_TAG` replies carry it).
    pub fn node_get_from_proto_def(&mut self, proto_id: NodeId, def: &str) -> Option<NodeId> {
        let id = self.node_get_from_def(def, Some(proto_id))?;
        if let Some(n) = self.nodes.find_by_id_mut(id) {
            n.is_proto_internal = true;
            n.parent_proto = Some(proto_id);
        }
        Some(id)
    }

    pub fn field_get_from_name(&mut self, node_id: NodeId, name: &str, allow_search_in_proto: Option<bool>) -> Option<FieldId> {
        let fn_name = "wb_supervisor_node_get_field";
        if !self.require_supervisor(fn_name) {
            return None;
        }
        if self.nodes.find_by_id(node_id).is_none() {
            self.reject(fn_name, ValidationError::InvalidNodeHandle);
            return None;
        }
        if let Some(f) = self.fields.find(name, node_id) {
            return Some(f.id);
        }
        let allow_proto = allow_search_in_proto.unwrap_or(self.config.allow_search_in_proto_default);
        self.with_step(|eng| {
            eng.transport.write_opcode(opcode::FIELD_GET_FROM_NAME);
            eng.transport.write_u32(node_id);
            eng.transport.write_str(name);
            eng.transport.write_u8(allow_proto as u8);
            if eng.transport.flush().is_err() {
                return None;
            }
            let op = eng.transport.read_u8().ok()?;
            if op != opcode::REPLY_FIELD_GET_FROM_NAME {
                eng.transport.rewind_opcode();
                return None;
            }
            let field_ref = eng.transport.read_i32().ok()?;
            let field_type_tag = eng.transport.read_i32().ok()? as u32;
            let is_proto_internal = eng.transport.read_u8().ok()? != 0;
            let ft = FieldType::from_wire(field_type_tag)?;
            let count = if ft.multi { eng.transport.read_i32().ok()? } else { -1 };
            if field_ref < 0 {
                return None;
            }
            Some(eng.fields.create_from_reply(node_id, name.to_string(), field_ref as u32, ft, count, is_proto_internal))
        })
    }

    // ---- generic field value operations (§4.2/§4.3) -------------------

    fn field_get_value(
        &mut self,
        function: &'static str,
        node_id: NodeId,
        field_id: FieldId,
        raw_index: i32,
        expected: ScalarKind,
        multi: bool,
    ) -> Option<FieldValue> {
        if !self.require_supervisor(function) {
            return None;
        }
        let (field_type, count) = match self.fields.find_by_id(node_id, field_id) {
            Some(f) => (f.field_type, f.count),
            None => {
                self.reject(function, ValidationError::InvalidFieldHandle);
                return None;
            }
        };
        if let Err(e) = validation::field_type_matches(field_type, expected, multi) {
            self.reject(function, e);
            return None;
        }
        let index = if multi {
            match validation::mf_index_for_get_set_remove(raw_index, count) {
                Ok(i) => i,
                Err(e) => {
                    self.reject(function, e);
                    return None;
                }
            }
        } else {
            -1
        };
        if let Some(v) = self.queue.find_queued_set(field_id, index) {
            return Some(v.clone());
        }
        self.with_step(|eng| {
            eng.queue.push(PendingRequest { kind: PendingKind::Get, node_id, field_id, index, data: None });
            if eng.flush_and_dispatch(function).is_err() {
                return None;
            }
            eng.fields.find_by_id(node_id, field_id).and_then(|f| f.data.clone())
        })
    }

    fn field_set_value(
        &mut self,
        function: &'static str,
        node_id: NodeId,
        field_id: FieldId,
        raw_index: i32,
        expected: ScalarKind,
        multi: bool,
        value: FieldValue,
    ) -> bool {
        if !self.require_supervisor(function) {
            return false;
        }
        let (field_type, count, is_proto_internal) = match self.fields.find_by_id(node_id, field_id) {
            Some(f) => (f.field_type, f.count, f.is_proto_internal),
            None => {
                self.reject(function, ValidationError::InvalidFieldHandle);
                return false;
            }
        };
        if let Err(e) = validation::non_proto_internal(is_proto_internal) {
            self.reject(function, e);
            return false;
        }
        if let Err(e) = validation::field_type_matches(field_type, expected, multi) {
            self.reject(function, e);
            return false;
        }
        let index = if multi {
            match validation::mf_index_for_get_set_remove(raw_index, count) {
                Ok(i) => i,
                Err(e) => {
                    self.reject(function, e);
                    return false;
                }
            }
        } else {
            -1
        };
        self.with_step(|eng| {
            eng.queue.coalesce_set(node_id, field_id, index, value.clone());
            // Optimistic local cache update, matching read-your-writes even
            // for a caller bypassing `field_get_value`'s queue fast path.
            if let Some(f) = eng.fields.find_by_id_mut(node_id, field_id) {
                f.data = Some(value);
            }
            true
        })
    }

    fn field_insert_value(
        &mut self,
        function: &'static str,
        node_id: NodeId,
        field_id: FieldId,
        raw_index: i32,
        expected: ScalarKind,
        value: FieldValue,
    ) -> bool {
        if !self.require_supervisor(function) {
            return false;
        }
        let (field_type, count, is_proto_internal) = match self.fields.find_by_id(node_id, field_id) {
            Some(f) => (f.field_type, f.count, f.is_proto_internal),
            None => {
                self.reject(function, ValidationError::InvalidFieldHandle);
                return false;
            }
        };
        if let Err(e) = validation::non_proto_internal(is_proto_internal) {
            self.reject(function, e);
            return false;
        }
        if let Err(e) = validation::field_type_matches(field_type, expected, true) {
            self.reject(function, e);
            return false;
        }
        let index = match validation::mf_index_for_insert(raw_index, count) {
            Ok(i) => i,
            Err(e) => {
                self.reject(function, e);
                return false;
            }
        };
        self.with_step(|eng| {
            eng.queue.push(PendingRequest { kind: PendingKind::Insert, node_id, field_id, index, data: Some(value) });
            let ok = eng.flush_and_dispatch(function).is_ok();
            if ok {
                if let Some(f) = eng.fields.find_by_id_mut(node_id, field_id) {
                    f.count += 1;
                }
            }
            ok
        })
    }

    /// Removes element `raw_index` from an MF field. Rejected outright for
    /// MF_NODE fields: removing a node removes its whole subtree, which can
    /// invalidate descendants and change the parent field's count by more
    /// than one, and there is no `REMOVE` reply opcode carrying a refreshed
    /// count. `node_remove` is the only path that can update this field's
    /// count correctly, via the `NODE_REMOVE_NODE` reply.
    fn field_remove_value(&mut self, function: &'static str, node_id: NodeId, field_id: FieldId, raw_index: i32) -> bool {
        if !self.require_supervisor(function) {
            return false;
        }
        let (field_type, count, is_proto_internal) = match self.fields.find_by_id(node_id, field_id) {
            Some(f) => (f.field_type, f.count, f.is_proto_internal),
            None => {
                self.reject(function, ValidationError::InvalidFieldHandle);
                return false;
            }
        };
        if let Err(e) = validation::non_proto_internal(is_proto_internal) {
            self.reject(function, e);
            return false;
        }
        if field_type.scalar == ScalarKind::Node {
            self.reject(function, ValidationError::MfNodeRemovalUnsupported);
            return false;
        }
        let index = match validation::mf_index_for_get_set_remove(raw_index, count) {
            Ok(i) => i,
            Err(e) => {
                self.reject(function, e);
                return false;
            }
        };
        self.with_step(|eng| {
            eng.queue.push(PendingRequest { kind: PendingKind::Remove, node_id, field_id, index, data: None });
            let ok = eng.flush_and_dispatch(function).is_ok();
            if ok {
                if let Some(f) = eng.fields.find_by_id_mut(node_id, field_id) {
                    f.count = (f.count - 1).max(0);
                }
            }
            ok
        })
    }

    /// Generic SF getter: caller supplies the expected `ScalarKind`. Covers
    /// all 9 SF kinds without one hand-written wrapper per kind.
    pub fn sf_get(&mut self, node_id: NodeId, field_id: FieldId, kind: ScalarKind) -> Option<FieldValue> {
        self.field_get_value("wb_supervisor_field_get_sf_value", node_id, field_id, -1, kind, false)
    }

    pub fn sf_set(&mut self, node_id: NodeId, field_id: FieldId, kind: ScalarKind, value: FieldValue) -> bool {
        self.field_set_value("wb_supervisor_field_set_sf_value", node_id, field_id, -1, kind, false, value)
    }

    pub fn mf_get(&mut self, node_id: NodeId, field_id: FieldId, index: i32, kind: ScalarKind) -> Option<FieldValue> {
        self.field_get_value("wb_supervisor_field_get_mf_value", node_id, field_id, index, kind, true)
    }

    pub fn mf_set(&mut self, node_id: NodeId, field_id: FieldId, index: i32, kind: ScalarKind, value: FieldValue) -> bool {
        self.field_set_value("wb_supervisor_field_set_mf_value", node_id, field_id, index, kind, true, value)
    }

    pub fn mf_insert(&mut self, node_id: NodeId, field_id: FieldId, index: i32, kind: ScalarKind, value: FieldValue) -> bool {
        self.field_insert_value("wb_supervisor_field_insert_mf_value", node_id, field_id, index, kind, value)
    }

    pub fn mf_remove(&mut self, node_id: NodeId, field_id: FieldId, index: i32) -> bool {
        self.field_remove_value("wb_supervisor_field_remove_mf_value", node_id, field_id, index)
    }

    // ---- typed convenience wrappers -----------------------------------

    pub fn sf_get_float(&mut self, node_id: NodeId, field_id: FieldId) -> f64 {
        self.sf_get(node_id, field_id, ScalarKind::Float).and_then(|v| v.as_float()).unwrap_or(f64::NAN)
    }

    pub fn sf_set_float(&mut self, node_id: NodeId, field_id: FieldId, value: f64) -> bool {
        if let Err(e) = validation::finite_bounded(value) {
            self.reject("wb_supervisor_field_set_sf_float", e);
            return false;
        }
        self.sf_set(node_id, field_id, ScalarKind::Float, FieldValue::Float(value))
    }

    pub fn sf_get_bool(&mut self, node_id: NodeId, field_id: FieldId) -> bool {
        self.sf_get(node_id, field_id, ScalarKind::Bool).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    pub fn sf_set_bool(&mut self, node_id: NodeId, field_id: FieldId, value: bool) -> bool {
        self.sf_set(node_id, field_id, ScalarKind::Bool, FieldValue::Bool(value))
    }

    pub fn sf_get_int32(&mut self, node_id: NodeId, field_id: FieldId) -> i32 {
        self.sf_get(node_id, field_id, ScalarKind::Int32).and_then(|v| v.as_int32()).unwrap_or(0)
    }

    pub fn sf_set_int32(&mut self, node_id: NodeId, field_id: FieldId, value: i32) -> bool {
        self.sf_set(node_id, field_id, ScalarKind::Int32, FieldValue::Int32(value))
    }

    pub fn sf_get_string(&mut self, node_id: NodeId, field_id: FieldId) -> String {
        self.sf_get(node_id, field_id, ScalarKind::String)
            .and_then(|v| v.as_string().map(str::to_string))
            .unwrap_or_default()
    }

    pub fn sf_set_string(&mut self, node_id: NodeId, field_id: FieldId, value: &str) -> bool {
        self.sf_set(node_id, field_id, ScalarKind::String, FieldValue::String(value.to_string()))
    }

    pub fn sf_get_vec3f(&mut self, node_id: NodeId, field_id: FieldId) -> [f64; 3] {
        self.sf_get(node_id, field_id, ScalarKind::Vec3f).and_then(|v| v.as_vec3f()).unwrap_or([f64::NAN; 3])
    }

    pub fn sf_set_vec3f(&mut self, node_id: NodeId, field_id: FieldId, value: [f64; 3]) -> bool {
        let fn_name = "wb_supervisor_field_set_sf_vec3f";
        for c in value {
            if let Err(e) = validation::finite_bounded(c) {
                self.reject(fn_name, e);
                return false;
            }
        }
        self.field_set_value(fn_name, node_id, field_id, -1, ScalarKind::Vec3f, false, FieldValue::Vec3f(value))
    }

    pub fn sf_get_color(&mut self, node_id: NodeId, field_id: FieldId) -> [f64; 3] {
        self.sf_get(node_id, field_id, ScalarKind::Color).and_then(|v| v.as_color()).unwrap_or([f64::NAN; 3])
    }

    pub fn sf_set_color(&mut self, node_id: NodeId, field_id: FieldId, rgb: [f64; 3]) -> bool {
        let fn_name = "wb_supervisor_field_set_sf_color";
        for c in rgb {
            if let Err(e) = validation::rgb_channel(c) {
                self.reject(fn_name, e);
                return false;
            }
        }
        self.field_set_value(fn_name, node_id, field_id, -1, ScalarKind::Color, false, FieldValue::Color(rgb))
    }

    pub fn sf_get_rotation(&mut self, node_id: NodeId, field_id: FieldId) -> [f64; 4] {
        self.sf_get(node_id, field_id, ScalarKind::Rotation).and_then(|v| v.as_rotation()).unwrap_or([f64::NAN; 4])
    }

    pub fn sf_set_rotation(&mut self, node_id: NodeId, field_id: FieldId, axis: [f64; 3], angle: f64) -> bool {
        let fn_name = "wb_supervisor_field_set_sf_rotation";
        if let Err(e) = validation::rotation_axis_nonzero(axis[0], axis[1], axis[2]) {
            self.reject(fn_name, e);
            return false;
        }
        if let Err(e) = validation::finite_bounded(angle) {
            self.reject(fn_name, e);
            return false;
        }
        let value = FieldValue::Rotation([axis[0], axis[1], axis[2], angle]);
        self.field_set_value(fn_name, node_id, field_id, -1, ScalarKind::Rotation, false, value)
    }

    pub fn sf_get_node(&mut self, node_id: NodeId, field_id: FieldId) -> Option<NodeId> {
        self.sf_get(node_id, field_id, ScalarKind::Node).and_then(|v| v.as_node()).flatten()
    }

    pub fn mf_get_float(&mut self, node_id: NodeId, field_id: FieldId, index: i32) -> f64 {
        self.mf_get(node_id, field_id, index, ScalarKind::Float).and_then(|v| v.as_float()).unwrap_or(f64::NAN)
    }

    pub fn mf_set_float(&mut self, node_id: NodeId, field_id: FieldId, index: i32, value: f64) -> bool {
        if let Err(e) = validation::finite_bounded(value) {
            self.reject("wb_supervisor_field_set_mf_float", e);
            return false;
        }
        self.mf_set(node_id, field_id, index, ScalarKind::Float, FieldValue::Float(value))
    }

    pub fn mf_insert_float(&mut self, node_id: NodeId, field_id: FieldId, index: i32, value: f64) -> bool {
        if let Err(e) = validation::finite_bounded(value) {
            self.reject("wb_supervisor_field_insert_mf_float", e);
            return false;
        }
        self.mf_insert(node_id, field_id, index, ScalarKind::Float, FieldValue::Float(value))
    }

    pub fn mf_get_node(&mut self, node_id: NodeId, field_id: FieldId, index: i32) -> Option<NodeId> {
        self.mf_get(node_id, field_id, index, ScalarKind::Node).and_then(|v| v.as_node()).flatten()
    }

    // ---- node-field imports (§4.3/§6, Open Question #2) ----------------

    pub fn field_import_sf_node(&mut self, node_id: NodeId, field_id: FieldId, payload: &str) -> bool {
        let fn_name = "wb_supervisor_field_import_sf_node";
        if !self.require_supervisor(fn_name) {
            return false;
        }
        let (field_type, is_proto_internal) = match self.fields.find_by_id(node_id, field_id) {
            Some(f) => (f.field_type, f.is_proto_internal),
            None => {
                self.reject(fn_name, ValidationError::InvalidFieldHandle);
                return false;
            }
        };
        if let Err(e) = validation::non_proto_internal(is_proto_internal) {
            self.reject(fn_name, e);
            return false;
        }
        if let Err(e) = validation::field_type_matches(field_type, ScalarKind::Node, false) {
            self.reject(fn_name, e);
            return false;
        }
        if let Err(e) = validation::has_extension(payload, ".wbo") {
            self.reject(fn_name, e);
            return false;
        }
        self.with_step(|eng| {
            eng.queue.push(PendingRequest {
                kind: PendingKind::InsertFromString,
                node_id,
                field_id,
                index: -1,
                data: Some(FieldValue::String(payload.to_string())),
            });
            eng.flush_and_dispatch(fn_name).is_ok()
        })
    }

    pub fn field_import_mf_node(&mut self, node_id: NodeId, field_id: FieldId, raw_index: i32, payload: &str) -> bool {
        let fn_name = "wb_supervisor_field_import_mf_node";
        if !self.require_supervisor(fn_name) {
            return false;
        }
        let (field_type, count, is_proto_internal) = match self.fields.find_by_id(node_id, field_id) {
            Some(f) => (f.field_type, f.count, f.is_proto_internal),
            None => {
                self.reject(fn_name, ValidationError::InvalidFieldHandle);
                return false;
            }
        };
        if let Err(e) = validation::non_proto_internal(is_proto_internal) {
            self.reject(fn_name, e);
            return false;
        }
        if let Err(e) = validation::field_type_matches(field_type, ScalarKind::Node, true) {
            self.reject(fn_name, e);
            return false;
        }
        let index = match validation::mf_index_for_insert(raw_index, count) {
            Ok(i) => i,
            Err(e) => {
                self.reject(fn_name, e);
                return false;
            }
        };
        let is_root_children_append = node_id == ROOT_NODE_ID && index == count;
        if let Err(e) = validation::wbo_or_wrl_extension(payload, is_root_children_append) {
            self.reject(fn_name, e);
            return false;
        }
        self.with_step(|eng| {
            eng.queue.push(PendingRequest {
                kind: PendingKind::InsertFromString,
                node_id,
                field_id,
                index,
                data: Some(FieldValue::String(payload.to_string())),
            });
            let ok = eng.flush_and_dispatch(fn_name).is_ok();
            if ok {
                if let Some(f) = eng.fields.find_by_id_mut(node_id, field_id) {
                    f.count += 1;
                }
            }
            ok
        })
    }

    pub fn imported_nodes_number(&self) -> Option<i32> {
        self.commands.imported_nodes_number
    }

    // ---- node-targeted commands (§4.5 phase 5) -------------------------

    pub fn node_remove(&mut self, node_id: NodeId) -> bool {
        let fn_name = "wb_supervisor_node_remove";
        if !self.require_supervisor(fn_name) {
            return false;
        }
        let node_type = match self.nodes.find_by_id(node_id) {
            Some(n) => n.node_type,
            None => {
                self.reject(fn_name, ValidationError::InvalidNodeHandle);
                return false;
            }
        };
        if let Err(e) = validation::not_viewpoint_or_world_info(node_type) {
            self.reject(fn_name, e);
            return false;
        }
        self.with_step(|eng| {
            eng.commands.node_remove = Some(node_id);
            let ok = eng.flush_and_dispatch(fn_name).is_ok();
            eng.commands.clear_node_targeted();
            ok
        })
    }

    pub fn node_get_position(&mut self, node_id: NodeId) -> [f64; 3] {
        let fn_name = "wb_supervisor_node_get_position";
        if !self.require_supervisor(fn_name) || self.reject_unless_known_node(fn_name, node_id) {
            return [f64::NAN; 3];
        }
        self.with_step(|eng| {
            eng.commands.get_position = Some(node_id);
            let ok = eng.flush_and_dispatch(fn_name).is_ok();
            let value = if ok { eng.nodes.find_by_id(node_id).and_then(|n| n.position) } else { None };
            eng.commands.clear_node_targeted();
            value.unwrap_or([f64::NAN; 3])
        })
    }

    pub fn node_get_orientation(&mut self, node_id: NodeId) -> [f64; 9] {
        let fn_name = "wb_supervisor_node_get_orientation";
        if !self.require_supervisor(fn_name) || self.reject_unless_known_node(fn_name, node_id) {
            return [f64::NAN; 9];
        }
        self.with_step(|eng| {
            eng.commands.get_orientation = Some(node_id);
            let ok = eng.flush_and_dispatch(fn_name).is_ok();
            let value = if ok { eng.nodes.find_by_id(node_id).and_then(|n| n.orientation) } else { None };
            eng.commands.clear_node_targeted();
            value.unwrap_or([f64::NAN; 9])
        })
    }

    pub fn node_get_center_of_mass(&mut self, node_id: NodeId) -> [f64; 3] {
        let fn_name = "wb_supervisor_node_get_center_of_mass";
        if !self.require_supervisor(fn_name) || self.reject_unless_known_node(fn_name, node_id) {
            return [f64::NAN; 3];
        }
        self.with_step(|eng| {
            eng.commands.get_center_of_mass = Some(node_id);
            let ok = eng.flush_and_dispatch(fn_name).is_ok();
            let value = if ok { eng.nodes.find_by_id(node_id).and_then(|n| n.center_of_mass) } else { None };
            eng.commands.clear_node_targeted();
            value.unwrap_or([f64::NAN; 3])
        })
    }

    pub fn node_get_static_balance(&mut self, node_id: NodeId) -> bool {
        let fn_name = "wb_supervisor_node_get_static_balance";
        if !self.require_supervisor(fn_name) || self.reject_unless_known_node(fn_name, node_id) {
            return false;
        }
        self.with_step(|eng| {
            eng.commands.get_static_balance = Some(node_id);
            let ok = eng.flush_and_dispatch(fn_name).is_ok();
            let value = if ok { eng.nodes.find_by_id(node_id).and_then(|n| n.static_balance) } else { None };
            eng.commands.clear_node_targeted();
            value.unwrap_or(false)
        })
    }

    pub fn node_get_velocity(&mut self, node_id: NodeId) -> [f64; 6] {
        let fn_name = "wb_supervisor_node_get_velocity";
        if !self.require_supervisor(fn_name) || self.reject_unless_known_node(fn_name, node_id) {
            return [f64::NAN; 6];
        }
        self.with_step(|eng| {
            eng.commands.get_velocity = Some(node_id);
            let ok = eng.flush_and_dispatch(fn_name).is_ok();
            let value = if ok { eng.nodes.find_by_id(node_id).and_then(|n| n.solid_velocity) } else { None };
            eng.commands.clear_node_targeted();
            value.unwrap_or([f64::NAN; 6])
        })
    }

    /// §5/§8 invariant 9: refreshes only if `current_time` has strictly
    /// advanced since the cache was last stamped.
    pub fn node_get_contact_points(&mut self, node_id: NodeId, include_descendants: bool, current_time: SimTime) -> Vec<ContactPoint> {
        let fn_name = "wb_supervisor_node_get_contact_points";
        if !self.require_supervisor(fn_name) {
            return Vec::new();
        }
        let cached_ts = match self.nodes.find_by_id(node_id) {
            Some(n) => n.contact_points_time_stamp,
            None => {
                self.reject(fn_name, ValidationError::InvalidNodeHandle);
                return Vec::new();
            }
        };
        if !contact_points_need_refresh(cached_ts, current_time) {
            return self.nodes.find_by_id(node_id).and_then(|n| n.contact_points.clone()).unwrap_or_default();
        }
        self.with_step(|eng| {
            eng.commands.get_contact_points = Some((node_id, include_descendants));
            let ok = eng.flush_and_dispatch(fn_name).is_ok();
            let points = if ok {
                if let Some(n) = eng.nodes.find_by_id_mut(node_id) {
                    n.contact_points_time_stamp = current_time;
                }
                eng.nodes.find_by_id(node_id).and_then(|n| n.contact_points.clone()).unwrap_or_default()
            } else {
                Vec::new()
            };
            eng.commands.clear_node_targeted();
            points
        })
    }

    fn reject_unless_known_node(&mut self, fn_name: &'static str, node_id: NodeId) -> bool {
        if self.nodes.find_by_id(node_id).is_none() {
            self.reject(fn_name, ValidationError::InvalidNodeHandle);
            true
        } else {
            false
        }
    }

    pub fn node_set_velocity(&mut self, node_id: NodeId, velocity: [f64; 6]) -> bool {
        let fn_name = "wb_supervisor_node_set_velocity";
        if !self.require_supervisor(fn_name) || self.reject_unless_known_node(fn_name, node_id) {
            return false;
        }
        for v in velocity {
            if let Err(e) = validation::finite_bounded(v) {
                self.reject(fn_name, e);
                return false;
            }
        }
        self.with_step(|eng| {
            eng.commands.set_velocity = Some(SetVelocity { node_id, velocity });
            true
        })
    }

    pub fn node_reset_physics(&mut self, node_id: NodeId) -> bool {
        let fn_name = "wb_supervisor_node_reset_physics";
        if !self.require_supervisor(fn_name) || self.reject_unless_known_node(fn_name, node_id) {
            return false;
        }
        self.with_step(|eng| {
            eng.commands.reset_physics = Some(node_id);
            true
        })
    }

    pub fn node_restart_controller(&mut self, node_id: NodeId) -> bool {
        let fn_name = "wb_supervisor_node_restart_controller";
        if !self.require_supervisor(fn_name) || self.reject_unless_known_node(fn_name, node_id) {
            return false;
        }
        self.with_step(|eng| {
            eng.commands.restart_controller = Some(node_id);
            true
        })
    }

    pub fn node_set_visibility(&mut self, node_id: NodeId, from_node_id: NodeId, visible: bool) -> bool {
        let fn_name = "wb_supervisor_node_set_visibility";
        if !self.require_supervisor(fn_name) || self.reject_unless_known_node(fn_name, node_id) {
            return false;
        }
        self.with_step(|eng| {
            eng.commands.set_visibility = Some(SetVisibility { node_id, from_node_id, visible });
            true
        })
    }

    pub fn node_move_viewpoint(&mut self, node_id: NodeId) -> bool {
        let fn_name = "wb_supervisor_node_move_viewpoint";
        if !self.require_supervisor(fn_name) || self.reject_unless_known_node(fn_name, node_id) {
            return false;
        }
        self.with_step(|eng| {
            eng.commands.move_viewpoint = Some(node_id);
            true
        })
    }

    pub fn node_add_force(&mut self, node_id: NodeId, force: [f64; 3], relative: bool) -> bool {
        let fn_name = "wb_supervisor_node_add_force";
        if !self.require_supervisor(fn_name) || self.reject_unless_known_node(fn_name, node_id) {
            return false;
        }
        for v in force {
            if let Err(e) = validation::finite_bounded(v) {
                self.reject(fn_name, e);
                return false;
            }
        }
        self.with_step(|eng| {
            eng.commands.add_force = Some(AddForce { node_id, force, relative });
            true
        })
    }

    pub fn node_add_force_with_offset(&mut self, node_id: NodeId, force: [f64; 3], offset: [f64; 3], relative: bool) -> bool {
        let fn_name = "wb_supervisor_node_add_force_with_offset";
        if !self.require_supervisor(fn_name) || self.reject_unless_known_node(fn_name, node_id) {
            return false;
        }
        for v in force.iter().chain(offset.iter()) {
            if let Err(e) = validation::finite_bounded(*v) {
                self.reject(fn_name, e);
                return false;
            }
        }
        self.with_step(|eng| {
            eng.commands.add_force_with_offset = Some(AddForceWithOffset { node_id, force, offset, relative });
            true
        })
    }

    pub fn node_add_torque(&mut self, node_id: NodeId, torque: [f64; 3], relative: bool) -> bool {
        let fn_name = "wb_supervisor_node_add_torque";
        if !self.require_supervisor(fn_name) || self.reject_unless_known_node(fn_name, node_id) {
            return false;
        }
        for v in torque {
            if let Err(e) = validation::finite_bounded(v) {
                self.reject(fn_name, e);
                return false;
            }
        }
        self.with_step(|eng| {
            eng.commands.add_torque = Some(AddForce { node_id, force: torque, relative });
            true
        })
    }

    // ---- step-global commands (§4.5 phase 1) ---------------------------

    pub fn simulation_set_mode(&mut self, mode: i32) -> bool {
        if !self.require_supervisor("wb_supervisor_simulation_set_mode") {
            return false;
        }
        self.with_step(|eng| {
            eng.commands.step_global = Some(StepGlobalCommand::ChangeSimulationMode(mode));
            true
        })
    }

    pub fn simulation_quit(&mut self, status: i32) -> bool {
        if !self.require_supervisor("wb_supervisor_simulation_quit") {
            return false;
        }
        self.with_step(|eng| {
            eng.commands.step_global = Some(StepGlobalCommand::Quit(status));
            true
        })
    }

    pub fn simulation_reset(&mut self) -> bool {
        if !self.require_supervisor("wb_supervisor_simulation_reset") {
            return false;
        }
        self.with_step(|eng| {
            eng.commands.step_global = Some(StepGlobalCommand::Reset);
            true
        })
    }

    pub fn world_reload(&mut self) -> bool {
        if !self.require_supervisor("wb_supervisor_world_reload") {
            return false;
        }
        self.with_step(|eng| {
            eng.commands.step_global = Some(StepGlobalCommand::ReloadWorld);
            true
        })
    }

    pub fn simulation_reset_physics(&mut self) -> bool {
        if !self.require_supervisor("wb_supervisor_simulation_reset_physics") {
            return false;
        }
        self.with_step(|eng| {
            eng.commands.step_global = Some(StepGlobalCommand::ResetPhysics);
            true
        })
    }

    pub fn world_load(&mut self, filename: &str) -> bool {
        let fn_name = "wb_supervisor_world_load";
        if !self.require_supervisor(fn_name) {
            return false;
        }
        if let Err(e) = validation::nonempty_filename(filename) {
            self.reject(fn_name, e);
            return false;
        }
        self.with_step(|eng| {
            eng.commands.step_global = Some(StepGlobalCommand::LoadWorld(filename.to_string()));
            true
        })
    }

    // ---- media (§4.5 phase 6) ------------------------------------------

    pub fn export_image(&mut self, filename: &str, quality: i32) -> bool {
        let fn_name = "wb_supervisor_export_image";
        if !self.require_supervisor(fn_name) {
            return false;
        }
        if let Err(e) = validation::nonempty_filename(filename) {
            self.reject(fn_name, e);
            return false;
        }
        self.with_step(|eng| {
            eng.commands.export_image = Some(ExportImage { filename: filename.to_string(), quality });
            true
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn movie_start(&mut self, filename: &str, width: i32, height: i32, codec: i32, quality: i32, acceleration: f64, caption: bool) -> bool {
        let fn_name = "wb_supervisor_movie_start_recording";
        if !self.require_supervisor(fn_name) {
            return false;
        }
        if let Err(e) = validation::nonempty_filename(filename) {
            self.reject(fn_name, e);
            return false;
        }
        if let Err(e) = validation::finite_bounded(acceleration) {
            self.reject(fn_name, e);
            return false;
        }
        self.with_step(|eng| {
            eng.commands.start_movie =
                Some(StartMovie { filename: filename.to_string(), width, height, codec, quality, acceleration, caption });
            true
        })
    }

    pub fn movie_stop(&mut self) -> bool {
        if !self.require_supervisor("wb_supervisor_movie_stop_recording") {
            return false;
        }
        self.with_step(|eng| {
            eng.commands.stop_movie = true;
            true
        })
    }

    pub fn animation_start(&mut self, filename: &str) -> bool {
        let fn_name = "wb_supervisor_animation_start_recording";
        if !self.require_supervisor(fn_name) {
            return false;
        }
        if let Err(e) = validation::has_extension(filename, ".html") {
            self.reject(fn_name, e);
            return false;
        }
        self.with_step(|eng| {
            eng.commands.start_animation = Some(filename.to_string());
            true
        })
    }

    pub fn animation_stop(&mut self) -> bool {
        if !self.require_supervisor("wb_supervisor_animation_stop_recording") {
            return false;
        }
        self.with_step(|eng| {
            eng.commands.stop_animation = true;
            true
        })
    }

    pub fn world_save(&mut self, filename: Option<&str>) -> bool {
        let fn_name = "wb_supervisor_world_save";
        if !self.require_supervisor(fn_name) {
            return false;
        }
        if let Some(f) = filename {
            if let Err(e) = validation::has_extension(f, ".wbt") {
                self.reject(fn_name, e);
                return false;
            }
        }
        self.with_step(|eng| {
            eng.commands.save_world = Some(filename.map(str::to_string));
            true
        })
    }

    pub fn movie_status(&self) -> Option<u8> {
        self.commands.movie_status
    }

    pub fn animation_start_status(&self) -> Option<u8> {
        self.commands.animation_start_status
    }

    pub fn animation_stop_status(&self) -> Option<u8> {
        self.commands.animation_stop_status
    }

    pub fn save_world_status(&self) -> Option<bool> {
        self.commands.save_world_status
    }

    // ---- VR headset (§4.5 phase 7) --------------------------------------

    pub fn vr_headset_is_used(&mut self) -> bool {
        let fn_name = "wb_supervisor_virtual_reality_headset_is_used";
        if !self.require_supervisor(fn_name) {
            return false;
        }
        self.with_step(|eng| {
            eng.commands.vr_headset_is_used = true;
            let ok = eng.flush_and_dispatch(fn_name).is_ok();
            let value = if ok { eng.commands.vr_headset_in_use } else { None };
            value.unwrap_or(false)
        })
    }

    pub fn vr_headset_get_position(&mut self) -> [f64; 3] {
        let fn_name = "wb_supervisor_virtual_reality_headset_get_position";
        if !self.require_supervisor(fn_name) {
            return [f64::NAN; 3];
        }
        self.with_step(|eng| {
            eng.commands.vr_headset_get_position = true;
            let ok = eng.flush_and_dispatch(fn_name).is_ok();
            let value = if ok { eng.commands.vr_headset_position } else { None };
            value.unwrap_or([f64::NAN; 3])
        })
    }

    pub fn vr_headset_get_orientation(&mut self) -> [f64; 9] {
        let fn_name = "wb_supervisor_virtual_reality_headset_get_orientation";
        if !self.require_supervisor(fn_name) {
            return [f64::NAN; 9];
        }
        self.with_step(|eng| {
            eng.commands.vr_headset_get_orientation = true;
            let ok = eng.flush_and_dispatch(fn_name).is_ok();
            let value = if ok { eng.commands.vr_headset_orientation } else { None };
            value.unwrap_or([f64::NAN; 9])
        })
    }

    // ---- labels (§4.5 phase 4) -------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn set_label(&mut self, id: i32, text: &str, x: f64, y: f64, size: f64, color: u32, transparency: f64, font: &str) -> bool {
        let fn_name = "wb_supervisor_set_label";
        if !self.require_supervisor(fn_name) {
            return false;
        }
        for v in [x, y, size, transparency] {
            if !(0.0..=1.0).contains(&v) {
                self.reject(fn_name, ValidationError::ColorChannelOutOfRange(v));
                return false;
            }
        }
        self.with_step(|eng| {
            eng.commands.labels.push(LabelCommand {
                id,
                text: text.to_string(),
                x,
                y,
                size,
                color,
                transparency,
                font: font.to_string(),
            });
            true
        })
    }

    // ---- supplemented accessors -------------------------------------------

    pub fn node_get_type_name(&self, node_id: NodeId) -> &'static str {
        self.nodes.find_by_id(node_id).map(|n| n.node_type.name()).unwrap_or("")
    }

    pub fn field_get_type_name(&self, node_id: NodeId, field_id: FieldId) -> String {
        self.fields.find_by_id(node_id, field_id).map(|f| f.field_type.name()).unwrap_or_default()
    }

    pub fn node_get_parent_node(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.find_by_id(node_id).and_then(|n| if n.parent_id >= 0 { Some(n.parent_id as NodeId) } else { None })
    }

    pub fn node_get_proto(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.find_by_id(node_id).and_then(|n| n.parent_proto)
    }

    pub fn field_get_count(&self, node_id: NodeId, field_id: FieldId) -> i32 {
        self.fields.find_by_id(node_id, field_id).map(|f| f.count).unwrap_or(0)
    }

    pub fn field_get_name(&self, node_id: NodeId, field_id: FieldId) -> String {
        self.fields.find_by_id(node_id, field_id).map(|f| f.name.clone()).unwrap_or_default()
    }

    pub fn is_node_ref_valid(&self, node_id: NodeId) -> bool {
        self.nodes.find_by_id(node_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supervisor_transport::mock::InMemoryTransport;
    use supervisor_transport::RequestWriter;

    fn configured_engine() -> SupervisorEngine<InMemoryTransport> {
        let mut t = InMemoryTransport::new();
        let mut reply = Vec::new();
        reply.write_u8(opcode::REPLY_CONFIGURE);
        reply.write_u32(1);
        reply.write_u8(0);
        reply.write_u8(0);
        reply.write_str("Robot");
        reply.write_str("");
        t.queue_reply(reply);

        let mut engine = SupervisorEngine::new(t);
        engine.configure().unwrap();
        engine
    }

    #[test]
    fn non_supervisor_calls_are_rejected_without_touching_the_transport() {
        let t = InMemoryTransport::new();
        let mut engine = SupervisorEngine::new(t);
        assert!(!engine.node_remove(1));
        assert_eq!(engine.transport().flush_count(), 0);
    }

    #[test]
    fn configure_registers_self_node_and_marks_supervisor() {
        let engine = configured_engine();
        assert!(engine.is_supervisor());
        assert_eq!(engine.self_node(), Some(1));
    }

    #[test]
    fn sf_set_then_get_round_trips_without_a_flush() {
        let mut engine = configured_engine();
        engine.fields.create_from_reply(1, "translation".into(), 9, FieldType::sf(ScalarKind::Float), -1, false);

        let flushes_before = engine.transport().flush_count();
        assert!(engine.sf_set_float(1, 9, 2.5));
        assert_eq!(engine.sf_get_float(1, 9), 2.5);
        assert_eq!(engine.transport().flush_count(), flushes_before);
    }

    #[test]
    fn set_sf_float_rejects_non_finite_values() {
        let mut engine = configured_engine();
        engine.fields.create_from_reply(1, "translation".into(), 9, FieldType::sf(ScalarKind::Float), -1, false);
        assert!(!engine.sf_set_float(1, 9, f64::NAN));
    }

    #[test]
    fn node_remove_is_rejected_for_viewpoint() {
        let mut engine = configured_engine();
        engine.nodes.upsert(2, NodeType::Viewpoint, None, None, 0, 0, false);
        assert!(!engine.node_remove(2));
    }

    #[test]
    fn field_import_sf_node_rejects_wrong_extension() {
        let mut engine = configured_engine();
        engine.fields.create_from_reply(1, "children".into(), 20, FieldType::sf(ScalarKind::Node), -1, false);
        assert!(!engine.field_import_sf_node(1, 20, "robot.wrl"));
    }

    #[test]
    fn field_import_mf_node_at_root_children_append_accepts_wrl() {
        let mut engine = configured_engine();
        engine.fields.create_from_reply(0, "children".into(), 30, FieldType::mf(ScalarKind::Node), 0, false);
        let mut reply = Vec::new();
        reply.write_u8(opcode::REPLY_FIELD_INSERT_VALUE);
        reply.write_i32(1);
        engine.transport_mut().queue_reply(reply);
        assert!(engine.field_import_mf_node(0, 30, 0, "robot.wrl"));
    }

    #[test]
    fn mf_remove_on_an_mf_node_field_is_rejected_without_touching_the_transport() {
        let mut engine = configured_engine();
        engine.fields.create_from_reply(0, "children".into(), 30, FieldType::mf(ScalarKind::Node), 2, false);
        let flushes_before = engine.transport().flush_count();
        assert!(!engine.mf_remove(0, 30, 0));
        assert_eq!(engine.transport().flush_count(), flushes_before);
        assert_eq!(engine.fields.find_by_id(0, 30).unwrap().count, 2);
    }

    #[test]
    fn contact_points_are_not_refetched_when_time_has_not_advanced() {
        let mut engine = configured_engine();
        engine.nodes.upsert(3, NodeType::Solid, None, None, 0, 0, false);

        let mut reply = Vec::new();
        reply.write_u8(opcode::REPLY_NODE_GET_CONTACT_POINTS);
        reply.write_i32(0);
        engine.transport_mut().queue_reply(reply);

        let flushes_before = engine.transport().flush_count();
        let first = engine.node_get_contact_points(3, false, 1.0);
        assert_eq!(engine.transport().flush_count(), flushes_before + 1);
        let second = engine.node_get_contact_points(3, false, 1.0);
        assert_eq!(engine.transport().flush_count(), flushes_before + 1);
        assert_eq!(first, second);
    }
}
