//! # supervisor-engine::queue
//!
//! The pending-operations queue, per spec §4.3: a FIFO of field-level
//! operations with a coalescing rule for read-your-writes semantics.
//! Replaces the original's hand-rolled singly-linked list with a
//! `VecDeque`, the same way the teacher's codebase reaches for `std`
//! collections (`BinaryHeap`, `FxHashMap`) over intrusive lists everywhere
//! it can.

use std::collections::VecDeque;

use supervisor_types::id::{FieldId, NodeId};
use supervisor_types::value::FieldValue;

/// The operation kind for a pending field request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    Get,
    Set,
    Insert,
    InsertFromString,
    Remove,
}

/// One queued field-level operation. Holds a non-owning `(node_id, field_id)`
/// reference rather than a borrow of the field record itself, per §3's
/// "pending requests hold non-owning references to fields".
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub kind: PendingKind,
    pub node_id: NodeId,
    pub field_id: FieldId,
    /// Normalized element index; `-1` for SF fields.
    pub index: i32,
    pub data: Option<FieldValue>,
}

/// The FIFO of pending field operations, plus the coalescing rule from §4.3.
#[derive(Default)]
pub struct PendingQueue {
    requests: VecDeque<PendingRequest>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self { requests: VecDeque::new() }
    }

    /// §4.3 coalescing rule: before appending a SET, look for an existing
    /// queued SET on the same `(field_id, index)` and overwrite its payload
    /// in place instead of appending a second entry.
    pub fn coalesce_set(&mut self, node_id: NodeId, field_id: FieldId, index: i32, data: FieldValue) {
        if let Some(existing) = self
            .requests
            .iter_mut()
            .find(|r| r.kind == PendingKind::Set && r.field_id == field_id && r.index == index)
        {
            existing.data = Some(data);
        } else {
            self.requests.push_back(PendingRequest {
                kind: PendingKind::Set,
                node_id,
                field_id,
                index,
                data: Some(data),
            });
        }
    }

    /// §4.3: "a new GET returns the queued SET's value locally without a
    /// flush" — the read-your-writes fast path the public API checks before
    /// enqueuing a real GET.
    pub fn find_queued_set(&self, field_id: FieldId, index: i32) -> Option<&FieldValue> {
        self.requests
            .iter()
            .find(|r| r.kind == PendingKind::Set && r.field_id == field_id && r.index == index)
            .and_then(|r| r.data.as_ref())
    }

    pub fn push(&mut self, request: PendingRequest) {
        self.requests.push_back(request);
    }

    pub fn pop_front(&mut self) -> Option<PendingRequest> {
        self.requests.pop_front()
    }

    pub fn front(&self) -> Option<&PendingRequest> {
        self.requests.front()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// §8 invariant 1: after every step, the queue must contain only SET
    /// requests (GET/INSERT/REMOVE never persist across a step boundary).
    pub fn all_deferred_are_sets(&self) -> bool {
        self.requests.iter().all(|r| r.kind == PendingKind::Set)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingRequest> {
        self.requests.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coalescing_overwrites_queued_set_in_place() {
        let mut q = PendingQueue::new();
        q.coalesce_set(1, 5, -1, FieldValue::Float(1.0));
        q.coalesce_set(1, 5, -1, FieldValue::Float(2.0));
        assert_eq!(q.len(), 1);
        assert_eq!(q.find_queued_set(5, -1), Some(&FieldValue::Float(2.0)));
    }

    #[test]
    fn coalescing_is_scoped_by_index() {
        let mut q = PendingQueue::new();
        q.coalesce_set(1, 5, 0, FieldValue::Int32(1));
        q.coalesce_set(1, 5, 1, FieldValue::Int32(2));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn queue_with_only_sets_satisfies_invariant() {
        let mut q = PendingQueue::new();
        q.coalesce_set(1, 1, -1, FieldValue::Bool(true));
        q.push(PendingRequest { kind: PendingKind::Get, node_id: 0, field_id: 2, index: -1, data: None });
        assert!(!q.all_deferred_are_sets());
        q.pop_front();
        q.pop_front();
        assert!(q.all_deferred_are_sets());
    }
}
