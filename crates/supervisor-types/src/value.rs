//! # supervisor-types::value
//!
//! Defines `FieldValue`, the tagged sum type standing in for the original's
//! `union WbFieldData`. Per design note §9, the discriminant already lives
//! in the owning field's `FieldType`, so it is not duplicated here — this
//! is a plain Rust enum, not a `(tag, union)` pair.

use crate::id::NodeId;

/// The last-known (SF) or last-queried-element (MF) value of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Int32(i32),
    Float(f64),
    Vec2f([f64; 2]),
    Vec3f([f64; 3]),
    Color([f64; 3]),
    Rotation([f64; 4]),
    String(String),
    /// `None` represents the wire's `0 => NULL node` sentinel.
    Node(Option<NodeId>),
}

impl FieldValue {
    /// A human-readable kind name, useful for diagnostics when a caller
    /// passes the wrong accessor for a field's actual type.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "bool",
            FieldValue::Int32(_) => "int32",
            FieldValue::Float(_) => "float",
            FieldValue::Vec2f(_) => "vec2f",
            FieldValue::Vec3f(_) => "vec3f",
            FieldValue::Color(_) => "color",
            FieldValue::Rotation(_) => "rotation",
            FieldValue::String(_) => "string",
            FieldValue::Node(_) => "node",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int32(&self) -> Option<i32> {
        match self {
            FieldValue::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec2f(&self) -> Option<[f64; 2]> {
        match self {
            FieldValue::Vec2f(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3f(&self) -> Option<[f64; 3]> {
        match self {
            FieldValue::Vec3f(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<[f64; 3]> {
        match self {
            FieldValue::Color(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_rotation(&self) -> Option<[f64; 4]> {
        match self {
            FieldValue::Rotation(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<Option<NodeId>> {
        match self {
            FieldValue::Node(v) => Some(*v),
            _ => None,
        }
    }
}
