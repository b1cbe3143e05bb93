//! # supervisor-types::field_type
//!
//! Defines the 18 field kinds: for each scalar kind {bool, int32, float,
//! vec2f, vec3f, color, rotation, string, node} there is a single-valued
//! (SF) and multi-valued (MF) variant. On the wire the MF bit is `0x10`.

/// The scalar kind underlying a field, independent of its SF/MF cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int32,
    Float,
    Vec2f,
    Vec3f,
    Color,
    Rotation,
    String,
    Node,
}

/// The MF bit set on the wire type tag for multi-valued fields.
pub const MF_BIT: u32 = 0x10;

/// A field's type: a scalar kind plus SF/MF cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldType {
    pub scalar: ScalarKind,
    pub multi: bool,
}

impl FieldType {
    pub const fn sf(scalar: ScalarKind) -> Self {
        FieldType { scalar, multi: false }
    }

    pub const fn mf(scalar: ScalarKind) -> Self {
        FieldType { scalar, multi: true }
    }

    /// Decodes the wire type tag (scalar discriminant in the low bits, the
    /// `MF_BIT` marking multi-valued fields).
    pub fn from_wire(tag: u32) -> Option<Self> {
        let multi = tag & MF_BIT != 0;
        let scalar = match tag & !MF_BIT {
            0 => ScalarKind::Bool,
            1 => ScalarKind::Int32,
            2 => ScalarKind::Float,
            3 => ScalarKind::Vec2f,
            4 => ScalarKind::Vec3f,
            5 => ScalarKind::Color,
            6 => ScalarKind::Rotation,
            7 => ScalarKind::String,
            8 => ScalarKind::Node,
            _ => return None,
        };
        Some(FieldType { scalar, multi })
    }

    pub fn to_wire(self) -> u32 {
        let base = match self.scalar {
            ScalarKind::Bool => 0,
            ScalarKind::Int32 => 1,
            ScalarKind::Float => 2,
            ScalarKind::Vec2f => 3,
            ScalarKind::Vec3f => 4,
            ScalarKind::Color => 5,
            ScalarKind::Rotation => 6,
            ScalarKind::String => 7,
            ScalarKind::Node => 8,
        };
        if self.multi {
            base | MF_BIT
        } else {
            base
        }
    }

    pub fn name(&self) -> String {
        let prefix = if self.multi { "MF" } else { "SF" };
        let scalar = match self.scalar {
            ScalarKind::Bool => "BOOL",
            ScalarKind::Int32 => "INT32",
            ScalarKind::Float => "FLOAT",
            ScalarKind::Vec2f => "VEC2F",
            ScalarKind::Vec3f => "VEC3F",
            ScalarKind::Color => "COLOR",
            ScalarKind::Rotation => "ROTATION",
            ScalarKind::String => "STRING",
            ScalarKind::Node => "NODE",
        };
        format!("{prefix}_{scalar}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_all_18_kinds() {
        for scalar in [
            ScalarKind::Bool,
            ScalarKind::Int32,
            ScalarKind::Float,
            ScalarKind::Vec2f,
            ScalarKind::Vec3f,
            ScalarKind::Color,
            ScalarKind::Rotation,
            ScalarKind::String,
            ScalarKind::Node,
        ] {
            for multi in [false, true] {
                let ft = FieldType { scalar, multi };
                assert_eq!(FieldType::from_wire(ft.to_wire()), Some(ft));
            }
        }
    }

    #[test]
    fn mf_bit_is_0x10() {
        let sf = FieldType::sf(ScalarKind::Float);
        let mf = FieldType::mf(ScalarKind::Float);
        assert_eq!(mf.to_wire() ^ sf.to_wire(), MF_BIT);
    }

    #[test]
    fn unknown_scalar_discriminant_rejected() {
        assert_eq!(FieldType::from_wire(200), None);
    }
}
