//! # supervisor-engine::validation
//!
//! Stateless argument checks, per spec §4.1/§7. Every precondition named in
//! the error-handling design is one function here; the public API (`api.rs`)
//! calls these before mutating any state and converts a returned
//! `ValidationError` into a diagnostic plus the documented sentinel return.
//! None of these functions allocate or touch the registries.

use supervisor_types::errors::ValidationError;
use supervisor_types::field_type::{FieldType, ScalarKind};
use supervisor_types::node_type::NodeType;

/// The C `FLT_MAX` bound the original validates floats against.
pub const FLT_MAX: f64 = f32::MAX as f64;

/// §8 invariant 6: every float argument passed to a setter must be finite
/// and within `±FLT_MAX`.
pub fn finite_bounded(v: f64) -> Result<(), ValidationError> {
    if v.is_finite() && v.abs() <= FLT_MAX {
        Ok(())
    } else {
        Err(ValidationError::NotFinite(v))
    }
}

/// §8 invariant 8: every color channel must be in `[0, 1]`.
pub fn rgb_channel(v: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(ValidationError::ColorChannelOutOfRange(v))
    }
}

/// §8 invariant 7: a rotation axis must be non-zero.
pub fn rotation_axis_nonzero(x: f64, y: f64, z: f64) -> Result<(), ValidationError> {
    if x == 0.0 && y == 0.0 && z == 0.0 {
        Err(ValidationError::ZeroRotationAxis)
    } else {
        Ok(())
    }
}

pub fn nonempty_filename(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        Err(ValidationError::EmptyFilename)
    } else {
        Ok(())
    }
}

/// §6's file-format gates: animation filenames end `.html`, world saves end
/// `.wbt`, SF node imports accept only `.wbo`.
pub fn has_extension(name: &str, ext: &'static str) -> Result<(), ValidationError> {
    nonempty_filename(name)?;
    if name.ends_with(ext) {
        Ok(())
    } else {
        Err(ValidationError::WrongExtension(name.to_string(), ext))
    }
}

/// §6: MF node import accepts `.wbo` anywhere, or `.wrl` when appending at
/// the root `children` field's insertion point.
pub fn wbo_or_wrl_extension(name: &str, allow_wrl: bool) -> Result<(), ValidationError> {
    nonempty_filename(name)?;
    if name.ends_with(".wbo") || (allow_wrl && name.ends_with(".wrl")) {
        Ok(())
    } else if allow_wrl {
        Err(ValidationError::WrongExtension(name.to_string(), ".wbo/.wrl"))
    } else {
        Err(ValidationError::WrongExtension(name.to_string(), ".wbo"))
    }
}

/// §4.3 index normalization for GET/SET/REMOVE: valid range is
/// `[-count, count-1]`; a negative index `i` normalizes to `i + count`.
pub fn mf_index_for_get_set_remove(index: i32, count: i32) -> Result<i32, ValidationError> {
    let normalized = if index < 0 { index + count } else { index };
    if normalized >= 0 && normalized < count {
        Ok(normalized)
    } else {
        Err(ValidationError::IndexOutOfBounds { index, count })
    }
}

/// §4.3 index normalization for INSERT: valid range is `[-(count+1), count]`;
/// a negative index `i` normalizes to `i + count + 1`.
pub fn mf_index_for_insert(index: i32, count: i32) -> Result<i32, ValidationError> {
    let normalized = if index < 0 { index + count + 1 } else { index };
    if normalized >= 0 && normalized <= count {
        Ok(normalized)
    } else {
        Err(ValidationError::IndexOutOfBounds { index, count })
    }
}

pub fn non_proto_internal(is_proto_internal: bool) -> Result<(), ValidationError> {
    if is_proto_internal {
        Err(ValidationError::ProtoInternalReadOnly)
    } else {
        Ok(())
    }
}

/// Checks the field's actual scalar kind and SF/MF cardinality against what
/// the calling accessor expects (e.g. `set_sf_float` expects `(Float, false)`).
pub fn field_type_matches(actual: FieldType, expected: ScalarKind, expect_multi: bool) -> Result<(), ValidationError> {
    if actual.scalar == expected && actual.multi == expect_multi {
        Ok(())
    } else {
        Err(ValidationError::FieldTypeMismatch {
            expected: FieldType { scalar: expected, multi: expect_multi }.name(),
            found: actual.name(),
        })
    }
}

/// §4.1: removing a viewpoint or world-info node is rejected locally.
pub fn not_viewpoint_or_world_info(kind: NodeType) -> Result<(), ValidationError> {
    if kind.is_removal_protected() {
        Err(ValidationError::ProtectedNodeType(kind.name()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn finite_bounded_rejects_nan_and_infinity() {
        assert!(finite_bounded(f64::NAN).is_err());
        assert!(finite_bounded(f64::INFINITY).is_err());
        assert!(finite_bounded(FLT_MAX).is_ok());
        assert!(finite_bounded(FLT_MAX * 2.0).is_err());
    }

    #[test]
    fn rgb_channel_bounds() {
        assert!(rgb_channel(0.0).is_ok());
        assert!(rgb_channel(1.0).is_ok());
        assert!(rgb_channel(-0.01).is_err());
        assert!(rgb_channel(1.01).is_err());
    }

    #[test]
    fn rotation_axis_rejects_zero_vector() {
        assert!(rotation_axis_nonzero(0.0, 0.0, 0.0).is_err());
        assert!(rotation_axis_nonzero(0.0, 1.0, 0.0).is_ok());
    }

    #[test]
    fn extension_gate() {
        assert!(has_extension("anim.html", ".html").is_ok());
        assert!(has_extension("anim.htm", ".html").is_err());
        assert!(has_extension("", ".html").is_err());
    }

    #[test]
    fn mf_get_set_remove_index_boundaries() {
        assert_eq!(mf_index_for_get_set_remove(-1, 3), Ok(2));
        assert_eq!(mf_index_for_get_set_remove(0, 3), Ok(0));
        assert_eq!(mf_index_for_get_set_remove(2, 3), Ok(2));
        assert!(mf_index_for_get_set_remove(3, 3).is_err());
        assert!(mf_index_for_get_set_remove(-4, 3).is_err());
    }

    #[test]
    fn mf_insert_index_boundaries() {
        assert_eq!(mf_index_for_insert(-1, 3), Ok(3));
        assert_eq!(mf_index_for_insert(3, 3), Ok(3));
        assert!(mf_index_for_insert(4, 3).is_err());
        assert!(mf_index_for_insert(-5, 3).is_err());
    }

    #[test]
    fn removal_protection_blocks_viewpoint_and_world_info() {
        assert!(not_viewpoint_or_world_info(NodeType::Viewpoint).is_err());
        assert!(not_viewpoint_or_world_info(NodeType::WorldInfo).is_err());
        assert!(not_viewpoint_or_world_info(NodeType::Solid).is_ok());
    }

    proptest! {
        #[test]
        fn finite_bounded_accepts_exactly_the_closed_flt_max_interval(v in -FLT_MAX..=FLT_MAX) {
            prop_assert!(finite_bounded(v).is_ok());
        }

        #[test]
        fn finite_bounded_rejects_everything_outside_flt_max(v in (FLT_MAX + 1.0)..1.0e300) {
            prop_assert!(finite_bounded(v).is_err());
            prop_assert!(finite_bounded(-v).is_err());
        }

        #[test]
        fn mf_get_set_remove_normalizes_into_bounds(count in 1i32..1000, offset in 0i32..1000) {
            let index = offset % count;
            prop_assert_eq!(mf_index_for_get_set_remove(index, count), Ok(index));
            let negative = -(count - index);
            prop_assert_eq!(mf_index_for_get_set_remove(negative, count), Ok(index));
        }

        #[test]
        fn mf_insert_normalizes_into_bounds(count in 0i32..1000, offset in 0i32..1001) {
            let index = offset % (count + 1);
            prop_assert_eq!(mf_index_for_insert(index, count), Ok(index));
            let negative = -(count + 1 - index);
            prop_assert_eq!(mf_index_for_insert(negative, count), Ok(index));
        }
    }
}
