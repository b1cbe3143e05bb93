//! # supervisor-types::config
//!
//! Defines strongly-typed configuration for the engine. These types are
//! used by `serde` to parse TOML/YAML into safe, usable Rust objects, the
//! same way the teacher workspace parses its scenario files.

use serde::{Deserialize, Serialize};

/// Engine-wide configuration, constructed directly or parsed from a config
/// file shipped alongside the host controller binary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default value of the `allow_search_in_proto` flag used by
    /// `FIELD_GET_FROM_NAME` (spec §4.5) when a call site doesn't override it.
    pub allow_search_in_proto_default: bool,
    /// §7: during process shutdown (`robot_is_quitting`) most diagnostics
    /// are suppressed to avoid noisy teardown messages.
    pub suppress_diagnostics_when_quitting: bool,
    /// §4.6: whether `NODE_GET_SELECTED`/`BY_ID`/`BY_TAG` replies for
    /// proto-internal nodes are accepted (`allows_contact_point_internal_node`).
    pub contact_point_internal_nodes_visible: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allow_search_in_proto_default: false,
            suppress_diagnostics_when_quitting: true,
            contact_point_internal_nodes_visible: false,
        }
    }
}
