//! # supervisor-transport::opcode
//!
//! The wire opcode catalog from spec §6. Request opcodes are written by the
//! serializer (§4.5); reply opcodes are read by the dispatcher (§4.6). Values
//! are arbitrary but stable within this workspace — the real simulator-side
//! assignment is owned by the out-of-scope transport/simulator pair, so
//! these only need to be internally consistent between the serializer and
//! the dispatcher (and, in tests, the mock transport's handler).

// --- Step-global commands (§4.5 phase 1) ---
pub const SIMULATION_CHANGE_MODE: u8 = 0x01;
pub const SIMULATION_QUIT: u8 = 0x02;
pub const SIMULATION_RESET: u8 = 0x03;
pub const RELOAD_WORLD: u8 = 0x04;
pub const SIMULATION_RESET_PHYSICS: u8 = 0x05;
pub const LOAD_WORLD: u8 = 0x06;

// --- Handle resolution (§4.5 phase 2) ---
pub const NODE_GET_FROM_ID: u8 = 0x10;
pub const NODE_GET_FROM_DEF: u8 = 0x11;
pub const NODE_GET_FROM_TAG: u8 = 0x12;
pub const NODE_GET_SELECTED: u8 = 0x13;
pub const FIELD_GET_FROM_NAME: u8 = 0x14;

// --- Field operations (§4.5 phase 3) ---
pub const FIELD_GET_VALUE: u8 = 0x20;
pub const FIELD_SET_VALUE: u8 = 0x21;
pub const FIELD_INSERT_VALUE: u8 = 0x22;
pub const FIELD_IMPORT_NODE_FROM_STRING: u8 = 0x23;
pub const FIELD_REMOVE_VALUE: u8 = 0x24;

// --- Labels (§4.5 phase 4) ---
pub const SET_LABEL: u8 = 0x30;

// --- Node remove + per-node attributes (§4.5 phase 5) ---
pub const NODE_REMOVE_NODE: u8 = 0x40;
pub const NODE_GET_POSITION: u8 = 0x41;
pub const NODE_GET_ORIENTATION: u8 = 0x42;
pub const NODE_GET_CENTER_OF_MASS: u8 = 0x43;
pub const NODE_GET_CONTACT_POINTS: u8 = 0x44;
pub const NODE_GET_STATIC_BALANCE: u8 = 0x45;
pub const NODE_GET_VELOCITY: u8 = 0x46;
pub const NODE_SET_VELOCITY: u8 = 0x47;
pub const NODE_RESET_PHYSICS: u8 = 0x48;
pub const NODE_RESTART_CONTROLLER: u8 = 0x49;
pub const NODE_SET_VISIBILITY: u8 = 0x4a;
pub const NODE_MOVE_VIEWPOINT: u8 = 0x4b;
pub const NODE_ADD_FORCE: u8 = 0x4c;
pub const NODE_ADD_FORCE_WITH_OFFSET: u8 = 0x4d;
pub const NODE_ADD_TORQUE: u8 = 0x4e;

// --- Media (§4.5 phase 6) ---
pub const EXPORT_IMAGE: u8 = 0x50;
pub const START_MOVIE: u8 = 0x51;
pub const STOP_MOVIE: u8 = 0x52;
pub const START_ANIMATION: u8 = 0x53;
pub const STOP_ANIMATION: u8 = 0x54;
pub const SAVE_WORLD: u8 = 0x55;

// --- VR headset (§4.5 phase 7) ---
pub const VIRTUAL_REALITY_HEADSET_IS_USED: u8 = 0x60;
pub const VIRTUAL_REALITY_HEADSET_GET_POSITION: u8 = 0x61;
pub const VIRTUAL_REALITY_HEADSET_GET_ORIENTATION: u8 = 0x62;

// --- Reply opcodes (§4.6) ---
pub const REPLY_CONFIGURE: u8 = 0x80;
pub const REPLY_NODE_GET_FROM_DEF: u8 = 0x81;
pub const REPLY_NODE_GET_SELECTED: u8 = 0x82;
pub const REPLY_NODE_GET_BY_ID: u8 = 0x83;
pub const REPLY_NODE_GET_BY_TAG: u8 = 0x84;
pub const REPLY_FIELD_GET_FROM_NAME: u8 = 0x85;
pub const REPLY_FIELD_GET_VALUE: u8 = 0x86;
pub const REPLY_NODE_REGENERATED: u8 = 0x87;
pub const REPLY_FIELD_INSERT_VALUE: u8 = 0x88;
pub const REPLY_NODE_REMOVE_NODE: u8 = 0x89;
pub const REPLY_NODE_GET_POSITION: u8 = 0x8a;
pub const REPLY_NODE_GET_ORIENTATION: u8 = 0x8b;
pub const REPLY_NODE_GET_CENTER_OF_MASS: u8 = 0x8c;
pub const REPLY_NODE_GET_CONTACT_POINTS: u8 = 0x8d;
pub const REPLY_NODE_GET_STATIC_BALANCE: u8 = 0x8e;
pub const REPLY_NODE_GET_VELOCITY: u8 = 0x8f;
pub const REPLY_MOVIE_STATUS: u8 = 0x90;
pub const REPLY_ANIMATION_START_STATUS: u8 = 0x91;
pub const REPLY_ANIMATION_STOP_STATUS: u8 = 0x92;
pub const REPLY_SAVE_WORLD: u8 = 0x93;
pub const REPLY_VR_HEADSET_IS_USED: u8 = 0x94;
pub const REPLY_VR_HEADSET_GET_POSITION: u8 = 0x95;
pub const REPLY_VR_HEADSET_GET_ORIENTATION: u8 = 0x96;
