//! # supervisor-types::errors
//!
//! Defines the error types shared across the workspace. Using `thiserror`
//! provides clean, descriptive error handling. All error variants must have
//! a deterministic `Debug` implementation for reproducibility.

use thiserror::Error;

/// A precondition or caller-context violation, per spec §7. These are
/// never fatal: the public API logs them through the diagnostics sink,
/// leaves state unchanged, and returns the documented sentinel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("value is not finite or exceeds the representable range: {0}")]
    NotFinite(f64),
    #[error("color channel {0} is out of range [0, 1]")]
    ColorChannelOutOfRange(f64),
    #[error("rotation axis must be non-zero")]
    ZeroRotationAxis,
    #[error("filename is null or empty")]
    EmptyFilename,
    #[error("filename {0:?} does not have the required extension {1:?}")]
    WrongExtension(String, &'static str),
    #[error("index {index} is out of bounds for field with count {count}")]
    IndexOutOfBounds { index: i32, count: i32 },
    #[error("node handle is not valid or unknown")]
    InvalidNodeHandle,
    #[error("field handle is not valid or unknown")]
    InvalidFieldHandle,
    #[error("field is read-only (proto-internal)")]
    ProtoInternalReadOnly,
    #[error("field type mismatch: expected {expected}, found {found}")]
    FieldTypeMismatch { expected: String, found: String },
    #[error("cannot remove node of protected type {0}")]
    ProtectedNodeType(&'static str),
    #[error("field has no elements")]
    EmptyField,
    #[error("the calling process is not a supervisor")]
    NotASupervisor,
    #[error("cannot remove an MF_NODE element this way; use node_remove so the parent field's count is refreshed from the reply")]
    MfNodeRemovalUnsupported,
}

/// An error during message serialization, deserialization, or framing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("unexpected opcode byte {0:#04x}")]
    UnknownOpcode(u8),
    #[error("unexpected end of reply frame while reading {0}")]
    UnexpectedEof(&'static str),
    #[error("string payload was not valid UTF-8")]
    InvalidUtf8,
    #[error("unknown field type tag {0:#04x}")]
    UnknownFieldType(u32),
}

/// An error surfaced by the underlying transport (out of scope per spec
/// §1, but the engine must be able to report that a flush failed).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("transport flush failed: {0}")]
    FlushFailed(String),
    #[error("transport connection is closed")]
    Closed,
}

/// The top-level error returned by fallible engine operations that are not
/// boundary-local validation (those instead return a sentinel, per §7).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("the remote object vanished before the reply was received")]
    ObjectVanished,
    #[error("a GET is already in flight for this step")]
    GetAlreadyInFlight,
}
