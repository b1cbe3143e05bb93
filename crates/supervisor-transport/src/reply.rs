//! # supervisor-transport::reply
//!
//! Defines `ReplyReader`, the primitives the engine's reply dispatcher uses
//! to consume one step's incoming reply frame. Symmetric with
//! `RequestWriter`: fixed-width integers, IEEE-754 doubles, and
//! length-prefixed strings, little-endian.

use supervisor_types::errors::CodecError;

/// Read primitives for consuming an incoming reply frame.
///
/// `rewind_opcode` lets the reply dispatcher implement spec §4.6's default
/// arm ("rewind one byte; delegate to base-controller reply handler")
/// without this crate needing to own the base controller's dispatch loop.
pub trait ReplyReader {
    fn read_u8(&mut self) -> Result<u8, CodecError>;
    fn read_u16(&mut self) -> Result<u16, CodecError>;
    fn read_i32(&mut self) -> Result<i32, CodecError>;
    fn read_u32(&mut self) -> Result<u32, CodecError>;
    fn read_f64(&mut self) -> Result<f64, CodecError>;
    fn read_str(&mut self) -> Result<String, CodecError>;

    /// Returns `true` if the frame has no more bytes to read.
    fn is_empty(&self) -> bool;

    /// Un-reads the single opcode byte most recently consumed by
    /// `read_u8`, so a caller that didn't recognize the opcode can hand
    /// the frame to another reader starting at the same position.
    fn rewind_opcode(&mut self);
}
