//! # supervisor-transport::request
//!
//! Defines `RequestWriter`, the append-only primitives the engine's
//! serializer uses to build one step's outgoing request frame. Per spec §1
//! this mirrors the base controller's request builder: fixed-width
//! integers, IEEE-754 doubles, and length-prefixed, NUL-terminated strings,
//! all little-endian.

/// Append primitives for building an outgoing request frame.
pub trait RequestWriter {
    fn write_u8(&mut self, v: u8);
    fn write_u16(&mut self, v: u16);
    fn write_i32(&mut self, v: i32);
    fn write_u32(&mut self, v: u32);
    fn write_f64(&mut self, v: f64);

    /// Writes a length-prefixed (u32 byte length), NUL-terminated string.
    fn write_str(&mut self, v: &str);

    /// Writes an opcode byte. A thin alias over `write_u8` so serializer
    /// call sites read as "opcode, then payload" rather than raw byte pokes.
    fn write_opcode(&mut self, op: u8) {
        self.write_u8(op);
    }
}

/// A `Vec<u8>` is itself a valid request sink. This lets tests build
/// scripted reply payloads with the exact same primitives the serializer
/// uses for outgoing frames.
impl RequestWriter for Vec<u8> {
    fn write_u8(&mut self, v: u8) {
        self.push(v);
    }

    fn write_u16(&mut self, v: u16) {
        self.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u32(&mut self, v: u32) {
        self.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.extend_from_slice(&v.to_le_bytes());
    }

    fn write_str(&mut self, v: &str) {
        self.write_u32(v.len() as u32);
        self.extend_from_slice(v.as_bytes());
        self.push(0);
    }
}
