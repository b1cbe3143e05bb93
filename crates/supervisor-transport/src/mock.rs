//! # supervisor-transport::mock
//!
//! An in-memory reference transport. This is the concrete stand-in for the
//! out-of-scope "underlying transport" described in spec §1: a request
//! builder, a symmetric reply reader, and a `flush()` that blocks (here,
//! synchronously computes) until a reply frame is available. It lets the
//! engine's public API and the scenario tests in `tests/scenarios.rs` run
//! without a live simulator process.

use std::collections::VecDeque;

use supervisor_types::errors::{CodecError, TransportError};

use crate::reply::ReplyReader;
use crate::request::RequestWriter;

/// Reads the primitives written by `RequestWriter` back out of a byte
/// buffer. Used both for `InMemoryTransport`'s incoming reply frame and,
/// in tests, to inspect the bytes a serializer produced.
#[derive(Debug, Default, Clone)]
pub struct ByteReader {
    buf: Vec<u8>,
    pos: usize,
    last_read_start: usize,
}

impl ByteReader {
    pub fn new(buf: Vec<u8>) -> Self {
        Self { buf, pos: 0, last_read_start: 0 }
    }

    fn take(&mut self, n: usize, what: &'static str) -> Result<&[u8], CodecError> {
        if self.pos + n > self.buf.len() {
            return Err(CodecError::UnexpectedEof(what));
        }
        self.last_read_start = self.pos;
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }
}

impl ReplyReader for ByteReader {
    fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1, "u8")?[0])
    }

    fn read_u16(&mut self) -> Result<u16, CodecError> {
        let b = self.take(2, "u16")?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn read_i32(&mut self) -> Result<i32, CodecError> {
        let b = self.take(4, "i32")?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        let b = self.take(4, "u32")?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_f64(&mut self) -> Result<f64, CodecError> {
        let b = self.take(8, "f64")?;
        Ok(f64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    fn read_str(&mut self) -> Result<String, CodecError> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len, "str")?.to_vec();
        let _nul = self.take(1, "str-terminator")?;
        String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn rewind_opcode(&mut self) {
        self.pos = self.last_read_start;
    }
}

/// The kind of thing `InMemoryTransport::flush` does with the outgoing
/// request to produce a reply.
enum ReplySource {
    /// Pop pre-scripted reply frames off a queue, one per flush.
    Scripted(VecDeque<Vec<u8>>),
    /// Compute the reply from the outgoing request bytes, e.g. a tiny
    /// fake simulator that echoes back plausible `NODE_GET_FROM_ID` replies.
    Handler(Box<dyn FnMut(&[u8]) -> Vec<u8>>),
}

/// A transport that keeps both sides of the wire in memory.
pub struct InMemoryTransport {
    outgoing: Vec<u8>,
    last_request: Vec<u8>,
    incoming: ByteReader,
    source: ReplySource,
    flush_count: usize,
}

impl InMemoryTransport {
    /// Creates a transport whose replies are scripted ahead of time via
    /// `queue_reply`. Flushing with an empty queue yields an empty reply.
    pub fn new() -> Self {
        Self {
            outgoing: Vec::new(),
            last_request: Vec::new(),
            incoming: ByteReader::new(Vec::new()),
            source: ReplySource::Scripted(VecDeque::new()),
            flush_count: 0,
        }
    }

    /// Creates a transport whose replies are computed on the fly from the
    /// outgoing request bytes, for tests that need stateful fake-simulator
    /// behavior (e.g. allocating sequential node ids).
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: FnMut(&[u8]) -> Vec<u8> + 'static,
    {
        Self {
            outgoing: Vec::new(),
            last_request: Vec::new(),
            incoming: ByteReader::new(Vec::new()),
            source: ReplySource::Handler(Box::new(handler)),
            flush_count: 0,
        }
    }

    /// Appends a reply frame to be returned by a future `flush()`, in order.
    pub fn queue_reply(&mut self, reply: Vec<u8>) {
        match &mut self.source {
            ReplySource::Scripted(q) => q.push_back(reply),
            ReplySource::Handler(_) => {
                panic!("queue_reply called on a handler-backed InMemoryTransport")
            }
        }
    }

    /// Bytes written to the outgoing frame since the last flush.
    pub fn pending_outgoing(&self) -> &[u8] {
        &self.outgoing
    }

    /// Bytes sent by the most recently completed flush, for assertions like
    /// "exactly one `NODE_GET_FROM_DEF` opcode was observed on the wire".
    pub fn last_request(&self) -> &[u8] {
        &self.last_request
    }

    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    /// Ships the outgoing frame and makes the next reply available to read.
    /// Mirrors spec §1's "`flush()` blocks until the simulator has consumed
    /// the outgoing request and delivered its reply" — here that happens
    /// synchronously and in-process.
    pub fn flush(&mut self) -> Result<(), TransportError> {
        let request = std::mem::take(&mut self.outgoing);
        let reply = match &mut self.source {
            ReplySource::Scripted(q) => q.pop_front().unwrap_or_default(),
            ReplySource::Handler(h) => h(&request),
        };
        tracing::debug!(request_bytes = request.len(), reply_bytes = reply.len(), "flush");
        self.last_request = request;
        self.incoming = ByteReader::new(reply);
        self.flush_count += 1;
        Ok(())
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestWriter for InMemoryTransport {
    fn write_u8(&mut self, v: u8) {
        self.outgoing.write_u8(v);
    }

    fn write_u16(&mut self, v: u16) {
        self.outgoing.write_u16(v);
    }

    fn write_i32(&mut self, v: i32) {
        self.outgoing.write_i32(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.outgoing.write_u32(v);
    }

    fn write_f64(&mut self, v: f64) {
        self.outgoing.write_f64(v);
    }

    fn write_str(&mut self, v: &str) {
        self.outgoing.write_str(v);
    }
}

impl ReplyReader for InMemoryTransport {
    fn read_u8(&mut self) -> Result<u8, CodecError> {
        self.incoming.read_u8()
    }

    fn read_u16(&mut self) -> Result<u16, CodecError> {
        self.incoming.read_u16()
    }

    fn read_i32(&mut self) -> Result<i32, CodecError> {
        self.incoming.read_i32()
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        self.incoming.read_u32()
    }

    fn read_f64(&mut self) -> Result<f64, CodecError> {
        self.incoming.read_f64()
    }

    fn read_str(&mut self) -> Result<String, CodecError> {
        self.incoming.read_str()
    }

    fn is_empty(&self) -> bool {
        self.incoming.is_empty()
    }

    fn rewind_opcode(&mut self) {
        self.incoming.rewind_opcode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_primitives_through_flush() {
        let mut t = InMemoryTransport::new();
        let mut reply = Vec::new();
        reply.write_u8(7);
        reply.write_u32(42);
        reply.write_f64(3.5);
        reply.write_str("hello");
        t.queue_reply(reply);

        t.write_u8(1);
        t.flush().unwrap();

        assert_eq!(t.read_u8().unwrap(), 7);
        assert_eq!(t.read_u32().unwrap(), 42);
        assert_eq!(t.read_f64().unwrap(), 3.5);
        assert_eq!(t.read_str().unwrap(), "hello");
        assert!(t.is_empty());
    }

    #[test]
    fn last_request_captures_the_flushed_frame() {
        let mut t = InMemoryTransport::new();
        t.queue_reply(Vec::new());
        t.write_opcode(0x11);
        t.write_u32(99);
        t.flush().unwrap();
        assert_eq!(t.last_request(), &[0x11, 99, 0, 0, 0]);
        assert!(t.pending_outgoing().is_empty());
    }

    #[test]
    fn rewind_opcode_allows_reinspection() {
        let mut buf = Vec::new();
        buf.write_u8(0xAB);
        buf.write_u32(5);
        let mut reader = ByteReader::new(buf);
        let op = reader.read_u8().unwrap();
        assert_eq!(op, 0xAB);
        reader.rewind_opcode();
        assert_eq!(reader.read_u8().unwrap(), 0xAB);
        assert_eq!(reader.read_u32().unwrap(), 5);
    }

    #[test]
    fn unexpected_eof_is_reported() {
        let mut reader = ByteReader::new(vec![1, 2]);
        assert!(reader.read_u32().is_err());
    }
}
