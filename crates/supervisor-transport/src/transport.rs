//! # supervisor-transport::transport
//!
//! Defines `Transport`, the engine-facing union of `RequestWriter` +
//! `ReplyReader` + the step-flush primitive from spec §1 ("a `flush()`
//! that blocks until the simulator has consumed the outgoing request and
//! delivered its reply"). `supervisor-engine::api::SupervisorEngine` is
//! generic over this trait so it can run against `InMemoryTransport` in
//! tests and against a real transport in a host controller without this
//! crate needing to know about either.

use supervisor_types::errors::TransportError;

use crate::reply::ReplyReader;
use crate::request::RequestWriter;

/// The full set of primitives the engine needs from a transport: building
/// an outgoing frame, flushing it, and reading the resulting reply frame.
pub trait Transport: RequestWriter + ReplyReader {
    fn flush(&mut self) -> Result<(), TransportError>;
}

impl Transport for crate::mock::InMemoryTransport {
    fn flush(&mut self) -> Result<(), TransportError> {
        crate::mock::InMemoryTransport::flush(self)
    }
}
