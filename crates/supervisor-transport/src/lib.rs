//! # supervisor-transport
//!
//! This crate provides the Software Development Kit boundary between the
//! supervisor engine and the underlying request/reply transport to the
//! simulator. Per spec §1, the transport itself (framing, shipping bytes,
//! the step mutex, `flush()`) is an external collaborator out of scope for
//! this workspace; what belongs here is the trait boundary the engine
//! programs against, the wire opcode catalog, and an in-memory reference
//! transport used for tests and for host applications that want to drive
//! the engine without a live simulator process.

#![forbid(unsafe_code)]

pub mod mock;
pub mod opcode;
pub mod reply;
pub mod request;
pub mod transport;

pub use mock::InMemoryTransport;
pub use reply::ReplyReader;
pub use request::RequestWriter;
pub use transport::Transport;
