//! Wire protocol: the JSON packet envelope and its tagged payloads.
//!
//! Every frame on the stream is one JSON object with three top-level
//! fields: `id`, `type`, and `data`. The schema of `data` is fully
//! determined by `type`, so the envelope stores it as a `RawValue` and
//! handlers decode it on demand via [`packet::Packet::payload_as`].
//!
//! All parsers are panic-free: malformed input is reported as
//! `ParlorError` instead of panicking, keeping the session loops resilient
//! to anything the server sends.

pub mod packet;
pub mod types;

pub use packet::{decode, encode, Packet, PacketType};
