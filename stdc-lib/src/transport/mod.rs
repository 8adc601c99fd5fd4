//! Inter-stage datagram transport.
//!
//! Each stage boundary carries exactly one encoded record per datagram. The
//! transport is best effort: nothing is retransmitted, reordered or
//! reassembled, and records that fail to decode are dropped.
//!
//! | link                  | codec            | default port |
//! |-----------------------|------------------|--------------|
//! | samples → demod       | raw `i16` LE     | 7355         |
//! | demod → decoder       | [SymbolCodec]    | 15003        |
//! | decoder → parser      | [FrameCodec]     | 15004        |
//! | parser → consumers    | [JsonCodec]      | 15005        |
//!
//! [TrailerCodec] is the frame-only form the combined tool emits when it
//! stops after decoding.
mod frames;
mod symbols;
mod udp;

pub use frames::*;
pub use symbols::*;
pub use udp::*;

use crate::Result;

/// Default port of a gqrx style audio sample feed.
pub const DEFAULT_SAMPLE_PORT: u16 = 7355;
/// Default port for symbol chunks.
pub const DEFAULT_SYMBOL_PORT: u16 = 15003;
/// Default port for decoded frames.
pub const DEFAULT_FRAME_PORT: u16 = 15004;
/// Default port for structured packet records.
pub const DEFAULT_PACKET_PORT: u16 = 15005;

/// Largest payload of a single UDP datagram.
pub const MAX_DATAGRAM_LEN: usize = 65507;

/// A wire form mapping one record to one datagram.
pub trait DatagramCodec {
    type Item;

    /// Largest datagram `encode` produces.
    fn max_len(&self) -> usize;

    /// Encode a single record.
    ///
    /// # Errors
    /// If the record has no representation in this wire form.
    fn encode(&self, item: &Self::Item) -> Result<Vec<u8>>;

    /// Decode a single datagram.
    ///
    /// # Errors
    /// If the datagram is malformed for this wire form.
    fn decode(&self, dat: &[u8]) -> Result<Self::Item>;
}

/// Compact JSON documents, one per datagram.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl DatagramCodec for JsonCodec {
    type Item = serde_json::Value;

    fn max_len(&self) -> usize {
        MAX_DATAGRAM_LEN
    }

    fn encode(&self, item: &Self::Item) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(item)?)
    }

    fn decode(&self, dat: &[u8]) -> Result<Self::Item> {
        Ok(serde_json::from_slice(dat)?)
    }
}
