//! The three processing stages and the glue between them.
//!
//! The signal processing itself is provided through the [Demodulator],
//! [Decoder] and [FrameParser] traits. Stages are chained either directly with
//! the iterator adapters in this module or across processes with the
//! [crate::transport] senders and receivers; rendering is the same either way.
//!
//! # Example
//! ```
//! use stdc::frame::{DecodedFrame, SymbolChunk};
//! use stdc::packet::PacketRecord;
//! use stdc::stage::{decode, parse, Decoder, FrameParser};
//!
//! struct OneFrame;
//! impl Decoder for OneFrame {
//!     fn decode(&mut self, _: &SymbolChunk) -> Vec<DecodedFrame> {
//!         vec![DecodedFrame::new(b"frame", 1).unwrap()]
//!     }
//! }
//!
//! struct OnePacket;
//! impl FrameParser for OnePacket {
//!     fn parse(&mut self, frame: &DecodedFrame) -> Vec<PacketRecord> {
//!         vec![PacketRecord::new(0xaa, frame.frame_number, chrono::Utc::now())]
//!     }
//! }
//!
//! let chunks = vec![SymbolChunk::from_slice(&[0u8; 5000]).unwrap()];
//! let packets: Vec<PacketRecord> = parse(decode(chunks, OneFrame), OnePacket).collect();
//! assert_eq!(packets.len(), 1);
//! ```
mod output;
mod runner;
mod source;

pub use output::*;
pub use runner::*;
pub use source::*;

use num_complex::Complex64;
use tracing::trace;

use crate::config::Tuning;
use crate::frame::{DecodedFrame, SymbolChunk};
use crate::packet::PacketRecord;

/// Turns 48 kHz audio samples into symbol chunks.
pub trait Demodulator {
    /// Consume `samples`, returning any chunks completed by them.
    fn demodulate(&mut self, samples: &[Complex64]) -> Vec<SymbolChunk>;

    fn set_tuning(&mut self, tuning: &Tuning);

    /// Current estimate of the carrier center frequency in Hz.
    fn center_frequency(&self) -> f64;

    fn is_in_sync(&self) -> bool;
}

/// Turns symbol chunks into decoded frames.
pub trait Decoder {
    fn decode(&mut self, chunk: &SymbolChunk) -> Vec<DecodedFrame>;
}

/// Extracts packet records from decoded frames.
pub trait FrameParser {
    fn parse(&mut self, frame: &DecodedFrame) -> Vec<PacketRecord>;
}

impl<D: Demodulator + ?Sized> Demodulator for &mut D {
    fn demodulate(&mut self, samples: &[Complex64]) -> Vec<SymbolChunk> {
        (**self).demodulate(samples)
    }

    fn set_tuning(&mut self, tuning: &Tuning) {
        (**self).set_tuning(tuning);
    }

    fn center_frequency(&self) -> f64 {
        (**self).center_frequency()
    }

    fn is_in_sync(&self) -> bool {
        (**self).is_in_sync()
    }
}

impl<D: Decoder + ?Sized> Decoder for &mut D {
    fn decode(&mut self, chunk: &SymbolChunk) -> Vec<DecodedFrame> {
        (**self).decode(chunk)
    }
}

impl<P: FrameParser + ?Sized> FrameParser for &mut P {
    fn parse(&mut self, frame: &DecodedFrame) -> Vec<PacketRecord> {
        (**self).parse(frame)
    }
}

/// Demodulate each buffer of samples from `source`.
pub fn demodulate<S, D>(source: S, mut demod: D) -> impl Iterator<Item = SymbolChunk>
where
    S: IntoIterator<Item = Vec<Complex64>>,
    D: Demodulator,
{
    source
        .into_iter()
        .flat_map(move |samples| demod.demodulate(&samples))
}

/// Decode each symbol chunk into frames.
pub fn decode<C, D>(chunks: C, mut decoder: D) -> impl Iterator<Item = DecodedFrame>
where
    C: IntoIterator<Item = SymbolChunk>,
    D: Decoder,
{
    chunks.into_iter().flat_map(move |chunk| {
        let frames = decoder.decode(&chunk);
        trace!(count = frames.len(), "decoded frames");
        frames
    })
}

/// Parse each frame into packet records, keeping only eligible records.
pub fn parse<F, P>(frames: F, mut parser: P) -> impl Iterator<Item = PacketRecord>
where
    F: IntoIterator<Item = DecodedFrame>,
    P: FrameParser,
{
    frames
        .into_iter()
        .flat_map(move |frame| parser.parse(&frame))
        .filter(|rec| {
            if !rec.is_eligible() {
                trace!(
                    descriptor = rec.descriptor,
                    frame_number = rec.frame_number,
                    "dropping ineligible packet"
                );
            }
            rec.is_eligible()
        })
}
