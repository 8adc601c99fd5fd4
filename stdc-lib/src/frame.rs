//! Records produced by the demodulator and the decoder.
//!
//! Both record types are fixed size; their sizes are part of the transport
//! contract between stages, see [crate::transport].
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of symbols produced by one demodulator invocation.
pub const SYMBOLS_PER_CHUNK: usize = 5000;
/// Capacity in bytes of a decoded frame buffer.
pub const FRAME_LENGTH: usize = 640;

/// One batch of demodulated symbols.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolChunk {
    pub symbols: Box<[u8; SYMBOLS_PER_CHUNK]>,
    /// Mean signal magnitude while the chunk was demodulated. Not carried over
    /// the transport; received chunks report 0.
    pub mean_magnitude: f64,
}

impl SymbolChunk {
    #[must_use]
    pub fn new(symbols: Box<[u8; SYMBOLS_PER_CHUNK]>, mean_magnitude: f64) -> Self {
        SymbolChunk {
            symbols,
            mean_magnitude,
        }
    }

    /// Construct from exactly [SYMBOLS_PER_CHUNK] bytes, or `None` for any other length.
    #[must_use]
    pub fn from_slice(dat: &[u8]) -> Option<Self> {
        let symbols: [u8; SYMBOLS_PER_CHUNK] = dat.try_into().ok()?;
        Some(SymbolChunk {
            symbols: Box::new(symbols),
            mean_magnitude: 0.0,
        })
    }
}

/// One fully decoded datalink frame with the decoder's quality metadata.
///
/// The quality flags are advisory and never change the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// Number of valid bytes at the start of `data`.
    pub length: usize,
    pub frame_number: u32,
    pub is_reversed_polarity: bool,
    pub is_mid_stream_reverse_polarity: bool,
    pub is_uncertain: bool,
    /// Estimated bit error rate, 0.0 to 1.0.
    pub ber: f64,
    pub data: Box<[u8; FRAME_LENGTH]>,
}

impl DecodedFrame {
    /// Create a frame holding `payload`, with all quality flags cleared.
    ///
    /// # Errors
    /// [Error::FrameLength] if `payload` does not fit in [FRAME_LENGTH] bytes.
    pub fn new(payload: &[u8], frame_number: u32) -> Result<Self> {
        if payload.len() > FRAME_LENGTH {
            return Err(Error::FrameLength(payload.len()));
        }
        let mut data = Box::new([0u8; FRAME_LENGTH]);
        data[..payload.len()].copy_from_slice(payload);
        Ok(DecodedFrame {
            length: payload.len(),
            frame_number,
            is_reversed_polarity: false,
            is_mid_stream_reverse_polarity: false,
            is_uncertain: false,
            ber: 0.0,
            data,
        })
    }

    /// The valid bytes of the frame buffer.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.length.min(FRAME_LENGTH)]
    }

    /// Multi-line diagnostic dump including the full frame buffer in hex.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut s = String::with_capacity(FRAME_LENGTH * 3 + 256);
        s.push_str("decoded frame:               \n");
        let _ = writeln!(s, "  len: {}", self.length);
        let _ = writeln!(s, "  frameNumber: {}", self.frame_number);
        let _ = writeln!(
            s,
            "  isReversedPolarity: {}",
            u8::from(self.is_reversed_polarity)
        );
        let _ = writeln!(
            s,
            "  isMidStreamReversePolarity: {}",
            u8::from(self.is_mid_stream_reverse_polarity)
        );
        let _ = writeln!(s, "  isUncertain: {}", u8::from(self.is_uncertain));
        let _ = writeln!(s, "  BER: {}", self.ber);
        s.push_str("  data = {\n");
        for b in self.data.iter() {
            let _ = write!(s, "{b:x} ");
        }
        s.push_str("\n }\n");
        s
    }
}

/// Calculate the number of frame numbers skipped between `last` and `cur`.
///
/// `cur` is expected to follow `last`, wrapping at `u32::MAX`. A repeated frame
/// number counts as nothing missing.
#[must_use]
pub fn missing_frames(cur: u32, last: u32) -> u32 {
    if cur == last {
        return 0;
    }
    cur.wrapping_sub(last).wrapping_sub(1)
}

/// Tracks stats on decoded frame iteration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FrameSummary {
    pub count: usize,
    /// Sum of valid payload bytes
    pub bytes: usize,
    /// Frame numbers skipped between consecutive frames
    pub missing: usize,
    pub reversed_polarity: usize,
    pub mid_stream_reverse_polarity: usize,
    pub uncertain: usize,
    pub mean_ber: f64,
    pub first_frame_number: Option<u32>,
    pub last_frame_number: Option<u32>,
}

impl FrameSummary {
    pub fn add(&mut self, frame: &DecodedFrame) {
        self.count += 1;
        self.bytes += frame.payload().len();
        if frame.is_reversed_polarity {
            self.reversed_polarity += 1;
        }
        if frame.is_mid_stream_reverse_polarity {
            self.mid_stream_reverse_polarity += 1;
        }
        if frame.is_uncertain {
            self.uncertain += 1;
        }
        self.mean_ber += (frame.ber - self.mean_ber) / self.count as f64;

        if let Some(last) = self.last_frame_number {
            self.missing += missing_frames(frame.frame_number, last) as usize;
        } else {
            self.first_frame_number = Some(frame.frame_number);
        }
        self.last_frame_number = Some(frame.frame_number);
    }
}
