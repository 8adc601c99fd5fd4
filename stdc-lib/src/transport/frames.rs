use serde::{Deserialize, Serialize};

use super::DatagramCodec;
use crate::frame::{DecodedFrame, FRAME_LENGTH};
use crate::{Error, Result};

/// Decoded frames in a fixed size, versioned envelope.
///
/// All multi-byte fields are big-endian:
/// ```text
/// 0      version
/// 1      flags; bit0 reversed polarity, bit1 mid-stream reverse, bit2 uncertain
/// 2..4   valid payload length (u16)
/// 4..8   frame number (u32)
/// 8..16  BER (f64 bits)
/// 16..   full frame buffer, FRAME_LENGTH bytes
/// ```
/// The envelope carries no checksum. Frame integrity is judged downstream by
/// the parser's per-packet CRC.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameCodec;

impl FrameCodec {
    pub const VERSION: u8 = 1;
    /// Envelope header length in bytes
    pub const HEADER_LEN: usize = 16;
    /// Total encoded length of every frame datagram
    pub const ENCODED_LEN: usize = Self::HEADER_LEN + FRAME_LENGTH;

    const FLAG_REVERSED: u8 = 0x1;
    const FLAG_MID_STREAM_REVERSED: u8 = 0x2;
    const FLAG_UNCERTAIN: u8 = 0x4;
}

impl DatagramCodec for FrameCodec {
    type Item = DecodedFrame;

    fn max_len(&self) -> usize {
        Self::ENCODED_LEN
    }

    /// Encode `frame`. A `length` beyond the frame capacity is clamped.
    fn encode(&self, frame: &DecodedFrame) -> Result<Vec<u8>> {
        let mut flags = 0u8;
        if frame.is_reversed_polarity {
            flags |= Self::FLAG_REVERSED;
        }
        if frame.is_mid_stream_reverse_polarity {
            flags |= Self::FLAG_MID_STREAM_REVERSED;
        }
        if frame.is_uncertain {
            flags |= Self::FLAG_UNCERTAIN;
        }
        // FRAME_LENGTH fits in a u16
        let length = frame.length.min(FRAME_LENGTH) as u16;

        let mut dat = Vec::with_capacity(Self::ENCODED_LEN);
        dat.push(Self::VERSION);
        dat.push(flags);
        dat.extend_from_slice(&length.to_be_bytes());
        dat.extend_from_slice(&frame.frame_number.to_be_bytes());
        dat.extend_from_slice(&frame.ber.to_bits().to_be_bytes());
        dat.extend_from_slice(&frame.data[..]);
        Ok(dat)
    }

    fn decode(&self, dat: &[u8]) -> Result<DecodedFrame> {
        if dat.len() != Self::ENCODED_LEN {
            return Err(Error::InvalidLength {
                actual: dat.len(),
                expected: Self::ENCODED_LEN,
            });
        }
        if dat[0] != Self::VERSION {
            return Err(Error::UnsupportedVersion(dat[0]));
        }
        let flags = dat[1];
        let length = u16::from_be_bytes([dat[2], dat[3]]) as usize;
        if length > FRAME_LENGTH {
            return Err(Error::FrameLength(length));
        }
        let frame_number = u32::from_be_bytes([dat[4], dat[5], dat[6], dat[7]]);
        let mut ber = [0u8; 8];
        ber.copy_from_slice(&dat[8..Self::HEADER_LEN]);

        let mut data = Box::new([0u8; FRAME_LENGTH]);
        data.copy_from_slice(&dat[Self::HEADER_LEN..]);

        Ok(DecodedFrame {
            length,
            frame_number,
            is_reversed_polarity: flags & Self::FLAG_REVERSED != 0,
            is_mid_stream_reverse_polarity: flags & Self::FLAG_MID_STREAM_REVERSED != 0,
            is_uncertain: flags & Self::FLAG_UNCERTAIN != 0,
            ber: f64::from_bits(u64::from_be_bytes(ber)),
            data,
        })
    }
}

/// How the last byte of a [TrailerCodec] frame number is written.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FrameNumberEncoding {
    /// Byte 3 is `frame_number >> 3`, matching deployed receivers. The low
    /// byte of the frame number cannot be recovered from this form.
    #[default]
    Legacy,
    /// Plain 4 byte big-endian.
    BigEndian,
}

/// Decoded frames as the valid payload bytes followed by a 4 byte frame
/// number trailer.
///
/// Quality flags and BER are not carried.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrailerCodec {
    pub encoding: FrameNumberEncoding,
}

impl TrailerCodec {
    /// Frame number trailer length in bytes
    pub const TRAILER_LEN: usize = 4;

    #[must_use]
    pub fn new(encoding: FrameNumberEncoding) -> Self {
        TrailerCodec { encoding }
    }
}

impl DatagramCodec for TrailerCodec {
    type Item = DecodedFrame;

    fn max_len(&self) -> usize {
        FRAME_LENGTH + Self::TRAILER_LEN
    }

    fn encode(&self, frame: &DecodedFrame) -> Result<Vec<u8>> {
        let payload = frame.payload();
        let n = frame.frame_number;
        let low = match self.encoding {
            FrameNumberEncoding::Legacy => (n >> 3) as u8,
            FrameNumberEncoding::BigEndian => n as u8,
        };

        let mut dat = Vec::with_capacity(payload.len() + Self::TRAILER_LEN);
        dat.extend_from_slice(payload);
        dat.extend_from_slice(&[(n >> 24) as u8, (n >> 16) as u8, (n >> 8) as u8, low]);
        Ok(dat)
    }

    /// Split the trailer off the end of `dat`. The frame number is always read
    /// big-endian, whatever `encoding` is set to.
    fn decode(&self, dat: &[u8]) -> Result<DecodedFrame> {
        if dat.len() < Self::TRAILER_LEN {
            return Err(Error::NotEnoughData {
                actual: dat.len(),
                minimum: Self::TRAILER_LEN,
            });
        }
        let (payload, trailer) = dat.split_at(dat.len() - Self::TRAILER_LEN);
        let frame_number = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
        DecodedFrame::new(payload, frame_number)
    }
}
