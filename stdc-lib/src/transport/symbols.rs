use super::DatagramCodec;
use crate::frame::{SymbolChunk, SYMBOLS_PER_CHUNK};
use crate::{Error, Result};

/// Symbol chunks as a raw copy of the symbol buffer.
///
/// There is no header or length prefix; the receiver relies on the fixed
/// [SYMBOLS_PER_CHUNK] size and rejects any other datagram length.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymbolCodec;

impl DatagramCodec for SymbolCodec {
    type Item = SymbolChunk;

    fn max_len(&self) -> usize {
        SYMBOLS_PER_CHUNK
    }

    fn encode(&self, item: &SymbolChunk) -> Result<Vec<u8>> {
        Ok(item.symbols.to_vec())
    }

    fn decode(&self, dat: &[u8]) -> Result<SymbolChunk> {
        SymbolChunk::from_slice(dat).ok_or(Error::InvalidLength {
            actual: dat.len(),
            expected: SYMBOLS_PER_CHUNK,
        })
    }
}
