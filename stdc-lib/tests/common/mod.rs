#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use stdc::frame::{DecodedFrame, SymbolChunk, SYMBOLS_PER_CHUNK};
use stdc::packet::PacketRecord;
use stdc::stage::{Decoder, FrameParser};

pub fn fixture_path(name: &str) -> PathBuf {
    let mut path =
        PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"));
    path.push("tests/fixtures");
    path.push(name);
    path
}

pub fn read_records(name: &str) -> Vec<PacketRecord> {
    let fpath = fixture_path(name);
    let dat = fs::read_to_string(&fpath).unwrap_or_else(|_| panic!("{fpath:?} to exist"));
    dat.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

/// Symbol chunk whose first 4 symbols carry a big-endian frame number.
pub fn chunk(frame_number: u32) -> SymbolChunk {
    let mut symbols = Box::new([0u8; SYMBOLS_PER_CHUNK]);
    symbols[..4].copy_from_slice(&frame_number.to_be_bytes());
    SymbolChunk::new(symbols, 0.5)
}

/// Decodes one frame per chunk, numbered by the chunk's first 4 symbols.
#[derive(Default)]
pub struct NumberedDecoder;

impl Decoder for NumberedDecoder {
    fn decode(&mut self, chunk: &SymbolChunk) -> Vec<DecodedFrame> {
        let num = u32::from_be_bytes([
            chunk.symbols[0],
            chunk.symbols[1],
            chunk.symbols[2],
            chunk.symbols[3],
        ]);
        let mut frame = DecodedFrame::new(format!("frame {num}").as_bytes(), num).unwrap();
        frame.ber = 0.01;
        vec![frame]
    }
}

/// Yields the fixture records belonging to each frame number.
pub struct FixtureParser {
    pub records: Vec<PacketRecord>,
}

impl FrameParser for FixtureParser {
    fn parse(&mut self, frame: &DecodedFrame) -> Vec<PacketRecord> {
        self.records
            .iter()
            .filter(|r| r.frame_number == frame.frame_number)
            .cloned()
            .collect()
    }
}
