//! Stage configuration.
//!
//! Each stage is configured by one record built up front and checked with
//! `validate` before the stage starts.
//!
//! # Example
//! ```
//! use stdc::config::{DecoderStageConfig, FrameOutput};
//!
//! let config = DecoderStageConfig::builder()
//!     .verbose(true)
//!     .output(Some(FrameOutput::Envelope("127.0.0.1:15004".parse().unwrap())))
//!     .build();
//! config.validate().unwrap();
//! ```
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::packet::TextFormat;
use crate::transport::{
    FrameCodec, FrameNumberEncoding, Receiver, SymbolCodec, DEFAULT_FRAME_PORT,
    DEFAULT_PACKET_PORT, DEFAULT_SAMPLE_PORT, DEFAULT_SYMBOL_PORT,
};
use crate::{Error, Result};

fn localhost(port: u16) -> SocketAddr {
    (Ipv4Addr::LOCALHOST, port).into()
}

/// Demodulator search band and initial center frequency, in Hz of the audio
/// signal.
#[derive(TypedBuilder, Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    #[builder(default = 500.0)]
    pub lo: f64,
    #[builder(default = 4500.0)]
    pub hi: f64,
    #[builder(default = 2600.0)]
    pub center: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning::builder().build()
    }
}

impl Tuning {
    /// # Errors
    /// [Error::Config] unless `lo < hi` and `center` lies within them.
    pub fn validate(&self) -> Result<()> {
        if !(self.lo < self.hi) {
            return Err(Error::Config(format!(
                "low frequency {} must be below high frequency {}",
                self.lo, self.hi
            )));
        }
        if self.center < self.lo || self.center > self.hi {
            return Err(Error::Config(format!(
                "center frequency {} outside {}..={}",
                self.center, self.lo, self.hi
            )));
        }
        Ok(())
    }
}

/// Where audio samples come from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum SampleSourceConfig {
    /// 48 kHz, 16-bit, mono WAV file
    File(PathBuf),
    /// Little-endian `i16` samples, gqrx style
    Udp { port: u16 },
}

impl Default for SampleSourceConfig {
    fn default() -> Self {
        Self::Udp {
            port: DEFAULT_SAMPLE_PORT,
        }
    }
}

#[derive(TypedBuilder, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DemodStageConfig {
    #[builder(default)]
    pub source: SampleSourceConfig,
    #[builder(default)]
    pub tuning: Tuning,
    /// Write a running frequency/sync status line
    #[builder(default)]
    pub stats: bool,
    /// Destination for symbol chunks
    #[builder(default = localhost(DEFAULT_SYMBOL_PORT))]
    pub output: SocketAddr,
}

impl DemodStageConfig {
    /// # Errors
    /// [Error::Config] for an invalid tuning or a file source that does not exist.
    pub fn validate(&self) -> Result<()> {
        self.tuning.validate()?;
        if let SampleSourceConfig::File(path) = &self.source {
            if !path.is_file() {
                return Err(Error::Config(format!(
                    "sample file {} does not exist",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Wire form used to forward decoded frames.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutput {
    /// Versioned envelope, read by the parser stage.
    Envelope(SocketAddr),
    /// Payload plus frame number trailer.
    Trailer {
        dest: SocketAddr,
        encoding: FrameNumberEncoding,
    },
}

impl Default for FrameOutput {
    fn default() -> Self {
        Self::Envelope(localhost(DEFAULT_FRAME_PORT))
    }
}

#[derive(TypedBuilder, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DecoderStageConfig {
    /// Port to receive symbol chunks on
    #[builder(default = DEFAULT_SYMBOL_PORT)]
    pub input_port: u16,
    /// Dump every decoded frame
    #[builder(default)]
    pub verbose: bool,
    /// Where to forward frames, if anywhere
    #[builder(default = Some(FrameOutput::default()))]
    pub output: Option<FrameOutput>,
}

impl DecoderStageConfig {
    /// # Errors
    /// [Error::Config] if forwarding to an unspecified destination.
    pub fn validate(&self) -> Result<()> {
        validate_output(self.output.as_ref())
    }

    /// Listen for symbol chunks on `input_port`.
    ///
    /// # Errors
    /// If the port cannot be bound.
    pub fn bind_input(&self) -> Result<Receiver<SymbolCodec>> {
        Receiver::bind(self.input_port, SymbolCodec)
    }
}

/// Receives decoded frame envelopes and optionally relays them, as a
/// standalone listener between the decoder and parser stages.
#[derive(TypedBuilder, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FrameRelayConfig {
    /// Port to receive frame envelopes on
    #[builder(default = DEFAULT_FRAME_PORT)]
    pub input_port: u16,
    /// Dump every received frame
    #[builder(default)]
    pub verbose: bool,
    /// Where to relay frames, if anywhere
    #[builder(default)]
    pub output: Option<FrameOutput>,
}

impl FrameRelayConfig {
    /// # Errors
    /// [Error::Config] if relaying to an unspecified destination.
    pub fn validate(&self) -> Result<()> {
        validate_output(self.output.as_ref())
    }

    /// Listen for frame envelopes on `input_port`.
    ///
    /// # Errors
    /// If the port cannot be bound.
    pub fn bind_input(&self) -> Result<Receiver<FrameCodec>> {
        Receiver::bind(self.input_port, FrameCodec)
    }
}

#[derive(TypedBuilder, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ParserStageConfig {
    /// Port to receive decoded frames on
    #[builder(default = DEFAULT_FRAME_PORT)]
    pub input_port: u16,
    #[builder(default)]
    pub format: TextFormat,
    /// Report every eligible packet, not just messages
    #[builder(default)]
    pub print_all: bool,
    /// Destination for structured packet records
    #[builder(default)]
    pub packet_out: Option<SocketAddr>,
}

impl ParserStageConfig {
    /// Default structured packet destination.
    #[must_use]
    pub fn default_packet_out() -> SocketAddr {
        localhost(DEFAULT_PACKET_PORT)
    }

    /// # Errors
    /// [Error::Config] if the packet destination is unspecified.
    pub fn validate(&self) -> Result<()> {
        match self.packet_out {
            Some(dest) => validate_dest(dest),
            None => Ok(()),
        }
    }

    /// Listen for frame envelopes on `input_port`.
    ///
    /// # Errors
    /// If the port cannot be bound.
    pub fn bind_input(&self) -> Result<Receiver<FrameCodec>> {
        Receiver::bind(self.input_port, FrameCodec)
    }
}

fn validate_output(output: Option<&FrameOutput>) -> Result<()> {
    match output {
        Some(FrameOutput::Envelope(dest) | FrameOutput::Trailer { dest, .. }) => {
            validate_dest(*dest)
        }
        None => Ok(()),
    }
}

fn validate_dest(dest: SocketAddr) -> Result<()> {
    if dest.ip().is_unspecified() || dest.port() == 0 {
        return Err(Error::Config(format!("invalid destination address {dest}")));
    }
    Ok(())
}
