use std::io::Write;
use std::net::SocketAddr;

use num_complex::Complex64;
use tracing::{debug, info, warn};

use super::{decode, open_source, Decoder, Demodulator, FrameParser, PacketOutput};
use crate::config::{
    DecoderStageConfig, DemodStageConfig, FrameOutput, FrameRelayConfig, ParserStageConfig,
};
use crate::frame::{DecodedFrame, FrameSummary, SymbolChunk};
use crate::packet::{PacketRecord, Summary};
use crate::transport::{FrameCodec, Sender, SymbolCodec, TrailerCodec};
use crate::Result;

/// Sends decoded frames in the wire form chosen by a [FrameOutput].
#[derive(Debug)]
pub enum FrameSender {
    Envelope(Sender<FrameCodec>),
    Trailer(Sender<TrailerCodec>),
}

impl FrameSender {
    /// # Errors
    /// If the socket cannot be created.
    pub fn new(output: &FrameOutput) -> Result<Self> {
        Ok(match *output {
            FrameOutput::Envelope(dest) => Self::Envelope(Sender::new(dest, FrameCodec)?),
            FrameOutput::Trailer { dest, encoding } => {
                Self::Trailer(Sender::new(dest, TrailerCodec::new(encoding))?)
            }
        })
    }

    #[must_use]
    pub fn dest(&self) -> SocketAddr {
        match self {
            Self::Envelope(tx) => tx.dest(),
            Self::Trailer(tx) => tx.dest(),
        }
    }

    /// # Errors
    /// If the datagram could not be sent.
    pub fn send(&self, frame: &DecodedFrame) -> Result<()> {
        match self {
            Self::Envelope(tx) => tx.send(frame),
            Self::Trailer(tx) => tx.send(frame),
        }
    }

    /// # Errors
    /// If the end of stream datagram could not be sent.
    pub fn finish(&self) -> Result<()> {
        match self {
            Self::Envelope(tx) => tx.finish(),
            Self::Trailer(tx) => tx.finish(),
        }
    }
}

/// Demodulate samples from the configured source and send the symbol chunks
/// to the configured destination. Returns the number of chunks produced.
///
/// # Errors
/// If the source cannot be opened, or as for [forward_symbols].
pub fn run_demod_stage<D, W>(
    config: &DemodStageConfig,
    demod: &mut D,
    stats: &mut W,
) -> Result<usize>
where
    D: Demodulator + ?Sized,
    W: Write,
{
    let source = open_source(&config.source)?;
    info!(source = ?config.source, "demodulator stage started");
    forward_symbols(config, source, demod, stats)
}

/// Demodulate samples from `source` and send the symbol chunks to
/// `config.output`. Returns the number of chunks produced.
///
/// With `config.stats` set, a status line ending in `\r` is written to `stats`
/// after each buffer of samples.
///
/// # Errors
/// If the sending socket cannot be created or writing stats fails. Send
/// failures are logged and do not stop the stage.
pub fn forward_symbols<S, D, W>(
    config: &DemodStageConfig,
    source: S,
    demod: &mut D,
    stats: &mut W,
) -> Result<usize>
where
    S: IntoIterator<Item = Vec<Complex64>>,
    D: Demodulator + ?Sized,
    W: Write,
{
    demod.set_tuning(&config.tuning);
    let sender = Sender::new(config.output, SymbolCodec)?;
    debug!(dest = %config.output, "sending symbols");

    let mut produced = 0;
    for samples in source {
        let chunks = demod.demodulate(&samples);
        if config.stats {
            write!(
                stats,
                "freq = {} sync = {}     \r",
                significant(demod.center_frequency(), 6),
                demod.is_in_sync()
            )?;
            stats.flush()?;
        }
        for chunk in chunks {
            produced += 1;
            if let Err(err) = sender.send(&chunk) {
                warn!(dest = %config.output, "failed to send symbols: {err}");
            }
        }
    }

    if let Err(err) = sender.finish() {
        warn!("failed to send end of stream: {err}");
    }
    info!(chunks = produced, "demodulator stage finished");
    Ok(produced)
}

/// Format `v` with at most `digits` significant digits and no trailing
/// zeros, switching to exponent form for very large or small magnitudes.
fn significant(v: f64, digits: usize) -> String {
    if v == 0.0 || !v.is_finite() {
        return format!("{v}");
    }
    let exp = v.abs().log10().floor() as i32;
    let digits = digits.max(1);
    if exp < -4 || exp >= digits as i32 {
        let s = format!("{:.*e}", digits - 1, v);
        return match s.split_once('e') {
            Some((mantissa, exp)) => format!("{}e{exp}", trim_zeros(mantissa)),
            None => s,
        };
    }
    let decimals = usize::try_from(digits as i32 - 1 - exp).unwrap_or_default();
    trim_zeros(&format!("{v:.decimals$}")).to_string()
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Dump and forward `frames`, returning a summary of them.
///
/// With `verbose` set every frame is dumped to `out`. Frames are sent to
/// `output` best effort.
///
/// # Errors
/// If writing to `out` fails.
pub fn forward_frames<F, W>(
    frames: F,
    verbose: bool,
    output: Option<&FrameSender>,
    out: &mut W,
) -> Result<FrameSummary>
where
    F: IntoIterator<Item = DecodedFrame>,
    W: Write,
{
    let mut summary = FrameSummary::default();
    for frame in frames {
        summary.add(&frame);
        if verbose {
            out.write_all(frame.dump().as_bytes())?;
        }
        if let Some(sender) = output {
            if let Err(err) = sender.send(&frame) {
                warn!(dest = %sender.dest(), "failed to send frame: {err}");
            }
        }
    }
    if let Some(sender) = output {
        if let Err(err) = sender.finish() {
            warn!("failed to send end of stream: {err}");
        }
    }
    out.flush()?;
    Ok(summary)
}

/// Receive frame envelopes on the configured port until end of stream,
/// dumping and relaying them as configured.
///
/// # Errors
/// If the port cannot be bound, the relay socket cannot be created or
/// writing to `out` fails.
pub fn run_frame_relay<W: Write>(config: &FrameRelayConfig, out: &mut W) -> Result<FrameSummary> {
    let sender = config.output.as_ref().map(FrameSender::new).transpose()?;
    let frames = config.bind_input()?;
    info!(port = config.input_port, output = ?config.output, "frame relay started");

    let summary = forward_frames(frames, config.verbose, sender.as_ref(), out)?;

    info!(
        frames = summary.count,
        missing = summary.missing,
        "frame relay finished"
    );
    Ok(summary)
}

/// Receive symbol chunks on the configured port until end of stream, decode
/// them and forward the frames as configured.
///
/// # Errors
/// If the port cannot be bound, or as for [decode_frames].
pub fn run_decoder_stage<D, W>(
    config: &DecoderStageConfig,
    decoder: &mut D,
    out: &mut W,
) -> Result<FrameSummary>
where
    D: Decoder + ?Sized,
    W: Write,
{
    let chunks = config.bind_input()?;
    info!(port = config.input_port, "decoder stage started");
    decode_frames(config, chunks, decoder, out)
}

/// Decode symbol chunks and forward the frames as configured.
///
/// # Errors
/// If the sending socket cannot be created or writing to `out` fails.
pub fn decode_frames<C, D, W>(
    config: &DecoderStageConfig,
    chunks: C,
    decoder: &mut D,
    out: &mut W,
) -> Result<FrameSummary>
where
    C: IntoIterator<Item = SymbolChunk>,
    D: Decoder + ?Sized,
    W: Write,
{
    let sender = config.output.as_ref().map(FrameSender::new).transpose()?;
    debug!(output = ?config.output, "forwarding frames");

    let summary = forward_frames(decode(chunks, decoder), config.verbose, sender.as_ref(), out)?;

    info!(
        frames = summary.count,
        missing = summary.missing,
        "decoder stage finished"
    );
    Ok(summary)
}

/// Output each record in `records` and summarize them.
///
/// # Errors
/// If writing text output fails.
pub fn render_records<R, W>(records: R, output: &mut PacketOutput<W>) -> Result<Summary>
where
    R: IntoIterator<Item = PacketRecord>,
    W: Write,
{
    let mut summary = Summary::default();
    for rec in records {
        summary.add(&rec);
        output.write(&rec)?;
    }
    output.flush()?;
    Ok(summary)
}

/// Receive frame envelopes on the configured port until end of stream and
/// parse them, writing the selected packet records to `output`.
///
/// # Errors
/// If the port cannot be bound, or as for [parse_frames].
pub fn run_parser_stage<P, W>(
    config: &ParserStageConfig,
    parser: &mut P,
    output: &mut PacketOutput<W>,
) -> Result<Summary>
where
    P: FrameParser + ?Sized,
    W: Write,
{
    let frames = config.bind_input()?;
    info!(port = config.input_port, "parser stage started");
    parse_frames(frames, parser, output)
}

/// Parse decoded frames and output the selected packet records.
///
/// The returned summary counts every record the parser produced, eligible or
/// not.
///
/// # Errors
/// If writing text output fails.
pub fn parse_frames<F, P, W>(
    frames: F,
    parser: &mut P,
    output: &mut PacketOutput<W>,
) -> Result<Summary>
where
    F: IntoIterator<Item = DecodedFrame>,
    P: FrameParser + ?Sized,
    W: Write,
{
    debug!(renderer = ?output.renderer(), "parsing frames");
    let records = frames.into_iter().flat_map(|frame| parser.parse(&frame));
    let summary = render_records(records, output)?;
    info!(
        packets = summary.total,
        messages = summary.messages,
        "parser stage finished"
    );
    Ok(summary)
}
