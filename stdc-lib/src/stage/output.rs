use std::io::Write;
use std::net::SocketAddr;

use tracing::{trace, warn};

use crate::config::ParserStageConfig;
use crate::packet::{PacketRecord, Renderer};
use crate::transport::{JsonCodec, Sender};
use crate::Result;

/// Writes selected packet records as text and optionally sends their
/// structured form.
///
/// Each record's text is written with a single `write_all` so concurrent
/// writers never interleave within a record.
pub struct PacketOutput<W: Write> {
    renderer: Renderer,
    writer: W,
    sink: Option<Sender<JsonCodec>>,
}

impl<W: Write> PacketOutput<W> {
    #[must_use]
    pub fn new(renderer: Renderer, writer: W) -> Self {
        PacketOutput {
            renderer,
            writer,
            sink: None,
        }
    }

    /// Build from a parser stage config.
    ///
    /// # Errors
    /// If the structured record socket cannot be created.
    pub fn from_config(config: &ParserStageConfig, writer: W) -> Result<Self> {
        let output = Self::new(Renderer::new(config.format, config.print_all), writer);
        match config.packet_out {
            Some(dest) => output.with_sink(dest),
            None => Ok(output),
        }
    }

    /// Also send structured records to `dest`.
    ///
    /// # Errors
    /// If the socket cannot be created.
    pub fn with_sink(mut self, dest: SocketAddr) -> Result<Self> {
        self.sink = Some(Sender::new(dest, JsonCodec)?);
        Ok(self)
    }

    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Output `rec` if the renderer selects it, returning whether it did.
    ///
    /// Structured records are sent best effort; failures are logged.
    ///
    /// # Errors
    /// If writing text fails.
    pub fn write(&mut self, rec: &PacketRecord) -> Result<bool> {
        let Some(text) = self.renderer.render(rec) else {
            trace!(descriptor = rec.descriptor, "packet not selected");
            return Ok(false);
        };
        self.writer.write_all(text.as_bytes())?;

        if let Some(sink) = &self.sink {
            match crate::packet::structured(rec) {
                Ok(doc) => {
                    if let Err(err) = sink.send(&doc) {
                        warn!(dest = %sink.dest(), "failed to send packet: {err}");
                    }
                }
                Err(err) => warn!(
                    frame_number = rec.frame_number,
                    "dropping structured packet: {err}"
                ),
            }
        }
        Ok(true)
    }

    /// # Errors
    /// If flushing the writer fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the writer.
    ///
    /// # Errors
    /// If flushing the writer fails.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{Payload, Presentation, TextFormat};
    use crate::transport::Receiver;
    use chrono::{DateTime, Utc};
    use std::net::Ipv4Addr;

    fn message() -> PacketRecord {
        PacketRecord::new(0xaa, 5, DateTime::<Utc>::UNIX_EPOCH)
            .with_payload(Payload::new(Presentation::IA5, &[0x41, 0x07]))
    }

    #[test]
    fn writes_selected_records() {
        let mut output = PacketOutput::new(Renderer::default(), Vec::new());
        let ack = PacketRecord::new(0x08, 1, DateTime::<Utc>::UNIX_EPOCH);

        assert!(output.write(&message()).unwrap());
        assert!(!output.write(&ack).unwrap());

        let text = String::from_utf8(output.into_inner().unwrap()).unwrap();
        assert!(text.starts_with("packet:"));
        assert!(text.contains("  Message(text): \n     A(7)\n"));
        assert_eq!(text.matches("packet:").count(), 1);
    }

    #[test]
    fn sends_structured_records() {
        let mut rx = Receiver::bind_addr((Ipv4Addr::LOCALHOST, 0).into(), JsonCodec).unwrap();
        let port = rx.local_addr().unwrap().port();
        let config = ParserStageConfig::builder()
            .format(TextFormat::Verbose)
            .packet_out(Some((Ipv4Addr::LOCALHOST, port).into()))
            .build();
        let mut output = PacketOutput::from_config(&config, Vec::new()).unwrap();

        let mut bad = message();
        bad.is_crc = false;
        output.write(&bad).unwrap();
        output.write(&message()).unwrap();

        let doc = rx.recv().unwrap().unwrap();
        assert_eq!(doc["frameNumber"], 5);
        assert_eq!(doc["payload"]["data"], "A(7)");
    }
}
