use std::fmt::Write;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{
    clean_text, hex_bytes, DecodingStage, PacketRecord, PacketVars, Presentation,
    DESCRIPTOR_TEXT_VAR,
};
use crate::Result;

/// Text layout for rendered records.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    /// Per-descriptor summary lines.
    #[default]
    Compact,
    /// Every field of the record, including all vars.
    Verbose,
}

/// Selects and renders packet records.
///
/// A record is selected when it is eligible and either `print_all` is set or
/// the record is a message. The same selection applies to text and structured
/// output.
#[derive(Debug, Default, Clone, Copy)]
pub struct Renderer {
    pub format: TextFormat,
    pub print_all: bool,
}

impl Renderer {
    #[must_use]
    pub fn new(format: TextFormat, print_all: bool) -> Self {
        Renderer { format, print_all }
    }

    #[must_use]
    pub fn selects(&self, rec: &PacketRecord) -> bool {
        rec.is_eligible() && (self.print_all || rec.is_message())
    }

    /// Render `rec` as text, selected or not. The result always ends with a
    /// blank line.
    #[must_use]
    pub fn text(&self, rec: &PacketRecord) -> String {
        let mut out = String::new();
        write_header(&mut out, rec);
        match self.format {
            TextFormat::Compact => rec.body().write_compact(&mut out),
            TextFormat::Verbose => write_verbose(&mut out, rec),
        }
        out.push('\n');
        out
    }

    /// Text for `rec` if it is selected.
    #[must_use]
    pub fn render(&self, rec: &PacketRecord) -> Option<String> {
        self.selects(rec).then(|| self.text(rec))
    }

    /// Structured document for `rec` if it is selected.
    ///
    /// # Errors
    /// If the record cannot be serialized.
    pub fn render_structured(&self, rec: &PacketRecord) -> Result<Option<serde_json::Value>> {
        if !self.selects(rec) {
            return Ok(None);
        }
        Ok(Some(structured(rec)?))
    }
}

fn write_header(out: &mut String, rec: &PacketRecord) {
    out.push_str("packet:                        \n");
    let _ = writeln!(
        out,
        "  type: {} ({:x})",
        rec.descriptor_text(),
        rec.descriptor
    );
}

fn write_verbose(out: &mut String, rec: &PacketRecord) {
    let local = rec.timestamp.with_timezone(&Local);
    let _ = writeln!(out, "  frameNumber: {}", rec.frame_number);
    let _ = writeln!(out, "  timestamp: {}", local.format("%a %b %e %H:%M:%S %Y"));
    let _ = writeln!(out, "  decodingStage: {}", rec.stage.name());
    let _ = writeln!(out, "  packetLength: {}", rec.packet_length);

    match rec.payload() {
        Some(payload) => {
            out.push_str("  payload: yes\n");
            let _ = writeln!(out, "      presentation: {}", payload.presentation.name());
            out.push_str("      data: {\n          ");
            match payload.presentation {
                Presentation::IA5 => out.push_str(&clean_text(&payload.data, "\n         ")),
                Presentation::ITA2 => {}
                _ => out.push_str(&hex_bytes(&payload.data)),
            }
            out.push_str("\n      }\n");
        }
        None => out.push_str("  payload: no\n"),
    }

    out.push_str("  packetVars:\n");
    for (key, value) in &rec.vars {
        if key == DESCRIPTOR_TEXT_VAR {
            continue;
        }
        let _ = writeln!(
            out,
            "      {key}: \n          {}",
            value.replace('\n', "\n          ")
        );
    }
}

#[derive(Serialize)]
struct StructuredPayload {
    data: String,
    presentation: i32,
}

/// Field order is the document key order.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StructuredRecord<'a> {
    decoding_stage: DecodingStage,
    frame_number: u32,
    packet_descriptor: u8,
    packet_length: u32,
    packet_vars: &'a PacketVars,
    payload: StructuredPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<i64>,
}

/// Machine readable form of `rec`.
///
/// Payload data is cleaned text with plain `\n` line breaks for every
/// presentation except ITA2, which is empty. The timestamp is nanoseconds
/// since the Unix epoch, omitted when that does not fit in an `i64`.
///
/// # Errors
/// If the record cannot be serialized.
pub fn structured(rec: &PacketRecord) -> Result<serde_json::Value> {
    let data = match rec.payload() {
        Some(p) if p.presentation != Presentation::ITA2 => clean_text(&p.data, "\n"),
        _ => String::new(),
    };
    let doc = StructuredRecord {
        decoding_stage: rec.stage,
        frame_number: rec.frame_number,
        packet_descriptor: rec.descriptor,
        packet_length: rec.packet_length,
        packet_vars: &rec.vars,
        payload: StructuredPayload {
            data,
            presentation: rec.presentation_code(),
        },
        timestamp: rec.timestamp.timestamp_nanos_opt(),
    };
    if doc.timestamp.is_none() {
        warn!(
            frame_number = rec.frame_number,
            "timestamp {} out of range, omitting it",
            rec.timestamp
        );
    }
    Ok(serde_json::to_value(doc)?)
}
