use std::io::{stdout, Write};
use std::net::SocketAddr;

use anyhow::{Context, Result};
use stdc::config::{FrameOutput, FrameRelayConfig};
use stdc::frame::FrameSummary;
use stdc::stage::run_frame_relay;
use stdc::transport::FrameNumberEncoding;

use crate::info::Format;

pub fn output(
    envelope_out: Option<SocketAddr>,
    trailer_out: Option<SocketAddr>,
    big_endian: bool,
) -> Option<FrameOutput> {
    if let Some(dest) = trailer_out {
        let encoding = if big_endian {
            FrameNumberEncoding::BigEndian
        } else {
            FrameNumberEncoding::Legacy
        };
        return Some(FrameOutput::Trailer { dest, encoding });
    }
    envelope_out.map(FrameOutput::Envelope)
}

pub fn frames(port: u16, verbose: bool, output: Option<FrameOutput>, format: &Format) -> Result<()> {
    let config = FrameRelayConfig::builder()
        .input_port(port)
        .verbose(verbose)
        .output(output)
        .build();
    config.validate().context("invalid frame output")?;

    let mut out = stdout().lock();
    let summary = run_frame_relay(&config, &mut out)
        .with_context(|| format!("relaying frames from port {}", config.input_port))?;

    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, &summary).context("serializing to json")?;
            writeln!(out).context("writing to stdout")
        }
        Format::Text => {
            let data = render_text(&summary).context("serializing summary")?;
            out.write_all(data.as_bytes()).context("writing to stdout")
        }
    }
}

fn render_text(summary: &FrameSummary) -> Result<String> {
    let mut hb = handlebars::Handlebars::new();
    hb.register_escape_fn(handlebars::no_escape);
    hb.register_template_string("frames", TEXT_TEMPLATE)
        .context("registering template")?;
    hb.render("frames", summary).context("rendering text")
}

const TEXT_TEMPLATE: &str = r"Frames
===============================================================================
Count:               {{ count }}
Bytes:               {{ bytes }}
Missing:             {{ missing }}
First:               {{ first_frame_number }}
Last:                {{ last_frame_number }}
Mean BER:            {{ mean_ber }}
Reversed polarity:   {{ reversed_polarity }}
Mid-stream reversed: {{ mid_stream_reverse_polarity }}
Uncertain:           {{ uncertain }}
";
