use std::fs::File;
use std::io::{stdout, BufRead, BufReader};
use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use stdc::config::ParserStageConfig;
use stdc::packet::{PacketRecord, TextFormat};
use stdc::stage::{render_records, PacketOutput};
use tracing::{info, warn};

/// Read packet records from a JSON lines file. Lines that are not valid
/// records are skipped.
pub fn read_records(fpath: &Path) -> Result<impl Iterator<Item = PacketRecord>> {
    let reader = BufReader::new(File::open(fpath).context("opening input")?);
    Ok(reader
        .lines()
        .map_while(std::result::Result::ok)
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(i, line)| match serde_json::from_str(&line) {
            Ok(rec) => Some(rec),
            Err(err) => {
                warn!(line = i + 1, "skipping invalid record: {err}");
                None
            }
        }))
}

pub fn render(
    fpath: &Path,
    verbose: bool,
    print_all: bool,
    packet_out: Option<SocketAddr>,
) -> Result<()> {
    let config = ParserStageConfig::builder()
        .format(if verbose {
            TextFormat::Verbose
        } else {
            TextFormat::Compact
        })
        .print_all(print_all)
        .packet_out(packet_out)
        .build();
    config.validate().context("invalid packet output")?;

    let records = read_records(fpath)?;
    let mut output = PacketOutput::from_config(&config, stdout().lock())
        .context("creating packet output")?;
    let summary = render_records(records, &mut output).context("rendering packets")?;

    info!(
        packets = summary.total,
        eligible = summary.eligible,
        messages = summary.messages,
        "rendered {fpath:?}"
    );
    Ok(())
}
