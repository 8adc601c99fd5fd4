mod frames;
mod info;
mod render;

use std::io::stderr;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use stdc::transport::DEFAULT_FRAME_PORT;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Receive decoded frames from a decoder stage.
    ///
    /// Frames are read as versioned envelopes until the sender signals end of
    /// stream, then a summary is written to stdout.
    Frames {
        /// UDP port to receive frames on
        #[arg(short, long, default_value_t = DEFAULT_FRAME_PORT)]
        port: u16,

        /// Dump every received frame
        #[arg(short, long, action)]
        verbose: bool,

        /// Relay frames as envelopes to this address
        #[arg(long, value_name = "addr", conflicts_with = "trailer_out")]
        envelope_out: Option<SocketAddr>,

        /// Relay frames as payload plus frame number trailer to this address
        #[arg(long, value_name = "addr")]
        trailer_out: Option<SocketAddr>,

        /// Write the full frame number big-endian in the trailer rather than
        /// the legacy form.
        #[arg(long, action, requires = "trailer_out")]
        big_endian: bool,

        /// Summary format
        #[arg(short, long, default_value = "text")]
        format: info::Format,
    },
    /// Render packet records from a JSON lines file.
    ///
    /// Records go through the same selection and rendering as the parser
    /// stage: only decoded, CRC valid records are shown, and only messages
    /// unless --print-all is given.
    Render {
        /// Input JSON lines file, one packet record per line
        input: PathBuf,

        /// Show every field of each record
        #[arg(short, long, action)]
        verbose: bool,

        /// Show every eligible record, not just messages
        #[arg(short = 'a', long, action)]
        print_all: bool,

        /// Also send structured records to this address
        #[arg(
            long,
            value_name = "addr",
            num_args = 0..=1,
            default_missing_value = "127.0.0.1:15005"
        )]
        out_udp: Option<SocketAddr>,
    },
    /// Show a summary of packet records in a JSON lines file
    Info {
        /// Input JSON lines file
        input: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: info::Format,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("STDC_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Frames {
            port,
            verbose,
            envelope_out,
            trailer_out,
            big_endian,
            format,
        } => frames::frames(
            *port,
            *verbose,
            frames::output(*envelope_out, *trailer_out, *big_endian),
            format,
        ),
        Commands::Render {
            input,
            verbose,
            print_all,
            out_udp,
        } => render::render(input, *verbose, *print_all, *out_udp),
        Commands::Info { input, format } => info::info(input, format),
    }
}
