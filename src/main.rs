//! vtr-reader - inspect and export VTOL VR flight replays
//!
//! ```bash
//! # Decode a replay to JSON on stdout
//! vtr-reader decode flight.vtr
//!
//! # Write compact JSON to a file
//! vtr-reader decode flight.vtr -o flight.json --compact
//!
//! # Summarise a buffer that was decompressed elsewhere
//! vtr-reader info flight.bin --raw
//! ```
//!
//! Set `RUST_LOG=debug` to see per-section decode progress.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use vtr_reader::{
    export, parse_replay_with, payload_fingerprint, read_vtr_payload, LoadOptions, ReplayDocument,
    TrackRegistry,
};

/// Decoder for VTOL VR .vtr replay files
#[derive(Parser)]
#[command(name = "vtr-reader")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a replay and export it as JSON
    Decode {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print a summary of a replay
    Info {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Replay file (.vtr)
    input: PathBuf,

    /// Input is already decompressed
    #[arg(long)]
    raw: bool,

    /// Upper bound for the decompressed size, in bytes
    #[arg(long)]
    max_output_size: Option<usize>,
}

impl InputArgs {
    fn load_options(&self) -> LoadOptions {
        let mut options = LoadOptions {
            raw: self.raw,
            ..LoadOptions::default()
        };
        if let Some(max) = self.max_output_size {
            options.decompress.max_output_size = max;
        }
        options
    }

    fn load(&self) -> Result<(Vec<u8>, ReplayDocument)> {
        let payload = read_vtr_payload(&self.input, &self.load_options())
            .with_context(|| format!("Failed to read {:?}", self.input))?;
        let doc = parse_replay_with(&payload, TrackRegistry::global())
            .with_context(|| format!("Failed to decode {:?}", self.input))?;
        Ok((payload, doc))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            input,
            output,
            compact,
        } => decode(&input, output.as_deref(), compact),
        Commands::Info { input } => info(&input),
    }
}

fn decode(input: &InputArgs, output: Option<&Path>, compact: bool) -> Result<()> {
    let (_, doc) = input.load()?;

    match output {
        Some(path) if !compact => {
            export::save_json(&doc, path).with_context(|| format!("Failed to write {:?}", path))?;
            tracing::info!("Wrote {:?}", path);
        }
        Some(path) => {
            let json = export::to_json_string(&doc, false)?;
            fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
            tracing::info!("Wrote {:?}", path);
        }
        None => {
            let json = export::to_json_string(&doc, !compact)?;
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }

    Ok(())
}

fn info(input: &InputArgs) -> Result<()> {
    let (payload, doc) = input.load()?;

    println!("File:           {}", input.input.display());
    println!("Payload:        {} bytes", payload.len());
    println!("Fingerprint:    {:016x}", payload_fingerprint(&payload));
    println!("Motion tracks:  {}", doc.motion_tracks().len());
    println!("Custom tracks:  {}", doc.custom_tracks().len());
    println!("Events:         {}", doc.event_track().keyframes.len());

    let duration = doc
        .motion_tracks()
        .iter()
        .filter_map(|track| track.keyframes.last())
        .map(|keyframe| keyframe.t)
        .fold(0.0f64, f64::max);
    println!("Duration:       {:.2}s", duration);

    println!();
    println!("Entities:");
    for entity in doc.entities() {
        let label = entity.metadata.map(|m| m.label.as_str()).unwrap_or("-");
        println!(
            "  {:>6}  type {:>3}  {}",
            entity.entity_id, entity.entity_type, label
        );
    }

    if !doc.custom_tracks().is_empty() {
        println!();
        println!("Custom tracks:");
        for track in doc.custom_tracks() {
            println!(
                "  {:>6}  {} ({} keyframes)",
                track.track_id,
                track.keyframe_type,
                track.keyframes.len()
            );
        }
    }

    Ok(())
}
