//! Decoder for VTOL VR flight replay (.vtr) files
//!
//! A stored replay is LZ4 compressed. [`load_vtr`] inflates and decodes a file
//! in one step; [`replay::parse_replay`] decodes an already inflated buffer.

pub mod binary_utils;
pub mod containers;
pub mod error;
pub mod export;
pub mod replay;

use std::{fs, hash::Hasher, path::Path};

use tracing::info;
use twox_hash::XxHash64;

pub use containers::compression::{decompress_vtr, DecompressOptions};
pub use error::{ReplayError, Result};
pub use replay::{parse_replay, parse_replay_with, ReplayDocument, TrackRegistry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Input is already decompressed
    pub raw: bool,
    pub decompress: DecompressOptions,
}

/// Read a replay file into its raw (decompressed) wire buffer
pub fn read_vtr_payload(path: &Path, options: &LoadOptions) -> Result<Vec<u8>> {
    let stored = fs::read(path)?;
    if options.raw {
        return Ok(stored);
    }
    decompress_vtr(&stored, &options.decompress)
}

/// Load and decode a compressed .vtr file with the built-in track types
pub fn load_vtr(path: &Path) -> Result<ReplayDocument> {
    load_vtr_with(path, &LoadOptions::default(), TrackRegistry::global())
}

pub fn load_vtr_with(
    path: &Path,
    options: &LoadOptions,
    registry: &TrackRegistry,
) -> Result<ReplayDocument> {
    let payload = read_vtr_payload(path, options)?;
    let doc = parse_replay_with(&payload, registry)?;

    info!(
        "Loaded {:?}: {} motion tracks, {} custom tracks, {} events",
        path,
        doc.motion_tracks().len(),
        doc.custom_tracks().len(),
        doc.event_track().keyframes.len()
    );

    Ok(doc)
}

/// xxHash64 of a decompressed replay buffer, for spotting duplicate recordings
pub fn payload_fingerprint(payload: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(payload);
    hasher.finish()
}
