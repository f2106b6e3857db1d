//! VTR replay decoding
//!
//! A decompressed replay buffer has the following layout (little-endian):
//!
//! ```text
//! i32 version (always 1)
//! motion section   i32 count, then per track:
//!                    i32 entity_id, i32 entity_type, u8 has_metadata,
//!                    [i32 identity, i32 label_len, label bytes],
//!                    i32 keyframe_count, one full keyframe, then deltas
//! custom section   i32 count, then per track:
//!                    i32 track_id, string keyframe_type, string metadata_type,
//!                    metadata record, i32 keyframe_count, keyframe records
//! event section    i32 count, then per event:
//!                    u8 type_index, f32 t, u8 event_type, shape fields
//! ```
//!
//! Records carry no length of their own. A single misread shifts every later
//! offset, so all decode errors abort the parse.

pub mod custom;
pub mod model;
pub mod parser;
pub mod registry;


pub use model::*;
pub use parser::{DeltaFlags, SUPPORTED_VERSION};
pub use registry::{CustomReader, CustomRecord, EventShape, TrackRegistry};

use crate::error::Result;

/// Decode a replay using the built-in custom track types
pub fn parse_replay(data: &[u8]) -> Result<ReplayDocument> {
    parser::parse_replay(data, TrackRegistry::global())
}

/// Decode a replay, resolving custom track types through `registry`
pub fn parse_replay_with(data: &[u8], registry: &TrackRegistry) -> Result<ReplayDocument> {
    parser::parse_replay(data, registry)
}
