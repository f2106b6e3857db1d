use std::{fmt, io};

use thiserror::Error;

/// Which registry table a custom track tag was looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackTypeKind {
    Keyframe,
    Metadata,
}

impl fmt::Display for TrackTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackTypeKind::Keyframe => write!(f, "keyframe"),
            TrackTypeKind::Metadata => write!(f, "metadata"),
        }
    }
}

/// Error type for replay decoding
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Truncated input: needed {needed} bytes at offset {offset}, {remaining} remaining")]
    TruncatedInput {
        offset: u64,
        needed: usize,
        remaining: usize,
    },

    #[error("Unsupported replay version: {0}")]
    UnsupportedVersion(i32),

    #[error("Unknown event type index {type_index} at offset {offset}")]
    UnknownEventType { type_index: u8, offset: u64 },

    #[error("Unknown custom {kind} type: {tag}")]
    UnknownTrackType { kind: TrackTypeKind, tag: String },

    #[error("Invalid string length {length} at offset {offset}")]
    InvalidStringLength { length: i32, offset: u64 },

    #[error("String at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: u64 },

    #[error("Reader already failed; no further reads are possible")]
    ReaderFailed,

    #[error("Corrupt input: {0}")]
    CorruptInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReplayError>;
