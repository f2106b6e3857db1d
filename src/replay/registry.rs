//! Decode tables for tagged records
//!
//! Event records carry a one-byte tag drawn from a fixed set, so their shapes
//! live in a constant table. Custom tracks name their keyframe and metadata
//! types with free-form strings; those are resolved through `TrackRegistry`,
//! which callers may extend before parsing. Record lengths are not stored in
//! the stream, so an unknown tag can never be skipped.

use std::{any::Any, collections::HashMap, fmt, sync::OnceLock};

use serde::{Serialize, Serializer};

use crate::{
    binary_utils::ByteReader,
    error::{ReplayError, Result, TrackTypeKind},
    replay::custom,
};

/// Built-in event record layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventShape {
    Base,
    World,
    BulletSpawn,
    BulletEnd,
}

/// Indexed by the event record's type byte
pub const EVENT_SHAPES: [EventShape; 5] = [
    EventShape::Base,        // 0
    EventShape::Base,        // 1
    EventShape::World,       // 2
    EventShape::BulletSpawn, // 3
    EventShape::BulletEnd,   // 4
];

pub fn event_shape(type_index: u8) -> Option<EventShape> {
    EVENT_SHAPES.get(type_index as usize).copied()
}

/// A record produced by a custom track decoder.
///
/// Implemented for every serialisable type, so decoders can return plain
/// structs. Use `as_any` to recover the concrete type.
pub trait CustomRecord: fmt::Debug + Send + Sync {
    fn to_json(&self) -> serde_json::Result<serde_json::Value>;
    fn as_any(&self) -> &dyn Any;
}

impl<T> CustomRecord for T
where
    T: Serialize + fmt::Debug + Send + Sync + 'static,
{
    fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Serialize for dyn CustomRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let value = self.to_json().map_err(serde::ser::Error::custom)?;
        value.serialize(serializer)
    }
}

impl dyn CustomRecord {
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Reads exactly one record from the stream
pub type CustomReader =
    Box<dyn Fn(&mut ByteReader<'_>) -> Result<Box<dyn CustomRecord>> + Send + Sync>;

#[derive(Default)]
pub struct TrackRegistry {
    keyframe_readers: HashMap<String, CustomReader>,
    metadata_readers: HashMap<String, CustomReader>,
}

impl TrackRegistry {
    /// A registry with no custom track types
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every custom track type the game writes
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        custom::register_builtin(&mut registry);
        registry
    }

    /// Shared built-in registry, created on first use
    pub fn global() -> &'static TrackRegistry {
        static GLOBAL: OnceLock<TrackRegistry> = OnceLock::new();
        GLOBAL.get_or_init(TrackRegistry::builtin)
    }

    /// Register a keyframe decoder. Replaces any decoder already bound to `tag`.
    pub fn register_keyframe<F, T>(&mut self, tag: impl Into<String>, reader: F) -> &mut Self
    where
        F: Fn(&mut ByteReader<'_>) -> Result<T> + Send + Sync + 'static,
        T: CustomRecord + 'static,
    {
        self.keyframe_readers.insert(tag.into(), boxed(reader));
        self
    }

    /// Register a metadata decoder. Replaces any decoder already bound to `tag`.
    pub fn register_metadata<F, T>(&mut self, tag: impl Into<String>, reader: F) -> &mut Self
    where
        F: Fn(&mut ByteReader<'_>) -> Result<T> + Send + Sync + 'static,
        T: CustomRecord + 'static,
    {
        self.metadata_readers.insert(tag.into(), boxed(reader));
        self
    }

    pub fn keyframe_reader(&self, tag: &str) -> Result<&CustomReader> {
        self.keyframe_readers
            .get(tag)
            .ok_or_else(|| ReplayError::UnknownTrackType {
                kind: TrackTypeKind::Keyframe,
                tag: tag.to_string(),
            })
    }

    pub fn metadata_reader(&self, tag: &str) -> Result<&CustomReader> {
        self.metadata_readers
            .get(tag)
            .ok_or_else(|| ReplayError::UnknownTrackType {
                kind: TrackTypeKind::Metadata,
                tag: tag.to_string(),
            })
    }

    pub fn keyframe_types(&self) -> impl Iterator<Item = &str> {
        self.keyframe_readers.keys().map(String::as_str)
    }

    pub fn metadata_types(&self) -> impl Iterator<Item = &str> {
        self.metadata_readers.keys().map(String::as_str)
    }
}

impl fmt::Debug for TrackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keyframes: Vec<_> = self.keyframe_types().collect();
        let mut metadata: Vec<_> = self.metadata_types().collect();
        keyframes.sort_unstable();
        metadata.sort_unstable();
        f.debug_struct("TrackRegistry")
            .field("keyframe_types", &keyframes)
            .field("metadata_types", &metadata)
            .finish()
    }
}

fn boxed<F, T>(reader: F) -> CustomReader
where
    F: Fn(&mut ByteReader<'_>) -> Result<T> + Send + Sync + 'static,
    T: CustomRecord + 'static,
{
    Box::new(move |r: &mut ByteReader<'_>| {
        reader(r).map(|record| Box::new(record) as Box<dyn CustomRecord>)
    })
}
