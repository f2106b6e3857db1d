//! Data model for decoded replays

use std::ops::Add;

use serde::Serialize;

use crate::replay::registry::CustomRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// Identity attached to a motion track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackMetadata {
    pub identity: i32,
    pub label: String,
}

/// One reconstructed sample of an entity's motion. All fields are absolute,
/// regardless of whether the sample was stored in full or as a delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotionKeyframe {
    pub t: f64,
    pub position: Vector3,
    pub velocity: Vector3,
    pub rotation: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotionTrack {
    pub entity_id: i32,
    pub entity_type: i32,
    pub metadata: Option<TrackMetadata>,
    pub keyframes: Vec<MotionKeyframe>,
}

/// Shape-specific payload of an event record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum EventKind {
    Base,
    World {
        position: Vector3,
        rotation: i32,
    },
    BulletSpawn {
        position: Vector3,
        velocity: Vector3,
        mass: f64,
        bullet_id: i32,
        /// Stored on the wire as a single byte, so never exceeds 255
        lifetime: f64,
    },
    BulletEnd {
        bullet_id: i32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventKeyframe {
    /// Wire tag that selected the shape. Tags 0 and 1 share the `Base`
    /// shape and are kept apart here.
    pub type_index: u8,
    pub t: f64,
    pub event_type: u8,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventTrack {
    pub keyframes: Vec<EventKeyframe>,
}

#[derive(Debug, Serialize)]
pub struct CustomTrack {
    pub track_id: i32,
    pub keyframe_type: String,
    pub metadata_type: String,
    pub metadata: Box<dyn CustomRecord>,
    pub keyframes: Vec<Box<dyn CustomRecord>>,
}

/// View of a motion track's identity, borrowed from the document
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Entity<'a> {
    pub entity_id: i32,
    pub entity_type: i32,
    pub metadata: Option<&'a TrackMetadata>,
}

impl<'a> From<&'a MotionTrack> for Entity<'a> {
    fn from(track: &'a MotionTrack) -> Self {
        Entity {
            entity_id: track.entity_id,
            entity_type: track.entity_type,
            metadata: track.metadata.as_ref(),
        }
    }
}

/// A fully decoded replay. Constructed only by the parser.
#[derive(Debug)]
pub struct ReplayDocument {
    motion_tracks: Vec<MotionTrack>,
    custom_tracks: Vec<CustomTrack>,
    event_track: EventTrack,
}

impl ReplayDocument {
    pub(crate) fn new(
        motion_tracks: Vec<MotionTrack>,
        custom_tracks: Vec<CustomTrack>,
        event_track: EventTrack,
    ) -> Self {
        ReplayDocument {
            motion_tracks,
            custom_tracks,
            event_track,
        }
    }

    pub fn motion_tracks(&self) -> &[MotionTrack] {
        &self.motion_tracks
    }

    pub fn custom_tracks(&self) -> &[CustomTrack] {
        &self.custom_tracks
    }

    pub fn event_track(&self) -> &EventTrack {
        &self.event_track
    }

    /// One entity per motion track, in track order
    pub fn entities(&self) -> impl Iterator<Item = Entity<'_>> + '_ {
        self.motion_tracks.iter().map(Entity::from)
    }
}
