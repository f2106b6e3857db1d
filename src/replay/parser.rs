//! Section decoders for the replay wire format

use bitflags::bitflags;
use tracing::debug;

use crate::{
    binary_utils::ByteReader,
    error::{ReplayError, Result},
    replay::{
        model::{
            CustomTrack, EventKeyframe, EventKind, EventTrack, MotionKeyframe, MotionTrack,
            ReplayDocument, TrackMetadata,
        },
        registry::{event_shape, EventShape, TrackRegistry},
    },
};

/// The only wire version this decoder understands
pub const SUPPORTED_VERSION: i32 = 1;

bitflags! {
    /// Fields present in a delta keyframe
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeltaFlags: u8 {
        const POSITION = 0b001;
        const VELOCITY = 0b010;
        const ROTATION = 0b100;
    }
}

/// Decode a complete, already decompressed replay buffer
pub fn parse_replay(data: &[u8], registry: &TrackRegistry) -> Result<ReplayDocument> {
    let mut reader = ByteReader::new(data);

    let version = reader.read_i32()?;
    if version != SUPPORTED_VERSION {
        return Err(reader.fail(ReplayError::UnsupportedVersion(version)));
    }

    let motion_tracks = read_motion_tracks(&mut reader)?;
    let custom_tracks = read_custom_tracks(&mut reader, registry)?;
    let event_track = read_event_track(&mut reader)?;

    if reader.remaining() > 0 {
        debug!("{} trailing bytes after event track", reader.remaining());
    }

    Ok(ReplayDocument::new(
        motion_tracks,
        custom_tracks,
        event_track,
    ))
}

pub fn read_motion_tracks(reader: &mut ByteReader<'_>) -> Result<Vec<MotionTrack>> {
    let count = reader.read_count()?;
    let mut tracks = Vec::with_capacity(count.min(reader.remaining()));

    for _ in 0..count {
        tracks.push(read_motion_track(reader)?);
    }

    debug!("Read {} motion tracks", tracks.len());
    Ok(tracks)
}

fn read_motion_track(reader: &mut ByteReader<'_>) -> Result<MotionTrack> {
    let entity_id = reader.read_i32()?;
    let entity_type = reader.read_i32()?;

    let has_metadata = reader.read_byte()?;
    let metadata = if has_metadata != 0 {
        Some(read_track_metadata(reader)?)
    } else {
        None
    };

    let keyframe_count = reader.read_count()?;
    let mut keyframes: Vec<MotionKeyframe> =
        Vec::with_capacity(keyframe_count.min(reader.remaining()));

    for _ in 0..keyframe_count {
        let keyframe = match keyframes.last() {
            None => read_full_keyframe(reader)?,
            Some(previous) => read_delta_keyframe(reader, previous)?,
        };
        keyframes.push(keyframe);
    }

    Ok(MotionTrack {
        entity_id,
        entity_type,
        metadata,
        keyframes,
    })
}

pub fn read_track_metadata(reader: &mut ByteReader<'_>) -> Result<TrackMetadata> {
    let identity = reader.read_i32()?;
    let label = reader.read_byte_array_string()?;
    Ok(TrackMetadata { identity, label })
}

pub fn read_full_keyframe(reader: &mut ByteReader<'_>) -> Result<MotionKeyframe> {
    Ok(MotionKeyframe {
        t: f64::from(reader.read_f32()?),
        position: reader.read_vector3()?,
        velocity: reader.read_vector3()?,
        rotation: reader.read_i32()?,
    })
}

/// Rebuild a keyframe from `previous` plus the fields flagged as changed.
/// Unflagged fields are copied as-is.
pub fn read_delta_keyframe(
    reader: &mut ByteReader<'_>,
    previous: &MotionKeyframe,
) -> Result<MotionKeyframe> {
    let dt = reader.read_f32()?;
    let flags = DeltaFlags::from_bits_truncate(reader.read_byte()?);

    let mut keyframe = MotionKeyframe {
        t: previous.t + f64::from(dt),
        ..*previous
    };

    if flags.contains(DeltaFlags::POSITION) {
        keyframe.position = previous.position + reader.read_vector3()?;
    }
    if flags.contains(DeltaFlags::VELOCITY) {
        keyframe.velocity = previous.velocity + reader.read_vector3()?;
    }
    if flags.contains(DeltaFlags::ROTATION) {
        keyframe.rotation = previous.rotation.wrapping_add(reader.read_i32()?);
    }

    Ok(keyframe)
}

pub fn read_custom_tracks(
    reader: &mut ByteReader<'_>,
    registry: &TrackRegistry,
) -> Result<Vec<CustomTrack>> {
    let count = reader.read_count()?;
    let mut tracks = Vec::with_capacity(count.min(reader.remaining()));

    for _ in 0..count {
        tracks.push(read_custom_track(reader, registry)?);
    }

    debug!("Read {} custom tracks", tracks.len());
    Ok(tracks)
}

fn read_custom_track(reader: &mut ByteReader<'_>, registry: &TrackRegistry) -> Result<CustomTrack> {
    let track_id = reader.read_i32()?;
    let keyframe_type = reader.read_string()?;
    let metadata_type = reader.read_string()?;

    let read_metadata = registry
        .metadata_reader(&metadata_type)
        .map_err(|e| reader.fail(e))?;
    let metadata = read_metadata(reader)?;

    let read_keyframe = registry
        .keyframe_reader(&keyframe_type)
        .map_err(|e| reader.fail(e))?;
    let keyframe_count = reader.read_count()?;
    let mut keyframes = Vec::with_capacity(keyframe_count.min(reader.remaining()));
    for _ in 0..keyframe_count {
        keyframes.push(read_keyframe(reader)?);
    }

    Ok(CustomTrack {
        track_id,
        keyframe_type,
        metadata_type,
        metadata,
        keyframes,
    })
}

/// Events are returned in stream order, which is also presentation order
pub fn read_event_track(reader: &mut ByteReader<'_>) -> Result<EventTrack> {
    let count = reader.read_count()?;
    let mut keyframes = Vec::with_capacity(count.min(reader.remaining()));

    for _ in 0..count {
        keyframes.push(read_event(reader)?);
    }

    debug!("Read {} events", keyframes.len());
    Ok(EventTrack { keyframes })
}

fn read_event(reader: &mut ByteReader<'_>) -> Result<EventKeyframe> {
    let offset = reader.position();
    let type_index = reader.read_byte()?;
    let shape = event_shape(type_index)
        .ok_or_else(|| reader.fail(ReplayError::UnknownEventType { type_index, offset }))?;

    let t = f64::from(reader.read_f32()?);
    let event_type = reader.read_byte()?;

    let kind = match shape {
        EventShape::Base => EventKind::Base,
        EventShape::World => EventKind::World {
            position: reader.read_vector3()?,
            rotation: reader.read_i32()?,
        },
        EventShape::BulletSpawn => EventKind::BulletSpawn {
            position: reader.read_vector3()?,
            velocity: reader.read_vector3()?,
            mass: f64::from(reader.read_f32()?),
            bullet_id: reader.read_i32()?,
            lifetime: f64::from(reader.read_byte()?),
        },
        EventShape::BulletEnd => EventKind::BulletEnd {
            bullet_id: reader.read_i32()?,
        },
    };

    Ok(EventKeyframe {
        type_index,
        t,
        event_type,
        kind,
    })
}
