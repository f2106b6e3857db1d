//! Built-in custom track types
//!
//! Each custom keyframe is stored in full; none are delta-encoded.

use serde::Serialize;

use crate::{
    binary_utils::ByteReader,
    error::Result,
    replay::{model::Vector3, registry::TrackRegistry},
};

pub const RADAR_LOCK_KEYFRAME: &str = "LockingRadar+RadarLockKeyframe";
pub const RADAR_LOCK_METADATA: &str = "LockingRadar+RadarLockReplayMetadata";
pub const RADAR_JAMMER_KEYFRAME: &str = "RadarJammer+JammerKeyframe";
pub const RADAR_JAMMER_METADATA: &str = "RadarJammer+ReplayMetadata";
pub const POOLED_PROJECTILE_KEYFRAME: &str =
    "VTOLVR.ReplaySystem.VTRPooledProjectile+PooledProjectileKeyframe";
pub const POOLED_PROJECTILE_METADATA: &str =
    "VTOLVR.ReplaySystem.VTRPooledProjectile+PooledProjectileMetadata";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarLockKeyframe {
    pub t: f64,
    pub target_id: i32,
}

impl RadarLockKeyframe {
    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(RadarLockKeyframe {
            t: f64::from(reader.read_f32()?),
            target_id: reader.read_i32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarLockMetadata {
    pub actor_id: i32,
}

impl RadarLockMetadata {
    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(RadarLockMetadata {
            actor_id: reader.read_i32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarJammerKeyframe {
    pub t: f64,
    pub keyframe_type: u8,
    pub transmit_mode: u8,
    pub band: u8,
    pub direction: Vector3,
}

impl RadarJammerKeyframe {
    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(RadarJammerKeyframe {
            t: f64::from(reader.read_f32()?),
            keyframe_type: reader.read_byte()?,
            transmit_mode: reader.read_byte()?,
            band: reader.read_byte()?,
            direction: reader.read_vector3()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarJammerMetadata {
    pub actor_replay_id: i32,
}

impl RadarJammerMetadata {
    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(RadarJammerMetadata {
            actor_replay_id: reader.read_i32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PooledProjectileKeyframe {
    pub t: f64,
    pub active: bool,
    pub position: Vector3,
    pub velocity: Vector3,
}

impl PooledProjectileKeyframe {
    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(PooledProjectileKeyframe {
            t: f64::from(reader.read_f32()?),
            active: reader.read_bool()?,
            position: reader.read_vector3()?,
            velocity: reader.read_vector3()?,
        })
    }
}

/// Metadata that occupies no bytes in the stream
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmptyMetadata {}

impl EmptyMetadata {
    pub fn read(_reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(EmptyMetadata {})
    }
}

pub fn register_builtin(registry: &mut TrackRegistry) {
    registry
        .register_keyframe(RADAR_LOCK_KEYFRAME, RadarLockKeyframe::read)
        .register_metadata(RADAR_LOCK_METADATA, RadarLockMetadata::read)
        .register_keyframe(RADAR_JAMMER_KEYFRAME, RadarJammerKeyframe::read)
        .register_metadata(RADAR_JAMMER_METADATA, RadarJammerMetadata::read)
        .register_keyframe(POOLED_PROJECTILE_KEYFRAME, PooledProjectileKeyframe::read)
        .register_metadata(POOLED_PROJECTILE_METADATA, EmptyMetadata::read);
}
