use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde::Serialize;

use crate::{
    error::Result,
    replay::{CustomTrack, Entity, EventTrack, MotionTrack, ReplayDocument},
};

/// Serialisable view of a whole replay, including the derived entity list
#[derive(Serialize, Debug)]
pub struct ReplayExport<'a> {
    pub motion_tracks: &'a [MotionTrack],
    pub custom_tracks: &'a [CustomTrack],
    pub event_track: &'a EventTrack,
    pub entities: Vec<Entity<'a>>,
}

impl<'a> From<&'a ReplayDocument> for ReplayExport<'a> {
    fn from(doc: &'a ReplayDocument) -> Self {
        ReplayExport {
            motion_tracks: doc.motion_tracks(),
            custom_tracks: doc.custom_tracks(),
            event_track: doc.event_track(),
            entities: doc.entities().collect(),
        }
    }
}

pub fn to_json_value(doc: &ReplayDocument) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(ReplayExport::from(doc))?)
}

pub fn to_json_string(doc: &ReplayDocument, pretty: bool) -> Result<String> {
    let export = ReplayExport::from(doc);
    let json = if pretty {
        serde_json::to_string_pretty(&export)?
    } else {
        serde_json::to_string(&export)?
    };
    Ok(json)
}

/// Write the replay as pretty-printed JSON
pub fn save_json(doc: &ReplayDocument, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &ReplayExport::from(doc))?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::{
        custom::{RADAR_LOCK_KEYFRAME, RADAR_LOCK_METADATA},
        parse_replay,
    };

    fn sample_document() -> ReplayDocument {
        let mut data = Vec::new();
        let i32s = |data: &mut Vec<u8>, values: &[i32]| {
            for v in values {
                data.extend_from_slice(&v.to_le_bytes());
            }
        };

        // version, one motion track with metadata and a single full keyframe
        i32s(&mut data, &[1, 1, 3, 5]);
        data.push(1);
        i32s(&mut data, &[8, 4]);
        data.extend_from_slice(b"Wolf");
        i32s(&mut data, &[1]);
        for v in [2.0f32, 1.0, 2.0, 3.0, 0.0, 0.0, 0.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        i32s(&mut data, &[45]);

        // one radar lock track with one keyframe
        i32s(&mut data, &[1, 6, RADAR_LOCK_KEYFRAME.len() as i32]);
        data.extend_from_slice(RADAR_LOCK_KEYFRAME.as_bytes());
        i32s(&mut data, &[RADAR_LOCK_METADATA.len() as i32]);
        data.extend_from_slice(RADAR_LOCK_METADATA.as_bytes());
        i32s(&mut data, &[3, 1]);
        data.extend_from_slice(&2.5f32.to_le_bytes());
        i32s(&mut data, &[3]);

        // one bullet-end event
        i32s(&mut data, &[1]);
        data.push(4);
        data.extend_from_slice(&2.75f32.to_le_bytes());
        data.push(6);
        i32s(&mut data, &[99]);

        parse_replay(&data).unwrap()
    }

    #[test]
    fn test_json_covers_every_section() {
        let json = to_json_value(&sample_document()).unwrap();

        let track = &json["motion_tracks"][0];
        assert_eq!(track["entity_id"], 3);
        assert_eq!(track["metadata"]["label"], "Wolf");
        assert_eq!(track["keyframes"][0]["rotation"], 45);
        assert_eq!(track["keyframes"][0]["position"]["z"], 3.0);

        let custom = &json["custom_tracks"][0];
        assert_eq!(custom["track_id"], 6);
        assert_eq!(custom["metadata"]["actor_id"], 3);
        assert_eq!(custom["keyframes"][0]["t"], 2.5);

        let event = &json["event_track"]["keyframes"][0];
        assert_eq!(event["type_index"], 4);
        assert_eq!(event["kind"], "BulletEnd");
        assert_eq!(event["bullet_id"], 99);

        assert_eq!(json["entities"][0]["entity_type"], 5);
        assert_eq!(json["entities"][0]["metadata"]["identity"], 8);
    }

    #[test]
    fn test_save_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replay.json");

        save_json(&sample_document(), &path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["entities"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_compact_and_pretty_agree() {
        let doc = sample_document();
        let compact: serde_json::Value =
            serde_json::from_str(&to_json_string(&doc, false).unwrap()).unwrap();
        let pretty: serde_json::Value =
            serde_json::from_str(&to_json_string(&doc, true).unwrap()).unwrap();
        assert_eq!(compact, pretty);
    }
}
