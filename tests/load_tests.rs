//! End-to-end tests: compressed file on disk -> decoded document

use std::io::Write;

use vtr_reader::{
    export, load_vtr, load_vtr_with, payload_fingerprint,
    replay::{EventKind, Vector3},
    LoadOptions, ReplayError, TrackRegistry,
};

/// version 1, one motion track (full + two deltas), no custom tracks, one world event
fn replay_buffer() -> Vec<u8> {
    let mut data = Vec::new();
    let put_i32 = |data: &mut Vec<u8>, v: i32| data.extend_from_slice(&v.to_le_bytes());
    let put_f32s = |data: &mut Vec<u8>, values: &[f32]| {
        for v in values {
            data.extend_from_slice(&v.to_le_bytes());
        }
    };

    put_i32(&mut data, 1);
    put_i32(&mut data, 1);
    put_i32(&mut data, 42);
    put_i32(&mut data, 1);
    data.push(1);
    put_i32(&mut data, 7);
    put_i32(&mut data, 3);
    data.extend_from_slice(b"F/A");
    put_i32(&mut data, 3);

    put_f32s(&mut data, &[0.0, 10.0, 500.0, -10.0, 100.0, 0.0, 0.0]);
    put_i32(&mut data, 0);

    put_f32s(&mut data, &[0.5]);
    data.push(0b011);
    put_f32s(&mut data, &[50.0, 0.0, 0.0, -1.0, 0.0, 0.0]);

    put_f32s(&mut data, &[0.5]);
    data.push(0b100);
    put_i32(&mut data, 15);

    put_i32(&mut data, 0);

    put_i32(&mut data, 1);
    data.push(2);
    put_f32s(&mut data, &[0.75]);
    data.push(5);
    put_f32s(&mut data, &[1.0, 2.0, 3.0]);
    put_i32(&mut data, 90);

    data
}

fn frame_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = lz4_flex::frame::FrameEncoder::new(Vec::new());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[test]
fn test_load_frame_compressed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flight.vtr");
    std::fs::write(&path, frame_compress(&replay_buffer())).unwrap();

    let doc = load_vtr(&path).unwrap();

    let track = &doc.motion_tracks()[0];
    assert_eq!(track.entity_id, 42);
    assert_eq!(track.metadata.as_ref().unwrap().label, "F/A");
    assert_eq!(track.keyframes.len(), 3);

    let last = track.keyframes[2];
    assert_eq!(last.t, 1.0);
    assert_eq!(last.position, Vector3::new(60.0, 500.0, -10.0));
    assert_eq!(last.velocity, Vector3::new(99.0, 0.0, 0.0));
    assert_eq!(last.rotation, 15);

    let event = &doc.event_track().keyframes[0];
    assert_eq!(event.t, 0.75);
    assert_eq!(event.event_type, 5);
    assert_eq!(
        event.kind,
        EventKind::World {
            position: Vector3::new(1.0, 2.0, 3.0),
            rotation: 90,
        }
    );
}

#[test]
fn test_load_block_compressed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.vtr");
    std::fs::write(&path, lz4_flex::block::compress(&replay_buffer())).unwrap();

    let doc = load_vtr(&path).unwrap();
    assert_eq!(doc.entities().count(), 1);
}

#[test]
fn test_load_raw_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flight.bin");
    std::fs::write(&path, replay_buffer()).unwrap();

    let options = LoadOptions {
        raw: true,
        ..LoadOptions::default()
    };
    let doc = load_vtr_with(&path, &options, &TrackRegistry::builtin()).unwrap();
    assert_eq!(doc.motion_tracks()[0].keyframes.len(), 3);

    let json = export::to_json_value(&doc).unwrap();
    assert_eq!(json["entities"][0]["metadata"]["label"], "F/A");
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_vtr(&dir.path().join("missing.vtr"));
    assert!(matches!(result, Err(ReplayError::Io(_))));
}

#[test]
fn test_wrong_version_after_decompression() {
    let mut data = replay_buffer();
    data[0] = 2;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.vtr");
    std::fs::write(&path, frame_compress(&data)).unwrap();

    assert!(matches!(
        load_vtr(&path),
        Err(ReplayError::UnsupportedVersion(2))
    ));
}

#[test]
fn test_fingerprint_is_stable() {
    let data = replay_buffer();
    assert_eq!(
        payload_fingerprint(&data),
        payload_fingerprint(&replay_buffer())
    );

    let mut other = data.clone();
    other[4] = 0;
    assert_ne!(payload_fingerprint(&data), payload_fingerprint(&other));
}
