//! Integration tests for the recording lifecycle
//!
//! These tests validate the complete coordinator workflow:
//! - Start, ingest, stop and export
//! - Session isolation and late callbacks
//! - Collector notifications and decimation

mod common;

use common::builders::{config_in, SampleBuilder};
use common::mock_helpers::{RecordingSink, ScriptedSensors};
use common::read_lines;
use motion_recorder::storage::parse_export;
use motion_recorder::{AcquisitionCoordinator, Channel, SinkEvent};
use std::sync::Arc;

fn setup(
    dir: &std::path::Path,
) -> (AcquisitionCoordinator, Arc<ScriptedSensors>, Arc<RecordingSink>) {
    let sensors = ScriptedSensors::new();
    let sink = RecordingSink::new();
    let coordinator = AcquisitionCoordinator::new(config_in(dir), sensors.clone(), sink.clone());
    (coordinator, sensors, sink)
}

#[test]
fn test_three_samples_export_four_lines() {
    let dir = tempfile::tempdir().unwrap();
    let (coordinator, sensors, sink) = setup(dir.path());

    coordinator.start();
    assert!(sensors.emit(
        SampleBuilder::new(Channel::Accelerometer)
            .at(12.345678)
            .values(&[0.012, -0.981, 0.034])
            .build()
    ));
    assert!(sensors.emit(
        SampleBuilder::new(Channel::Accelerometer)
            .at(12.35)
            .values(&[0.001, 0.002, -0.0005])
            .build()
    ));
    assert!(sensors.emit(
        SampleBuilder::new(Channel::Accelerometer)
            .at(12.355)
            .values(&[22.1, -5.3, 41.0])
            .build()
    ));
    coordinator.stop();

    let path = coordinator.export_file().expect("export should succeed");
    let lines = read_lines(&path);
    assert_eq!(
        lines,
        vec![
            "TYPE,TIMESTAMP,X,Y,Z",
            "ACC,12.345678,0.012000,-0.981000,0.034000",
            "ACC,12.350000,0.001000,0.002000,-0.000500",
            "ACC,12.355000,22.100000,-5.300000,41.000000",
        ]
    );

    // None of 1, 2, 3 is a multiple of the interval
    assert!(sink.data_events().is_empty());
    assert_eq!(sink.events(), vec![SinkEvent::Start, SinkEvent::Stop]);
}

#[test]
fn test_export_file_name_and_location() {
    let dir = tempfile::tempdir().unwrap();
    let (coordinator, sensors, _sink) = setup(dir.path());

    coordinator.start();
    sensors.emit(SampleBuilder::new(Channel::Gyroscope).build());
    coordinator.stop();

    let path = coordinator.export_file().unwrap();
    assert_eq!(path.parent(), Some(dir.path()));
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("motion_data_"), "{}", name);
    assert!(name.ends_with(".csv"), "{}", name);
    // motion_data_YYYY-MM-DD_HH-mm-ss.csv
    assert!(name.len() >= "motion_data_2025-09-25_14-03-07.csv".len());
}

#[test]
fn test_export_twice_gives_identical_contents() {
    let dir = tempfile::tempdir().unwrap();
    let (coordinator, sensors, _sink) = setup(dir.path());

    coordinator.start();
    for i in 0..7 {
        sensors.emit(
            SampleBuilder::new(Channel::Magnetometer)
                .at(i as f64 * 0.1)
                .values(&[i as f64, 1.0, 2.0])
                .build(),
        );
    }
    coordinator.stop();

    let first = coordinator.export_file().unwrap();
    let second = coordinator.export_file().unwrap();
    assert_ne!(first, second);
    assert_eq!(
        std::fs::read_to_string(&first).unwrap(),
        std::fs::read_to_string(&second).unwrap()
    );
}

#[test]
fn test_new_session_does_not_touch_previous_export() {
    let dir = tempfile::tempdir().unwrap();
    let (coordinator, sensors, sink) = setup(dir.path());

    coordinator.start();
    for i in 1..=4 {
        sensors.emit(SampleBuilder::new(Channel::Gyroscope).at(i as f64).build());
    }
    coordinator.stop();
    let first_export = coordinator.export_file().unwrap();
    let first_contents = std::fs::read_to_string(&first_export).unwrap();

    coordinator.start();
    assert_eq!(coordinator.record_count(), 0);
    // Counters were reset: this is sample 1 of the new session, not sample 5
    sensors.emit(SampleBuilder::new(Channel::Gyroscope).at(100.0).build());
    assert!(sink.data_events().is_empty());
    coordinator.stop();

    assert_eq!(std::fs::read_to_string(&first_export).unwrap(), first_contents);
    let records = parse_export(&first_contents).unwrap();
    assert_eq!(records.len(), 4);

    let second_export = coordinator.export_file().unwrap();
    let second = parse_export(&std::fs::read_to_string(second_export).unwrap()).unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].timestamp(), 100.0);
}

#[test]
fn test_forwarded_events_carry_sanitized_values() {
    let dir = tempfile::tempdir().unwrap();
    let (coordinator, sensors, sink) = setup(dir.path());

    coordinator.start();
    for i in 1..=5 {
        let z = if i == 5 { f64::INFINITY } else { 0.5 };
        sensors.emit(
            SampleBuilder::new(Channel::Attitude)
                .at(i as f64)
                .values(&[0.1, f64::NAN, z])
                .build(),
        );
    }
    coordinator.stop();

    assert_eq!(
        sink.data_events(),
        vec![SinkEvent::Data {
            channel: Channel::Attitude,
            timestamp: 5.0,
            values: [0.1, 0.0, 0.0],
        }]
    );

    let path = coordinator.export_file().unwrap();
    let lines = read_lines(&path);
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[5], "MOTION,5.000000,0.100000,0.000000,0.000000");
}

#[test]
fn test_channels_decimate_independently() {
    let dir = tempfile::tempdir().unwrap();
    let (coordinator, sensors, sink) = setup(dir.path());

    coordinator.start();
    for i in 1..=12 {
        sensors.emit(SampleBuilder::new(Channel::Accelerometer).at(i as f64).build());
        if i <= 4 {
            sensors.emit(SampleBuilder::new(Channel::Gyroscope).at(i as f64).build());
        }
    }
    coordinator.stop();

    let forwarded: Vec<(Channel, f64)> = sink
        .data_events()
        .into_iter()
        .filter_map(|event| match event {
            SinkEvent::Data {
                channel, timestamp, ..
            } => Some((channel, timestamp)),
            _ => None,
        })
        .collect();
    assert_eq!(
        forwarded,
        vec![(Channel::Accelerometer, 5.0), (Channel::Accelerometer, 10.0)]
    );
}

#[test]
fn test_unavailable_channel_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let sensors = ScriptedSensors::without(&[Channel::Magnetometer]);
    let sink = RecordingSink::new();
    let coordinator =
        AcquisitionCoordinator::new(config_in(dir.path()), sensors.clone(), sink.clone());

    coordinator.start();
    assert!(coordinator.is_recording());
    assert_eq!(
        sensors.subscribed(),
        vec![Channel::Accelerometer, Channel::Gyroscope, Channel::Attitude]
    );
    assert!(!sensors.emit(SampleBuilder::new(Channel::Magnetometer).build()));

    coordinator.stop();
    assert!(sensors.subscribed().is_empty());
}

#[test]
fn test_repeated_start_and_stop_are_no_ops() {
    let dir = tempfile::tempdir().unwrap();
    let (coordinator, sensors, sink) = setup(dir.path());

    coordinator.stop();
    coordinator.start();
    sensors.emit(SampleBuilder::new(Channel::Accelerometer).build());
    let session = coordinator.current_session().unwrap();
    coordinator.start();
    assert!(Arc::ptr_eq(&session, &coordinator.current_session().unwrap()));
    assert_eq!(coordinator.record_count(), 1);
    coordinator.stop();
    coordinator.stop();

    assert_eq!(sink.count(&SinkEvent::Start), 1);
    assert_eq!(sink.count(&SinkEvent::Stop), 1);
}

#[test]
fn test_late_callback_lands_in_finished_session() {
    let dir = tempfile::tempdir().unwrap();
    let (coordinator, sensors, _sink) = setup(dir.path());

    coordinator.start();
    let in_flight = sensors.handler(Channel::Gyroscope).unwrap();
    coordinator.stop();
    let finished = coordinator.current_session().unwrap();

    coordinator.start();
    in_flight(SampleBuilder::new(Channel::Gyroscope).at(1.0).build());

    assert_eq!(finished.buffer().count(), 1);
    assert_eq!(coordinator.record_count(), 0);
    coordinator.stop();
}

#[test]
fn test_malformed_sample_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let (coordinator, sensors, _sink) = setup(dir.path());

    coordinator.start();
    sensors.emit(
        SampleBuilder::new(Channel::Accelerometer)
            .values(&[1.0, 2.0, 3.0, 4.0])
            .build(),
    );
    sensors.emit(SampleBuilder::new(Channel::Accelerometer).values(&[1.0, 2.0, 3.0]).build());
    coordinator.stop();

    let stats = coordinator.session_stats().unwrap();
    assert_eq!(stats.records, 1);
    assert_eq!(stats.rejected, 1);
    assert!(stats.stopped_at.is_some());
}

#[test]
fn test_export_failure_returns_none() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the export directory should be
    let blocked = dir.path().join("not_a_dir");
    std::fs::write(&blocked, b"x").unwrap();

    let (coordinator, sensors, _sink) = setup(&blocked);
    coordinator.start();
    sensors.emit(SampleBuilder::new(Channel::Accelerometer).build());
    coordinator.stop();

    assert!(coordinator.export_file().is_none());
    assert!(coordinator.export_to(&blocked).is_err());
}
