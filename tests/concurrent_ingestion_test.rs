//! Stress tests for concurrent sample ingestion
//!
//! Four producer threads, one per channel, feed the coordinator while the
//! control thread exports mid-stream.

mod common;

use common::builders::{config_in, SampleBuilder};
use common::mock_helpers::{RecordingSink, ScriptedSensors};
use motion_recorder::storage::parse_export;
use motion_recorder::{AcquisitionCoordinator, Channel, SampleBuffer, SinkEvent};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

const PER_PRODUCER: usize = 2_000;

#[test]
fn test_four_producers_lose_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let sensors = ScriptedSensors::new();
    let sink = RecordingSink::new();
    let coordinator =
        AcquisitionCoordinator::new(config_in(dir.path()), sensors.clone(), sink.clone());
    coordinator.start();

    let barrier = Arc::new(Barrier::new(Channel::ALL.len()));
    let producers: Vec<_> = Channel::ALL
        .into_iter()
        .map(|channel| {
            let handler = sensors.handler(channel).unwrap();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..PER_PRODUCER {
                    // Unique id per record: channel index and sequence number
                    let id = (channel.index() * PER_PRODUCER + i) as f64;
                    handler(
                        SampleBuilder::new(channel)
                            .at(i as f64)
                            .values(&[id, 0.0, 0.0])
                            .build(),
                    );
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }
    coordinator.stop();

    let total = Channel::ALL.len() * PER_PRODUCER;
    assert_eq!(coordinator.record_count(), total);

    let records = coordinator.current_session().unwrap().buffer().snapshot();
    let ids: HashSet<u64> = records.iter().map(|r| r.values()[0] as u64).collect();
    assert_eq!(ids.len(), total);

    // Each channel's own records keep their order
    for channel in Channel::ALL {
        let timestamps: Vec<f64> = records
            .iter()
            .filter(|r| r.channel() == channel)
            .map(|r| r.timestamp())
            .collect();
        assert_eq!(timestamps.len(), PER_PRODUCER);
        assert!(timestamps.windows(2).all(|w| w[0] < w[1]));
    }

    // Every fifth sample of each channel was forwarded
    let forwarded = sink.data_events().len();
    assert_eq!(forwarded, Channel::ALL.len() * (PER_PRODUCER / 5));
    assert_eq!(
        coordinator.session_stats().unwrap().forwarded,
        forwarded as u64
    );
    assert_eq!(sink.count(&SinkEvent::Start), 1);
}

#[test]
fn test_export_during_ingestion_is_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let sensors = ScriptedSensors::new();
    let coordinator = Arc::new(AcquisitionCoordinator::new(
        config_in(dir.path()),
        sensors.clone(),
        RecordingSink::new(),
    ));
    coordinator.start();

    let handler = sensors.handler(Channel::Accelerometer).unwrap();
    let producer = thread::spawn(move || {
        for i in 0..PER_PRODUCER {
            handler(
                SampleBuilder::new(Channel::Accelerometer)
                    .at(i as f64)
                    .values(&[i as f64, 1.0, 2.0])
                    .build(),
            );
        }
    });

    let mut exports = Vec::new();
    for _ in 0..5 {
        exports.push(coordinator.export_to(dir.path()).unwrap());
    }
    producer.join().unwrap();
    coordinator.stop();

    for path in exports {
        let text = std::fs::read_to_string(&path).unwrap();
        let records = parse_export(&text).unwrap();
        // A snapshot is a prefix of the final log
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.timestamp(), i as f64);
            assert_eq!(record.values(), [i as f64, 1.0, 2.0]);
        }
    }
}

#[test]
fn test_buffer_n_by_m_appends() {
    let buffer = Arc::new(SampleBuffer::new());
    let producers = 8;
    let per_producer = 1_000;

    let handles: Vec<_> = (0..producers)
        .map(|p| {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                let channel = Channel::ALL[p % Channel::ALL.len()];
                for i in 0..per_producer {
                    let id = (p * per_producer + i) as f64;
                    let sample = SampleBuilder::new(channel).values(&[id, 0.0, 0.0]).build();
                    assert!(buffer.append(&sample));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(buffer.count(), producers * per_producer);
    let ids: HashSet<u64> = buffer
        .snapshot()
        .iter()
        .map(|r| r.values()[0] as u64)
        .collect();
    assert_eq!(ids.len(), producers * per_producer);
}
