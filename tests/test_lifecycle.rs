use std::sync::Arc;
use std::time::Duration;

use batchflow::{Config, Producer, ProducerError};

use common::{payload, test_config, CollectingStats, ScriptedSink};

mod common;

#[tokio::test]
async fn start_stop_cycles_are_idempotent_pairs() {
    let sink = Arc::new(ScriptedSink::always_ok());
    let producer = Producer::new(sink, test_config()).expect("config");

    producer.start().await.expect("first start");
    assert!(matches!(
        producer.start().await,
        Err(ProducerError::AlreadyStarted)
    ));

    producer.stop().await.expect("first stop");
    assert!(matches!(
        producer.stop().await,
        Err(ProducerError::AlreadyStopped)
    ));

    producer.start().await.expect("restart");
    producer.stop().await.expect("second stop");
}

#[tokio::test]
async fn submit_requires_a_running_producer() {
    let sink = Arc::new(ScriptedSink::always_ok());
    let producer = Producer::new(sink, test_config()).expect("config");

    assert!(matches!(
        producer.submit(payload(0), "key").await,
        Err(ProducerError::NotRunning)
    ));

    producer.start().await.expect("start");
    producer.submit(payload(0), "key").await.expect("submit");
    producer.stop().await.expect("stop");

    assert!(matches!(
        producer.submit(payload(1), "key").await,
        Err(ProducerError::NotRunning)
    ));
}

#[tokio::test]
async fn no_sink_calls_after_stop_returns() {
    let sink = Arc::new(ScriptedSink::always_ok());
    let config = Config {
        // A batch never fills, so nothing dispatches before stop.
        batch_size: 10,
        buffer_size: 100,
        flush_interval: Duration::ZERO,
        ..test_config()
    };
    let producer = Producer::new(sink.clone(), config).expect("config");

    producer.start().await.expect("start");
    for n in 0..5 {
        producer.submit(payload(n), "key").await.expect("submit");
    }
    producer.stop().await.expect("stop");

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(sink.call_count(), 0);

    // The records survived the stop and drain on the next run's flush path.
    let report = producer.flush(Duration::ZERO, false).await.expect("flush");
    assert_eq!(report.sent, 5);
    assert_eq!(report.remaining, 0);
    assert_eq!(sink.total_records(), 5);
}

#[tokio::test]
async fn stop_emits_a_final_stats_snapshot() {
    let sink = Arc::new(ScriptedSink::always_ok());
    let stats = Arc::new(CollectingStats::default());
    let config = Config {
        stat_receiver: Some(stats.clone()),
        ..test_config()
    };
    let producer = Producer::new(sink, config).expect("config");

    producer.start().await.expect("start");
    for n in 0..10 {
        producer.submit(payload(n), "key").await.expect("submit");
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    producer.stop().await.expect("stop");

    let snapshots = stats.snapshots();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].records_sent_ok, 10);
    assert_eq!(snapshots[0].buffer_size, 0);
}

#[tokio::test]
async fn periodic_stats_reset_between_snapshots() {
    let sink = Arc::new(ScriptedSink::always_ok());
    let stats = Arc::new(CollectingStats::default());
    let config = Config {
        stat_interval: Duration::from_millis(50),
        stat_receiver: Some(stats.clone()),
        ..test_config()
    };
    let producer = Producer::new(sink, config).expect("config");

    producer.start().await.expect("start");
    for n in 0..10 {
        producer.submit(payload(n), "key").await.expect("submit");
    }
    tokio::time::sleep(Duration::from_millis(180)).await;
    producer.stop().await.expect("stop");

    let snapshots = stats.snapshots();
    assert!(snapshots.len() >= 2, "got {} snapshots", snapshots.len());
    // Counters are cumulative since the previous snapshot, so the totals add
    // up to exactly one delivery of every record.
    assert_eq!(stats.total_sent_ok(), 10);
    assert_eq!(stats.total_dropped(), 0);
}
