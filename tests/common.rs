#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use batchflow::{
    BatchOutput, Config, Record, RecordResult, RecordSink, SinkError, StatReceiver, StatsSnapshot,
};

/// One observed batch: `(partition_key, payload)` per record, in order.
pub type SeenBatch = Vec<(String, Vec<u8>)>;

fn observe(records: &[Record]) -> SeenBatch {
    records
        .iter()
        .map(|r| (r.partition_key.clone(), r.payload.clone()))
        .collect()
}

/// Scripted response for one `put_batch` call.
pub enum SinkResponse {
    /// Whole batch succeeds.
    Ok,
    /// Whole batch fails with this message.
    WholeBatchError(String),
    /// The records at these indices fail; the rest succeed.
    FailAt {
        indices: Vec<usize>,
        code: String,
        message: String,
    },
}

/// Sink that replays a script of responses, then succeeds forever.
///
/// Every batch it sees is recorded for later inspection.
#[derive(Default)]
pub struct ScriptedSink {
    script: Mutex<VecDeque<SinkResponse>>,
    batches: Mutex<Vec<SeenBatch>>,
}

impl ScriptedSink {
    pub fn always_ok() -> Self {
        Self::default()
    }

    pub fn with_script(script: Vec<SinkResponse>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn batches(&self) -> Vec<SeenBatch> {
        self.batches.lock().expect("batches lock").clone()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches().iter().map(|b| b.len()).collect()
    }

    pub fn total_records(&self) -> usize {
        self.batches().iter().map(|b| b.len()).sum()
    }

    pub fn call_count(&self) -> usize {
        self.batches().len()
    }
}

#[async_trait]
impl RecordSink for ScriptedSink {
    async fn put_batch(&self, records: &[Record]) -> Result<BatchOutput, SinkError> {
        self.batches
            .lock()
            .expect("batches lock")
            .push(observe(records));

        let response = self
            .script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or(SinkResponse::Ok);

        match response {
            SinkResponse::Ok => Ok(BatchOutput::all_ok()),
            SinkResponse::WholeBatchError(message) => Err(SinkError::new(message)),
            SinkResponse::FailAt {
                indices,
                code,
                message,
            } => {
                let results = (0..records.len())
                    .map(|i| {
                        if indices.contains(&i) {
                            RecordResult::failed(code.clone(), message.clone())
                        } else {
                            RecordResult::ok()
                        }
                    })
                    .collect();
                Ok(BatchOutput::from_results(results))
            }
        }
    }
}

/// Sink whose every call fails wholesale.
pub struct FailingSink {
    message: String,
    calls: AtomicUsize,
}

impl FailingSink {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSink for FailingSink {
    async fn put_batch(&self, _records: &[Record]) -> Result<BatchOutput, SinkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SinkError::new(self.message.clone()))
    }
}

/// Sink that reports a per-record failure for every record of every batch.
pub struct RejectingSink {
    code: String,
    message: String,
    calls: AtomicUsize,
}

impl RejectingSink {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordSink for RejectingSink {
    async fn put_batch(&self, records: &[Record]) -> Result<BatchOutput, SinkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let results = records
            .iter()
            .map(|_| RecordResult::failed(self.code.clone(), self.message.clone()))
            .collect();
        Ok(BatchOutput::from_results(results))
    }
}

/// Sink that sleeps for a fixed duration before accepting every batch.
pub struct StallingSink {
    delay: Duration,
    batch_sizes: Mutex<Vec<usize>>,
}

impl StallingSink {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            batch_sizes: Mutex::new(Vec::new()),
        }
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().expect("batch sizes lock").clone()
    }
}

#[async_trait]
impl RecordSink for StallingSink {
    async fn put_batch(&self, records: &[Record]) -> Result<BatchOutput, SinkError> {
        tokio::time::sleep(self.delay).await;
        self.batch_sizes
            .lock()
            .expect("batch sizes lock")
            .push(records.len());
        Ok(BatchOutput::all_ok())
    }
}

/// Stat receiver that keeps every snapshot it is handed.
#[derive(Default)]
pub struct CollectingStats {
    snapshots: Mutex<Vec<StatsSnapshot>>,
}

impl CollectingStats {
    pub fn snapshots(&self) -> Vec<StatsSnapshot> {
        self.snapshots.lock().expect("snapshots lock").clone()
    }

    pub fn total_sent_ok(&self) -> u64 {
        self.snapshots().iter().map(|s| s.records_sent_ok).sum()
    }

    pub fn total_dropped(&self) -> u64 {
        self.snapshots().iter().map(|s| s.records_dropped).sum()
    }

    pub fn total_downstream_errors(&self) -> u64 {
        self.snapshots().iter().map(|s| s.downstream_errors).sum()
    }
}

impl StatReceiver for CollectingStats {
    fn receive(&self, stats: StatsSnapshot) {
        self.snapshots.lock().expect("snapshots lock").push(stats);
    }
}

/// Numbered payload for submissions.
pub fn payload(n: usize) -> Vec<u8> {
    format!("record-{n}").into_bytes()
}

/// Base config for tests: small buffer, eager-friendly, no periodic stats.
pub fn test_config() -> Config {
    Config {
        batch_size: 10,
        buffer_size: 100,
        flush_interval: Duration::from_millis(100),
        stat_interval: Duration::ZERO,
        ..Config::default()
    }
}
